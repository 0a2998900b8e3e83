//! xdg-xmenu - application menu generator for xmenu
//!
//! Scans XDG application directories and prints the menu on stdout.
//! Icon resolution diagnostics go to stderr through the logger.

use clap::Parser;
use log::info;
use std::error::Error;
use std::io::{self, BufWriter, Write};
use xmenu_apps::{DEFAULT_EXPIRY_DAYS, MenuConfig, XdgDirs, build_menu, cache_is_expired};

#[derive(Parser, Debug)]
#[command(name = "xdg-xmenu")]
#[command(about = "Generate application menu in xmenu format")]
struct Args {
    /// Don't sort applications by category
    #[arg(short = 'a', long = "applications")]
    no_categories: bool,

    /// Refresh image cache if older than the expiry window
    #[arg(short, long)]
    expired: bool,

    /// Force refresh image cache
    #[arg(short, long)]
    force: bool,

    /// Select a custom icon theme
    #[arg(short = 'i', long = "icontheme", value_name = "THEME")]
    icon_theme: Option<String>,

    /// Don't compile images on demand (this is way faster)
    #[arg(short, long)]
    lazy: bool,

    /// Add applications to multiple categories
    #[arg(short, long)]
    multiple: bool,

    /// No image output (implies --lazy)
    #[arg(short, long)]
    text: bool,

    /// Cache age, in days, after which --expired refreshes it
    #[arg(long, value_name = "DAYS", default_value_t = DEFAULT_EXPIRY_DAYS)]
    expiry_days: u64,

    /// Terminal for Terminal=true entries (defaults to $TERMINAL, then xterm)
    #[arg(long, value_name = "CMD")]
    terminal: Option<String>,
}

impl Args {
    fn into_config(self, dirs: &XdgDirs) -> MenuConfig {
        let expiry = MenuConfig::expiry_days(self.expiry_days);
        let expired = self.expired && cache_is_expired(&dirs.cache_dir(), expiry);
        if expired {
            info!("Icon cache is older than {} days, refreshing", self.expiry_days);
        }

        let terminal = self
            .terminal
            .or_else(|| std::env::var("TERMINAL").ok().filter(|t| !t.is_empty()))
            .unwrap_or_else(|| MenuConfig::default().terminal);

        MenuConfig {
            sort_by_category: !self.no_categories,
            multiple_categories: self.multiple,
            compile_images: !self.lazy,
            force_refresh: self.force || expired,
            icon_theme: self.icon_theme.filter(|t| !t.is_empty()),
            terminal,
            expiry,
            ..MenuConfig::default()
        }
        .with_print_images(!self.text)
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let args = Args::parse();
    let dirs = XdgDirs::from_env();
    let config = args.into_config(&dirs);

    let lines = build_menu(config, &dirs);

    let mut out = BufWriter::new(io::stdout().lock());
    for line in &lines {
        writeln!(out, "{}", line)?;
    }
    out.flush()?;

    Ok(())
}
