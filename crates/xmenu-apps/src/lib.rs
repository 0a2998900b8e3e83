//! xmenu-apps: Application catalog and icon cache for xmenu.
//!
//! Provides:
//! - Desktop entry parsing from .desktop files
//! - Category grouping over the freedesktop main categories
//! - Icon lookup across icon themes, converted into a fixed-size PNG cache
//! - xmenu-formatted output

mod cache;
mod catalog;
mod categories;
mod config;
mod desktop_entry;
mod error;
mod format;
mod icons;
mod paths;

pub use cache::{CacheEntry, IconCache, cache_is_expired};
pub use catalog::AppCatalog;
pub use categories::{Category, CategoryRegistry, OTHERS_LABEL};
pub use config::{DEFAULT_EXPIRY_DAYS, ICON_SIZE, MenuConfig};
pub use desktop_entry::{Application, DesktopRecord, strip_field_codes};
pub use error::{AppsError, Result};
pub use format::{MenuFormatter, render_menu};
pub use icons::{IconConverter, IconResolver, MagickConverter};
pub use paths::XdgDirs;

/// Scan the application directories and render the menu in one pass.
pub fn build_menu(config: MenuConfig, dirs: &XdgDirs) -> Vec<String> {
    let mut catalog = AppCatalog::new(config, dirs);
    catalog.scan(&dirs.application_directories());
    render_menu(&mut catalog)
}
