//! Menu generation options.

use std::time::Duration;

/// Edge length, in pixels, of converted icons.
pub const ICON_SIZE: u32 = 24;

/// Default age after which `--expired` refreshes the cache.
pub const DEFAULT_EXPIRY_DAYS: u64 = 7;

/// Options shared by the catalog, icon resolver and formatter.
#[derive(Clone, Debug)]
pub struct MenuConfig {
    /// Group applications under category headers.
    pub sort_by_category: bool,
    /// Let an application appear under every category it matches.
    pub multiple_categories: bool,
    /// Emit `IMG:` prefixes and resolve icons at all.
    pub print_images: bool,
    /// Convert icons that are missing from the cache.
    pub compile_images: bool,
    /// Ignore existing cache entries and resolve again.
    pub force_refresh: bool,
    /// Icon theme override; detected from GTK settings when `None`.
    pub icon_theme: Option<String>,
    /// Terminal used for `Terminal=true` entries.
    pub terminal: String,
    pub icon_size: u32,
    pub expiry: Duration,
}

impl MenuConfig {
    /// Turning image output off also turns compilation off.
    pub fn with_print_images(mut self, print_images: bool) -> Self {
        self.print_images = print_images;
        self.compile_images &= print_images;
        self
    }

    pub fn expiry_days(days: u64) -> Duration {
        Duration::from_secs(days.saturating_mul(24 * 60 * 60))
    }
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            sort_by_category: true,
            multiple_categories: false,
            print_images: true,
            compile_images: true,
            force_refresh: false,
            icon_theme: None,
            terminal: "xterm".to_string(),
            icon_size: ICON_SIZE,
            expiry: Self::expiry_days(DEFAULT_EXPIRY_DAYS),
        }
    }
}
