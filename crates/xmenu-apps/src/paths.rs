//! Path helpers for XDG directories and config files.

use std::path::PathBuf;

/// Name of the per-tool cache subdirectory.
pub const CACHE_DIR_NAME: &str = "xdg-xmenu";

/// The XDG base directories the menu is built from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct XdgDirs {
    pub data_home: PathBuf,
    pub data_dirs: Vec<PathBuf>,
    pub config_home: PathBuf,
    pub cache_home: PathBuf,
}

impl XdgDirs {
    /// Read the base directories from the environment, falling back to the
    /// XDG defaults under the user's home.
    pub fn from_env() -> Self {
        let home = dirs::home_dir().unwrap_or_default();

        let data_home = env_dir("XDG_DATA_HOME").unwrap_or_else(|| home.join(".local/share"));
        let config_home = env_dir("XDG_CONFIG_HOME").unwrap_or_else(|| home.join(".config"));
        let cache_home = env_dir("XDG_CACHE_HOME").unwrap_or_else(|| home.join(".cache"));
        let data_dirs = std::env::var("XDG_DATA_DIRS")
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| "/usr/local/share:/usr/share".to_string());

        Self {
            data_home,
            data_dirs: split_dir_list(&data_dirs),
            config_home,
            cache_home,
        }
    }

    /// Directories scanned (non-recursively) for `.desktop` files.
    /// The user data dir comes last so its entries override system ones.
    pub fn application_directories(&self) -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = self
            .data_dirs
            .iter()
            .map(|dir| dir.join("applications"))
            .collect();
        push_unique(&mut dirs, self.data_home.join("applications"));
        dirs
    }

    /// Roots walked recursively when indexing candidate icon files.
    pub fn icon_directories(&self) -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = self.data_dirs.iter().map(|dir| dir.join("icons")).collect();
        push_unique(&mut dirs, self.data_home.join("icons"));
        dirs
    }

    /// GTK settings file holding `gtk-icon-theme-name`.
    pub fn gtk_settings_file(&self) -> PathBuf {
        self.config_home.join("gtk-3.0").join("settings.ini")
    }

    /// Directory holding the converted icons and sentinels.
    /// Typically ~/.cache/xdg-xmenu
    pub fn cache_dir(&self) -> PathBuf {
        self.cache_home.join(CACHE_DIR_NAME)
    }
}

fn env_dir(var: &str) -> Option<PathBuf> {
    std::env::var_os(var)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// Split a colon separated directory list, dropping empties and duplicates.
fn split_dir_list(list: &str) -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    for dir in list.split(':') {
        if !dir.is_empty() {
            push_unique(&mut dirs, PathBuf::from(dir));
        }
    }
    dirs
}

fn push_unique(dirs: &mut Vec<PathBuf>, dir: PathBuf) {
    if !dirs.contains(&dir) {
        dirs.push(dir);
    }
}

/// Read the icon theme name out of a GTK `settings.ini`.
pub fn read_gtk_icon_theme(content: &str) -> Option<String> {
    content
        .lines()
        .filter_map(|line| line.split_once('='))
        .find(|(key, _)| key.trim() == "gtk-icon-theme-name")
        .map(|(_, value)| value.trim().trim_matches('"').to_string())
        .filter(|theme| !theme.is_empty())
}
