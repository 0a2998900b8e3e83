//! App Catalog implementation.

use crate::categories::CategoryRegistry;
use crate::config::MenuConfig;
use crate::desktop_entry::{Application, DesktopRecord};
use crate::icons::IconResolver;
use crate::paths::XdgDirs;
use log::{debug, info, warn};

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Applications found during one scan, with their category buckets.
pub struct AppCatalog {
    config: MenuConfig,
    /// Applications keyed by Name; later entries replace earlier ones.
    apps: HashMap<String, Application>,
    categories: CategoryRegistry,
    icons: IconResolver,
}

impl AppCatalog {
    pub fn new(config: MenuConfig, dirs: &XdgDirs) -> Self {
        let icons = IconResolver::new(&config, dirs);
        Self::with_resolver(config, icons)
    }

    pub fn with_resolver(config: MenuConfig, icons: IconResolver) -> Self {
        Self {
            config,
            apps: HashMap::new(),
            categories: CategoryRegistry::standard(),
            icons,
        }
    }

    pub fn config(&self) -> &MenuConfig {
        &self.config
    }

    pub fn categories(&self) -> &CategoryRegistry {
        &self.categories
    }

    pub fn get_app(&self, name: &str) -> Option<&Application> {
        self.apps.get(name)
    }

    /// All applications, sorted by name.
    pub fn applications(&self) -> Vec<&Application> {
        let mut apps: Vec<&Application> = self.apps.values().collect();
        apps.sort_by(|a, b| a.name.cmp(&b.name));
        apps
    }

    /// Scan every application directory, in order.
    pub fn scan(&mut self, dirs: &[PathBuf]) {
        info!("Scanning {} application directories...", dirs.len());
        for dir in dirs {
            self.scan_directory(dir);
        }
        info!("Found {} applications", self.apps.len());
    }

    /// Load the `.desktop` files directly inside `dir`, in file-name order.
    pub fn scan_directory(&mut self, dir: &Path) {
        if !dir.is_dir() {
            return;
        }

        let walker = walkdir::WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry in {}: {}", dir.display(), e);
                    continue;
                }
            };

            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("desktop") {
                continue;
            }

            let target = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
            if target.is_file() {
                self.load_file(&target);
            }
        }
    }

    /// Parse one descriptor and add it. Returns whether an app was added.
    pub fn load_file(&mut self, path: &Path) -> bool {
        let record = match DesktopRecord::load(path) {
            Ok(record) => record,
            Err(e) => {
                warn!("{}", e);
                return false;
            }
        };

        match Application::from_record(&record) {
            Some(app) => {
                self.insert(app);
                true
            }
            None => {
                debug!("Skipping {}: missing Name or Exec", path.display());
                false
            }
        }
    }

    /// Resolve the icon, file the app under its categories and store it,
    /// replacing any earlier app of the same name.
    pub fn insert(&mut self, mut app: Application) {
        if self.config.print_images {
            if let Some(icon) = app.icon_name.as_deref() {
                app.icon_path = self.icons.resolve(icon);
            }
        }

        if self.config.sort_by_category {
            self.categories.assign(&app, self.config.multiple_categories);
        }

        self.apps.insert(app.name.clone(), app);
    }

    /// Resolve each category header's own icon.
    pub fn resolve_category_icons(&mut self) {
        for category in self.categories.iter_mut() {
            category.icon_path = self.icons.resolve(&category.icon_name);
        }
    }
}
