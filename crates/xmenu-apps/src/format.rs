//! xmenu text output.

use crate::catalog::AppCatalog;
use crate::categories::Category;
use crate::desktop_entry::Application;
use std::path::Path;

/// Renders categories and applications as xmenu lines.
pub struct MenuFormatter<'a> {
    print_images: bool,
    terminal: &'a str,
}

impl<'a> MenuFormatter<'a> {
    pub fn new(print_images: bool, terminal: &'a str) -> Self {
        Self {
            print_images,
            terminal,
        }
    }

    fn image_prefix(&self, icon: Option<&Path>, out: &mut String) {
        if let Some(path) = icon.filter(|_| self.print_images) {
            out.push_str("IMG:");
            out.push_str(&path.to_string_lossy());
            out.push('\t');
        }
    }

    pub fn category_line(&self, category: &Category) -> String {
        let mut out = String::new();
        self.image_prefix(category.icon_path.as_deref(), &mut out);
        out.push_str(&category.label);
        out
    }

    pub fn app_line(&self, app: &Application) -> String {
        let mut out = String::new();
        self.image_prefix(app.icon_path.as_deref(), &mut out);
        out.push_str(&app.name);
        if let Some(generic) = &app.generic_name {
            out.push_str(&format!(" ({generic})"));
        }
        out.push('\t');
        if app.terminal {
            out.push_str(&format!("{} -e {}", self.terminal, app.execute));
        } else {
            out.push_str(&app.execute);
        }
        out
    }

    /// Headers followed by tab-indented apps, skipping empty categories.
    pub fn category_menu<'c>(&self, categories: impl Iterator<Item = &'c Category>) -> Vec<String> {
        let mut lines = Vec::new();
        for category in categories {
            let mut apps = category.visible_apps().peekable();
            if apps.peek().is_none() {
                continue;
            }
            lines.push(self.category_line(category));
            lines.extend(apps.map(|app| format!("\t{}", self.app_line(app))));
        }
        lines
    }

    /// One line per application, already sorted by the caller.
    pub fn flat_menu<'c>(&self, apps: impl IntoIterator<Item = &'c Application>) -> Vec<String> {
        apps.into_iter().map(|app| self.app_line(app)).collect()
    }
}

/// Render the whole menu for a scanned catalog.
pub fn render_menu(catalog: &mut AppCatalog) -> Vec<String> {
    let config = catalog.config().clone();
    let formatter = MenuFormatter::new(config.print_images, &config.terminal);

    if config.sort_by_category {
        if config.print_images {
            catalog.resolve_category_icons();
        }
        formatter.category_menu(catalog.categories().iter())
    } else {
        formatter.flat_menu(catalog.applications())
    }
}
