//! Menu categories and tag classification.

use crate::desktop_entry::Application;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Label of the catch-all bucket for unmatched applications.
pub const OTHERS_LABEL: &str = "Others";

/// (label, icon name, tag prefixes) in menu order.
const REGISTRY: &[(&str, &str, &[&str])] = &[
    ("Multimedia", "applications-multimedia", &["Audio", "Video"]),
    ("Development", "applications-development", &["Development"]),
    ("Education", "applications-education", &["Education"]),
    ("Games", "applications-games", &["Game"]),
    ("Graphics", "applications-graphics", &["Graphics"]),
    ("Internet", "applications-internet", &["Network"]),
    ("Office", "applications-office", &["Office"]),
    ("Science", "applications-science", &["Science"]),
    ("Settings", "preferences-desktop", &["Settings"]),
    ("System", "applications-system", &["System"]),
    ("Accessories", "applications-accessories", &["Utility"]),
    (OTHERS_LABEL, "applications-other", &[]),
];

/// A menu section and the applications filed under it.
#[derive(Clone, Debug)]
pub struct Category {
    pub label: String,
    pub icon_name: String,
    pub icon_path: Option<PathBuf>,
    /// Tag prefixes; empty for a category that only receives leftovers.
    prefixes: Vec<&'static str>,
    pub apps: BTreeMap<String, Application>,
}

impl Category {
    pub fn new(label: &str, icon_name: &str, prefixes: &[&'static str]) -> Self {
        Self {
            label: label.to_string(),
            icon_name: icon_name.to_string(),
            icon_path: None,
            prefixes: prefixes.to_vec(),
            apps: BTreeMap::new(),
        }
    }

    pub fn matches(&self, tag: &str) -> bool {
        self.prefixes.iter().any(|prefix| tag.starts_with(prefix))
    }

    /// Applications shown under this header, sorted by name.
    pub fn visible_apps(&self) -> impl Iterator<Item = &Application> {
        self.apps.values().filter(|app| app.is_visible())
    }
}

/// Ordered set of categories.
#[derive(Clone, Debug)]
pub struct CategoryRegistry {
    categories: Vec<Category>,
}

impl CategoryRegistry {
    /// The standard freedesktop main-category layout.
    pub fn standard() -> Self {
        Self {
            categories: REGISTRY
                .iter()
                .map(|(label, icon, prefixes)| Category::new(label, icon, prefixes))
                .collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Category> {
        self.categories.iter_mut()
    }

    pub fn get(&self, label: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.label == label)
    }

    /// Indices of the categories an application with `tags` belongs to.
    ///
    /// A tag equal to a label wins outright, otherwise the first category
    /// whose prefixes match takes it. Without `multiple` only the first tag
    /// that matched anything counts. Unmatched applications land in Others.
    pub fn classify(&self, tags: &[String], multiple: bool) -> Vec<usize> {
        let mut matched = Vec::new();

        for tag in tags.iter().filter(|t| !t.is_empty()) {
            let hit = self
                .categories
                .iter()
                .position(|c| c.label == *tag)
                .or_else(|| self.categories.iter().position(|c| c.matches(tag)));

            if let Some(index) = hit {
                if !matched.contains(&index) {
                    matched.push(index);
                }
                if !multiple {
                    break;
                }
            }
        }

        if matched.is_empty() {
            if let Some(others) = self.categories.iter().position(|c| c.label == OTHERS_LABEL) {
                matched.push(others);
            }
        }

        matched
    }

    /// File `app` under its categories, replacing any previous entry with
    /// the same name in every category.
    pub fn assign(&mut self, app: &Application, multiple: bool) {
        self.remove(&app.name);
        for index in self.classify(&app.categories, multiple) {
            self.categories[index]
                .apps
                .insert(app.name.clone(), app.clone());
        }
    }

    pub fn remove(&mut self, name: &str) {
        for category in &mut self.categories {
            category.apps.remove(name);
        }
    }
}

impl Default for CategoryRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
