//! Desktop entry parsing.

use crate::error::{AppsError, Result};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Raw key/value pairs read from a .desktop file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DesktopRecord {
    entries: HashMap<String, String>,
}

impl DesktopRecord {
    /// Read a .desktop file. Invalid UTF-8 is replaced rather than rejected.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).map_err(|e| AppsError::io(path, e))?;
        Ok(Self::parse(&String::from_utf8_lossy(&bytes)))
    }

    /// Parse `Key=Value` lines. Stops at the first repeated key, which marks
    /// the start of a localized or action section.
    pub fn parse(content: &str) -> Self {
        let mut entries = HashMap::new();

        for line in content.lines() {
            let Some((key, value)) = line.trim().split_once('=') else {
                continue;
            };
            let key = key.trim();
            if entries.contains_key(key) {
                break;
            }
            entries.insert(key.to_string(), value.trim().to_string());
        }

        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

/// An application parsed from a .desktop file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Application {
    pub name: String,
    pub generic_name: Option<String>,
    /// Exec line with `%f`-style field codes removed.
    pub execute: String,
    pub icon_name: Option<String>,
    pub icon_path: Option<PathBuf>,
    pub categories: Vec<String>,
    pub terminal: bool,
    pub no_display: bool,
    pub only_show_in: Vec<String>,
}

impl Application {
    /// Build an application from a record. `None` when Name or Exec is missing.
    pub fn from_record(record: &DesktopRecord) -> Option<Self> {
        let name = record.get("Name")?.to_string();
        let execute = strip_field_codes(record.get("Exec")?);

        Some(Self {
            name,
            generic_name: record
                .get("GenericName")
                .filter(|s| !s.is_empty())
                .map(String::from),
            execute,
            icon_name: record.get("Icon").and_then(icon_basename),
            icon_path: None,
            categories: record.get("Categories").map(split_list).unwrap_or_default(),
            terminal: record.get("Terminal").is_some_and(parse_bool),
            no_display: record.get("NoDisplay").is_some_and(parse_bool),
            only_show_in: record.get("OnlyShowIn").map(split_list).unwrap_or_default(),
        })
    }

    /// Whether the entry belongs in a categorized menu.
    pub fn is_visible(&self) -> bool {
        !self.no_display && self.only_show_in.is_empty()
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(value, "true" | "True")
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Remove `%` followed by a letter (`%U`, `%f`, `%i`...) from an Exec line.
pub fn strip_field_codes(exec: &str) -> String {
    let mut out = String::with_capacity(exec.len());
    let mut chars = exec.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '%' && chars.peek().is_some_and(|n| n.is_ascii_alphabetic()) {
            chars.next();
            continue;
        }
        out.push(c);
    }

    out
}

/// Icon values may be absolute paths; only the file stem is used for lookup.
fn icon_basename(icon: &str) -> Option<String> {
    let base = Path::new(icon).file_name()?.to_str()?;
    let stem = [".png", ".svg", ".xpm"]
        .iter()
        .find_map(|ext| base.strip_suffix(ext))
        .unwrap_or(base);
    (!stem.is_empty()).then(|| stem.to_string())
}
