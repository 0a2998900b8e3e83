//! Icon lookup, conversion and caching.

use crate::cache::{CacheEntry, IconCache};
use crate::config::MenuConfig;
use crate::error::{AppsError, Result};
use crate::paths::{XdgDirs, read_gtk_icon_theme};
use log::{debug, info, warn};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Extensions accepted as icon sources.
const SOURCE_EXTENSIONS: [&str; 2] = ["png", "svg"];

/// Turns a non-PNG icon into a square PNG.
pub trait IconConverter {
    fn convert(&self, source: &Path, dest: &Path, size: u32) -> Result<()>;
}

/// Converter backed by ImageMagick's `convert`.
pub struct MagickConverter {
    program: String,
}

impl MagickConverter {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for MagickConverter {
    fn default() -> Self {
        Self::new("convert")
    }
}

impl IconConverter for MagickConverter {
    fn convert(&self, source: &Path, dest: &Path, size: u32) -> Result<()> {
        let status = Command::new(&self.program)
            .args(["-background", "none", "-size", &format!("{size}x{size}")])
            .arg(source)
            .arg(dest)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| AppsError::Conversion {
                source_path: source.to_path_buf(),
                reason: format!("failed to run {}: {}", self.program, e),
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(AppsError::Conversion {
                source_path: source.to_path_buf(),
                reason: format!("{} exited with {}", self.program, status),
            })
        }
    }
}

/// Resolves icon names to cached bitmaps.
///
/// The candidate index and theme are computed on the first lookup that
/// misses the cache, and every name is resolved at most once per run.
pub struct IconResolver {
    cache: IconCache,
    search_dirs: Vec<PathBuf>,
    settings_file: PathBuf,
    theme_override: Option<String>,
    compile: bool,
    force_refresh: bool,
    icon_size: u32,
    converter: Box<dyn IconConverter>,
    /// Candidate image files, in walk order.
    index: Option<Vec<PathBuf>>,
    theme: Option<Option<String>>,
    resolved: HashMap<String, Option<PathBuf>>,
}

impl IconResolver {
    pub fn new(config: &MenuConfig, dirs: &XdgDirs) -> Self {
        Self {
            cache: IconCache::new(dirs.cache_dir()),
            search_dirs: dirs.icon_directories(),
            settings_file: dirs.gtk_settings_file(),
            theme_override: config.icon_theme.clone().filter(|t| !t.is_empty()),
            compile: config.compile_images,
            force_refresh: config.force_refresh,
            icon_size: config.icon_size,
            converter: Box::new(MagickConverter::default()),
            index: None,
            theme: None,
            resolved: HashMap::new(),
        }
    }

    pub fn with_converter(mut self, converter: Box<dyn IconConverter>) -> Self {
        self.converter = converter;
        self
    }

    /// Whether the candidate index has been built yet.
    pub fn is_indexed(&self) -> bool {
        self.index.is_some()
    }

    /// Resolve an icon name to a cached bitmap path.
    pub fn resolve(&mut self, name: &str) -> Option<PathBuf> {
        if name.is_empty() {
            return None;
        }
        if let Some(known) = self.resolved.get(name) {
            return known.clone();
        }

        let result = self.resolve_uncached(name);
        self.resolved.insert(name.to_string(), result.clone());
        result
    }

    fn resolve_uncached(&mut self, name: &str) -> Option<PathBuf> {
        if !self.force_refresh {
            match self.cache.lookup(name) {
                CacheEntry::Bitmap(path) => return Some(path),
                CacheEntry::NotFound => return None,
                CacheEntry::Missing if !self.compile => return None,
                CacheEntry::Missing => {}
            }
        }

        let Some(source) = self.find_candidate(name) else {
            if let Err(e) = self.cache.mark_not_found(name) {
                warn!("Failed to record missing icon {}: {}", name, e);
            }
            info!("=> {}.notfound", name);
            return None;
        };

        match self.materialize(name, &source) {
            Ok(path) => {
                info!("{}.png <= {}", name, source.display());
                Some(path)
            }
            Err(e) => {
                warn!("Failed to cache icon {}: {}", name, e);
                None
            }
        }
    }

    /// Pick the source file for `name`. A path containing the active theme
    /// name beats one that doesn't; otherwise the first in walk order wins.
    fn find_candidate(&mut self, name: &str) -> Option<PathBuf> {
        let theme = self.theme().map(str::to_string);
        let index = self.index();

        let mut fallback = None;
        for path in index.iter().filter(|p| is_candidate(p, name)) {
            match &theme {
                Some(theme) if path.to_string_lossy().contains(theme.as_str()) => {
                    return Some(path.clone());
                }
                Some(_) => {
                    fallback.get_or_insert_with(|| path.clone());
                }
                None => return Some(path.clone()),
            }
        }

        fallback
    }

    fn materialize(&self, name: &str, source: &Path) -> Result<PathBuf> {
        if has_extension(source, "png") {
            return self.cache.store_copy(name, source);
        }

        self.cache.ensure_dir()?;
        let dest = self.cache.bitmap_path(name);
        self.converter.convert(source, &dest, self.icon_size)?;
        self.cache.commit_bitmap(name).ok_or_else(|| AppsError::Conversion {
            source_path: source.to_path_buf(),
            reason: format!("no output written to {}", dest.display()),
        })
    }

    fn index(&mut self) -> &[PathBuf] {
        let search_dirs = &self.search_dirs;
        self.index.get_or_insert_with(|| build_index(search_dirs))
    }

    /// Active theme: explicit override, else the GTK settings file.
    pub fn theme(&mut self) -> Option<&str> {
        if self.theme.is_none() {
            let detected = self.theme_override.clone().or_else(|| {
                fs::read_to_string(&self.settings_file)
                    .ok()
                    .and_then(|content| read_gtk_icon_theme(&content))
            });
            debug!("Icon theme: {:?}", detected);
            self.theme = Some(detected);
        }
        self.theme.as_ref().and_then(|t| t.as_deref())
    }
}

/// Walk every search dir for png/svg files, in file-name order.
fn build_index(search_dirs: &[PathBuf]) -> Vec<PathBuf> {
    let mut index = Vec::new();
    debug!("Scanning {} icon directories...", search_dirs.len());

    for dir_path in search_dirs {
        if !dir_path.is_dir() {
            continue;
        }

        let walker = walkdir::WalkDir::new(dir_path)
            .follow_links(true)
            .sort_by_file_name();

        for entry in walker.into_iter().filter_map(|e| e.ok()) {
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if SOURCE_EXTENSIONS.iter().any(|ext| has_extension(path, ext)) {
                index.push(path.to_path_buf());
            }
        }
    }

    debug!("Indexed {} icon files", index.len());
    index
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(ext)
}

fn is_candidate(path: &Path, name: &str) -> bool {
    path.file_stem().and_then(|s| s.to_str()) == Some(name)
        && SOURCE_EXTENSIONS.iter().any(|ext| has_extension(path, ext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use tempfile::TempDir;

    /// Records conversions and writes a placeholder PNG.
    struct FakeConverter {
        calls: Rc<RefCell<Vec<PathBuf>>>,
        succeed: bool,
    }

    impl IconConverter for FakeConverter {
        fn convert(&self, source: &Path, dest: &Path, _size: u32) -> Result<()> {
            self.calls.borrow_mut().push(source.to_path_buf());
            if self.succeed {
                fs::write(dest, b"converted").map_err(|e| AppsError::io(dest, e))
            } else {
                Err(AppsError::Conversion {
                    source_path: source.to_path_buf(),
                    reason: "fake failure".into(),
                })
            }
        }
    }

    struct Fixture {
        root: TempDir,
        dirs: XdgDirs,
    }

    impl Fixture {
        fn new() -> Self {
            let root = tempfile::tempdir().unwrap();
            let dirs = XdgDirs {
                data_home: root.path().join("home/.local/share"),
                data_dirs: vec![root.path().join("usr/share")],
                config_home: root.path().join("home/.config"),
                cache_home: root.path().join("home/.cache"),
            };
            Self { root, dirs }
        }

        fn icon(&self, rel: &str, body: &[u8]) -> PathBuf {
            let path = self.root.path().join("usr/share/icons").join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, body).unwrap();
            path
        }

        fn resolver(&self, config: &MenuConfig) -> (IconResolver, Rc<RefCell<Vec<PathBuf>>>) {
            self.resolver_with(config, true)
        }

        fn resolver_with(
            &self,
            config: &MenuConfig,
            succeed: bool,
        ) -> (IconResolver, Rc<RefCell<Vec<PathBuf>>>) {
            let calls = Rc::new(RefCell::new(Vec::new()));
            let resolver = IconResolver::new(config, &self.dirs).with_converter(Box::new(
                FakeConverter {
                    calls: calls.clone(),
                    succeed,
                },
            ));
            (resolver, calls)
        }

        fn cache_listing(&self) -> Vec<String> {
            let mut names: Vec<String> = fs::read_dir(self.dirs.cache_dir())
                .map(|rd| {
                    rd.filter_map(|e| e.ok())
                        .map(|e| e.file_name().to_string_lossy().into_owned())
                        .collect()
                })
                .unwrap_or_default();
            names.sort();
            names
        }
    }

    #[test]
    fn test_cache_hit_skips_index_and_conversion() {
        let fx = Fixture::new();
        let cache = IconCache::new(fx.dirs.cache_dir());
        cache.ensure_dir().unwrap();
        fs::write(cache.bitmap_path("foo"), b"png").unwrap();

        let (mut resolver, calls) = fx.resolver(&MenuConfig::default());
        assert_eq!(resolver.resolve("foo"), Some(cache.bitmap_path("foo")));
        assert!(!resolver.is_indexed());
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn test_sentinel_hit_skips_scan() {
        let fx = Fixture::new();
        fx.icon("hicolor/48x48/apps/foo.png", b"png");
        let cache = IconCache::new(fx.dirs.cache_dir());
        cache.mark_not_found("foo").unwrap();

        let (mut resolver, _) = fx.resolver(&MenuConfig::default());
        assert_eq!(resolver.resolve("foo"), None);
        assert!(!resolver.is_indexed());
    }

    #[test]
    fn test_svg_converted_once() {
        let fx = Fixture::new();
        let source = fx.icon("hicolor/scalable/apps/bar.svg", b"<svg/>");

        let (mut resolver, calls) = fx.resolver(&MenuConfig::default());
        let expected = fx.dirs.cache_dir().join("bar.png");
        assert_eq!(resolver.resolve("bar"), Some(expected.clone()));
        assert_eq!(resolver.resolve("bar"), Some(expected));
        assert_eq!(*calls.borrow(), vec![source]);
        assert_eq!(fx.cache_listing(), vec!["bar.png"]);
    }

    #[test]
    fn test_png_copied_verbatim() {
        let fx = Fixture::new();
        fx.icon("hicolor/24x24/apps/term.png", b"\x89PNG-bytes");

        let (mut resolver, calls) = fx.resolver(&MenuConfig::default());
        let path = resolver.resolve("term").unwrap();
        assert_eq!(fs::read(path).unwrap(), b"\x89PNG-bytes");
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn test_missing_icon_writes_sentinel() {
        let fx = Fixture::new();
        let (mut resolver, _) = fx.resolver(&MenuConfig::default());
        assert_eq!(resolver.resolve("ghost"), None);
        assert_eq!(fx.cache_listing(), vec!["ghost.notfound"]);
    }

    #[test]
    fn test_themed_candidate_wins() {
        let fx = Fixture::new();
        fx.icon("Adwaita/48x48/apps/editor.png", b"adwaita");
        fx.icon("Papirus/48x48/apps/editor.png", b"papirus");
        fx.icon("hicolor/48x48/apps/editor.png", b"hicolor");

        let config = MenuConfig {
            icon_theme: Some("Papirus".into()),
            ..MenuConfig::default()
        };
        let (mut resolver, _) = fx.resolver(&config);
        let path = resolver.resolve("editor").unwrap();
        assert_eq!(fs::read(path).unwrap(), b"papirus");
    }

    #[test]
    fn test_unthemed_fallback_when_theme_lacks_icon() {
        let fx = Fixture::new();
        fx.icon("Adwaita/48x48/apps/editor.png", b"adwaita");
        fx.icon("hicolor/48x48/apps/editor.png", b"hicolor");

        let config = MenuConfig {
            icon_theme: Some("Papirus".into()),
            ..MenuConfig::default()
        };
        let (mut resolver, _) = fx.resolver(&config);
        let path = resolver.resolve("editor").unwrap();
        assert_eq!(fs::read(path).unwrap(), b"adwaita");
    }

    #[test]
    fn test_theme_from_gtk_settings() {
        let fx = Fixture::new();
        let settings = fx.dirs.gtk_settings_file();
        fs::create_dir_all(settings.parent().unwrap()).unwrap();
        fs::write(&settings, "[Settings]\ngtk-icon-theme-name=Breeze\n").unwrap();

        let (mut resolver, _) = fx.resolver(&MenuConfig::default());
        assert_eq!(resolver.theme(), Some("Breeze"));
    }

    #[test]
    fn test_lazy_mode_writes_nothing() {
        let fx = Fixture::new();
        fx.icon("hicolor/48x48/apps/foo.png", b"png");
        let config = MenuConfig {
            compile_images: false,
            ..MenuConfig::default()
        };
        let (mut resolver, _) = fx.resolver(&config);
        assert_eq!(resolver.resolve("foo"), None);
        assert!(!resolver.is_indexed());
        assert!(fx.cache_listing().is_empty());
    }

    #[test]
    fn test_force_refresh_replaces_sentinel() {
        let fx = Fixture::new();
        IconCache::new(fx.dirs.cache_dir()).mark_not_found("foo").unwrap();
        fx.icon("hicolor/48x48/apps/foo.png", b"png");

        let config = MenuConfig {
            force_refresh: true,
            ..MenuConfig::default()
        };
        let (mut resolver, _) = fx.resolver(&config);
        assert!(resolver.resolve("foo").is_some());
        assert_eq!(fx.cache_listing(), vec!["foo.png"]);
    }

    #[test]
    fn test_conversion_failure_is_not_found() {
        let fx = Fixture::new();
        fx.icon("hicolor/scalable/apps/bar.svg", b"<svg/>");

        let (mut resolver, calls) = fx.resolver_with(&MenuConfig::default(), false);
        assert_eq!(resolver.resolve("bar"), None);
        assert_eq!(calls.borrow().len(), 1);
        assert!(fx.cache_listing().is_empty());
    }

    #[test]
    fn test_second_run_leaves_cache_unchanged() {
        let fx = Fixture::new();
        fx.icon("hicolor/scalable/apps/bar.svg", b"<svg/>");
        fx.icon("hicolor/48x48/apps/foo.png", b"png");

        let run = || {
            let (mut resolver, calls) = fx.resolver(&MenuConfig::default());
            resolver.resolve("bar");
            resolver.resolve("foo");
            resolver.resolve("ghost");
            let conversions = calls.borrow().len();
            conversions
        };
        let snapshot = || -> Vec<(String, std::time::SystemTime)> {
            fx.cache_listing()
                .into_iter()
                .map(|name| {
                    let modified = fs::metadata(fx.dirs.cache_dir().join(&name))
                        .and_then(|m| m.modified())
                        .unwrap();
                    (name, modified)
                })
                .collect()
        };

        assert_eq!(run(), 1);
        let first = snapshot();
        assert_eq!(
            first.iter().map(|(n, _)| n.as_str()).collect::<Vec<_>>(),
            vec!["bar.png", "foo.png", "ghost.notfound"]
        );

        std::thread::sleep(std::time::Duration::from_millis(20));
        assert_eq!(run(), 0);
        assert_eq!(snapshot(), first);
    }
}
