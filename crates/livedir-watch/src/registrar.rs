//! Watch registration.

use crate::pattern::WatchPattern;

/// Top-level globs that are always watched, regardless of what the scan found.
pub const DEFAULT_GLOBS: [&str; 3] = ["*.html", "*.css", "*.js"];

/// Something that accepts watch patterns, typically the live-reload server.
pub trait WatchRegistry {
    /// Register a pattern; matching changes trigger a reload of all clients.
    fn watch(&mut self, pattern: WatchPattern);
}

impl WatchRegistry for Vec<WatchPattern> {
    fn watch(&mut self, pattern: WatchPattern) {
        self.push(pattern);
    }
}

/// Register [`DEFAULT_GLOBS`] followed by every discovered file.
///
/// Issues exactly `DEFAULT_GLOBS.len() + files.len()` registrations. A file
/// also covered by a top-level glob is registered twice on purpose.
pub fn register_watches<R>(registry: &mut R, files: &[String])
where
    R: WatchRegistry + ?Sized,
{
    for glob in DEFAULT_GLOBS {
        registry.watch(WatchPattern::glob(glob));
    }
    for file in files {
        registry.watch(WatchPattern::path(file.as_str()));
    }
    tracing::info!(
        globs = DEFAULT_GLOBS.len(),
        files = files.len(),
        "Registered watch patterns"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Counts calls instead of storing them.
    #[derive(Default)]
    struct CountingRegistry {
        calls: usize,
    }

    impl WatchRegistry for CountingRegistry {
        fn watch(&mut self, _pattern: WatchPattern) {
            self.calls += 1;
        }
    }

    #[test]
    fn test_empty_scan_registers_only_globs() {
        let mut registered: Vec<WatchPattern> = Vec::new();
        register_watches(&mut registered, &[]);

        assert_eq!(
            registered,
            vec![
                WatchPattern::glob("*.html"),
                WatchPattern::glob("*.css"),
                WatchPattern::glob("*.js"),
            ]
        );
    }

    #[test]
    fn test_registers_globs_then_files() {
        let files = vec![
            "css/site.css".to_owned(),
            "img/logo.PNG".to_owned(),
            "index.html".to_owned(),
        ];
        let mut registered: Vec<WatchPattern> = Vec::new();
        register_watches(&mut registered, &files);

        assert_eq!(registered.len(), 3 + files.len());
        assert_eq!(&registered[3..], &[
            WatchPattern::path("css/site.css"),
            WatchPattern::path("img/logo.PNG"),
            WatchPattern::path("index.html"),
        ]);
    }

    #[test]
    fn test_registration_count() {
        for n in [0, 1, 7, 50] {
            let files: Vec<String> = (0..n).map(|i| format!("page{i}.html")).collect();
            let mut registry = CountingRegistry::default();
            register_watches(&mut registry, &files);
            assert_eq!(registry.calls, 3 + n);
        }
    }

    #[test]
    fn test_file_covered_by_glob_is_still_registered() {
        let mut registered: Vec<WatchPattern> = Vec::new();
        register_watches(&mut registered, &["index.html".to_owned()]);

        assert!(registered.contains(&WatchPattern::glob("*.html")));
        assert!(registered.contains(&WatchPattern::path("index.html")));
    }

    #[test]
    fn test_works_through_trait_object() {
        let mut registered: Vec<WatchPattern> = Vec::new();
        let registry: &mut dyn WatchRegistry = &mut registered;
        register_watches(registry, &["a.js".to_owned()]);

        assert_eq!(registered.len(), 4);
    }
}
