//! Live-reload site configuration

use crate::cache::DEFAULT_CAPACITY;
use crate::inject::DEFAULT_EVENTS_URL;
use crate::reload::DEFAULT_DEBOUNCE;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for a [`Site`](crate::site::Site)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Directory whose files are served
    pub directory: PathBuf,

    /// File name suffixes whose changes trigger a reload
    pub watched_suffixes: Vec<String>,

    /// File name suffixes whose content is injected and cached
    pub cached_suffixes: Vec<String>,

    /// Endpoint the injected client listens on
    pub events_url: String,

    /// Quiet period after the last change before browsers reload
    pub debounce: Duration,

    /// Maximum number of cached pages
    pub cache_capacity: usize,
}

impl Default for Settings {
    #[inline]
    fn default() -> Self {
        Settings {
            directory: PathBuf::from("static"),
            watched_suffixes: vec![".html".to_string(), ".js".to_string()],
            cached_suffixes: vec![".html".to_string()],
            events_url: DEFAULT_EVENTS_URL.to_string(),
            debounce: DEFAULT_DEBOUNCE,
            cache_capacity: DEFAULT_CAPACITY,
        }
    }
}

impl Settings {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = directory.into();

        self
    }

    #[inline]
    pub fn with_watched_suffixes<I, S>(mut self, suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.watched_suffixes = suffixes.into_iter().map(Into::into).collect();

        self
    }

    #[inline]
    pub fn with_cached_suffixes<I, S>(mut self, suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cached_suffixes = suffixes.into_iter().map(Into::into).collect();

        self
    }

    #[inline]
    pub fn with_events_url(mut self, url: impl Into<String>) -> Self {
        self.events_url = url.into();

        self
    }

    #[inline]
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;

        self
    }

    #[inline]
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;

        self
    }

    /// Whether changes to `name` should trigger a reload
    pub fn is_watched(&self, name: &str) -> bool {
        has_suffix(name, &self.watched_suffixes)
    }

    /// Whether `name` is injected and cached
    pub fn is_cached(&self, name: &str) -> bool {
        has_suffix(name, &self.cached_suffixes)
    }

    /// Path of `name` inside the served directory
    pub fn path_of(&self, name: &str) -> PathBuf {
        self.directory.join(name)
    }

    #[inline]
    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

/// A name that is nothing but the suffix (`.html`) does not count
fn has_suffix(name: &str, suffixes: &[String]) -> bool {
    suffixes
        .iter()
        .any(|suffix| name.len() > suffix.len() && name.ends_with(suffix.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.directory, PathBuf::from("static"));
        assert_eq!(settings.events_url, "http://localhost:8080/events");
        assert_eq!(settings.debounce, Duration::from_millis(500));
        assert_eq!(settings.cache_capacity, 256);
        assert!(settings.is_watched("app.js"));
        assert!(settings.is_watched("index.html"));
        assert!(settings.is_cached("index.html"));
        assert!(!settings.is_cached("app.js"));
        assert!(!settings.is_watched("style.css"));
        assert!(!settings.is_cached(".html"));
    }

    #[test]
    fn test_builder() {
        let settings = Settings::new()
            .with_directory("public")
            .with_watched_suffixes([".htm"])
            .with_cached_suffixes(vec![".htm".to_string()])
            .with_events_url("http://127.0.0.1:9000/events")
            .with_debounce(Duration::from_millis(50))
            .with_cache_capacity(8);

        assert_eq!(settings.path_of("a.htm"), PathBuf::from("public").join("a.htm"));
        assert!(settings.is_watched("a.htm"));
        assert!(!settings.is_watched("a.html"));
        assert!(settings.is_cached("a.htm"));
        assert_eq!(settings.debounce, Duration::from_millis(50));
        assert_eq!(settings.cache_capacity, 8);
    }
}
