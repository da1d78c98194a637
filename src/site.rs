//! Live-reload site
//!
//! Ties the injector, the page cache and the reload notification together.
//! The filesystem watcher and the HTTP server are not part of this crate:
//! the watcher calls [`Site::file_changed`], the static handler reads
//! [`Site::page`], and the events endpoint waits on [`Site::reload_signal`].

use crate::cache::{Page, PageCache};
use crate::inject::Injector;
use crate::reload::{Debouncer, ReloadSignal};
use crate::settings::Settings;
use rayon::prelude::*;
use std::borrow::Cow;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Errors from reading the served directory
#[derive(Debug, Error)]
pub enum SiteError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl SiteError {
    fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        SiteError::Io {
            path: path.into(),
            source,
        }
    }
}

/// A served directory and its transformed pages
pub struct Site {
    settings: Settings,
    injector: Injector,
    cache: PageCache,
    signal: Arc<ReloadSignal>,
    debouncer: Debouncer,
}

impl Site {
    pub fn new(settings: Settings) -> Self {
        let signal = Arc::new(ReloadSignal::new());

        Site {
            injector: Injector::new(&settings.events_url),
            cache: PageCache::new(settings.cache_capacity),
            debouncer: Debouncer::new(settings.debounce, Arc::clone(&signal)),
            signal,
            settings,
        }
    }

    #[inline]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[inline]
    pub fn injector(&self) -> &Injector {
        &self.injector
    }

    /// Watched file names directly inside the served directory, sorted
    pub fn enumerate(&self) -> Result<Vec<String>, SiteError> {
        let dir = self.settings.directory();
        let entries = fs::read_dir(dir).map_err(|e| SiteError::io(dir, e))?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| SiteError::io(dir, e))?;
            let file_type = entry.file_type().map_err(|e| SiteError::io(entry.path(), e))?;
            if file_type.is_dir() {
                continue;
            }
            // Names that are not UTF-8 cannot be requested by URL anyway
            if let Ok(name) = entry.file_name().into_string() {
                if self.settings.is_watched(&name) {
                    names.push(name);
                }
            }
        }

        names.sort_unstable();
        Ok(names)
    }

    /// Load every cached-suffix file of the directory into the cache.
    ///
    /// Files are read and transformed in parallel and the cache grows to
    /// hold all of them. Files that cannot be read or fail to parse are
    /// skipped. Returns how many pages are resident afterwards.
    pub fn prime(&self) -> Result<usize, SiteError> {
        let names: Vec<String> = self
            .enumerate()?
            .into_iter()
            .filter(|name| self.settings.is_cached(name))
            .collect();

        let pages: Vec<(String, Page)> = names
            .into_par_iter()
            .filter_map(|name| match self.load(&name) {
                Ok(page) => page.map(|page| (name, page)),
                Err(err) => {
                    tracing::warn!("{}", err);
                    None
                }
            })
            .collect();

        self.cache.reserve(pages.len());

        let mut cached = 0;
        for (name, page) in pages {
            tracing::info!("Caching {}", name);
            self.cache.insert(name.as_str(), page);
            if self.cache.contains(&name) {
                cached += 1;
            }
        }

        Ok(cached)
    }

    /// React to a write or create event for `path`.
    ///
    /// Refreshes the cache entry of a cached-suffix file and restarts the
    /// reload window for any watched file. Returns the file name the path
    /// mapped to, if it belongs to the directory and is watched.
    pub fn file_changed(&self, path: &Path) -> Option<String> {
        let name = self.file_name(path)?;
        if !self.settings.is_watched(&name) {
            return None;
        }

        if self.settings.is_cached(&name) {
            match self.load(&name) {
                Ok(Some(page)) => {
                    tracing::info!("Caching {}", name);
                    self.cache.insert(name.as_str(), page);
                }
                Ok(None) => {}
                Err(err) => tracing::warn!("{}", err),
            }
        }

        self.debouncer.touch();
        Some(name)
    }

    /// Current snapshot of a cached page.
    ///
    /// A cached-suffix file missing from the cache (never primed, or
    /// evicted) is loaded from disk and cached on the way out.
    pub fn page(&self, name: &str) -> Option<Arc<Page>> {
        if let Some(page) = self.cache.get(name) {
            return Some(page);
        }

        if !self.settings.is_cached(name) || !is_plain_file_name(name) {
            return None;
        }

        match self.load(name) {
            Ok(Some(page)) => {
                tracing::info!("Caching {}", name);
                let page = Arc::new(page);
                self.cache.insert_shared(name, Arc::clone(&page));
                Some(page)
            }
            Ok(None) => None,
            Err(err) => {
                tracing::debug!("{}", err);
                None
            }
        }
    }

    #[inline]
    pub fn cache(&self) -> &PageCache {
        &self.cache
    }

    /// Notification the events endpoint waits on
    #[inline]
    pub fn reload_signal(&self) -> Arc<ReloadSignal> {
        Arc::clone(&self.signal)
    }

    /// Map an event path to a file name relative to the served directory
    pub fn file_name(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(self.settings.directory()).ok()?;
        let name = relative.to_str()?;
        (!name.is_empty()).then(|| name.to_string())
    }

    /// Read and transform one file.
    ///
    /// `Ok(None)` means the file did not parse and its previous cache entry
    /// stays in place.
    fn load(&self, name: &str) -> Result<Option<Page>, SiteError> {
        let path = self.settings.path_of(name);
        let bytes = fs::read(&path).map_err(|e| SiteError::io(&path, e))?;

        let Ok(source) = std::str::from_utf8(&bytes) else {
            tracing::warn!("{} is not UTF-8, caching it unmodified", name);
            return Ok(Some(Page::unmodified(bytes)));
        };

        match self.injector.inject(source) {
            Ok(Cow::Owned(injected)) => Ok(Some(Page::injected(injected))),
            Ok(Cow::Borrowed(_)) => Ok(Some(Page::unmodified(bytes))),
            Err(err) => {
                tracing::warn!("Skipping {}: {}", name, err);
                Ok(None)
            }
        }
    }
}

/// A single path component, so a requested name cannot leave the directory
fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

impl std::fmt::Debug for Site {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Site")
            .field("directory", &self.settings.directory)
            .field("cache", &self.cache)
            .finish()
    }
}
