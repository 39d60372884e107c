//! Corpus Cache
//! Keeps normalized corpora in memory so reopening a file skips the CSV parse.
//!
//! Entries are keyed by path and checked against the file's length and
//! modification time; a changed file is loaded again.

use cord_explorer::data::{ColumnProfile, Corpus, DataLoader, DataSourceError, FieldNormalizer, NormalizeReport};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{debug, info};

/// Length and modification time of a file when it was read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fingerprint {
    len: u64,
    modified: Option<SystemTime>,
}

impl Fingerprint {
    pub fn of(path: &Path) -> Result<Self, DataSourceError> {
        let meta = fs::metadata(path).map_err(|e| DataSourceError::Unreadable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            len: meta.len(),
            modified: meta.modified().ok(),
        })
    }
}

/// Everything the explorer needs from one CSV file.
#[derive(Debug)]
pub struct LoadedCorpus {
    pub source: PathBuf,
    pub corpus: Corpus,
    pub normalize: NormalizeReport,
    pub profile: ColumnProfile,
}

/// Load and normalize `path`, fingerprinting it first.
pub fn load_and_normalize(path: &Path) -> Result<(Fingerprint, LoadedCorpus), DataSourceError> {
    let fingerprint = Fingerprint::of(path)?;
    let raw = DataLoader::load_csv(path)?;
    let profile = raw.profile()?;
    let (corpus, normalize) = FieldNormalizer::normalize(&raw)?;
    Ok((
        fingerprint,
        LoadedCorpus {
            source: path.to_path_buf(),
            corpus,
            normalize,
            profile,
        },
    ))
}

#[derive(Debug, Default)]
pub struct CorpusCache {
    entries: HashMap<PathBuf, (Fingerprint, Arc<LoadedCorpus>)>,
}

impl CorpusCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached corpus for `path`, if the file has not changed since.
    pub fn get(&self, path: &Path) -> Option<Arc<LoadedCorpus>> {
        let (cached, loaded) = self.entries.get(path)?;
        match Fingerprint::of(path) {
            Ok(current) if current == *cached => {
                debug!(path = %path.display(), "corpus cache hit");
                Some(Arc::clone(loaded))
            }
            _ => None,
        }
    }

    pub fn insert(&mut self, fingerprint: Fingerprint, loaded: LoadedCorpus) -> Arc<LoadedCorpus> {
        info!(path = %loaded.source.display(), records = loaded.corpus.len(), "corpus cached");
        let loaded = Arc::new(loaded);
        self.entries
            .insert(loaded.source.clone(), (fingerprint, Arc::clone(&loaded)));
        loaded
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Cached corpus or a fresh load, the way the explorer opens files.
    fn load(cache: &mut CorpusCache, path: &Path) -> Result<Arc<LoadedCorpus>, DataSourceError> {
        if let Some(loaded) = cache.get(path) {
            return Ok(loaded);
        }
        let (fingerprint, loaded) = load_and_normalize(path)?;
        Ok(cache.insert(fingerprint, loaded))
    }

    const CSV: &str = "title,publish_time,journal\nVirus spread model,2020,Lancet\n";

    #[test]
    fn second_load_is_served_from_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metadata.csv");
        fs::write(&path, CSV).unwrap();

        let mut cache = CorpusCache::new();
        let first = load(&mut cache, &path).unwrap();
        let second = load(&mut cache, &path).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
        assert_eq!(first.corpus.len(), 1);
    }

    #[test]
    fn changed_file_is_reloaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metadata.csv");
        fs::write(&path, CSV).unwrap();

        let mut cache = CorpusCache::new();
        let first = load(&mut cache, &path).unwrap();

        fs::write(&path, format!("{CSV}Vaccine trial results,2021,BMJ\n")).unwrap();
        assert!(cache.get(&path).is_none());
        let second = load(&mut cache, &path).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.corpus.len(), 2);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn missing_file_is_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = CorpusCache::new();
        let err = load(&mut cache, &dir.path().join("absent.csv")).unwrap_err();
        assert!(matches!(err, DataSourceError::Unreadable { .. }));
        assert_eq!(cache.len(), 0);
    }
}
