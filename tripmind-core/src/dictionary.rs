//! Persistent purchase-combination ids.
//!
//! Training records refer to purchases by a small integer instead of the full
//! unit mapping. The mapping from canonical key to id lives in a JSON file that
//! is shared across runs, so ids must never change once handed out.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DictionaryError {
    #[error("IO error writing move dictionary: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error writing move dictionary: {0}")]
    Json(#[from] serde_json::Error),
}

/// Canonical text of a purchase: keys sorted, `", "` and `": "` separators.
///
/// ```
/// use std::collections::BTreeMap;
/// use tripmind_core::dictionary::canonical_key;
///
/// let purchase: BTreeMap<String, u32> =
///     [("infantry".to_string(), 2), ("armour".to_string(), 1)].into_iter().collect();
/// assert_eq!(canonical_key(&purchase), r#"{"armour": 1, "infantry": 2}"#);
/// ```
pub fn canonical_key(purchase: &BTreeMap<String, u32>) -> String {
    let body: Vec<String> = purchase
        .iter()
        .map(|(unit, n)| {
            let quoted = serde_json::Value::String(unit.clone()).to_string();
            format!("{}: {}", quoted, n)
        })
        .collect();
    format!("{{{}}}", body.join(", "))
}

/// Append-only map from canonical purchase key to id.
#[derive(Debug, Clone, Default)]
pub struct MoveDictionary {
    path: Option<PathBuf>,
    ids: BTreeMap<String, u32>,
    next_id: u32,
    dirty: bool,
}

impl MoveDictionary {
    /// A dictionary that is never written to disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Read the dictionary at `path`. A missing file starts empty; so does an
    /// unreadable one, with a warning. Later saves go to `path`.
    pub fn load(path: &Path) -> Self {
        let ids = match std::fs::read_to_string(path) {
            Ok(text) => match serde_json::from_str::<BTreeMap<String, u32>>(&text) {
                Ok(ids) => ids,
                Err(e) => {
                    log::warn!("Move dictionary {} is corrupt, starting empty: {}", path.display(), e);
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No move dictionary at {}, starting empty", path.display());
                BTreeMap::new()
            }
            Err(e) => {
                log::warn!("Cannot read move dictionary {}, starting empty: {}", path.display(), e);
                BTreeMap::new()
            }
        };

        // Never reuse an id, even if the file has gaps
        let next_id = ids
            .values()
            .map(|&id| id + 1)
            .max()
            .unwrap_or(0)
            .max(ids.len() as u32);
        log::info!("Move dictionary: {} entries", ids.len());

        Self {
            path: Some(path.to_path_buf()),
            ids,
            next_id,
            dirty: false,
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<u32> {
        self.ids.get(key).copied()
    }

    /// Id for `key`, assigning the next free id if the key is new.
    ///
    /// The next free id is one past the largest id ever seen, not the current
    /// length. The two agree for any file this type wrote; they differ only for
    /// hand-edited files with gaps, where `len` could collide with an id
    /// already handed out.
    pub fn id_for(&mut self, key: &str) -> u32 {
        if let Some(&id) = self.ids.get(key) {
            return id;
        }
        let id = self.next_id;
        self.next_id += 1;
        self.ids.insert(key.to_string(), id);
        self.dirty = true;
        id
    }

    /// Register every key; returns `true` if any was new.
    pub fn register_all<'a, I>(&mut self, keys: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        let before = self.ids.len();
        for key in keys {
            self.id_for(key);
        }
        self.ids.len() > before
    }

    /// Keys were added since the last save.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Rewrite the whole file if anything changed. In-memory dictionaries only
    /// clear the dirty flag.
    ///
    /// The new contents go to a sibling `.tmp` file which is then renamed over
    /// the old one, so a crash mid-write leaves the previous dictionary intact.
    pub fn save(&mut self) -> Result<(), DictionaryError> {
        if !self.dirty {
            return Ok(());
        }
        if let Some(path) = &self.path {
            let text = serde_json::to_string_pretty(&self.ids)?;
            let tmp = Self::tmp_path(path);
            let mut file = File::create(&tmp)?;
            file.write_all(text.as_bytes())?;
            file.sync_all()?;
            drop(file);
            std::fs::rename(&tmp, path)?;
            log::debug!("Saved {} move ids to {}", self.ids.len(), path.display());
        }
        self.dirty = false;
        Ok(())
    }

    fn tmp_path(path: &Path) -> PathBuf {
        let mut name = path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        path.with_file_name(name)
    }
}
