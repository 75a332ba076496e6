use std::collections::HashMap;
use std::path::{Path, PathBuf};

use jn_core::PluginMeta;
use serde::{Deserialize, Serialize};

/// Identity of a discovered plugin source file: absolute path, mtime, size
/// (spec.md §4.2). A cache hit requires all three to match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub path: PathBuf,
    pub mtime_secs: i64,
    pub mtime_nanos: u32,
    pub size: u64,
}

impl CacheKey {
    pub fn from_metadata(path: &Path, metadata: &std::fs::Metadata) -> std::io::Result<Self> {
        let modified = metadata.modified()?;
        let since_epoch = modified
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default();
        Ok(Self {
            path: path.to_path_buf(),
            mtime_secs: since_epoch.as_secs() as i64,
            mtime_nanos: since_epoch.subsec_nanos(),
            size: metadata.len(),
        })
    }
}

/// `PluginMeta::executable` is `#[serde(skip)]` (it's filled in by the
/// registry at discovery time, not part of any wire schema), so the cache
/// carries it alongside the meta rather than losing it across the JSON
/// round-trip.
#[derive(Debug, Default, Serialize, Deserialize)]
struct CacheFile {
    entries: Vec<(CacheKey, PathBuf, PluginMeta)>,
}

/// Content-addressed plugin metadata cache, persisted as JSON.
#[derive(Debug, Default)]
pub struct Cache {
    entries: HashMap<CacheKey, (PathBuf, PluginMeta)>,
}

impl Cache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a cache file. Corruption is non-fatal: an unreadable or
    /// unparsable file yields an empty cache (spec.md §4.2), logging a
    /// warning rather than failing discovery.
    pub fn load(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return Self::new(),
        };
        match serde_json::from_str::<CacheFile>(&content) {
            Ok(file) => {
                Self { entries: file.entries.into_iter().map(|(k, exe, meta)| (k, (exe, meta))).collect() }
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "plugin cache corrupt, rediscovering live");
                Self::new()
            }
        }
    }

    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let file = CacheFile {
            entries: self.entries.iter().map(|(k, (exe, v))| (k.clone(), exe.clone(), v.clone())).collect(),
        };
        let content = serde_json::to_string_pretty(&file)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)
    }

    /// Returns the cached meta with `executable` re-attached from the
    /// executable path recorded alongside it at insertion time.
    pub fn get(&self, key: &CacheKey) -> Option<PluginMeta> {
        self.entries.get(key).map(|(exe, meta)| {
            let mut meta = meta.clone();
            meta.executable = exe.clone();
            meta
        })
    }

    pub fn insert(&mut self, key: CacheKey, meta: PluginMeta) {
        let executable = meta.executable.clone();
        self.entries.insert(key, (executable, meta));
    }
}
