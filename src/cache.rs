//! On-disk cache for assembled pattern indexes
//!
//! Discovery over a large tree is the expensive part of dataset assembly, so
//! the raw match databases can be persisted and reloaded. Entries are keyed
//! by a blake3 digest of the assembly inputs and written atomically through a
//! temporary file, so a crashed writer never leaves a partial entry behind.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CacheError, CacheResult};

/// Bumped whenever the bundle layout changes; older entries are discarded.
const CACHE_VERSION: u32 = 1;

/// Raw assembly state as discovered on disk, before strictness checks and
/// sorting are applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexBundle {
	version: u32,
	pub matching_groups: Vec<String>,
	pub group_index: Vec<Vec<String>>,
	pub tiles: HashMap<Vec<String>, Vec<PathBuf>>,
	pub annotations: HashMap<Vec<String>, Vec<PathBuf>>,
}

impl IndexBundle {
	pub fn new(
		matching_groups: Vec<String>,
		group_index: Vec<Vec<String>>,
		tiles: HashMap<Vec<String>, Vec<PathBuf>>,
		annotations: HashMap<Vec<String>, Vec<PathBuf>>,
	) -> Self {
		Self {
			version: CACHE_VERSION,
			matching_groups,
			group_index,
			tiles,
			annotations,
		}
	}
}

#[derive(Debug, Clone)]
pub struct PatternCache {
	cache_dir: PathBuf,
}

impl PatternCache {
	/// Cache rooted at the platform cache directory.
	pub fn new() -> CacheResult<Self> {
		let base = dirs::cache_dir().ok_or_else(|| {
			std::io::Error::new(
				std::io::ErrorKind::NotFound,
				"no platform cache directory available",
			)
		})?;
		Ok(Self::with_dir(base.join("tilepack").join("pattern")))
	}

	/// Cache rooted at an explicit directory.
	pub fn with_dir(cache_dir: impl Into<PathBuf>) -> Self {
		Self {
			cache_dir: cache_dir.into(),
		}
	}

	pub fn cache_dir(&self) -> &Path {
		&self.cache_dir
	}

	/// Digest of the assembly inputs, used as the entry file name.
	pub fn key(parts: &[&str]) -> String {
		let mut hasher = blake3::Hasher::new();
		for part in parts {
			hasher.update(part.as_bytes());
			hasher.update(&[0]);
		}
		hasher.finalize().to_hex().to_string()
	}

	fn entry_path(&self, key: &str) -> PathBuf {
		self.cache_dir.join(format!("{key}.bin"))
	}

	/// Loads the bundle stored under `key`, or `None` when absent.
	pub fn load(&self, key: &str) -> CacheResult<Option<IndexBundle>> {
		let path = self.entry_path(key);
		let bytes = match fs::read(&path) {
			Ok(bytes) => bytes,
			Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(None),
			Err(error) => return Err(error.into()),
		};
		let bundle: IndexBundle = bincode::deserialize(&bytes)?;
		if bundle.version != CACHE_VERSION {
			return Err(CacheError::VersionMismatch {
				expected: CACHE_VERSION,
				found: bundle.version,
			});
		}
		debug!(%key, "loaded index bundle from cache");
		Ok(Some(bundle))
	}

	/// Stores `bundle` under `key`, replacing any previous entry.
	pub fn store(&self, key: &str, bundle: &IndexBundle) -> CacheResult<()> {
		fs::create_dir_all(&self.cache_dir)?;
		let bytes = bincode::serialize(bundle)?;
		let path = self.entry_path(key);
		let tmp = self.cache_dir.join(format!("{key}.tmp"));
		fs::write(&tmp, &bytes)?;
		fs::rename(&tmp, &path)?;
		debug!(%key, size = bytes.len(), "stored index bundle in cache");
		Ok(())
	}
}
