//! Group-matched tile/annotation dataset assembly
//!
//! A [`PatternDataset`] pairs every tile file with its annotation file(s) by
//! matching two path patterns over the same tree and joining their captures
//! on the groups the patterns share. Items are materialized lazily through a
//! [`TileDriver`] and an [`AnnotationDriver`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::cache::{IndexBundle, PatternCache};
use crate::data::{Annotation, DataPoint, TileCollection};
use crate::error::{DatasetError, DatasetResult, DriverResult};
use crate::pattern::{Captures, Pattern};
use crate::walk::PathResolver;

/// Values of the matching groups identifying one dataset item.
pub type GroupKey = Vec<String>;

/// Materializes the tile side of one item from its matched paths.
pub trait TileDriver {
	fn load_tiles(&self, paths: &[PathBuf], captures: &Captures) -> DriverResult<TileCollection>;
}

impl<F> TileDriver for F
where
	F: Fn(&[PathBuf], &Captures) -> DriverResult<TileCollection>,
{
	fn load_tiles(&self, paths: &[PathBuf], captures: &Captures) -> DriverResult<TileCollection> {
		self(paths, captures)
	}
}

/// Materializes the annotation side of one item from its matched paths.
pub trait AnnotationDriver {
	fn load_annotation(&self, paths: &[PathBuf], captures: &Captures) -> DriverResult<Annotation>;
}

impl<F> AnnotationDriver for F
where
	F: Fn(&[PathBuf], &Captures) -> DriverResult<Annotation>,
{
	fn load_annotation(&self, paths: &[PathBuf], captures: &Captures) -> DriverResult<Annotation> {
		self(paths, captures)
	}
}

/// The assembled join of tile and annotation matches, ordered by group key.
#[derive(Debug, Clone)]
pub struct PatternIndex {
	matching_groups: Vec<String>,
	group_index: Vec<GroupKey>,
	tiles: HashMap<GroupKey, Vec<PathBuf>>,
	annotations: HashMap<GroupKey, Vec<PathBuf>>,
}

impl PatternIndex {
	/// Groups shared by both patterns, in tile pattern order.
	pub fn matching_groups(&self) -> &[String] {
		&self.matching_groups
	}

	pub fn keys(&self) -> &[GroupKey] {
		&self.group_index
	}

	pub fn len(&self) -> usize {
		self.group_index.len()
	}

	pub fn is_empty(&self) -> bool {
		self.group_index.is_empty()
	}

	pub fn key(&self, index: usize) -> DatasetResult<&GroupKey> {
		self.group_index
			.get(index)
			.ok_or(DatasetError::IndexOutOfBounds {
				index,
				len: self.group_index.len(),
			})
	}

	pub fn tile_paths(&self, key: &GroupKey) -> &[PathBuf] {
		self.tiles.get(key).map(Vec::as_slice).unwrap_or(&[])
	}

	pub fn annotation_paths(&self, key: &GroupKey) -> &[PathBuf] {
		self.annotations.get(key).map(Vec::as_slice).unwrap_or(&[])
	}

	/// Captures of one key, named after the matching groups.
	pub fn captures_for(&self, key: &GroupKey) -> Captures {
		self.matching_groups
			.iter()
			.cloned()
			.zip(key.iter().cloned())
			.collect()
	}
}

enum PatternSource {
	Text(String),
	Compiled(Pattern),
}

impl PatternSource {
	fn compile(self, reserved: &[String]) -> DatasetResult<Pattern> {
		match self {
			PatternSource::Text(text) => {
				if reserved.is_empty() {
					Ok(Pattern::new(&text)?)
				} else {
					Ok(Pattern::with_reserved(&text, reserved.iter().cloned())?)
				}
			}
			PatternSource::Compiled(pattern) => Ok(pattern),
		}
	}
}

enum Sort {
	Discovery,
	Natural,
	Key(Box<dyn Fn(&GroupKey) -> GroupKey>),
}

/// Configures and assembles a [`PatternDataset`].
///
/// Strict matching is the default: every tile tuple must have an annotation
/// tuple. Loose matching drops unmatched tile tuples instead.
pub struct PatternDatasetBuilder {
	tile_pattern: PatternSource,
	annotation_pattern: PatternSource,
	reserved: Vec<String>,
	root: Option<PathBuf>,
	strict: bool,
	cache: bool,
	cache_dir: Option<PathBuf>,
	cache_salt: String,
	sort: Sort,
	match_filter: Option<Box<dyn Fn(&Captures) -> bool>>,
}

impl PatternDatasetBuilder {
	pub fn new(tile_pattern: &str, annotation_pattern: &str) -> Self {
		Self {
			tile_pattern: PatternSource::Text(tile_pattern.to_string()),
			annotation_pattern: PatternSource::Text(annotation_pattern.to_string()),
			reserved: Vec::new(),
			root: None,
			strict: true,
			cache: false,
			cache_dir: None,
			cache_salt: String::new(),
			sort: Sort::Discovery,
			match_filter: None,
		}
	}

	/// Uses programmatically assembled patterns instead of pattern strings.
	pub fn from_patterns(tile_pattern: Pattern, annotation_pattern: Pattern) -> Self {
		let mut builder = Self::new("", "");
		builder.tile_pattern = PatternSource::Compiled(tile_pattern);
		builder.annotation_pattern = PatternSource::Compiled(annotation_pattern);
		builder
	}

	/// Group names the patterns may not declare.
	pub fn reserved(mut self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
		self.reserved = names.into_iter().map(Into::into).collect();
		self
	}

	/// Search root for relative patterns.
	pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
		self.root = Some(root.into());
		self
	}

	pub fn strict(mut self, strict: bool) -> Self {
		self.strict = strict;
		self
	}

	pub fn cache(mut self, cache: bool) -> Self {
		self.cache = cache;
		self
	}

	pub fn cache_dir(mut self, cache_dir: impl Into<PathBuf>) -> Self {
		self.cache_dir = Some(cache_dir.into());
		self
	}

	/// Extra discriminant mixed into the cache key, for configuration that
	/// changes the assembly without changing the patterns.
	pub fn cache_salt(mut self, salt: impl Into<String>) -> Self {
		self.cache_salt = salt.into();
		self
	}

	/// Orders the index by ascending group key.
	pub fn sort_natural(mut self) -> Self {
		self.sort = Sort::Natural;
		self
	}

	/// Orders the index by a caller-derived key.
	pub fn sort_key(mut self, key: impl Fn(&GroupKey) -> GroupKey + 'static) -> Self {
		self.sort = Sort::Key(Box::new(key));
		self
	}

	/// Drops individual path matches whose captures fail the predicate,
	/// before tuples are joined.
	pub fn match_filter(mut self, filter: impl Fn(&Captures) -> bool + 'static) -> Self {
		self.match_filter = Some(Box::new(filter));
		self
	}

	/// Assembles the index and wraps it with the given drivers.
	pub fn build<T, A>(self, tile_driver: T, annotation_driver: A) -> DatasetResult<PatternDataset<T, A>>
	where
		T: TileDriver,
		A: AnnotationDriver,
	{
		Ok(PatternDataset {
			index: self.build_index()?,
			tile_driver,
			annotation_driver,
		})
	}

	/// Assembles the index alone.
	pub fn build_index(self) -> DatasetResult<PatternIndex> {
		let tile_pattern = self.tile_pattern.compile(&self.reserved)?;
		let annotation_pattern = self.annotation_pattern.compile(&self.reserved)?;

		if tile_pattern.is_degenerate() {
			return Err(DatasetError::DegenerateTilePattern {
				pattern: tile_pattern.as_str().to_string(),
			});
		}
		let matching_groups = matching_groups(&tile_pattern, &annotation_pattern)?;

		let cache = if self.cache {
			Some(match &self.cache_dir {
				Some(dir) => PatternCache::with_dir(dir),
				None => PatternCache::new()?,
			})
		} else {
			None
		};
		let cache_key = PatternCache::key(&[
			tile_pattern.as_str(),
			annotation_pattern.as_str(),
			&self
				.root
				.as_deref()
				.map(|root| root.display().to_string())
				.unwrap_or_default(),
			&self.cache_salt,
		]);

		let mut bundle = None;
		if let Some(cache) = &cache {
			match cache.load(&cache_key) {
				Ok(loaded) => bundle = loaded,
				Err(error) => warn!(%error, "ignoring unusable cache entry"),
			}
		}
		let bundle = match bundle {
			Some(bundle) => bundle,
			None => {
				let bundle = discover(
					&tile_pattern,
					&annotation_pattern,
					&matching_groups,
					self.root.as_deref(),
					self.match_filter.as_deref(),
				)?;
				if let Some(cache) = &cache {
					if let Err(error) = cache.store(&cache_key, &bundle) {
						warn!(%error, "failed to store index bundle in cache");
					}
				}
				bundle
			}
		};

		let matching_groups = bundle.matching_groups;
		let mut group_index = bundle.group_index;
		let tiles = bundle.tiles;
		let annotations = bundle.annotations;

		if self.strict {
			for key in &group_index {
				if !annotations.contains_key(key) {
					let path = tiles
						.get(key)
						.and_then(|paths| paths.first())
						.cloned()
						.unwrap_or_default();
					return Err(DatasetError::UnmatchedTile { path });
				}
			}
		} else {
			group_index.retain(|key| annotations.contains_key(key));
		}
		if group_index.is_empty() {
			return Err(DatasetError::NoMatches);
		}

		match &self.sort {
			Sort::Discovery => {}
			Sort::Natural => group_index.sort(),
			Sort::Key(key) => group_index.sort_by(|a, b| key(a).cmp(&key(b))),
		}

		info!(
			items = group_index.len(),
			groups = ?matching_groups,
			"assembled pattern index"
		);
		Ok(PatternIndex {
			matching_groups,
			group_index,
			tiles,
			annotations,
		})
	}
}

/// Groups shared by both patterns, in tile pattern order. A degenerate
/// annotation pattern matches on every tile group.
fn matching_groups(tile: &Pattern, annotation: &Pattern) -> DatasetResult<Vec<String>> {
	if annotation.is_degenerate() {
		return Ok(tile.group_names().to_vec());
	}
	let groups: Vec<String> = tile
		.group_names()
		.iter()
		.filter(|name| annotation.group_names().contains(name))
		.cloned()
		.collect();
	if groups.is_empty() {
		return Err(DatasetError::NoCommonGroup);
	}
	Ok(groups)
}

fn discover(
	tile_pattern: &Pattern,
	annotation_pattern: &Pattern,
	matching_groups: &[String],
	root: Option<&Path>,
	filter: Option<&dyn Fn(&Captures) -> bool>,
) -> DatasetResult<IndexBundle> {
	let mut tiles: HashMap<GroupKey, Vec<PathBuf>> = HashMap::new();
	let mut group_index: Vec<GroupKey> = Vec::new();

	let tile_resolver = PathResolver::new(tile_pattern.clone());
	let tile_root = (!tile_pattern.is_absolute()).then_some(root).flatten();
	for resolved in tile_resolver.find(tile_root)? {
		if filter.is_some_and(|filter| !filter(resolved.captures())) {
			continue;
		}
		let key = key_of(matching_groups, resolved.captures());
		let entry = tiles.entry(key.clone()).or_default();
		if entry.is_empty() {
			group_index.push(key);
		}
		entry.push(resolved.into_path());
	}
	debug!(tuples = group_index.len(), "discovered tile matches");

	let mut annotations: HashMap<GroupKey, Vec<PathBuf>> = HashMap::new();
	let annotation_resolver = PathResolver::new(annotation_pattern.clone());
	let annotation_root = (!annotation_pattern.is_absolute()).then_some(root).flatten();
	if annotation_pattern.is_degenerate() {
		// The single annotation file annotates every tile tuple.
		if let Some(resolved) = annotation_resolver.find(annotation_root)?.next() {
			for key in &group_index {
				annotations.insert(key.clone(), vec![resolved.path().to_path_buf()]);
			}
		}
	} else {
		for resolved in annotation_resolver.find(annotation_root)? {
			if filter.is_some_and(|filter| !filter(resolved.captures())) {
				continue;
			}
			let key = key_of(matching_groups, resolved.captures());
			annotations.entry(key).or_default().push(resolved.into_path());
		}
	}
	debug!(tuples = annotations.len(), "discovered annotation matches");

	Ok(IndexBundle::new(
		matching_groups.to_vec(),
		group_index,
		tiles,
		annotations,
	))
}

fn key_of(matching_groups: &[String], captures: &Captures) -> GroupKey {
	matching_groups
		.iter()
		.map(|name| captures.get(name).unwrap_or_default().to_string())
		.collect()
}

/// A dataset assembled from a tile pattern and an annotation pattern.
pub struct PatternDataset<T, A> {
	index: PatternIndex,
	tile_driver: T,
	annotation_driver: A,
}

impl<T: TileDriver, A: AnnotationDriver> PatternDataset<T, A> {
	pub fn builder(tile_pattern: &str, annotation_pattern: &str) -> PatternDatasetBuilder {
		PatternDatasetBuilder::new(tile_pattern, annotation_pattern)
	}

	pub fn index(&self) -> &PatternIndex {
		&self.index
	}

	pub fn len(&self) -> usize {
		self.index.len()
	}

	pub fn is_empty(&self) -> bool {
		self.index.is_empty()
	}

	/// Materializes the item at `index` through both drivers.
	pub fn get(&self, index: usize) -> DatasetResult<DataPoint> {
		let key = self.index.key(index)?.clone();
		let captures = self.index.captures_for(&key);
		let tiles = self
			.tile_driver
			.load_tiles(self.index.tile_paths(&key), &captures)?;
		let annotation = self
			.annotation_driver
			.load_annotation(self.index.annotation_paths(&key), &captures)?;
		Ok(DataPoint { tiles, annotation })
	}

	pub fn iter(&self) -> impl Iterator<Item = DatasetResult<DataPoint>> + '_ {
		(0..self.len()).map(|index| self.get(index))
	}
}
