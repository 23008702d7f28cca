//! Ready-made dataset over the playground tile/label tree layout
//!
//! A playground tree holds one directory per dataset, named by a v4 UUID,
//! with `samples/{zone}/{image}/{tile}.jpg` tiles and `labels/{zone}/{tile}.json`
//! GeoJSON annotations. [`PlaygroundDataset`] wires the fixed patterns, the
//! playground drivers, id-based selection filters, per-dataset summaries for
//! tile ordering, and optional taxonomy enforcement into one builder.

mod driver;
mod summary;

pub use driver::{GeoJsonAnnotationDriver, PlaygroundTileDriver};
pub use summary::{DatasetSummary, SUMMARY_FILE};

use std::cell::OnceCell;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::data::DataPoint;
use crate::dataset::{
	AnnotationDriver, GroupKey, PatternDatasetBuilder, PatternIndex, TileDriver,
};
use crate::error::{DatasetError, DatasetResult, PatternResult};
use crate::pattern::{ComponentResolver, ExtensionResolver, GroupResolver, Pattern, Resolver};
use crate::taxonomy::Taxonomy;

/// Version-4 UUIDs only; other versions name internal artifacts.
pub const UUID4_FILTER: &str =
	"[0-9a-f]{8}-[0-9a-f]{4}-4[0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}";
/// Tile file stems are 128-bit hex digests.
pub const TILE_FILTER: &str = "[0-9a-f]{32}";

pub const TAXONOMY_FILE: &str = "taxonomy.json";

// The repetition braces in the filters are not expressible in the pattern
// string syntax, so both patterns are assembled from resolvers.
fn tile_pattern() -> PatternResult<Pattern> {
	Pattern::from_resolvers(vec![
		Resolver::Group(GroupResolver::new("dataset").with_filter(UUID4_FILTER)),
		Resolver::Component(ComponentResolver::new("samples")),
		Resolver::Group(GroupResolver::new("zone").with_filter(UUID4_FILTER)),
		Resolver::Group(GroupResolver::new("image")),
		Resolver::Group(
			GroupResolver::new("tile")
				.with_filter(TILE_FILTER)
				.with_extension(ExtensionResolver::new("jpg")),
		),
	])
}

fn annotation_pattern() -> PatternResult<Pattern> {
	Pattern::from_resolvers(vec![
		Resolver::Group(GroupResolver::new("dataset").with_filter(UUID4_FILTER)),
		Resolver::Component(ComponentResolver::new("labels")),
		Resolver::Group(GroupResolver::new("zone").with_filter(UUID4_FILTER)),
		Resolver::Group(
			GroupResolver::new("tile")
				.with_filter(TILE_FILTER)
				.with_extension(ExtensionResolver::new("json")),
		),
	])
}

/// Id allow/deny list at one granularity.
///
/// An empty selection admits everything; exclusion always wins.
#[derive(Debug, Clone, Default)]
struct IdFilter {
	select: HashSet<String>,
	exclude: HashSet<String>,
}

impl IdFilter {
	fn admits(&self, id: &str) -> bool {
		(self.select.is_empty() || self.select.contains(id)) && !self.exclude.contains(id)
	}

	fn salt(&self) -> String {
		let sorted = |set: &HashSet<String>| {
			let mut ids: Vec<&str> = set.iter().map(String::as_str).collect();
			ids.sort_unstable();
			ids.join(",")
		};
		format!("{}!{}", sorted(&self.select), sorted(&self.exclude))
	}
}

/// Configures and assembles a [`PlaygroundDataset`].
pub struct PlaygroundDatasetBuilder {
	root: PathBuf,
	datasets: IdFilter,
	zones: IdFilter,
	images: IdFilter,
	tiles: IdFilter,
	tile_driver: PlaygroundTileDriver,
	annotation_driver: GeoJsonAnnotationDriver,
	use_taxonomy: bool,
	cache: bool,
	cache_dir: Option<PathBuf>,
}

impl PlaygroundDatasetBuilder {
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self {
			root: root.into(),
			datasets: IdFilter::default(),
			zones: IdFilter::default(),
			images: IdFilter::default(),
			tiles: IdFilter::default(),
			tile_driver: PlaygroundTileDriver::new(),
			annotation_driver: GeoJsonAnnotationDriver::new(),
			use_taxonomy: false,
			cache: false,
			cache_dir: None,
		}
	}

	pub fn select_datasets(mut self, ids: impl IntoIterator<Item = impl Into<String>>) -> Self {
		self.datasets.select.extend(ids.into_iter().map(Into::into));
		self
	}

	pub fn exclude_datasets(mut self, ids: impl IntoIterator<Item = impl Into<String>>) -> Self {
		self.datasets.exclude.extend(ids.into_iter().map(Into::into));
		self
	}

	pub fn select_zones(mut self, ids: impl IntoIterator<Item = impl Into<String>>) -> Self {
		self.zones.select.extend(ids.into_iter().map(Into::into));
		self
	}

	pub fn exclude_zones(mut self, ids: impl IntoIterator<Item = impl Into<String>>) -> Self {
		self.zones.exclude.extend(ids.into_iter().map(Into::into));
		self
	}

	pub fn select_images(mut self, ids: impl IntoIterator<Item = impl Into<String>>) -> Self {
		self.images.select.extend(ids.into_iter().map(Into::into));
		self
	}

	pub fn exclude_images(mut self, ids: impl IntoIterator<Item = impl Into<String>>) -> Self {
		self.images.exclude.extend(ids.into_iter().map(Into::into));
		self
	}

	pub fn select_tiles(mut self, ids: impl IntoIterator<Item = impl Into<String>>) -> Self {
		self.tiles.select.extend(ids.into_iter().map(Into::into));
		self
	}

	pub fn exclude_tiles(mut self, ids: impl IntoIterator<Item = impl Into<String>>) -> Self {
		self.tiles.exclude.extend(ids.into_iter().map(Into::into));
		self
	}

	pub fn tile_driver(mut self, tile_driver: PlaygroundTileDriver) -> Self {
		self.tile_driver = tile_driver;
		self
	}

	pub fn annotation_driver(mut self, annotation_driver: GeoJsonAnnotationDriver) -> Self {
		self.annotation_driver = annotation_driver;
		self
	}

	/// Enforces a shared taxonomy: mismatching dataset taxonomies fail the
	/// build, and record labels are validated on access.
	pub fn use_taxonomy(mut self, use_taxonomy: bool) -> Self {
		self.use_taxonomy = use_taxonomy;
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

	/// The filters change the assembly, so they discriminate cache entries.
	fn filter_salt(&self) -> String {
		[&self.datasets, &self.zones, &self.images, &self.tiles]
			.iter()
			.map(|filter| filter.salt())
			.collect::<Vec<_>>()
			.join(";")
	}

	pub fn build(self) -> DatasetResult<PlaygroundDataset> {
		let salt = self.filter_salt();
		let filters = [
			("dataset", self.datasets),
			("zone", self.zones),
			("image", self.images),
			("tile", self.tiles),
		];
		let mut builder = PatternDatasetBuilder::from_patterns(tile_pattern()?, annotation_pattern()?)
			.root(self.root.clone())
			.sort_natural()
			.cache(self.cache)
			.cache_salt(salt)
			.match_filter(move |captures| {
				filters.iter().all(|(name, filter)| {
					captures.get(name).map_or(true, |value| filter.admits(value))
				})
			});
		if let Some(cache_dir) = &self.cache_dir {
			builder = builder.cache_dir(cache_dir);
		}
		let index = builder.build_index()?;
		let taxonomy = scan_taxonomies(&self.root, &index, self.use_taxonomy)?;
		Ok(PlaygroundDataset {
			root: self.root,
			index,
			tile_driver: self.tile_driver,
			annotation_driver: self.annotation_driver,
			taxonomy,
			summaries: OnceCell::new(),
		})
	}
}

/// Loads the taxonomies of every indexed dataset and checks they agree.
///
/// A mismatch is an error only when enforcement is on; otherwise it is logged
/// and the offending taxonomy ignored. Returns the shared taxonomy when
/// enforcement is on.
fn scan_taxonomies(
	root: &Path,
	index: &PatternIndex,
	use_taxonomy: bool,
) -> DatasetResult<Option<Taxonomy>> {
	let mut reference: Option<Taxonomy> = None;
	let mut seen = HashSet::new();
	for key in index.keys() {
		let dataset = &key[0];
		if !seen.insert(dataset.clone()) {
			continue;
		}
		let path = root.join(dataset).join(TAXONOMY_FILE);
		if !path.is_file() {
			continue;
		}
		let taxonomy = Taxonomy::from_file(&path)?;
		match &reference {
			None => reference = Some(taxonomy),
			Some(current) if *current != taxonomy => {
				if use_taxonomy {
					return Err(DatasetError::TaxonomyConflict {
						dataset: dataset.clone(),
					});
				}
				warn!(%dataset, "ignoring mismatching dataset taxonomy");
			}
			Some(_) => {}
		}
	}
	Ok(if use_taxonomy { reference } else { None })
}

/// A dataset over a playground tree, with one item per (dataset, zone, tile)
/// tuple.
pub struct PlaygroundDataset {
	root: PathBuf,
	index: PatternIndex,
	tile_driver: PlaygroundTileDriver,
	annotation_driver: GeoJsonAnnotationDriver,
	taxonomy: Option<Taxonomy>,
	summaries: OnceCell<HashMap<String, DatasetSummary>>,
}

impl PlaygroundDataset {
	pub fn builder(root: impl Into<PathBuf>) -> PlaygroundDatasetBuilder {
		PlaygroundDatasetBuilder::new(root)
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

	/// Materializes the item at `index`.
	///
	/// When the tile driver asks for fetch ordering, the item's tiles are
	/// reordered by their image's rank in the dataset summary before the
	/// driver runs. With taxonomy enforcement on, every record's labels must
	/// fit the shared taxonomy.
	pub fn get(&self, index: usize) -> DatasetResult<DataPoint> {
		let key = self.index.key(index)?.clone();
		let captures = self.index.captures_for(&key);
		let mut tile_paths = self.index.tile_paths(&key).to_vec();
		if self.tile_driver.fetch_ordering() {
			self.order_tiles(&key, &mut tile_paths)?;
		}
		let tiles = self.tile_driver.load_tiles(&tile_paths, &captures)?;
		let annotation = self
			.annotation_driver
			.load_annotation(self.index.annotation_paths(&key), &captures)?;
		if let Some(taxonomy) = &self.taxonomy {
			for record in annotation.records().iter() {
				if !taxonomy.fits(record.labels()) {
					return Err(DatasetError::TaxonomyViolation {
						labels: record.labels().to_vec(),
					});
				}
			}
		}
		Ok(DataPoint { tiles, annotation })
	}

	pub fn iter(&self) -> impl Iterator<Item = DatasetResult<DataPoint>> + '_ {
		(0..self.len()).map(|index| self.get(index))
	}

	/// Summaries of every indexed dataset that carries one, loaded once.
	fn summaries(&self) -> DatasetResult<&HashMap<String, DatasetSummary>> {
		if let Some(summaries) = self.summaries.get() {
			return Ok(summaries);
		}
		let mut loaded = HashMap::new();
		for key in self.index.keys() {
			let dataset = &key[0];
			if loaded.contains_key(dataset) {
				continue;
			}
			let path = self.root.join(dataset).join(SUMMARY_FILE);
			if !path.is_file() {
				continue;
			}
			// An unreadable summary counts as absent.
			match DatasetSummary::load(&path) {
				Ok(summary) => {
					loaded.insert(dataset.clone(), summary);
				}
				Err(error) => warn!(%dataset, %error, "ignoring unreadable dataset summary"),
			}
		}
		if loaded.is_empty() {
			return Err(DatasetError::SummariesNotFound {
				root: self.root.clone(),
			});
		}
		Ok(self.summaries.get_or_init(|| loaded))
	}

	fn order_tiles(&self, key: &GroupKey, paths: &mut Vec<PathBuf>) -> DatasetResult<()> {
		let dataset = &key[0];
		let zone = &key[1];
		let summaries = self.summaries()?;
		let zone_missing = || DatasetError::ZoneMissingFromSummaries {
			dataset: dataset.clone(),
			zone: zone.clone(),
		};
		let summary = summaries.get(dataset).ok_or_else(zone_missing)?;
		let zone_index = summary.zone_index(zone).ok_or_else(zone_missing)?;

		let mut ranked = Vec::with_capacity(paths.len());
		for path in paths.drain(..) {
			let image = path
				.parent()
				.and_then(|dir| dir.file_name())
				.map(|name| name.to_string_lossy().into_owned())
				.unwrap_or_default();
			let rank = summary.image_rank(zone_index, &image).ok_or_else(|| {
				DatasetError::ImageMissingFromSummaries {
					dataset: dataset.clone(),
					image: image.clone(),
				}
			})?;
			ranked.push((rank, path));
		}
		ranked.sort_by_key(|(rank, _)| *rank);
		paths.extend(ranked.into_iter().map(|(_, path)| path));
		Ok(())
	}
}
