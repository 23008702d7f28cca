//! Pattern-matched assembly of tile/annotation datasets from file trees.
//!
//! Two path patterns describe where tile images and annotation files live
//! relative to a common root; capture groups name the parts of each path that
//! identify an item. The groups shared by both patterns drive the join: every
//! distinct tuple of shared-group values becomes one dataset item, carrying
//! all tile paths and all annotation paths that produced the tuple. Drivers
//! then turn the raw paths of one item into typed tiles and annotations on
//! access.
//!
//! ```no_run
//! use tilepack::PatternDatasetBuilder;
//! # use tilepack::{Annotation, Captures, DriverResult, RecordCollection, TileCollection};
//! # use std::path::PathBuf;
//! # fn tiles(_paths: &[PathBuf], _c: &Captures) -> DriverResult<TileCollection> { Ok(TileCollection::new()) }
//! # fn labels(paths: &[PathBuf], _c: &Captures) -> DriverResult<Annotation> {
//! #     Ok(Annotation::new(RecordCollection::new(), vec![], paths.to_vec()))
//! # }
//!
//! let dataset = PatternDatasetBuilder::new(
//!     "images/{dataset}/{zone}/{tile}.jpg",
//!     "labels/{dataset}/{zone}/{tile}.json",
//! )
//! .root("/data/campaign")
//! .build(tiles, labels)?;
//!
//! for item in dataset.iter() {
//!     let item = item?;
//!     println!("{} tiles", item.tiles.len());
//! }
//! # Ok::<(), tilepack::DatasetError>(())
//! ```
//!
//! The [`playground`] module wires the patterns, drivers and selection
//! filters of the playground tree layout into a ready-made dataset.

pub mod cache;
pub mod data;
pub mod dataset;
pub mod error;
pub mod pattern;
pub mod playground;
pub mod taxonomy;
pub mod walk;

#[cfg(test)]
mod testutil;

pub use cache::{IndexBundle, PatternCache};
pub use data::{Annotation, DataPoint, Mask, Record, RecordCollection, Tile, TileCollection};
pub use dataset::{
	AnnotationDriver, GroupKey, PatternDataset, PatternDatasetBuilder, PatternIndex, TileDriver,
};
pub use error::{
	CacheError, CacheResult, DatasetError, DatasetResult, DriverError, DriverResult, PatternError,
	PatternResult, ResolveError, ResolveResult, TaxonomyError,
};
pub use pattern::{
	Captures, ComponentResolver, ExtensionResolver, GroupResolver, Parser, Pattern, Resolver,
	DEFAULT_FILTER,
};
pub use playground::{
	DatasetSummary, GeoJsonAnnotationDriver, PlaygroundDataset, PlaygroundDatasetBuilder,
	PlaygroundTileDriver,
};
pub use taxonomy::Taxonomy;
pub use walk::{Matches, PathResolver, ResolvedPath};
