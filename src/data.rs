//! Typed containers handed out by drivers and dataset items
//!
//! Capture values and other open-ended metadata live in explicit key-value
//! side tables on each container, with typed accessors for the well-known
//! entries.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

/// One tile: a path into the dataset tree plus its string properties.
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
	path: PathBuf,
	properties: BTreeMap<String, String>,
}

impl Tile {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self {
			path: path.into(),
			properties: BTreeMap::new(),
		}
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	pub fn property(&self, name: &str) -> Option<&str> {
		self.properties.get(name).map(String::as_str)
	}

	pub fn set_property(&mut self, name: impl Into<String>, value: impl Into<String>) {
		self.properties.insert(name.into(), value.into());
	}

	pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.set_property(name, value);
		self
	}

	/// Identifier of the image this tile was cut from, when known.
	pub fn image_id(&self) -> Option<&str> {
		self.property("image_id")
	}
}

/// Insertion-ordered collection of named tiles.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TileCollection {
	entries: Vec<(String, Tile)>,
}

impl TileCollection {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn insert(&mut self, name: impl Into<String>, tile: Tile) {
		let name = name.into();
		if let Some(entry) = self.entries.iter_mut().find(|(key, _)| *key == name) {
			entry.1 = tile;
		} else {
			self.entries.push((name, tile));
		}
	}

	pub fn get(&self, name: &str) -> Option<&Tile> {
		self.entries
			.iter()
			.find(|(key, _)| key == name)
			.map(|(_, tile)| tile)
	}

	/// Tile at insertion position `index`.
	pub fn get_index(&self, index: usize) -> Option<&Tile> {
		self.entries.get(index).map(|(_, tile)| tile)
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.entries.iter().map(|(name, _)| name.as_str())
	}

	pub fn values(&self) -> impl Iterator<Item = &Tile> {
		self.entries.iter().map(|(_, tile)| tile)
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &Tile)> {
		self.entries
			.iter()
			.map(|(name, tile)| (name.as_str(), tile))
	}
}

impl FromIterator<(String, Tile)> for TileCollection {
	fn from_iter<I: IntoIterator<Item = (String, Tile)>>(iter: I) -> Self {
		let mut collection = Self::new();
		for (name, tile) in iter {
			collection.insert(name, tile);
		}
		collection
	}
}

/// One annotated record: polygon rings, labels and source properties.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
	coordinates: Vec<Vec<[f64; 2]>>,
	labels: Vec<String>,
	id: Option<String>,
	confidence: Option<f64>,
	properties: Map<String, Value>,
}

impl Record {
	pub fn new(
		coordinates: Vec<Vec<[f64; 2]>>,
		labels: Vec<String>,
		id: Option<String>,
		confidence: Option<f64>,
		properties: Map<String, Value>,
	) -> Self {
		Self {
			coordinates,
			labels,
			id,
			confidence,
			properties,
		}
	}

	pub fn coordinates(&self) -> &[Vec<[f64; 2]>] {
		&self.coordinates
	}

	pub fn labels(&self) -> &[String] {
		&self.labels
	}

	pub fn id(&self) -> Option<&str> {
		self.id.as_deref()
	}

	pub fn confidence(&self) -> Option<f64> {
		self.confidence
	}

	/// Raw source property, for entries without a typed accessor.
	pub fn property(&self, name: &str) -> Option<&Value> {
		self.properties.get(name)
	}

	pub fn property_str(&self, name: &str) -> Option<&str> {
		self.properties.get(name).and_then(Value::as_str)
	}
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordCollection {
	records: Vec<Record>,
}

impl RecordCollection {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push(&mut self, record: Record) {
		self.records.push(record);
	}

	pub fn get(&self, index: usize) -> Option<&Record> {
		self.records.get(index)
	}

	pub fn len(&self) -> usize {
		self.records.len()
	}

	pub fn is_empty(&self) -> bool {
		self.records.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = &Record> {
		self.records.iter()
	}
}

/// Named polygon mask, such as a zone footprint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mask {
	name: String,
	coordinates: Vec<Vec<[f64; 2]>>,
}

impl Mask {
	pub fn new(name: impl Into<String>, coordinates: Vec<Vec<[f64; 2]>>) -> Self {
		Self {
			name: name.into(),
			coordinates,
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn coordinates(&self) -> &[Vec<[f64; 2]>] {
		&self.coordinates
	}
}

/// The annotation side of one dataset item.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Annotation {
	records: RecordCollection,
	masks: Vec<Mask>,
	paths: Vec<PathBuf>,
	properties: BTreeMap<String, String>,
}

impl Annotation {
	pub fn new(records: RecordCollection, masks: Vec<Mask>, paths: Vec<PathBuf>) -> Self {
		Self {
			records,
			masks,
			paths,
			properties: BTreeMap::new(),
		}
	}

	pub fn records(&self) -> &RecordCollection {
		&self.records
	}

	pub fn masks(&self) -> &[Mask] {
		&self.masks
	}

	pub fn mask(&self, name: &str) -> Option<&Mask> {
		self.masks.iter().find(|mask| mask.name() == name)
	}

	/// Source files this annotation was read from.
	pub fn paths(&self) -> &[PathBuf] {
		&self.paths
	}

	pub fn property(&self, name: &str) -> Option<&str> {
		self.properties.get(name).map(String::as_str)
	}

	pub fn set_property(&mut self, name: impl Into<String>, value: impl Into<String>) {
		self.properties.insert(name.into(), value.into());
	}
}

/// One fully materialized dataset item.
#[derive(Debug, Clone, PartialEq)]
pub struct DataPoint {
	pub tiles: TileCollection,
	pub annotation: Annotation,
}
