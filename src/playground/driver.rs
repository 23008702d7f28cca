//! Playground tile and annotation drivers
//!
//! The tile driver names tiles and tags each with the identifier of the
//! image directory it was found under. The annotation driver parses one
//! GeoJSON feature collection per item, splitting features into records and
//! masks.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use serde_json::Value;

use crate::data::{Annotation, Mask, Record, RecordCollection, Tile, TileCollection};
use crate::dataset::{AnnotationDriver, TileDriver};
use crate::error::{DriverError, DriverResult};
use crate::pattern::Captures;

/// Default identity key of a record's source properties.
const RECORD_ID_KEY: &str = "record_id";
/// Features flagged with this boolean property are masks, not records.
const MASK_KEY: &str = "mask";
const FOOTPRINT_MASK: &str = "zone_footprint";

/// Loads the tiles of one item, one [`Tile`] per matched path.
#[derive(Debug, Clone)]
pub struct PlaygroundTileDriver {
	names: Option<Vec<String>>,
	fetch_ordering: bool,
}

impl Default for PlaygroundTileDriver {
	fn default() -> Self {
		Self {
			names: None,
			fetch_ordering: true,
		}
	}
}

impl PlaygroundTileDriver {
	pub fn new() -> Self {
		Self::default()
	}

	/// Fixed tile names; every item must then match exactly this many tiles.
	pub fn with_names(mut self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
		self.names = Some(names.into_iter().map(Into::into).collect());
		self
	}

	/// Whether tiles should follow the summary acquisition order.
	pub fn with_fetch_ordering(mut self, fetch_ordering: bool) -> Self {
		self.fetch_ordering = fetch_ordering;
		self
	}

	pub fn fetch_ordering(&self) -> bool {
		self.fetch_ordering
	}
}

impl TileDriver for PlaygroundTileDriver {
	fn load_tiles(&self, paths: &[PathBuf], captures: &Captures) -> DriverResult<TileCollection> {
		if let Some(names) = &self.names {
			if names.len() != paths.len() {
				return Err(DriverError::TileCountMismatch {
					expected: names.len(),
					found: paths.len(),
				});
			}
		}

		let mut tiles = TileCollection::new();
		for (position, path) in paths.iter().enumerate() {
			let name = match &self.names {
				Some(names) => names[position].clone(),
				None => format!("tile_{position}"),
			};
			let mut tile = Tile::new(path);
			for (capture, value) in captures.iter() {
				tile.set_property(capture, value);
			}
			if let Some(image) = path.parent().and_then(|dir| dir.file_name()) {
				tile.set_property("image_id", image.to_string_lossy());
			}
			tiles.insert(name, tile);
		}
		Ok(tiles)
	}
}

/// Parses one GeoJSON feature collection into an [`Annotation`].
pub struct GeoJsonAnnotationDriver {
	record_id_key: String,
	confidence_key: Option<String>,
	memo: Option<RefCell<HashMap<Vec<PathBuf>, Annotation>>>,
}

impl Default for GeoJsonAnnotationDriver {
	fn default() -> Self {
		Self {
			record_id_key: RECORD_ID_KEY.to_string(),
			confidence_key: None,
			memo: None,
		}
	}
}

impl GeoJsonAnnotationDriver {
	pub fn new() -> Self {
		Self::default()
	}

	/// Property to read record identities from, instead of `record_id`.
	pub fn with_record_id_key(mut self, key: impl Into<String>) -> Self {
		self.record_id_key = key.into();
		self
	}

	/// Property to read record confidences from. No confidence is read by
	/// default.
	pub fn with_confidence_key(mut self, key: impl Into<String>) -> Self {
		self.confidence_key = Some(key.into());
		self
	}

	/// Memoizes parsed annotations per path tuple. Off by default, so every
	/// access re-reads the file.
	pub fn with_cache(mut self, cache: bool) -> Self {
		self.memo = cache.then(|| RefCell::new(HashMap::new()));
		self
	}

	fn parse(&self, path: &PathBuf, captures: &Captures) -> DriverResult<Annotation> {
		let reader = BufReader::new(File::open(path)?);
		let document: Value = serde_json::from_reader(reader)?;
		let features = document
			.get("features")
			.and_then(Value::as_array)
			.ok_or_else(|| DriverError::Failed("document is not a feature collection".to_string()))?;

		let mut records = RecordCollection::new();
		let mut masks = Vec::new();
		for feature in features {
			let properties = feature
				.get("properties")
				.and_then(Value::as_object)
				.ok_or_else(|| DriverError::Failed("feature has no properties".to_string()))?;
			let coordinates = parse_rings(feature.get("geometry"))?;

			if properties.get(MASK_KEY).and_then(Value::as_bool) == Some(true) {
				masks.push(Mask::new(FOOTPRINT_MASK, coordinates));
				continue;
			}

			let labels = properties
				.get("tags")
				.and_then(Value::as_array)
				.map(|tags| {
					tags.iter()
						.filter_map(Value::as_str)
						.map(str::to_string)
						.collect()
				})
				.unwrap_or_default();
			let id = properties
				.get(&self.record_id_key)
				.and_then(Value::as_str)
				.map(str::to_string);
			let confidence = self
				.confidence_key
				.as_deref()
				.and_then(|key| properties.get(key))
				.and_then(Value::as_f64);
			records.push(Record::new(
				coordinates,
				labels,
				id,
				confidence,
				properties.clone(),
			));
		}

		let mut annotation = Annotation::new(records, masks, vec![path.clone()]);
		for (capture, value) in captures.iter() {
			annotation.set_property(capture, value);
		}
		Ok(annotation)
	}
}

impl AnnotationDriver for GeoJsonAnnotationDriver {
	fn load_annotation(&self, paths: &[PathBuf], captures: &Captures) -> DriverResult<Annotation> {
		if paths.len() != 1 {
			return Err(DriverError::MultipleAnnotationFiles { count: paths.len() });
		}
		if let Some(memo) = &self.memo {
			if let Some(annotation) = memo.borrow().get(paths) {
				return Ok(annotation.clone());
			}
		}
		let annotation = self.parse(&paths[0], captures)?;
		if let Some(memo) = &self.memo {
			memo.borrow_mut()
				.insert(paths.to_vec(), annotation.clone());
		}
		Ok(annotation)
	}
}

/// Polygon rings of a GeoJSON geometry, as `[x, y]` pairs.
fn parse_rings(geometry: Option<&Value>) -> DriverResult<Vec<Vec<[f64; 2]>>> {
	let rings = geometry
		.and_then(|geometry| geometry.get("coordinates"))
		.and_then(Value::as_array)
		.ok_or_else(|| DriverError::Failed("feature has no polygon coordinates".to_string()))?;
	rings
		.iter()
		.map(|ring| {
			ring.as_array()
				.ok_or_else(|| DriverError::Failed("malformed polygon ring".to_string()))?
				.iter()
				.map(parse_position)
				.collect()
		})
		.collect()
}

fn parse_position(position: &Value) -> DriverResult<[f64; 2]> {
	let pair = position
		.as_array()
		.filter(|pair| pair.len() == 2)
		.ok_or_else(|| DriverError::Failed("malformed polygon position".to_string()))?;
	match (pair[0].as_f64(), pair[1].as_f64()) {
		(Some(x), Some(y)) => Ok([x, y]),
		_ => Err(DriverError::Failed(
			"malformed polygon position".to_string(),
		)),
	}
}
