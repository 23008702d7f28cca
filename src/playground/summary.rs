//! Per-dataset summary files
//!
//! Each dataset may carry a `dataset_summary.json` describing its zones and,
//! per zone, the acquisition images in rank order. The ranks drive the tile
//! ordering inside a dataset item.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::DriverResult;

pub const SUMMARY_FILE: &str = "dataset_summary.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetSummary {
	target_zoom: u32,
	dataset_name: String,
	/// One image list per zone, parallel to `zone_ids`.
	image_ids: Vec<Vec<String>>,
	zone_ids: Vec<String>,
	creation_date: String,
	dataset_id: String,
}

impl DatasetSummary {
	pub fn load(path: &Path) -> DriverResult<Self> {
		let reader = BufReader::new(File::open(path)?);
		Ok(serde_json::from_reader(reader)?)
	}

	pub fn dataset_id(&self) -> &str {
		&self.dataset_id
	}

	pub fn dataset_name(&self) -> &str {
		&self.dataset_name
	}

	pub fn target_zoom(&self) -> u32 {
		self.target_zoom
	}

	pub fn zone_index(&self, zone: &str) -> Option<usize> {
		self.zone_ids.iter().position(|id| id == zone)
	}

	/// Rank of `image` within the given zone's acquisition order.
	pub fn image_rank(&self, zone_index: usize, image: &str) -> Option<usize> {
		self.image_ids
			.get(zone_index)?
			.iter()
			.position(|id| id == image)
	}
}
