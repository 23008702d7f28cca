//! Label taxonomy loading and validation
//!
//! A taxonomy is a tree of label names read from a nested JSON object. Two
//! taxonomies are equal when their trees are structurally equal; a label set
//! fits a taxonomy when every label is known and no label is an ancestor of
//! another label in the same set.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde_json::Value;

use crate::error::TaxonomyError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Taxonomy {
	children: BTreeMap<String, Taxonomy>,
}

impl Taxonomy {
	/// Builds a taxonomy from a nested JSON object, where each key is a label
	/// and its value holds that label's sub-labels.
	pub fn from_value(value: &Value) -> Result<Self, TaxonomyError> {
		let object = value.as_object().ok_or(TaxonomyError::NotAnObject)?;
		let mut children = BTreeMap::new();
		for (label, subtree) in object {
			children.insert(label.clone(), Self::from_value(subtree)?);
		}
		Ok(Self { children })
	}

	pub fn from_file(path: &Path) -> Result<Self, TaxonomyError> {
		let reader = BufReader::new(File::open(path)?);
		let value: Value = serde_json::from_reader(reader)?;
		Self::from_value(&value)
	}

	pub fn is_empty(&self) -> bool {
		self.children.is_empty()
	}

	/// True when `label` appears anywhere in the tree.
	pub fn contains(&self, label: &str) -> bool {
		self.children.contains_key(label)
			|| self.children.values().any(|subtree| subtree.contains(label))
	}

	/// True when `ancestor` has `descendant` somewhere below it.
	pub fn is_ancestor(&self, ancestor: &str, descendant: &str) -> bool {
		match self.children.get(ancestor) {
			Some(subtree) => subtree.contains(descendant),
			None => self
				.children
				.values()
				.any(|subtree| subtree.is_ancestor(ancestor, descendant)),
		}
	}

	/// A label set fits when every label is known and the set names no two
	/// labels on the same root-to-leaf line.
	pub fn fits(&self, labels: &[String]) -> bool {
		if !labels.iter().all(|label| self.contains(label)) {
			return false;
		}
		for first in labels {
			for second in labels {
				if first != second && self.is_ancestor(first, second) {
					return false;
				}
			}
		}
		true
	}
}
