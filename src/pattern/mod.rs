//! Path pattern compilation
//!
//! A [`Pattern`] is the compiled form of a path pattern string: its resolver
//! sequence, the anchored full-path regex, the ordered capture group names,
//! and the literal directory prefix usable as a walk base. Patterns can also
//! be assembled programmatically from resolvers, which allows group filters
//! containing characters the string syntax reserves.

mod parser;
mod resolver;

pub use parser::Parser;
pub use resolver::{
	ComponentResolver, ExtensionResolver, GroupResolver, Resolver, DEFAULT_FILTER,
};

use std::fmt;
use std::path::{Path, PathBuf};

use regex::Regex;

use crate::error::{PatternError, PatternResult};
use crate::pattern::resolver::is_identifier;

/// Ordered named captures extracted from one matched path.
///
/// Order follows group declaration order in the pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Captures {
	entries: Vec<(String, String)>,
}

impl Captures {
	pub(crate) fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
		self.entries.push((name.into(), value.into()));
	}

	pub fn get(&self, name: &str) -> Option<&str> {
		self.entries
			.iter()
			.find(|(entry, _)| entry == name)
			.map(|(_, value)| value.as_str())
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.entries
			.iter()
			.map(|(name, value)| (name.as_str(), value.as_str()))
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

impl FromIterator<(String, String)> for Captures {
	fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
		Self {
			entries: iter.into_iter().collect(),
		}
	}
}

/// A compiled path pattern.
#[derive(Debug, Clone)]
pub struct Pattern {
	resolvers: Vec<Resolver>,
	regex: Regex,
	source: String,
	group_names: Vec<String>,
	prefix: PathBuf,
	absolute: bool,
}

impl Pattern {
	/// Compiles a pattern string.
	pub fn new(pattern: &str) -> PatternResult<Self> {
		Self::from_resolvers(Parser::new().parse(pattern)?)
	}

	/// Compiles a pattern string, rejecting the given group names.
	pub fn with_reserved(
		pattern: &str,
		reserved: impl IntoIterator<Item = impl Into<String>>,
	) -> PatternResult<Self> {
		Self::from_resolvers(Parser::with_reserved(reserved).parse(pattern)?)
	}

	/// Assembles a pattern from a resolver sequence.
	///
	/// This path skips the string syntax entirely, so filters may use any
	/// regex construct, including repetition braces.
	pub fn from_resolvers(resolvers: Vec<Resolver>) -> PatternResult<Self> {
		let source = emit(&resolvers);
		let last = match resolvers.len().checked_sub(1) {
			Some(last) => last,
			None => return Err(PatternError::FileMissing { pattern: source }),
		};

		let mut group_names = Vec::new();
		for (position, item) in resolvers.iter().enumerate() {
			if position > 0 && matches!(item, Resolver::Anchor) {
				return Err(PatternError::Syntax {
					reason: "anchor resolver after the first position".to_string(),
				});
			}
			if position == last {
				if item.extension().is_none() {
					return Err(PatternError::FileMissing {
						pattern: source.clone(),
					});
				}
				if item.is_recursive() {
					if let Some(name) = item.group_name() {
						return Err(PatternError::RecursiveFile {
							group: name.to_string(),
						});
					}
				}
			}
			if let Resolver::Group(group) = item {
				if !is_identifier(group.name()) {
					return Err(PatternError::InvalidName {
						name: group.name().to_string(),
					});
				}
				if group_names.iter().any(|name| name == group.name()) {
					return Err(PatternError::DuplicateGroup {
						name: group.name().to_string(),
					});
				}
				if let Some(filter) = group.explicit_filter() {
					if let Err(error) = Regex::new(filter) {
						return Err(PatternError::InvalidFilter {
							group: group.name().to_string(),
							source: Box::new(error),
						});
					}
				}
				group_names.push(group.name().to_string());
			}
		}

		let absolute = matches!(resolvers.first(), Some(Resolver::Anchor));
		let fragments: Vec<String> = resolvers
			.iter()
			.map(Resolver::regex_fragment)
			.collect();
		let regex =
			Regex::new(&format!("^{}$", fragments.join("/"))).map_err(|error| PatternError::Syntax {
				reason: error.to_string(),
			})?;

		let prefix = literal_prefix(&resolvers, last);
		Ok(Self {
			resolvers,
			regex,
			source,
			group_names,
			prefix,
			absolute,
		})
	}

	/// Canonical pattern text this pattern re-emits as.
	pub fn as_str(&self) -> &str {
		&self.source
	}

	pub fn regex(&self) -> &Regex {
		&self.regex
	}

	pub fn resolvers(&self) -> &[Resolver] {
		&self.resolvers
	}

	/// Capture group names in declaration order.
	pub fn group_names(&self) -> &[String] {
		&self.group_names
	}

	/// True when the pattern declares no capture group and therefore
	/// designates a single path.
	pub fn is_degenerate(&self) -> bool {
		self.group_names.is_empty()
	}

	pub fn is_absolute(&self) -> bool {
		self.absolute
	}

	/// Longest run of leading literal directory components, usable as a walk
	/// base.
	pub fn prefix(&self) -> &Path {
		&self.prefix
	}

	/// Matches `candidate` (a `/`-separated path string) against the whole
	/// pattern, returning the named captures on success.
	pub fn captures(&self, candidate: &str) -> Option<Captures> {
		let matched = self.regex.captures(candidate)?;
		let mut captures = Captures::default();
		for name in &self.group_names {
			captures.push(name.clone(), matched.name(name)?.as_str());
		}
		Some(captures)
	}
}

impl fmt::Display for Pattern {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.source)
	}
}

fn emit(resolvers: &[Resolver]) -> String {
	let fragments: Vec<String> = resolvers.iter().map(Resolver::pattern_fragment).collect();
	fragments.join("/")
}

fn literal_prefix(resolvers: &[Resolver], last: usize) -> PathBuf {
	let mut prefix = PathBuf::new();
	for (position, item) in resolvers.iter().enumerate() {
		match item {
			Resolver::Anchor => prefix.push("/"),
			Resolver::Component(component) if position < last => prefix.push(component.name()),
			_ => break,
		}
	}
	prefix
}
