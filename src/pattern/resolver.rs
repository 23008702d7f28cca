//! Resolver sequence: the compiled form of a path pattern
//!
//! A pattern string is compiled into one resolver per path component, plus an
//! optional extension decorator on the final one. Each resolver knows how to
//! re-emit its canonical pattern text and how to contribute a fragment to the
//! full-path regular expression.

use serde::{Deserialize, Serialize};

/// Filter applied to capture groups that do not declare their own,
/// matching exactly one path component.
pub const DEFAULT_FILTER: &str = "[^/]+";

/// Returns true when `name` is usable as a group or file name.
pub(crate) fn is_identifier(name: &str) -> bool {
	let mut chars = name.chars();
	match chars.next() {
		Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
		_ => return false,
	}
	chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Extension decorator on a pattern's final component.
///
/// A single entry renders as `.ext`; multiple entries render as the
/// alternative form `.[a|b]` and match any one of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionResolver {
	extensions: Vec<String>,
}

impl ExtensionResolver {
	pub fn new(extension: impl Into<String>) -> Self {
		Self {
			extensions: vec![extension.into()],
		}
	}

	pub fn alternatives(extensions: impl IntoIterator<Item = impl Into<String>>) -> Self {
		Self {
			extensions: extensions.into_iter().map(Into::into).collect(),
		}
	}

	pub fn extensions(&self) -> &[String] {
		&self.extensions
	}

	pub fn is_alternative(&self) -> bool {
		self.extensions.len() > 1
	}

	/// Canonical pattern text, including the leading dot.
	pub fn pattern_fragment(&self) -> String {
		if self.is_alternative() {
			format!(".[{}]", self.extensions.join("|"))
		} else {
			format!(".{}", self.extensions[0])
		}
	}

	pub fn regex_fragment(&self) -> String {
		if self.is_alternative() {
			let escaped: Vec<String> = self.extensions.iter().map(|e| regex::escape(e)).collect();
			format!(r"\.(?:{})", escaped.join("|"))
		} else {
			format!(r"\.{}", regex::escape(&self.extensions[0]))
		}
	}
}

/// Literal path component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentResolver {
	name: String,
	extension: Option<ExtensionResolver>,
}

impl ComponentResolver {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			extension: None,
		}
	}

	pub fn with_extension(mut self, extension: ExtensionResolver) -> Self {
		self.extension = Some(extension);
		self
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn extension(&self) -> Option<&ExtensionResolver> {
		self.extension.as_ref()
	}
}

/// Named capture group component, optionally recursive and optionally
/// carrying a caller-supplied filter regex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupResolver {
	name: String,
	recursive: bool,
	filter: Option<String>,
	extension: Option<ExtensionResolver>,
}

impl GroupResolver {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			recursive: false,
			filter: None,
			extension: None,
		}
	}

	pub fn recursive(mut self) -> Self {
		self.recursive = true;
		self
	}

	pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
		self.filter = Some(filter.into());
		self
	}

	pub fn with_extension(mut self, extension: ExtensionResolver) -> Self {
		self.extension = Some(extension);
		self
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn is_recursive(&self) -> bool {
		self.recursive
	}

	/// The effective filter, falling back to the single-component default.
	pub fn filter(&self) -> &str {
		self.filter.as_deref().unwrap_or(DEFAULT_FILTER)
	}

	pub fn explicit_filter(&self) -> Option<&str> {
		self.filter.as_deref()
	}

	pub fn extension(&self) -> Option<&ExtensionResolver> {
		self.extension.as_ref()
	}
}

/// One compiled pattern component.
///
/// `Anchor` marks an absolute pattern and only ever appears first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolver {
	Anchor,
	Component(ComponentResolver),
	Group(GroupResolver),
}

impl Resolver {
	/// Capture group name, if this resolver is a group.
	pub fn group_name(&self) -> Option<&str> {
		match self {
			Resolver::Group(group) => Some(group.name()),
			_ => None,
		}
	}

	pub fn extension(&self) -> Option<&ExtensionResolver> {
		match self {
			Resolver::Anchor => None,
			Resolver::Component(component) => component.extension(),
			Resolver::Group(group) => group.extension(),
		}
	}

	pub fn is_recursive(&self) -> bool {
		matches!(self, Resolver::Group(group) if group.is_recursive())
	}

	/// Canonical pattern text for this component.
	pub fn pattern_fragment(&self) -> String {
		let (mut text, extension) = match self {
			Resolver::Anchor => (String::new(), None),
			Resolver::Component(component) => (component.name().to_string(), component.extension()),
			Resolver::Group(group) => {
				let mut inner = group.name().to_string();
				if group.is_recursive() {
					inner.push('/');
				}
				if let Some(filter) = group.explicit_filter() {
					inner.push(':');
					inner.push_str(filter);
				}
				(format!("{{{inner}}}"), group.extension())
			}
		};
		if let Some(extension) = extension {
			text.push_str(&extension.pattern_fragment());
		}
		text
	}

	/// Regex fragment matching this component within a full relative path.
	pub fn regex_fragment(&self) -> String {
		let (mut text, extension) = match self {
			Resolver::Anchor => (String::new(), None),
			Resolver::Component(component) => {
				(regex::escape(component.name()), component.extension())
			}
			Resolver::Group(group) => {
				let body = if group.is_recursive() {
					format!("(?:{}/?)+", group.filter())
				} else {
					group.filter().to_string()
				};
				(format!("(?P<{}>{})", group.name(), body), group.extension())
			}
		};
		if let Some(extension) = extension {
			text.push_str(&extension.regex_fragment());
		}
		text
	}
}
