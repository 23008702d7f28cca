//! Path pattern parser
//!
//! Turns a pattern string such as `data/{dataset}/{aoi/}/{tile:\w+}.[jpg|png]`
//! into a [`Resolver`] sequence. The parser works in two phases: a character
//! scan splitting the pattern into components while tracking brace and
//! bracket nesting, then a per-component parse producing resolvers. Group
//! semantics (duplicates, reserved names) are checked once the whole pattern
//! has parsed.

use crate::error::{PatternError, PatternResult};
use crate::pattern::resolver::{
	is_identifier, ComponentResolver, ExtensionResolver, GroupResolver, Resolver,
};

/// Pattern string parser, optionally rejecting caller-reserved group names.
#[derive(Debug, Clone, Default)]
pub struct Parser {
	reserved: Vec<String>,
}

impl Parser {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_reserved(reserved: impl IntoIterator<Item = impl Into<String>>) -> Self {
		Self {
			reserved: reserved.into_iter().map(Into::into).collect(),
		}
	}

	/// Parses `pattern` into a resolver sequence, anchor first for absolute
	/// patterns.
	pub fn parse(&self, pattern: &str) -> PatternResult<Vec<Resolver>> {
		let (absolute, components) = split_components(pattern)?;
		// split_components never returns an empty component list.
		let last = components.len() - 1;

		let mut resolvers = Vec::with_capacity(components.len() + 1);
		if absolute {
			resolvers.push(Resolver::Anchor);
		}
		for (position, component) in components.iter().enumerate() {
			if position == last {
				resolvers.push(parse_file_component(component, pattern)?);
			} else {
				resolvers.push(parse_directory_component(component, pattern)?);
			}
		}

		self.check_group_semantics(&resolvers)?;
		Ok(resolvers)
	}

	fn check_group_semantics(&self, resolvers: &[Resolver]) -> PatternResult<()> {
		let mut seen: Vec<&str> = Vec::new();
		for resolver in resolvers {
			let Some(name) = resolver.group_name() else {
				continue;
			};
			if self.reserved.iter().any(|reserved| reserved == name) {
				return Err(PatternError::ReservedGroup {
					name: name.to_string(),
				});
			}
			if seen.contains(&name) {
				return Err(PatternError::DuplicateGroup {
					name: name.to_string(),
				});
			}
			seen.push(name);
		}
		Ok(())
	}
}

/// Splits `pattern` at separators outside braces and brackets, reporting
/// structural brace errors as they are encountered.
fn split_components(pattern: &str) -> PatternResult<(bool, Vec<String>)> {
	let mut components = Vec::new();
	let mut current = String::new();
	let mut in_group = false;
	let mut group_content = 0usize;
	let mut bracket_open: Option<usize> = None;

	for (index, character) in pattern.char_indices() {
		match character {
			'{' if in_group => {
				if group_content == 0 {
					return Err(PatternError::MissingGroupName {
						pattern: pattern.to_string(),
					});
				}
				// A second opening brace means the current group never closed.
				return Err(PatternError::MissingGroupClosing {
					pattern: pattern.to_string(),
				});
			}
			'{' => {
				in_group = true;
				group_content = 0;
				current.push(character);
			}
			'}' if !in_group => {
				return Err(PatternError::MissingGroupOpening {
					pattern: pattern.to_string(),
				});
			}
			'}' => {
				in_group = false;
				current.push(character);
			}
			'[' if !in_group && bracket_open.is_none() => {
				bracket_open = Some(index);
				current.push(character);
			}
			']' if !in_group => {
				bracket_open = None;
				current.push(character);
			}
			'/' if !in_group && bracket_open.is_none() => {
				components.push(std::mem::take(&mut current));
			}
			_ => {
				if in_group {
					group_content += 1;
				}
				current.push(character);
			}
		}
	}

	if in_group {
		return Err(PatternError::MissingGroupClosing {
			pattern: pattern.to_string(),
		});
	}
	if let Some(start) = bracket_open {
		return Err(PatternError::InvalidExtension {
			extension: pattern[start..].to_string(),
		});
	}
	components.push(current);

	let absolute = components.first().is_some_and(String::is_empty);
	if absolute {
		components.remove(0);
	}
	if components.is_empty() {
		return Err(PatternError::FileMissing {
			pattern: pattern.to_string(),
		});
	}
	if components.iter().any(String::is_empty) {
		// A trailing separator leaves no file component; any other empty
		// component comes from a doubled separator.
		if components.last().is_some_and(String::is_empty)
			&& !components[..components.len() - 1]
				.iter()
				.any(String::is_empty)
		{
			return Err(PatternError::FileMissing {
				pattern: pattern.to_string(),
			});
		}
		return Err(PatternError::DuplicateSeparator {
			pattern: pattern.to_string(),
		});
	}
	Ok((absolute, components))
}

fn parse_directory_component(component: &str, pattern: &str) -> PatternResult<Resolver> {
	if component.starts_with('{') {
		if !component.ends_with('}') || component[1..component.len() - 1].contains('}') {
			return Err(PatternError::Syntax {
				reason: format!("malformed group component '{component}'"),
			});
		}
		return Ok(Resolver::Group(parse_group(
			&component[1..component.len() - 1],
			pattern,
		)?));
	}
	if component.contains('{') {
		return Err(PatternError::Syntax {
			reason: format!("group marker inside literal component '{component}'"),
		});
	}
	Ok(Resolver::Component(ComponentResolver::new(component)))
}

/// Parses the final component, splitting off its mandatory extension first.
fn parse_file_component(component: &str, pattern: &str) -> PatternResult<Resolver> {
	let Some(dot) = find_extension_separator(component) else {
		return Err(PatternError::FileMissing {
			pattern: pattern.to_string(),
		});
	};
	let stem = &component[..dot];
	let extension_text = &component[dot + 1..];
	if extension_text.is_empty() || extension_text.starts_with('{') {
		return Err(PatternError::FileMissing {
			pattern: pattern.to_string(),
		});
	}
	let extension = parse_extension(extension_text)?;

	if stem.starts_with('{') {
		if !stem.ends_with('}') || stem[1..stem.len() - 1].contains('}') {
			return Err(PatternError::Syntax {
				reason: format!("malformed group component '{stem}'"),
			});
		}
		let group = parse_group(&stem[1..stem.len() - 1], pattern)?;
		if group.is_recursive() {
			return Err(PatternError::RecursiveFile {
				group: group.name().to_string(),
			});
		}
		Ok(Resolver::Group(group.with_extension(extension)))
	} else {
		if !is_identifier(stem) {
			return Err(PatternError::InvalidName {
				name: stem.to_string(),
			});
		}
		Ok(Resolver::Component(
			ComponentResolver::new(stem).with_extension(extension),
		))
	}
}

/// First `.` of the final component that sits outside any group braces.
fn find_extension_separator(component: &str) -> Option<usize> {
	let mut in_group = false;
	for (index, character) in component.char_indices() {
		match character {
			'{' => in_group = true,
			'}' => in_group = false,
			'.' if !in_group => return Some(index),
			_ => {}
		}
	}
	None
}

/// Parses a brace-stripped group body: `name`, `name/`, `name:filter` or
/// `name/:filter`.
fn parse_group(content: &str, pattern: &str) -> PatternResult<GroupResolver> {
	if content.is_empty() {
		return Err(PatternError::MissingGroupName {
			pattern: pattern.to_string(),
		});
	}
	let split = content.find(['/', ':']);
	let name = &content[..split.unwrap_or(content.len())];
	if name.is_empty() {
		return Err(PatternError::MissingGroupName {
			pattern: pattern.to_string(),
		});
	}
	if !is_identifier(name) {
		return Err(PatternError::InvalidName {
			name: name.to_string(),
		});
	}

	let mut group = GroupResolver::new(name);
	if let Some(split) = split {
		let mut rest = &content[split..];
		if let Some(after_slash) = rest.strip_prefix('/') {
			group = group.recursive();
			if after_slash.is_empty() {
				return Ok(group);
			}
			if !after_slash.starts_with(':') {
				return Err(PatternError::InvalidGroupConstruct {
					group: content.to_string(),
				});
			}
			rest = after_slash;
		}
		let filter = &rest[1..];
		if filter.is_empty() {
			return Err(PatternError::MissingGroupRegex {
				group: content.to_string(),
			});
		}
		if filter.contains('/') {
			return Err(PatternError::InvalidGroupConstruct {
				group: content.to_string(),
			});
		}
		group = group.with_filter(filter);
	}
	Ok(group)
}

fn parse_extension(text: &str) -> PatternResult<ExtensionResolver> {
	if let Some(inner) = text.strip_prefix('[') {
		let Some(inner) = inner.strip_suffix(']') else {
			return Err(PatternError::InvalidExtension {
				extension: text.to_string(),
			});
		};
		if inner.contains('/') || inner.contains(':') {
			return Err(PatternError::Syntax {
				reason: format!("separator inside alternative extension '{text}'"),
			});
		}
		let entries: Vec<&str> = inner.split('|').collect();
		if entries.len() < 2 || entries.iter().any(|entry| !is_extension_token(entry)) {
			return Err(PatternError::InvalidExtension {
				extension: text.to_string(),
			});
		}
		return Ok(ExtensionResolver::alternatives(entries));
	}
	if !is_extension_token(text) {
		return Err(PatternError::InvalidExtension {
			extension: text.to_string(),
		});
	}
	Ok(ExtensionResolver::new(text))
}

fn is_extension_token(token: &str) -> bool {
	!token.is_empty()
		&& token
			.chars()
			.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
