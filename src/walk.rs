//! Pattern-driven file tree resolution
//!
//! A [`PathResolver`] walks a file tree and lazily yields every path matching
//! its compiled [`Pattern`], along with the captured group values. The walk
//! starts from the pattern's literal prefix so unrelated siblings are never
//! visited, and unreadable entries are logged and skipped rather than
//! aborting the whole resolution.

use std::path::{Path, PathBuf};

use tracing::warn;
use walkdir::WalkDir;

use crate::error::{PatternResult, ResolveError, ResolveResult};
use crate::pattern::{Captures, Pattern};

/// One path matched by a pattern, with its captured group values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
	path: PathBuf,
	captures: Captures,
}

impl ResolvedPath {
	pub fn path(&self) -> &Path {
		&self.path
	}

	pub fn into_path(self) -> PathBuf {
		self.path
	}

	pub fn captures(&self) -> &Captures {
		&self.captures
	}

	pub fn capture(&self, name: &str) -> Option<&str> {
		self.captures.get(name)
	}
}

/// Resolves a compiled pattern against a file tree.
#[derive(Debug, Clone)]
pub struct PathResolver {
	pattern: Pattern,
}

impl PathResolver {
	pub fn new(pattern: Pattern) -> Self {
		Self { pattern }
	}

	/// Compiles `pattern` and wraps it in a resolver.
	pub fn compile(pattern: &str) -> PatternResult<Self> {
		Ok(Self::new(Pattern::new(pattern)?))
	}

	pub fn pattern(&self) -> &Pattern {
		&self.pattern
	}

	/// Starts a lazy search for paths matching the pattern.
	///
	/// Relative patterns require a search root; absolute patterns forbid one.
	/// A degenerate pattern skips the walk entirely and checks its single
	/// implied path for existence.
	pub fn find(&self, root: Option<&Path>) -> ResolveResult<Matches<'_>> {
		match (self.pattern.is_absolute(), root) {
			(true, Some(_)) => return Err(ResolveError::AbsoluteWithRoot),
			(false, None) => return Err(ResolveError::RelativeWithoutRoot),
			_ => {}
		}

		if self.pattern.is_degenerate() {
			let path = match root {
				Some(root) => root.join(self.pattern.as_str()),
				None => PathBuf::from(self.pattern.as_str()),
			};
			if !path.is_file() {
				return Err(ResolveError::DegenerateMissing { path });
			}
			return Ok(Matches {
				pattern: &self.pattern,
				state: State::Degenerate(Some(ResolvedPath {
					path,
					captures: Captures::default(),
				})),
			});
		}

		let base = match root {
			Some(root) => root.join(self.pattern.prefix()),
			None => self.pattern.prefix().to_path_buf(),
		};
		Ok(Matches {
			pattern: &self.pattern,
			state: State::Walk {
				root: root.map(Path::to_path_buf),
				entries: WalkDir::new(base).into_iter(),
			},
		})
	}
}

/// Lazy iterator over the paths matched by one [`PathResolver::find`] call.
pub struct Matches<'a> {
	pattern: &'a Pattern,
	state: State,
}

enum State {
	Degenerate(Option<ResolvedPath>),
	Walk {
		root: Option<PathBuf>,
		entries: walkdir::IntoIter,
	},
}

impl Iterator for Matches<'_> {
	type Item = ResolvedPath;

	fn next(&mut self) -> Option<Self::Item> {
		match &mut self.state {
			State::Degenerate(single) => single.take(),
			State::Walk { root, entries } => {
				for entry in entries {
					let entry = match entry {
						Ok(entry) => entry,
						Err(error) => {
							warn!(%error, "skipping unreadable entry");
							continue;
						}
					};
					if !entry.file_type().is_file() {
						continue;
					}
					let candidate = match root {
						Some(root) => match entry.path().strip_prefix(root) {
							Ok(relative) => relative,
							Err(_) => continue,
						},
						None => entry.path(),
					};
					let Some(candidate) = candidate.to_str() else {
						warn!(path = %entry.path().display(), "skipping non-UTF8 path");
						continue;
					};
					let candidate = candidate.replace('\\', "/");
					if let Some(captures) = self.pattern.captures(&candidate) {
						return Some(ResolvedPath {
							path: entry.path().to_path_buf(),
							captures,
						});
					}
				}
				None
			}
		}
	}
}
