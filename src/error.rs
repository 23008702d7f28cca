//! Error types for pattern compilation, path resolution and dataset assembly

use std::path::PathBuf;
use thiserror::Error;

/// Syntax and compilation errors raised while turning a path pattern string
/// into a resolver sequence and a regular expression.
///
/// Each variant maps to one malformation of the pattern language:
///
/// - separators: empty components from doubled `/`
/// - group construction: brace balance, group naming, filter placement
/// - extensions: the final component's `.ext` or `.[a|b]` decorator
/// - semantics: duplicate, reserved or recursive-on-file groups
///
/// `Syntax` is the catch-all for malformations with no more specific
/// classification, such as a group marker stranded inside a literal
/// component or a path separator inside an alternative extension block.
#[derive(Debug, Error)]
pub enum PatternError {
	/// Doubled `/` producing an empty path component
	#[error("duplicated separator in pattern '{pattern}'")]
	DuplicateSeparator { pattern: String },

	/// Content after the recursive `/` marker that is not a `:filter`
	#[error("invalid group construct in '{{{group}}}'")]
	InvalidGroupConstruct { group: String },

	/// Group braces with no name before `/`, `:` or the closing brace
	#[error("missing group name in pattern '{pattern}'")]
	MissingGroupName { pattern: String },

	/// Closing brace with no matching opening brace
	#[error("missing group opening in pattern '{pattern}'")]
	MissingGroupOpening { pattern: String },

	/// Opening brace never closed before the pattern ends
	#[error("missing group closing in pattern '{pattern}'")]
	MissingGroupClosing { pattern: String },

	/// Group or file name that is not a valid identifier
	#[error("invalid name '{name}'")]
	InvalidName { name: String },

	/// A `:` filter marker with nothing after it
	#[error("missing group regex in '{{{group}}}'")]
	MissingGroupRegex { group: String },

	/// Recursive marker on the final (file) component
	#[error("recursive groups are not allowed on file components: '{{{group}}}'")]
	RecursiveFile { group: String },

	/// Pattern whose final component carries no extension
	#[error("pattern '{pattern}' does not designate a file")]
	FileMissing { pattern: String },

	/// Malformed extension or alternative extension list
	#[error("invalid extension '{extension}'")]
	InvalidExtension { extension: String },

	/// The same group name declared twice in one pattern
	#[error("duplicated group '{name}'")]
	DuplicateGroup { name: String },

	/// A group name reserved by the caller
	#[error("reserved group '{name}'")]
	ReservedGroup { name: String },

	/// Group filter that does not compile as a regular expression
	#[error("invalid filter for group '{group}': {source}")]
	InvalidFilter {
		group: String,
		#[source]
		source: Box<regex::Error>,
	},

	/// Any other malformation of the pattern syntax
	#[error("invalid pattern syntax: {reason}")]
	Syntax { reason: String },
}

/// Errors raised while resolving a compiled pattern against a file tree.
#[derive(Debug, Error)]
pub enum ResolveError {
	#[error("the pattern is absolute but a search root was provided")]
	AbsoluteWithRoot,

	#[error("the pattern is relative but no search root was provided")]
	RelativeWithoutRoot,

	/// Degenerate pattern whose single implied path does not exist
	#[error("degenerate path pattern points to a non-existing file: {path}")]
	DegenerateMissing { path: PathBuf },

	#[error("pattern error: {0}")]
	Pattern(#[from] PatternError),

	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),
}

/// Cache-specific errors
#[derive(Debug, Error)]
pub enum CacheError {
	#[error("cache version mismatch: expected {expected}, found {found}")]
	VersionMismatch { expected: u32, found: u32 },

	#[error("cache I/O error: {0}")]
	Io(#[from] std::io::Error),

	#[error("cache serialization error: {0}")]
	Serialization(#[from] bincode::Error),
}

/// Errors raised by tile and annotation drivers while materializing an item.
#[derive(Debug, Error)]
pub enum DriverError {
	#[error("the number of tiles is incompatible with the provided number of names: expected {expected}, found {found}")]
	TileCountMismatch { expected: usize, found: usize },

	#[error("more than one annotation file was provided: {count}")]
	MultipleAnnotationFiles { count: usize },

	#[error("driver I/O error: {0}")]
	Io(#[from] std::io::Error),

	#[error("driver JSON error: {0}")]
	Json(#[from] serde_json::Error),

	#[error("driver error: {0}")]
	Failed(String),
}

/// Errors raised while loading or validating a label taxonomy.
#[derive(Debug, Error)]
pub enum TaxonomyError {
	#[error("taxonomy document is not a nested object")]
	NotAnObject,

	#[error("taxonomy I/O error: {0}")]
	Io(#[from] std::io::Error),

	#[error("taxonomy JSON error: {0}")]
	Json(#[from] serde_json::Error),
}

/// Errors covering dataset assembly and item materialization.
///
/// Construction-time variants (`DegenerateTilePattern`, `NoCommonGroup`,
/// `NoMatches`, `UnmatchedTile`) report an unusable pattern configuration or
/// an empty assembly; access-time variants report a bad index or a summary,
/// taxonomy or driver failure while materializing a single item.
#[derive(Debug, Error)]
pub enum DatasetError {
	/// Tile pattern declaring no capture group at all
	#[error("tile pattern degeneracy is not supported: '{pattern}'")]
	DegenerateTilePattern { pattern: String },

	#[error("no common group could be found in between patterns")]
	NoCommonGroup,

	#[error("no matches where found between tiles and annotations")]
	NoMatches,

	/// Strict-mode tile tuple with no annotation entry
	#[error("tile {path} does not have a matching annotation")]
	UnmatchedTile { path: PathBuf },

	#[error("index out of bounds: {index} (dataset length is {len})")]
	IndexOutOfBounds { index: usize, len: usize },

	/// No dataset in the index carries a readable summary file
	#[error("no file summaries could be found under {root}")]
	SummariesNotFound { root: PathBuf },

	#[error("some zones or datasets seem to be missing from the summaries: {zone} (dataset {dataset})")]
	ZoneMissingFromSummaries { dataset: String, zone: String },

	#[error("some images seem to be missing from the summaries: {image} (dataset {dataset})")]
	ImageMissingFromSummaries { dataset: String, image: String },

	#[error("some datasets have mismatching taxonomies: {dataset}")]
	TaxonomyConflict { dataset: String },

	/// Annotation labels that do not fit the loaded taxonomy
	#[error("labels {labels:?} do not fit the dataset taxonomy")]
	TaxonomyViolation { labels: Vec<String> },

	#[error("taxonomy error: {0}")]
	Taxonomy(#[from] TaxonomyError),

	#[error("pattern error: {0}")]
	Pattern(#[from] PatternError),

	#[error("resolve error: {0}")]
	Resolve(#[from] ResolveError),

	#[error("driver error: {0}")]
	Driver(#[from] DriverError),

	#[error("cache error: {0}")]
	Cache(#[from] CacheError),
}

/// Convenience type alias for pattern compilation results.
pub type PatternResult<T> = Result<T, PatternError>;

/// Convenience type alias for path resolution results.
pub type ResolveResult<T> = Result<T, ResolveError>;

/// Convenience type alias for cache operation results.
pub type CacheResult<T> = Result<T, CacheError>;

/// Convenience type alias for driver invocation results.
pub type DriverResult<T> = Result<T, DriverError>;

/// Convenience type alias for dataset assembly and access results.
pub type DatasetResult<T> = Result<T, DatasetError>;
