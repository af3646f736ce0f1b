//! Schema definitions, loading, caching and record validation.
//!
//! A schema is a JSON or YAML list of field records. The [`SchemaManager`]
//! caches parsed schemas per path and maintains the [`SchemaKeyIndex`] used
//! by the query parser to resolve user keys.

pub mod definition;
pub mod errors;
pub mod field;
pub mod key_index;
pub mod lint;
pub mod manager;
pub mod parse;
pub mod validation;

pub use definition::{Schema, schema_name};
pub use errors::{SchemaLoadError, ValidationError, ValidationReport};
pub use field::{FieldType, SchemaFieldSpec};
pub use key_index::SchemaKeyIndex;
pub use lint::{LintIssue, LintReport, LintSeverity, lint_schema, lint_schema_file};
pub use manager::{ManagerValidateError, SchemaCacheEntry, SchemaManager};
pub use parse::{ParseOptions, SchemaFormat, discover_schema_files, load_schema_from_file, parse_schema};
pub use validation::{SKIP_KEYS, validate, validate_all};
