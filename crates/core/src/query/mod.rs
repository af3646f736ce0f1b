//! Query language: JSON filters, `key:value` pairs and free text.

pub mod convert;
pub mod errors;
pub mod parser;
pub mod spec;

pub use convert::{FLOAT_PATTERN, INT_PATTERN, convert_type};
pub use errors::QueryError;
/// Document identifier, written as 24 lower-case hex characters.
pub use bson::oid::{Error as ObjectIdError, ObjectId};
pub use parser::{QueryParser, split_key_values};
pub use spec::{Condition, QuerySpec, TEXT_KEY};
