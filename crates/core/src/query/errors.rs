//! Query parsing errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueryError {
    /// Query string is empty or whitespace.
    #[error("empty query")]
    EmptyQuery,

    /// A `{...}` query was not valid JSON. Never retried as key:value text.
    #[error("unable to parse query spec: {0}")]
    MalformedSpec(#[source] serde_json::Error),

    /// A `{...}` query decoded to something other than an object.
    #[error("query spec must be a JSON object, got {0}")]
    NotAnObject(&'static str),
}
