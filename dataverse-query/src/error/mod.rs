//! Error types

mod field;

pub use field::*;

/// Boxed error produced by a [`RetrievalPort`](crate::query::RetrievalPort) implementation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors surfaced by query execution.
///
/// The builders never produce errors of their own. Everything here either
/// comes from the retrieval port or from mapping records into caller types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The retrieval port failed to fetch a page.
    ///
    /// The port's error is carried as-is; use [`Error::retrieval_source`] to
    /// downcast it back to the concrete type.
    #[error("Retrieval failed: {0}")]
    Retrieval(#[source] BoxError),

    /// A typed field accessor failed while mapping a record.
    #[error(transparent)]
    Field(#[from] FieldError),

    /// A caller-supplied mapping rejected a record.
    #[error("Failed to map '{entity}' record: {message}")]
    Mapping {
        /// Logical name of the record's entity.
        entity: String,
        /// Description of the failure.
        message: String,
    },

    /// The port kept reporting more records past the last representable page.
    #[error("Paging of '{entity}' exceeded page {page}")]
    PageOverflow {
        /// Logical name of the queried entity.
        entity: String,
        /// Last page number that was fetched.
        page: u32,
    },

    /// Serde mapping of a record into a typed value failed.
    #[error("Record deserialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Wraps a port failure.
    pub fn retrieval(err: impl Into<BoxError>) -> Self {
        Self::Retrieval(err.into())
    }

    /// Creates a mapping error for the given entity.
    pub fn mapping(entity: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Mapping {
            entity: entity.into(),
            message: message.into(),
        }
    }

    /// Returns the port error if this is a retrieval failure.
    pub fn retrieval_source(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            Self::Retrieval(inner) => Some(inner.as_ref()),
            _ => None,
        }
    }

    /// Returns `true` if the error originated in the retrieval port.
    pub fn is_retrieval(&self) -> bool {
        matches!(self, Self::Retrieval(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("service unavailable")]
    struct Unavailable;

    #[test]
    fn test_retrieval_source_downcasts() {
        let err = Error::retrieval(Unavailable);
        assert!(err.is_retrieval());
        assert_eq!(err.to_string(), "Retrieval failed: service unavailable");
        let source = err.retrieval_source().unwrap();
        assert!(source.downcast_ref::<Unavailable>().is_some());
    }

    #[test]
    fn test_field_error_is_transparent() {
        let err = Error::from(FieldError::missing("name"));
        assert!(!err.is_retrieval());
        assert_eq!(err.to_string(), "Field 'name' not found in record");
    }
}
