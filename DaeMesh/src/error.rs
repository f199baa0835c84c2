//! Error types for `DaeMesh`

use std::path::PathBuf;

use thiserror::Error;

/// The error type for `DaeMesh` operations.
///
/// Every variant is fatal for the import that raised it: the importer
/// session is dropped and nothing partial is returned. Soft failures
/// (unresolved materials or textures) never surface here, they are logged.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    // ==================== IO Errors ====================
    /// IO error from file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The document to import does not exist.
    #[error("file not found: {path}")]
    FileNotFound {
        /// The path that was requested.
        path: PathBuf,
    },

    /// The document exists but could not be opened.
    #[error("unable to open {path}: {source}")]
    FileUnreadable {
        /// The path that was requested.
        path: PathBuf,
        /// The underlying open error.
        source: std::io::Error,
    },

    // ==================== Document Structure Errors ====================
    /// A required XML attribute is absent.
    #[error("mandatory attribute '{attribute}' not found on <{element}>")]
    MissingAttribute {
        /// The element that should carry the attribute.
        element: String,
        /// The missing attribute name.
        attribute: String,
    },

    /// A declared array or list length disagrees with the actual token count.
    #[error("count mismatch in <{element}>{}: expected {expected}, found {found}", describe_id(.id))]
    CountMismatch {
        /// The element holding the list.
        element: String,
        /// The id of the enclosing source, when there is one.
        id: Option<String>,
        /// The declared (or required) length.
        expected: usize,
        /// The length actually present.
        found: usize,
    },

    /// An `<input>` semantic other than VERTEX, NORMAL or TEXCOORD.
    #[error("input semantic '{semantic}' not supported")]
    UnsupportedSemantic {
        /// The semantic string found in the document.
        semantic: String,
    },

    /// An input references a source id that was never registered.
    #[error("source '{id}' not found")]
    UnknownSource {
        /// The unresolved source id.
        id: String,
    },

    /// A raw index addresses past the end of its bulk array.
    #[error("index {index} out of range for source '{source_id}' ({len} values)")]
    IndexOutOfRange {
        /// The bulk array being indexed.
        source_id: String,
        /// The offending raw index.
        index: usize,
        /// The number of floats in the array.
        len: usize,
    },

    /// A token failed to parse as a number.
    #[error("unable to convert '{token}' to a number in <{element}>")]
    MalformedNumber {
        /// The element whose content held the token.
        element: String,
        /// The token text.
        token: String,
    },

    // ==================== Stream Errors ====================
    /// The document ended before a required element was closed or found.
    #[error("unexpected end of document while reading <{element}>")]
    StreamTruncated {
        /// The element that was being read.
        element: String,
    },

    /// The XML reader failed.
    #[error("XML stream error: {0}")]
    StreamError(#[from] quick_xml::Error),

    /// XML attribute error.
    #[error("XML attribute error: {0}")]
    XmlAttrError(String),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    // ==================== Context ====================
    /// Wraps an import failure with the name of the document being read.
    #[error("{document}: {source}")]
    Document {
        /// The source document name.
        document: String,
        /// The underlying failure.
        source: Box<Error>,
    },
}

impl Error {
    /// Returns the structural error underneath any document context.
    #[must_use]
    pub fn root(&self) -> &Error {
        match self {
            Error::Document { source, .. } => source.root(),
            other => other,
        }
    }

    /// True for failures raised before any parsing began.
    #[must_use]
    pub fn is_boundary(&self) -> bool {
        matches!(
            self.root(),
            Error::FileNotFound { .. } | Error::FileUnreadable { .. }
        )
    }

    pub(crate) fn count_mismatch(
        element: &str,
        id: Option<&str>,
        expected: usize,
        found: usize,
    ) -> Self {
        Error::CountMismatch {
            element: element.to_string(),
            id: id.map(str::to_string),
            expected,
            found,
        }
    }

    pub(crate) fn malformed(element: &str, token: &str) -> Self {
        Error::MalformedNumber {
            element: element.to_string(),
            token: token.to_string(),
        }
    }

    pub(crate) fn truncated(element: &str) -> Self {
        Error::StreamTruncated {
            element: element.to_string(),
        }
    }
}

#[allow(clippy::ref_option)]
fn describe_id(id: &Option<String>) -> String {
    id.as_ref().map(|id| format!(" '{id}'")).unwrap_or_default()
}

// Add conversion from quick_xml::events::attributes::AttrError
impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::XmlAttrError(err.to_string())
    }
}

/// A specialized Result type for `DaeMesh` operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_unwraps_document_context() {
        let err = Error::Document {
            document: "scene.dae".to_string(),
            source: Box::new(Error::count_mismatch("float_array", Some("P"), 4, 3)),
        };
        assert!(matches!(err.root(), Error::CountMismatch { expected: 4, found: 3, .. }));
        assert!(!err.is_boundary());
        assert_eq!(
            err.to_string(),
            "scene.dae: count mismatch in <float_array> 'P': expected 4, found 3"
        );
    }

    #[test]
    fn test_boundary_errors() {
        let err = Error::FileNotFound {
            path: PathBuf::from("missing.dae"),
        };
        assert!(err.is_boundary());
    }
}
