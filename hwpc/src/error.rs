//! Error types and result definitions for carbon accounting runs.
//!
//! Provides an error system with classification, aggregation, and captured diagnostic
//! metadata for simulation runs. The [`HwpcError`] type supports single errors, errors
//! with additional detail, and multiple aggregated errors for complex failure scenarios.

use std::backtrace::Backtrace;
use std::borrow::Cow;
use std::error;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;

/// Convenient result type for simulation operations using [`HwpcError`] as the error type.
pub type HwpcResult<T> = Result<T, HwpcError>;

/// Detailed payload stored for single [`HwpcError`] instances.
#[derive(Debug, Clone)]
struct ErrorPayload {
    kind: ErrorKind,
    description: Cow<'static, str>,
    detail: Option<Cow<'static, str>>,
    source: Option<Arc<dyn error::Error + Send + Sync>>,
    location: &'static Location<'static>,
    backtrace: Arc<Backtrace>,
}

/// Main error type for simulation operations.
///
/// [`HwpcError`] can represent single errors, errors with additional detail, or multiple
/// aggregated errors. The design allows for rich error information while maintaining
/// ergonomic usage patterns.
#[derive(Debug, Clone)]
pub struct HwpcError {
    repr: ErrorRepr,
}

/// Internal representation of error data.
#[derive(Debug, Clone)]
enum ErrorRepr {
    /// Single error payload holding rich metadata.
    Single(ErrorPayload),
    /// Multiple aggregated errors.
    ///
    /// This variant is mainly useful to capture multiple task failures.
    Many {
        errors: Vec<HwpcError>,
        location: &'static Location<'static>,
    },
}

/// Specific categories of errors that can occur during a simulation run.
///
/// Error kinds are organized by functional area and failure mode to enable appropriate
/// error handling strategies.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
#[non_exhaustive]
pub enum ErrorKind {
    // Cluster lifecycle errors
    ClusterConstructionFailed,
    ClusterUnavailable,

    // Task graph errors
    TaskFailed,
    TaskPanic,

    // Data & aggregation errors
    InvalidLineage,
    FieldShapeMismatch,
    InvalidData,

    // IO & serialization errors
    IoError,
    SerializationError,

    // Storage errors
    UploadFailed,
    DownloadFailed,

    // Configuration errors
    ConfigError,

    // Unknown / uncategorized
    Unknown,
}

impl HwpcError {
    /// Returns the [`ErrorKind`] of this error.
    ///
    /// For multiple errors, returns the kind of the first error or [`ErrorKind::Unknown`]
    /// if the error list is empty.
    pub fn kind(&self) -> ErrorKind {
        match self.repr {
            ErrorRepr::Single(ref payload) => payload.kind,
            ErrorRepr::Many { ref errors, .. } => errors
                .first()
                .map(|err| err.kind())
                .unwrap_or(ErrorKind::Unknown),
        }
    }

    /// Returns all [`ErrorKind`]s present in this error.
    ///
    /// For single errors, returns a vector with one element. For multiple errors,
    /// returns a flattened vector of all error kinds.
    pub fn kinds(&self) -> Vec<ErrorKind> {
        match self.repr {
            ErrorRepr::Single(ref payload) => vec![payload.kind],
            ErrorRepr::Many { ref errors, .. } => errors
                .iter()
                .flat_map(|err| err.kinds())
                .collect::<Vec<_>>(),
        }
    }

    /// Returns the detailed error information if available.
    ///
    /// For multiple errors, returns the detail of the first error that has one.
    pub fn detail(&self) -> Option<&str> {
        match self.repr {
            ErrorRepr::Single(ref payload) => payload.detail.as_deref(),
            ErrorRepr::Many { ref errors, .. } => errors.iter().find_map(|e| e.detail()),
        }
    }

    /// Returns the captured backtrace for this error.
    pub fn backtrace(&self) -> Option<&Backtrace> {
        match self.repr {
            ErrorRepr::Single(ref payload) => Some(payload.backtrace.as_ref()),
            ErrorRepr::Many { .. } => None,
        }
    }

    /// Returns the captured callsite location for this error.
    pub fn location(&self) -> &'static Location<'static> {
        match self.repr {
            ErrorRepr::Single(ref payload) => payload.location,
            ErrorRepr::Many { location, .. } => location,
        }
    }

    /// Attaches an originating [`error::Error`] to this error and returns the modified instance.
    ///
    /// The stored source is preserved across clones and exposed via [`error::Error::source`].
    /// Has no effect when called on aggregated errors because aggregates forward the first
    /// contained error as their source.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: error::Error + Send + Sync + 'static,
    {
        if let ErrorRepr::Single(ref mut payload) = self.repr {
            payload.source = Some(Arc::new(source));
        }
        self
    }

    /// Creates an [`HwpcError`] from its components.
    #[track_caller]
    fn from_components(
        kind: ErrorKind,
        description: Cow<'static, str>,
        detail: Option<Cow<'static, str>>,
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    ) -> Self {
        let location = Location::caller();
        let backtrace = Arc::new(Backtrace::capture());

        HwpcError {
            repr: ErrorRepr::Single(ErrorPayload {
                kind,
                description,
                detail,
                source,
                location,
                backtrace,
            }),
        }
    }
}

impl PartialEq for HwpcError {
    fn eq(&self, other: &HwpcError) -> bool {
        match (&self.repr, &other.repr) {
            (ErrorRepr::Single(a), ErrorRepr::Single(b)) => a.kind == b.kind,
            (
                ErrorRepr::Many {
                    errors: errors_a, ..
                },
                ErrorRepr::Many {
                    errors: errors_b, ..
                },
            ) => {
                errors_a.len() == errors_b.len()
                    && errors_a.iter().zip(errors_b.iter()).all(|(a, b)| a == b)
            }
            _ => false,
        }
    }
}

impl fmt::Display for HwpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match &self.repr {
            ErrorRepr::Single(payload) => {
                let location = payload.location;
                write!(
                    f,
                    "[{:?}] {} @ {}:{}:{}",
                    payload.kind,
                    payload.description,
                    location.file(),
                    location.line(),
                    location.column()
                )?;

                if let Some(detail) = payload.detail.as_deref() {
                    write!(f, "\n  Detail: {detail}")?;
                }

                Ok(())
            }
            ErrorRepr::Many { errors, location } => {
                let count = errors.len();
                write!(
                    f,
                    "[Many] {} error{} aggregated @ {}:{}:{}",
                    count,
                    if count == 1 { "" } else { "s" },
                    location.file(),
                    location.line(),
                    location.column()
                )?;

                for (index, error) in errors.iter().enumerate() {
                    let rendered = format!("{error}");
                    for (line_index, line) in rendered.lines().enumerate() {
                        if line_index == 0 {
                            write!(f, "\n  {}. {}", index + 1, line)?;
                        } else {
                            write!(f, "\n     {line}")?;
                        }
                    }
                }

                Ok(())
            }
        }
    }
}

impl error::Error for HwpcError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match &self.repr {
            ErrorRepr::Single(payload) => payload
                .source
                .as_ref()
                .map(|source| source as &(dyn error::Error + 'static)),
            // For aggregated errors, we forward the first contained error as the source.
            ErrorRepr::Many { errors, .. } => errors
                .first()
                .map(|error| error as &(dyn error::Error + 'static)),
        }
    }
}

/// Creates an [`HwpcError`] from an error kind and static description.
impl From<(ErrorKind, &'static str)> for HwpcError {
    #[track_caller]
    fn from((kind, desc): (ErrorKind, &'static str)) -> HwpcError {
        HwpcError::from_components(kind, Cow::Borrowed(desc), None, None)
    }
}

/// Creates an [`HwpcError`] from an error kind, static description, and dynamic detail.
impl<D> From<(ErrorKind, &'static str, D)> for HwpcError
where
    D: Into<Cow<'static, str>>,
{
    #[track_caller]
    fn from((kind, desc, detail): (ErrorKind, &'static str, D)) -> HwpcError {
        HwpcError::from_components(kind, Cow::Borrowed(desc), Some(detail.into()), None)
    }
}

/// Creates an [`HwpcError`] from a vector of errors for aggregation.
///
/// If the vector contains exactly one error, returns that error directly without wrapping
/// it in the aggregated variant.
impl<E> From<Vec<E>> for HwpcError
where
    E: Into<HwpcError>,
{
    #[track_caller]
    fn from(errors: Vec<E>) -> HwpcError {
        let location = Location::caller();

        let mut errors: Vec<HwpcError> = errors.into_iter().map(Into::into).collect();

        if errors.len() == 1 {
            return errors.pop().expect("just checked length is 1");
        }

        HwpcError {
            repr: ErrorRepr::Many { errors, location },
        }
    }
}

/// Converts [`std::io::Error`] to [`HwpcError`] with [`ErrorKind::IoError`].
impl From<std::io::Error> for HwpcError {
    #[track_caller]
    fn from(err: std::io::Error) -> HwpcError {
        let detail = err.to_string();
        let source = Arc::new(err);
        HwpcError::from_components(
            ErrorKind::IoError,
            Cow::Borrowed("I/O operation failed"),
            Some(Cow::Owned(detail)),
            Some(source),
        )
    }
}

/// Converts [`csv::Error`] to [`HwpcError`] with [`ErrorKind::SerializationError`].
impl From<csv::Error> for HwpcError {
    #[track_caller]
    fn from(err: csv::Error) -> HwpcError {
        let detail = err.to_string();
        let source = Arc::new(err);
        HwpcError::from_components(
            ErrorKind::SerializationError,
            Cow::Borrowed("CSV serialization failed"),
            Some(Cow::Owned(detail)),
            Some(source),
        )
    }
}

/// Converts [`zip::result::ZipError`] to [`HwpcError`] with [`ErrorKind::SerializationError`].
impl From<zip::result::ZipError> for HwpcError {
    #[track_caller]
    fn from(err: zip::result::ZipError) -> HwpcError {
        let detail = err.to_string();
        let source = Arc::new(err);
        HwpcError::from_components(
            ErrorKind::SerializationError,
            Cow::Borrowed("Archive assembly failed"),
            Some(Cow::Owned(detail)),
            Some(source),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hwpc_error;

    #[test]
    fn single_error_exposes_kind_and_detail() {
        let err = hwpc_error!(ErrorKind::TaskFailed, "Task resolution failed", "year 2011");

        assert_eq!(err.kind(), ErrorKind::TaskFailed);
        assert_eq!(err.detail(), Some("year 2011"));
    }

    #[test]
    fn aggregated_errors_flatten_kinds() {
        let errors = vec![
            hwpc_error!(ErrorKind::TaskFailed, "Task resolution failed"),
            hwpc_error!(ErrorKind::UploadFailed, "Archive upload failed"),
        ];
        let err = HwpcError::from(errors);

        assert_eq!(err.kind(), ErrorKind::TaskFailed);
        assert_eq!(
            err.kinds(),
            vec![ErrorKind::TaskFailed, ErrorKind::UploadFailed]
        );
    }

    #[test]
    fn single_element_vector_unwraps() {
        let errors = vec![hwpc_error!(ErrorKind::ConfigError, "Bad config")];
        let err = HwpcError::from(errors);

        assert_eq!(err.kinds().len(), 1);
    }
}
