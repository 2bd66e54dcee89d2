use crate::db::{DbError, FieldError, QueryError, QueryErrorKind};
use crate::model::driver::DriverId;
use crate::model::validation::ValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Error returned by every repository and service operation.
#[derive(Debug)]
pub enum RepoError {
    /// Payload failed field validation, or referenced a missing driver.
    Validation(ValidationError),
    /// Update patch carried no recognized field.
    NoFields(&'static str),
    /// Store uniqueness constraint rejected the write.
    Conflict {
        constraint: String,
        source: QueryError,
    },
    /// Row cannot be deleted while other rows still reference it.
    Referenced { entity: &'static str, id: i64 },
    /// Target row of an update does not exist.
    NotFound { entity: &'static str, id: i64 },
    /// Opaque store or connectivity failure.
    Query(QueryError),
    Db(DbError),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    /// Persisted row cannot be mapped to a valid record.
    InvalidData(String),
}

impl RepoError {
    /// True when a uniqueness conflict was raised on `column`
    /// (`table.column` form).
    pub fn is_conflict_on(&self, column: &str) -> bool {
        matches!(self, Self::Conflict { source, .. } if source.is_unique_violation_on(column))
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NoFields(entity) => write!(f, "no {entity} fields to update"),
            Self::Conflict { constraint, .. } => {
                write!(f, "value already exists: {constraint}")
            }
            Self::Referenced { entity, id } => {
                write!(f, "{entity} {id} is still referenced by other records")
            }
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::Query(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "repository requires table `{table}`")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Conflict { source, .. } => Some(source),
            Self::Query(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NoFields(_)
            | Self::Referenced { .. }
            | Self::NotFound { .. }
            | Self::UninitializedConnection { .. }
            | Self::MissingRequiredTable(_)
            | Self::InvalidData(_) => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<QueryError> for RepoError {
    fn from(value: QueryError) -> Self {
        Self::Query(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Query(QueryError::from(value))
    }
}

impl From<FieldError> for RepoError {
    fn from(value: FieldError) -> Self {
        Self::InvalidData(value.to_string())
    }
}

/// Maps insert/update failures onto domain errors.
///
/// `driver_ref` is the driver id the statement tried to reference, used to
/// report a foreign-key failure as a validation error.
pub(crate) fn map_write_error(err: QueryError, driver_ref: Option<DriverId>) -> RepoError {
    match (err.kind(), driver_ref) {
        (QueryErrorKind::UniqueViolation, _) => RepoError::Conflict {
            constraint: err.constraint().unwrap_or("unique").to_string(),
            source: err,
        },
        (QueryErrorKind::ForeignKeyViolation, Some(driver_id)) => {
            RepoError::Validation(ValidationError::UnknownDriver(driver_id))
        }
        _ => RepoError::Query(err),
    }
}
