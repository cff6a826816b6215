#![forbid(unsafe_code)]

#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Sql(rusqlite::Error),
    InvalidInput(&'static str),
    /// The change-set catalog itself is malformed (ids not strictly
    /// ascending, duplicate names). Authoring bug, caught before any SQL runs.
    CatalogInvalid(&'static str),
    /// Ledger and catalog disagree on order. Fatal; requires operator
    /// intervention and is never auto-resolved.
    OrderingViolation { detail: String },
    Apply {
        change_set_id: i64,
        name: &'static str,
        cause: Box<StoreError>,
    },
    Revert {
        change_set_id: i64,
        name: &'static str,
        cause: Box<StoreError>,
    },
    NoBackwardSupported { change_set_id: i64 },
    /// A unique index could not be installed because rows still collide.
    /// The deduplication step was incomplete, an authoring bug in the
    /// change set, not a runtime-recoverable condition.
    ConstraintBuild {
        index: &'static str,
        cause: Box<StoreError>,
    },
    UnknownId,
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io: {err}"),
            Self::Sql(err) => write!(f, "sqlite: {err}"),
            Self::InvalidInput(message) => write!(f, "invalid input: {message}"),
            Self::CatalogInvalid(message) => write!(f, "invalid change-set catalog: {message}"),
            Self::OrderingViolation { detail } => {
                write!(f, "ledger ordering violation: {detail}")
            }
            Self::Apply {
                change_set_id,
                name,
                cause,
            } => write!(
                f,
                "apply failed (change_set={change_set_id} {name}): {cause}"
            ),
            Self::Revert {
                change_set_id,
                name,
                cause,
            } => write!(
                f,
                "revert failed (change_set={change_set_id} {name}): {cause}"
            ),
            Self::NoBackwardSupported { change_set_id } => {
                write!(
                    f,
                    "change set {change_set_id} declares no backward operation"
                )
            }
            Self::ConstraintBuild { index, cause } => {
                write!(
                    f,
                    "unique index {index} could not be installed (deduplication incomplete): {cause}"
                )
            }
            Self::UnknownId => write!(f, "unknown id"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sql(value)
    }
}
