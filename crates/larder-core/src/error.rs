use std::fmt;
use std::path::PathBuf;

/// Machine-readable error codes for scripts and agents driving the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    StoreOpenFailed,
    SchemaMigrationFailed,
    ItemNotFound,
    EmptyItemName,
    NothingToPlan,
    StoreWriteFailed,
    ImportReadFailed,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1002",
            Self::StoreOpenFailed => "E1004",
            Self::SchemaMigrationFailed => "E1005",
            Self::ItemNotFound => "E2001",
            Self::EmptyItemName => "E2006",
            Self::NothingToPlan => "E2007",
            Self::StoreWriteFailed => "E5001",
            Self::ImportReadFailed => "E5003",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::StoreOpenFailed => "Inventory store could not be opened",
            Self::SchemaMigrationFailed => "Inventory schema migration failed",
            Self::ItemNotFound => "Item not found",
            Self::EmptyItemName => "Ingredient name is empty",
            Self::NothingToPlan => "No expiring items to plan around",
            Self::StoreWriteFailed => "Inventory write failed",
            Self::ImportReadFailed => "Import source could not be read",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to users and agents.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in larder/config.toml and retry."),
            Self::StoreOpenFailed => {
                Some("Check that the --db path (or LARDER_DB) points to a writable location.")
            }
            Self::SchemaMigrationFailed => {
                Some("Back up the database file, then retry; an unreadable table is recreated empty.")
            }
            Self::ItemNotFound => Some("Run `larder list` to see stored ingredient names."),
            Self::EmptyItemName => Some("Pass a non-empty ingredient name."),
            Self::NothingToPlan => Some(
                "Pass --expiring or flag stock with `larder priority <name>` before planning.",
            ),
            Self::StoreWriteFailed => Some("Check disk space and write permissions."),
            Self::ImportReadFailed => Some("Check the file path and that it is UTF-8 text or CSV."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Failures surfaced by the inventory store.
///
/// Only the write path produces these; reads degrade to empty results.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("cannot create store directory {path}: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot open inventory store {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("inventory schema migration failed: {0}")]
    Migration(#[source] rusqlite::Error),

    #[error("{op} failed for '{name}': {source}")]
    Write {
        op: &'static str,
        name: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("ingredient name must not be empty")]
    EmptyName,

    #[error("failed to close inventory store: {0}")]
    Close(#[source] rusqlite::Error),
}

impl StoreError {
    /// Machine-readable code associated with this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Directory { .. } | Self::Open { .. } => ErrorCode::StoreOpenFailed,
            Self::Migration(_) => ErrorCode::SchemaMigrationFailed,
            Self::Write { .. } | Self::Close(_) => ErrorCode::StoreWriteFailed,
            Self::EmptyName => ErrorCode::EmptyItemName,
        }
    }

    /// Remediation hint, falling back to the code's generic hint.
    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        self.code().hint()
    }

    pub(crate) fn write(op: &'static str, name: &str, source: rusqlite::Error) -> Self {
        Self::Write {
            op,
            name: name.to_string(),
            source,
        }
    }
}
