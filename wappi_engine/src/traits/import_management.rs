use thiserror::Error;

use crate::{
    db_types::{ImportData, ImportRecord, NewImportRecord},
    ErrorKind,
};

#[derive(Debug, Clone, Error)]
pub enum ImportApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Import record {0} does not exist")]
    RecordNotFound(String),
    #[error("Could not read the uploaded file. {0}")]
    FileParseError(String),
    #[error("Imported {imported} rows before failing. {reason}")]
    PartialImport { imported: usize, reason: String },
}

impl ImportApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DatabaseError(_) => ErrorKind::Internal,
            Self::RecordNotFound(_) => ErrorKind::NotFound,
            Self::FileParseError(_) => ErrorKind::Parse,
            Self::PartialImport { .. } => ErrorKind::Internal,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::DatabaseError(_) => "import:database-error",
            Self::RecordNotFound(_) => "import:not-found",
            Self::FileParseError(_) => "import:file-parse-error",
            Self::PartialImport { .. } => "import:create-error",
        }
    }
}

impl From<sqlx::Error> for ImportApiError {
    fn from(e: sqlx::Error) -> Self {
        ImportApiError::DatabaseError(e.to_string())
    }
}

impl From<serde_json::Error> for ImportApiError {
    fn from(e: serde_json::Error) -> Self {
        ImportApiError::DatabaseError(format!("Could not encode import data. {e}"))
    }
}

/// Storage for the rows of imported price lists.
#[allow(async_fn_in_trait)]
pub trait ImportManagement {
    async fn insert_import_record(&self, record: NewImportRecord) -> Result<ImportRecord, ImportApiError>;

    /// All import records, oldest first. The matcher relies on this order to break ties.
    async fn fetch_import_records(&self) -> Result<Vec<ImportRecord>, ImportApiError>;

    async fn fetch_import_record(&self, id: &str) -> Result<Option<ImportRecord>, ImportApiError>;

    /// Replaces the data (and profile) of an existing record. Returns `None` if there is no such record.
    async fn update_import_record(
        &self,
        id: &str,
        data: ImportData,
        profile_id: Option<String>,
    ) -> Result<Option<ImportRecord>, ImportApiError>;

    /// Returns `true` if a record was deleted.
    async fn delete_import_record(&self, id: &str) -> Result<bool, ImportApiError>;

    /// Deletes every import record, returning how many were removed.
    async fn delete_all_import_records(&self) -> Result<u64, ImportApiError>;
}
