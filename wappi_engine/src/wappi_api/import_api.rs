use std::fmt::Debug;

use log::*;
use serde::{Deserialize, Serialize};

use crate::{
    db_types::{ImportData, ImportRecord, NewImportRecord},
    spreadsheet::{read_workbook, rows_to_import_data},
    traits::{ImportApiError, ImportManagement},
};

/// The result of a spreadsheet upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub imported: usize,
}

/// `ImportApi` manages the imported price list that order items are reconciled against.
pub struct ImportApi<B> {
    db: B,
}

impl<B> Debug for ImportApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ImportApi")
    }
}

impl<B> ImportApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> ImportApi<B>
where B: ImportManagement
{
    pub async fn create(&self, record: NewImportRecord) -> Result<ImportRecord, ImportApiError> {
        self.db.insert_import_record(record).await
    }

    pub async fn fetch_all(&self) -> Result<Vec<ImportRecord>, ImportApiError> {
        self.db.fetch_import_records().await
    }

    pub async fn fetch(&self, id: &str) -> Result<ImportRecord, ImportApiError> {
        self.db.fetch_import_record(id).await?.ok_or_else(|| ImportApiError::RecordNotFound(id.to_string()))
    }

    pub async fn update(
        &self,
        id: &str,
        data: ImportData,
        profile_id: Option<String>,
    ) -> Result<ImportRecord, ImportApiError> {
        self.db
            .update_import_record(id, data, profile_id)
            .await?
            .ok_or_else(|| ImportApiError::RecordNotFound(id.to_string()))
    }

    pub async fn delete(&self, id: &str) -> Result<(), ImportApiError> {
        if self.db.delete_import_record(id).await? {
            debug!("📄️ Import record {id} deleted");
            Ok(())
        } else {
            Err(ImportApiError::RecordNotFound(id.to_string()))
        }
    }

    pub async fn delete_all(&self) -> Result<u64, ImportApiError> {
        let count = self.db.delete_all_import_records().await?;
        info!("📄️ {count} import records deleted");
        Ok(count)
    }

    /// Stores one import record per data row of a sheet. See [`rows_to_import_data`] for how rows are read.
    ///
    /// Rows are stored one at a time. If storing a row fails, the rows stored before it stay, and the error reports
    /// how many made it.
    pub async fn import_spreadsheet(
        &self,
        rows: Vec<Vec<String>>,
        profile_id: Option<String>,
    ) -> Result<ImportSummary, ImportApiError> {
        let mut imported = 0;
        for data in rows_to_import_data(rows) {
            let record = NewImportRecord { data, profile_id: profile_id.clone() };
            if let Err(e) = self.db.insert_import_record(record).await {
                warn!("📄️ Import stopped after {imported} rows. {e}");
                return Err(ImportApiError::PartialImport { imported, reason: e.to_string() });
            }
            imported += 1;
        }
        info!("📄️ Imported {imported} price list rows");
        Ok(ImportSummary { imported })
    }

    /// Reads the first sheet of an uploaded workbook and imports it.
    pub async fn import_workbook(
        &self,
        bytes: &[u8],
        profile_id: Option<String>,
    ) -> Result<ImportSummary, ImportApiError> {
        let rows = read_workbook(bytes).map_err(|e| ImportApiError::FileParseError(e.to_string()))?;
        self.import_spreadsheet(rows, profile_id).await
    }
}
