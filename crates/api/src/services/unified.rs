use finboard_core::unified::{DuplicateStrategy, ImportResult, UnifiedExport};
use log::info;

use crate::client::ApiClient;
use crate::error::{ApiError, Result};
use crate::transport::{ApiRequest, MultipartPart};

const IMPORT_CONTENT_TYPE: &str = "application/json";

/// Whole-dataset export and import.
#[derive(Debug, Clone)]
pub struct UnifiedService {
    client: ApiClient,
}

impl UnifiedService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// GET /unified/export
    pub async fn export_data(&self) -> Result<UnifiedExport> {
        self.client.get("/unified/export", Vec::new()).await
    }

    /// POST /unified/import as multipart: the file under `file` and the
    /// strategy under `duplicateStrategy`.
    pub async fn import_data(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        strategy: DuplicateStrategy,
    ) -> Result<ImportResult> {
        if bytes.is_empty() {
            return Err(ApiError::invalid_request("Import file is empty"));
        }
        let request = ApiRequest::post("/unified/import").with_multipart(vec![
            MultipartPart::File {
                name: "file".to_string(),
                file_name: file_name.to_string(),
                content_type: IMPORT_CONTENT_TYPE.to_string(),
                bytes,
            },
            MultipartPart::Text {
                name: "duplicateStrategy".to_string(),
                value: strategy.as_str().to_string(),
            },
        ]);
        let result: ImportResult = self.client.send_json(request).await?;
        info!(
            "Imported {}: {} created, {} errors",
            file_name,
            result.total_created(),
            result.total_errors()
        );
        Ok(result)
    }
}
