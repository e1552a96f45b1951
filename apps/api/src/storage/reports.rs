//! Report Store: writes the final screening record, keyed by the candidate's name digest.

use std::path::PathBuf;

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::models::report::ScreeningReport;
use crate::storage::StorageError;

/// Single all-or-nothing write of a report record. Returns where the record landed.
#[async_trait]
pub trait ReportStore: Send + Sync {
    async fn write_record(&self, key: &str, report: &ScreeningReport)
        -> Result<String, StorageError>;
}

/// Renders the persisted record as 4-space indented JSON.
pub fn render_record(report: &ScreeningReport) -> Result<Vec<u8>, StorageError> {
    let mut buf = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    report.record().serialize(&mut serializer)?;
    Ok(buf)
}

// Keys become file names and object keys; digests and the fallback key always pass.
fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

/// Writes `<dir>/<key>.json`. The record is written to a temp file and renamed into place,
/// so a failed write never leaves a partial record behind.
pub struct FileReportStore {
    dir: PathBuf,
}

impl FileReportStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl ReportStore for FileReportStore {
    async fn write_record(
        &self,
        key: &str,
        report: &ScreeningReport,
    ) -> Result<String, StorageError> {
        validate_key(key)?;
        let body = render_record(report)?;

        let path = self.dir.join(format!("{key}.json"));
        let tmp = self.dir.join(format!(".{key}.json.tmp"));

        if let Err(e) = tokio::fs::write(&tmp, &body).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }

        Ok(path.display().to_string())
    }
}

/// Writes `reports/<key>.json` to an S3-compatible bucket (MinIO locally, AWS in production).
pub struct S3ReportStore {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3ReportStore {
    pub fn new(client: aws_sdk_s3::Client, bucket: String) -> Self {
        Self { client, bucket }
    }
}

#[async_trait]
impl ReportStore for S3ReportStore {
    async fn write_record(
        &self,
        key: &str,
        report: &ScreeningReport,
    ) -> Result<String, StorageError> {
        validate_key(key)?;
        let body = render_record(report)?;
        let object_key = format!("reports/{key}.json");

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&object_key)
            .content_type("application/json")
            .body(ByteStream::from(Bytes::from(body)))
            .send()
            .await
            .map_err(|e| StorageError::S3(e.to_string()))?;

        Ok(format!("s3://{}/{object_key}", self.bucket))
    }
}
