//! Snapshot file source.
//!
//! Re-reads a JSON file on every tick. Useful for replaying a captured
//! payload or for backends that drop their latest result on disk.

use super::{parse_payload, DataSource};
use crate::error::FetchError;
use crate::models::Payload;
use futures::future::BoxFuture;
use std::path::PathBuf;

pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn read(&self) -> Result<Payload, FetchError> {
        let body = tokio::fs::read(&self.path).await?;
        parse_payload(&body)
    }
}

impl DataSource for FileSource {
    fn fetch(&self) -> BoxFuture<'_, Result<Payload, FetchError>> {
        Box::pin(self.read())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
