use crate::constants::{METADATA_HEADER, METADATA_HEADER_VALUE};
use crate::error::Result;
use crate::types::Snapshot;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};

/// Where poll cycles get their snapshots from.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn fetch(&self) -> Result<Snapshot>;
}

/// Reads the scheduled events document from the instance metadata service.
pub struct MetadataClient {
    client: reqwest::Client,
    url: String,
}

impl MetadataClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl SnapshotSource for MetadataClient {
    #[instrument(skip(self), fields(url = %self.url))]
    async fn fetch(&self) -> Result<Snapshot> {
        let resp = self
            .client
            .get(&self.url)
            .header(METADATA_HEADER, METADATA_HEADER_VALUE)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            debug!("Metadata endpoint answered {}", status);
        }

        let body = resp.error_for_status()?.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}
