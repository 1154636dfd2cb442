use reqwest::Client;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::{error::RutubeResult, fetch};

/// Fetches and writes one segment at a time, in order.
pub(crate) struct SequentialDownloader {
    client: Client,
    primary_base: String,
    reserve_base: Option<String>,
}

impl SequentialDownloader {
    pub(crate) fn new(client: Client, primary_base: String, reserve_base: Option<String>) -> Self {
        Self {
            client,
            primary_base,
            reserve_base,
        }
    }

    pub(crate) async fn download<W>(&self, urls: Vec<String>, sink: &mut W) -> RutubeResult<()>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let total = urls.len();
        for (sequence, uri) in urls.iter().enumerate() {
            let data = fetch::fetch_segment(
                &self.client,
                uri,
                &self.primary_base,
                self.reserve_base.as_deref(),
            )
            .await?;

            sink.write_all(&data).await?;
            tracing::info!("Processing {uri} finished. ({} / {total})", sequence + 1);
        }
        sink.flush().await?;

        Ok(())
    }
}
