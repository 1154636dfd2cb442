use std::{
    num::NonZeroU32,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use reqwest::Client;
use tokio::{
    io::{AsyncWrite, AsyncWriteExt},
    sync::{mpsc, Semaphore},
};

use crate::{error::RutubeResult, fetch, util::ordered::OrderedReceiver};

/// Fetches segments with a bounded worker pool while keeping sink writes in
/// the original segment order.
///
/// Workers send `(sequence, result)` pairs over a channel; the single writer
/// drains them through an [`OrderedReceiver`], so a segment completing early
/// waits in the reorder buffer until every lower sequence has been written. A
/// segment that exhausted its retries surfaces its error at the in-order
/// position and aborts the pipeline: earlier segments are already in the sink,
/// nothing at or after the failed index is written. Dropping the receiver on
/// abort tears down the channel, which stops the remaining workers from doing
/// anything useful with their results.
pub(crate) struct ParallelDownloader {
    client: Client,
    primary_base: Arc<str>,
    reserve_base: Option<Arc<str>>,
    concurrency: NonZeroU32,
}

impl ParallelDownloader {
    pub(crate) fn new(
        client: Client,
        primary_base: String,
        reserve_base: Option<String>,
        concurrency: NonZeroU32,
    ) -> Self {
        Self {
            client,
            primary_base: primary_base.into(),
            reserve_base: reserve_base.map(Into::into),
            concurrency,
        }
    }

    pub(crate) async fn download<W>(&self, urls: Vec<String>, sink: &mut W) -> RutubeResult<()>
    where
        W: AsyncWrite + Unpin + Send,
    {
        tracing::info!("Start downloading with {} worker(s).", self.concurrency.get());

        let total = urls.len();
        let permits = Arc::new(Semaphore::new(self.concurrency.get() as usize));
        let downloaded = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = mpsc::unbounded_channel();

        for (sequence, uri) in urls.into_iter().enumerate() {
            let permit = permits.clone().acquire_owned().await.unwrap();
            let client = self.client.clone();
            let primary_base = self.primary_base.clone();
            let reserve_base = self.reserve_base.clone();
            let downloaded = downloaded.clone();
            let sender = tx.clone();

            tokio::spawn(async move {
                let result =
                    fetch::fetch_segment(&client, &uri, &primary_base, reserve_base.as_deref())
                        .await;

                match &result {
                    Ok(_) => {
                        let done = downloaded.fetch_add(1, Ordering::Relaxed) + 1;
                        tracing::info!("Processing {uri} finished. ({done} / {total})");
                    }
                    Err(error) => {
                        tracing::error!("Processing {uri} failed, max retries exceed. {error}");
                    }
                }

                // send only fails after the pipeline has already aborted
                let _ = sender.send((sequence as u64, result));
                drop(permit);
            });
        }
        drop(tx);

        let mut ordered = OrderedReceiver::new(rx);
        while let Some(result) = ordered.next().await {
            let data = result?;
            sink.write_all(&data).await?;
        }
        sink.flush().await?;

        Ok(())
    }
}
