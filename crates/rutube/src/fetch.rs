use std::time::Duration;

use bytes::Bytes;
use reqwest::Client;

use crate::error::{RutubeError, RutubeResult};

/// Attempts per source location, including the first one.
pub const RETRY: u32 = 5;
/// Fixed wait between attempts. No exponential backoff, no jitter.
pub const RETRY_INTERVAL: Duration = Duration::from_secs(1);

/// GET `url`, retrying on a non-success status until the budget runs out.
///
/// Transport-level failures are not retried; only responses that actually
/// arrived with a bad status count against the budget.
pub async fn fetch_data(client: &Client, url: &str) -> RutubeResult<Bytes> {
    let mut last_status = None;
    for attempt in 1..=RETRY {
        let response = client.get(url).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.bytes().await?);
        }

        last_status = Some(status);
        tracing::warn!("Fetching {url} failed with {status} ({attempt}/{RETRY}).");
        if attempt < RETRY {
            tokio::time::sleep(RETRY_INTERVAL).await;
        }
    }

    Err(RutubeError::Unavailable {
        status: last_status,
    })
}

/// Fetch one segment, trying the reserve source first and falling back to the
/// primary. Each source gets the full retry budget of [`fetch_data`].
pub async fn fetch_segment(
    client: &Client,
    segment_uri: &str,
    primary_base: &str,
    reserve_base: Option<&str>,
) -> RutubeResult<Bytes> {
    if let Some(reserve_base) = reserve_base {
        match fetch_data(client, &make_segment_url(reserve_base, segment_uri)).await {
            Err(RutubeError::Unavailable { status }) => {
                tracing::warn!(
                    "Reserve source exhausted for {segment_uri} (status {status:?}), \
                     falling back to primary."
                );
            }
            result => return result,
        }
    }

    fetch_data(client, &make_segment_url(primary_base, segment_uri)).await
}

/// Segments live next to their playlist on the CDN, addressed by file name
/// only: the base URL is cut at its `.m3u8` marker and the segment's trailing
/// path component is appended, regardless of how the sub-playlist spelled the
/// segment path.
pub fn make_segment_url(base_url: &str, segment_uri: &str) -> String {
    let base = base_url
        .find(".m3u8")
        .map_or(base_url, |at| &base_url[..at]);
    let name = segment_uri.rsplit('/').next().unwrap_or(segment_uri);
    format!("{base}/{name}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_make_segment_url() {
        assert_eq!(
            make_segment_url("https://cdn/video/index.m3u8", "segment-1.ts"),
            "https://cdn/video/index/segment-1.ts"
        );
        // query parameters after the marker are cut away together with it
        assert_eq!(
            make_segment_url("https://cdn/video/index.m3u8?sig=abc", "segment-1.ts"),
            "https://cdn/video/index/segment-1.ts"
        );
        // only the trailing path component of the segment uri is kept
        assert_eq!(
            make_segment_url("https://cdn/video/index.m3u8", "../other/dir/segment-2.ts"),
            "https://cdn/video/index/segment-2.ts"
        );
    }

    #[test]
    fn test_make_segment_url_without_marker() {
        assert_eq!(
            make_segment_url("https://cdn/video", "segment-1.ts"),
            "https://cdn/video/segment-1.ts"
        );
    }
}
