use std::ops::Deref;

use fake_user_agent::get_chrome_rua;
use m3u8_rs::MasterPlaylist;
use reqwest::Client;

use crate::{
    error::{RutubeError, RutubeResult},
    model::{clean_title, PlayOptions, VideoParams, YappyPage},
    playlist::{Playlist, YappyVideo},
    source::VideoKind,
};

const API_BASE: &str = "https://rutube.ru";

/// HTTP client bound to the rutube.ru API surface.
#[derive(Clone)]
pub struct RutubeClient {
    client: Client,
    api_base: String,
}

impl RutubeClient {
    pub fn new() -> Self {
        let client = Client::builder()
            .user_agent(get_chrome_rua())
            .build()
            .unwrap();

        Self {
            client,
            api_base: API_BASE.to_string(),
        }
    }

    /// Replace the API host. Meant for tests against a local mock server.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn http(&self) -> &Client {
        &self.client
    }

    /// Resolve a page URL into the playlist of downloadable videos.
    pub async fn resolve(&self, page_url: &str) -> RutubeResult<Playlist> {
        self.check_url(page_url).await?;

        let kind = VideoKind::from_url(page_url);
        let id = kind.extract_id(page_url)?;
        log::info!("Resolved {page_url} as {kind:?} with id {id}");

        match kind {
            VideoKind::Yappy => {
                let page = self.yappy_page(&id).await?;
                let video = page
                    .results
                    .into_iter()
                    .next()
                    .ok_or(RutubeError::NoResults)?;
                Ok(Playlist::single(kind, YappyVideo::new(id, video.link)))
            }
            VideoKind::Video | VideoKind::Shorts => {
                let options = self.play_options(&id).await?;
                let title = options
                    .title
                    .as_deref()
                    .map(clean_title)
                    .filter(|title| !title.is_empty())
                    .unwrap_or_else(|| id.clone());

                let master = self.master_playlist(&options.video_balancer.m3u8).await?;
                let params = VideoParams {
                    id,
                    title,
                    duration: options.duration,
                };
                Ok(Playlist::from_master(kind, &master, params))
            }
        }
    }

    async fn check_url(&self, url: &str) -> RutubeResult<()> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(RutubeError::SourceUnavailable(url.to_string()));
        }
        Ok(())
    }

    async fn play_options(&self, id: &str) -> RutubeResult<PlayOptions> {
        let url = format!(
            "{}/api/play/options/{id}/?no_404=true&referer=https%253A%252F%252Frutube.ru&pver=v2",
            self.api_base
        );
        let bytes = self.client.get(&url).send().await?.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn yappy_page(&self, id: &str) -> RutubeResult<YappyPage> {
        let url = format!(
            "{}/pangolin/api/web/yappy/yappypage/?client=wdp&source=shorts&videoId={id}",
            self.api_base
        );
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(RutubeError::Unavailable {
                status: Some(response.status()),
            });
        }
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn master_playlist(&self, url: &str) -> RutubeResult<MasterPlaylist> {
        log::info!("Fetching master playlist from {url}");
        let bytes = self.client.get(url).send().await?.bytes().await?;
        match m3u8_rs::parse_playlist_res(&bytes) {
            Ok(m3u8_rs::Playlist::MasterPlaylist(playlist)) => Ok(playlist),
            Ok(m3u8_rs::Playlist::MediaPlaylist(_)) => Err(RutubeError::ManifestParse(
                "expected a master playlist".to_string(),
            )),
            Err(_) => Err(RutubeError::ManifestParse(
                String::from_utf8_lossy(&bytes).into_owned(),
            )),
        }
    }
}

impl Default for RutubeClient {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for RutubeClient {
    type Target = Client;

    fn deref(&self) -> &Self::Target {
        &self.client
    }
}
