use std::{
    num::NonZeroU32,
    ops::Index,
    path::{Path, PathBuf},
};

use m3u8_rs::MasterPlaylist;
use tokio::{
    fs::File,
    io::{AsyncWrite, AsyncWriteExt},
};

use crate::{
    client::RutubeClient,
    download::{ParallelDownloader, SequentialDownloader},
    error::{RutubeError, RutubeResult},
    model::VideoParams,
    source::VideoKind,
};

/// One downloadable quality variant of a segmented video.
///
/// A rendition keeps the sub-playlist location it was announced with as its
/// primary source; when the master playlist announces the same vertical
/// resolution a second time, that location becomes the reserve source of the
/// already existing rendition instead of a new entry.
pub struct Rendition {
    params: VideoParams,
    width: u64,
    height: u64,
    codecs: Option<String>,
    primary_url: String,
    reserve_url: Option<String>,
    segment_urls: Option<Vec<String>>,
}

impl Rendition {
    fn new(
        uri: String,
        width: u64,
        height: u64,
        codecs: Option<String>,
        params: VideoParams,
    ) -> Self {
        Self {
            params,
            width,
            height,
            codecs,
            primary_url: uri,
            reserve_url: None,
            segment_urls: None,
        }
    }

    /// Display title, e.g. `Some Title (1920x1080)`.
    pub fn title(&self) -> String {
        format!("{} ({})", self.params.title, self.resolution())
    }

    pub fn resolution(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }

    pub fn id(&self) -> &str {
        &self.params.id
    }

    pub fn duration(&self) -> Option<u64> {
        self.params.duration
    }

    pub fn width(&self) -> u64 {
        self.width
    }

    pub fn height(&self) -> u64 {
        self.height
    }

    pub fn codecs(&self) -> Option<&str> {
        self.codecs.as_deref()
    }

    pub fn primary_url(&self) -> &str {
        &self.primary_url
    }

    pub fn reserve_url(&self) -> Option<&str> {
        self.reserve_url.as_deref()
    }

    /// Ordered segment URIs of this rendition, resolved from the primary
    /// sub-playlist with a single failover to the reserve one. The result is
    /// cached; use [`Rendition::clear_segment_urls`] to force re-resolution.
    pub async fn segment_urls(&mut self, client: &RutubeClient) -> RutubeResult<&[String]> {
        if self.segment_urls.is_none() {
            self.segment_urls = Some(self.load_segment_urls(client).await?);
        }
        Ok(self.segment_urls.as_deref().unwrap())
    }

    pub fn clear_segment_urls(&mut self) {
        self.segment_urls = None;
    }

    async fn load_segment_urls(&self, client: &RutubeClient) -> RutubeResult<Vec<String>> {
        let response = client.get(&self.primary_url).send().await?;
        let response = if response.status().is_success() {
            response
        } else {
            let status = response.status();
            let Some(reserve_url) = &self.reserve_url else {
                return Err(RutubeError::Unavailable {
                    status: Some(status),
                });
            };

            log::warn!("Primary sub-playlist failed with {status}, trying reserve.");
            let reserve = client.get(reserve_url).send().await?;
            if !reserve.status().is_success() {
                return Err(RutubeError::Unavailable {
                    status: Some(reserve.status()),
                });
            }
            reserve
        };

        let bytes = response.bytes().await?;
        let playlist = match m3u8_rs::parse_media_playlist_res(&bytes) {
            Ok(playlist) => playlist,
            Err(_) => {
                return Err(RutubeError::ManifestParse(
                    String::from_utf8_lossy(&bytes).into_owned(),
                ))
            }
        };

        Ok(playlist
            .segments
            .into_iter()
            .map(|segment| segment.uri)
            .collect())
    }

    /// Download all segments into `sink` in their original order.
    ///
    /// `workers == 0` downloads sequentially; any other value bounds the
    /// concurrent fetch pool while writes still happen in segment order.
    pub async fn download<W>(
        &mut self,
        client: &RutubeClient,
        sink: &mut W,
        workers: u32,
    ) -> RutubeResult<()>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let urls = self.segment_urls(client).await?.to_vec();

        match NonZeroU32::new(workers) {
            Some(concurrency) => {
                ParallelDownloader::new(
                    client.http().clone(),
                    self.primary_url.clone(),
                    self.reserve_url.clone(),
                    concurrency,
                )
                .download(urls, sink)
                .await
            }
            None => {
                SequentialDownloader::new(
                    client.http().clone(),
                    self.primary_url.clone(),
                    self.reserve_url.clone(),
                )
                .download(urls, sink)
                .await
            }
        }
    }
}

/// Short-form video served as a single file, no manifest involved.
pub struct YappyVideo {
    id: String,
    link: String,
}

impl YappyVideo {
    /// Nominal resolution; the endpoint does not announce a real one.
    const RESOLUTION: (u64, u64) = (1920, 1080);

    pub fn new(id: String, link: String) -> Self {
        Self { id, link }
    }

    pub fn title(&self) -> &str {
        &self.id
    }

    pub fn link(&self) -> &str {
        &self.link
    }

    pub fn resolution(&self) -> String {
        format!("{}x{}", Self::RESOLUTION.0, Self::RESOLUTION.1)
    }

    pub fn height(&self) -> u64 {
        Self::RESOLUTION.1
    }

    /// Download the whole file with one request.
    pub async fn download<W>(&self, client: &RutubeClient, sink: &mut W) -> RutubeResult<()>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let response = client.get(&self.link).send().await?;
        if !response.status().is_success() {
            return Err(RutubeError::Unavailable {
                status: Some(response.status()),
            });
        }

        let bytes = response.bytes().await?;
        sink.write_all(&bytes).await?;
        sink.flush().await?;
        Ok(())
    }
}

/// One selectable video variant, segmented or direct.
pub enum Video {
    Rendition(Rendition),
    Yappy(YappyVideo),
}

impl Video {
    pub fn title(&self) -> String {
        match self {
            Self::Rendition(rendition) => rendition.title(),
            Self::Yappy(yappy) => yappy.title().to_string(),
        }
    }

    pub fn resolution(&self) -> String {
        match self {
            Self::Rendition(rendition) => rendition.resolution(),
            Self::Yappy(yappy) => yappy.resolution(),
        }
    }

    pub fn height(&self) -> u64 {
        match self {
            Self::Rendition(rendition) => rendition.height(),
            Self::Yappy(yappy) => yappy.height(),
        }
    }

    pub fn file_name(&self) -> String {
        match self {
            Self::Rendition(rendition) => format!("{}.mp4", rendition.title()),
            Self::Yappy(yappy) => yappy.title().to_string(),
        }
    }

    pub async fn download<W>(
        &mut self,
        client: &RutubeClient,
        sink: &mut W,
        workers: u32,
    ) -> RutubeResult<()>
    where
        W: AsyncWrite + Unpin + Send,
    {
        match self {
            Self::Rendition(rendition) => rendition.download(client, sink, workers).await,
            Self::Yappy(yappy) => yappy.download(client, sink).await,
        }
    }

    /// Download into `dir` (created recursively when absent; current directory
    /// when `None`) under the conventional file name. Returns the output path.
    pub async fn download_to(
        &mut self,
        client: &RutubeClient,
        dir: Option<&Path>,
        workers: u32,
    ) -> RutubeResult<PathBuf> {
        let path = match dir {
            Some(dir) => {
                if !dir.exists() {
                    tokio::fs::create_dir_all(dir).await?;
                }
                dir.join(self.file_name())
            }
            None => PathBuf::from(self.file_name()),
        };

        let mut file = File::create(&path).await?;
        self.download(client, &mut file, workers).await?;
        Ok(path)
    }
}

/// Videos of one resolved source, in manifest encounter order.
///
/// The order is the master playlist's own listing order, never re-sorted, so
/// the first entry is the worst quality and the last one the best.
pub struct Playlist {
    kind: VideoKind,
    videos: Vec<Video>,
}

impl Playlist {
    /// Build the deduplicated rendition list from a master playlist.
    ///
    /// The first variant seen at a vertical resolution becomes that
    /// rendition's primary source; every later variant at the same resolution
    /// only contributes its URI as the reserve source.
    pub fn from_master(kind: VideoKind, master: &MasterPlaylist, params: VideoParams) -> Self {
        let mut renditions: Vec<Rendition> = Vec::with_capacity(master.variants.len());
        for variant in &master.variants {
            let Some(resolution) = variant.resolution.as_ref() else {
                log::warn!("Variant {} carries no resolution, skipping.", variant.uri);
                continue;
            };

            match renditions
                .iter_mut()
                .find(|rendition| rendition.height == resolution.height)
            {
                Some(rendition) => rendition.reserve_url = Some(variant.uri.clone()),
                None => renditions.push(Rendition::new(
                    variant.uri.clone(),
                    resolution.width,
                    resolution.height,
                    variant.codecs.clone(),
                    params.clone(),
                )),
            }
        }

        Self {
            kind,
            videos: renditions.into_iter().map(Video::Rendition).collect(),
        }
    }

    /// Playlist with a single direct-download video.
    pub fn single(kind: VideoKind, video: YappyVideo) -> Self {
        Self {
            kind,
            videos: vec![Video::Yappy(video)],
        }
    }

    pub fn kind(&self) -> VideoKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.videos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.videos.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Video> {
        self.videos.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Video> {
        self.videos.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Video> {
        self.videos.get_mut(index)
    }

    pub fn available_resolutions(&self) -> Vec<u64> {
        self.videos.iter().map(Video::height).collect()
    }

    pub fn best(&self) -> Option<&Video> {
        self.videos.last()
    }

    pub fn best_mut(&mut self) -> Option<&mut Video> {
        self.videos.last_mut()
    }

    pub fn worst(&self) -> Option<&Video> {
        self.videos.first()
    }

    pub fn worst_mut(&mut self) -> Option<&mut Video> {
        self.videos.first_mut()
    }

    /// Last video with the given vertical resolution, scanning from the end.
    pub fn by_resolution(&self, height: u64) -> Option<&Video> {
        self.videos.iter().rev().find(|video| video.height() == height)
    }

    pub fn by_resolution_mut(&mut self, height: u64) -> Option<&mut Video> {
        self.videos
            .iter_mut()
            .rev()
            .find(|video| video.height() == height)
    }
}

impl Index<usize> for Playlist {
    type Output = Video;

    fn index(&self, index: usize) -> &Self::Output {
        &self.videos[index]
    }
}
