use regex::Regex;

use crate::error::{RutubeError, RutubeResult};

/// Kind of a rutube page, decided once from the page URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoKind {
    Video,
    Shorts,
    Yappy,
}

impl VideoKind {
    /// Path segment that selects this kind and keys the id pattern.
    pub fn path_segment(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Shorts => "shorts",
            Self::Yappy => "yappy",
        }
    }

    pub fn from_url(url: &str) -> Self {
        if url.contains("/shorts/") {
            Self::Shorts
        } else if url.contains("/yappy/") {
            Self::Yappy
        } else {
            Self::Video
        }
    }

    /// Extract the video id following this kind's path segment.
    pub fn extract_id(&self, url: &str) -> RutubeResult<String> {
        let pattern = Regex::new(&format!(r"{}/(\w+)", self.path_segment())).unwrap();
        pattern
            .captures(url)
            .and_then(|captures| captures.get(1))
            .map(|id| id.as_str().to_string())
            .ok_or_else(|| RutubeError::InvalidUrl(url.to_string()))
    }

    pub fn is_video(&self) -> bool {
        matches!(self, Self::Video)
    }

    pub fn is_shorts(&self) -> bool {
        matches!(self, Self::Shorts)
    }

    pub fn is_yappy(&self) -> bool {
        matches!(self, Self::Yappy)
    }
}
