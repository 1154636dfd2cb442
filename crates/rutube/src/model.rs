use serde::Deserialize;

/// Characters that must not end up in a file name.
const FORBIDDEN_CHARS: [char; 9] = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Play options document returned by the `api/play/options` endpoint.
#[derive(Debug, Deserialize)]
pub struct PlayOptions {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub duration: Option<u64>,
    pub video_balancer: VideoBalancer,
}

#[derive(Debug, Deserialize)]
pub struct VideoBalancer {
    pub m3u8: String,
}

/// Results document returned by the yappy page endpoint.
#[derive(Debug, Deserialize)]
pub struct YappyPage {
    #[serde(default)]
    pub results: Vec<YappyResult>,
}

#[derive(Debug, Deserialize)]
pub struct YappyResult {
    pub link: String,
}

/// Parameters shared by every rendition of one resolved video.
#[derive(Debug, Clone)]
pub struct VideoParams {
    pub id: String,
    pub title: String,
    pub duration: Option<u64>,
}

pub(crate) fn clean_title(title: &str) -> String {
    title.chars().filter(|c| !FORBIDDEN_CHARS.contains(c)).collect()
}
