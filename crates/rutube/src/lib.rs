//! Resolve a rutube.ru page URL into its downloadable renditions and retrieve
//! a chosen rendition as a single file.
//!
//! Page URL -> [`RutubeClient::resolve`] -> [`Playlist`] -> pick a [`Video`]
//! -> [`Video::download`], which fetches the rendition's segments (optionally
//! with a bounded worker pool) and writes them to the sink in original order.

pub mod client;
pub mod error;
pub mod fetch;
pub mod model;
pub mod playlist;
pub mod source;

mod download;
mod util;

pub use client::RutubeClient;
pub use error::{RutubeError, RutubeResult};
pub use m3u8_rs;
pub use playlist::{Playlist, Rendition, Video, YappyVideo};
pub use source::VideoKind;
