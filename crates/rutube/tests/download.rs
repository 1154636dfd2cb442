use rutube::{
    m3u8_rs::{self, MasterPlaylist},
    model::VideoParams,
    Playlist, RutubeClient, RutubeError, VideoKind,
};
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

fn master(body: &str) -> MasterPlaylist {
    match m3u8_rs::parse_playlist_res(body.as_bytes()).unwrap() {
        m3u8_rs::Playlist::MasterPlaylist(playlist) => playlist,
        m3u8_rs::Playlist::MediaPlaylist(_) => panic!("expected a master playlist"),
    }
}

fn params() -> VideoParams {
    VideoParams {
        id: "abc123".to_string(),
        title: "Some Title".to_string(),
        duration: None,
    }
}

/// Mounts a single-rendition source with `count` segments and returns the
/// per-segment payloads in order. Segment files live next to the playlist:
/// `/video/index.m3u8` -> `/video/index/segment-<i>.ts`.
async fn mount_segmented_source(server: &MockServer, count: usize) -> Vec<Vec<u8>> {
    let mut media = String::from("#EXTM3U\n#EXT-X-TARGETDURATION:10\n#EXT-X-VERSION:3\n");
    let mut payloads = Vec::with_capacity(count);

    for i in 0..count {
        media.push_str(&format!("#EXTINF:9.009,\nsegment-{i}.ts\n"));

        let payload = format!("segment-{i:02}-payload|").into_bytes();
        Mock::given(method("GET"))
            .and(path(format!("/video/index/segment-{i}.ts")))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(payload.clone()))
            .mount(server)
            .await;
        payloads.push(payload);
    }
    media.push_str("#EXT-X-ENDLIST\n");

    Mock::given(method("GET"))
        .and(path("/video/index.m3u8"))
        .respond_with(ResponseTemplate::new(200).set_body_string(media))
        .mount(server)
        .await;

    payloads
}

fn single_rendition_playlist(server: &MockServer) -> Playlist {
    let body = format!(
        "#EXTM3U
#EXT-X-STREAM-INF:BANDWIDTH=1500000,RESOLUTION=1280x720
{}/video/index.m3u8
",
        server.uri()
    );
    Playlist::from_master(VideoKind::Video, &master(&body), params())
}

#[tokio::test]
async fn test_sequential_and_parallel_output_identical() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    let payloads = mount_segmented_source(&server, 10).await;
    let expected: Vec<u8> = payloads.concat();

    let client = RutubeClient::new();

    let mut playlist = single_rendition_playlist(&server);
    let video = playlist.best_mut().unwrap();
    let mut sequential = Vec::new();
    video.download(&client, &mut sequential, 0).await?;

    // a fresh resolution of the same source, this time with a worker pool
    let mut playlist = single_rendition_playlist(&server);
    let video = playlist.best_mut().unwrap();
    let mut parallel = Vec::new();
    video.download(&client, &mut parallel, 4).await?;

    assert_eq!(sequential, expected);
    assert_eq!(parallel, expected);

    Ok(())
}

#[tokio::test]
async fn test_parallel_failure_aborts_in_order() {
    let server = MockServer::start().await;

    // segment 4 fails permanently; mounted with priority over the catch-all
    // success mocks below
    Mock::given(method("GET"))
        .and(path("/video/index/segment-4.ts"))
        .respond_with(ResponseTemplate::new(500))
        .with_priority(1)
        .mount(&server)
        .await;
    let payloads = mount_segmented_source(&server, 10).await;

    let client = RutubeClient::new();
    let mut playlist = single_rendition_playlist(&server);
    let video = playlist.best_mut().unwrap();

    let mut sink = Vec::new();
    let result = video.download(&client, &mut sink, 3).await;
    assert!(matches!(result, Err(RutubeError::Unavailable { .. })));

    // everything before the failed index is in the sink, nothing at or after
    assert_eq!(sink, payloads[..4].concat());
}

#[tokio::test]
async fn test_sequential_failure_aborts_in_order() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/video/index/segment-2.ts"))
        .respond_with(ResponseTemplate::new(404))
        .with_priority(1)
        .mount(&server)
        .await;
    let payloads = mount_segmented_source(&server, 6).await;

    let client = RutubeClient::new();
    let mut playlist = single_rendition_playlist(&server);
    let video = playlist.best_mut().unwrap();

    let mut sink = Vec::new();
    let result = video.download(&client, &mut sink, 0).await;
    assert!(matches!(result, Err(RutubeError::Unavailable { .. })));
    assert_eq!(sink, payloads[..2].concat());
}

#[tokio::test]
async fn test_yappy_download_single_request() -> anyhow::Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/clip.mp4"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"whole clip".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let client = RutubeClient::new();
    let mut playlist = Playlist::single(
        VideoKind::Yappy,
        rutube::YappyVideo::new("def456".to_string(), format!("{}/clip.mp4", server.uri())),
    );

    let mut sink = Vec::new();
    playlist
        .best_mut()
        .unwrap()
        .download(&client, &mut sink, 0)
        .await?;
    assert_eq!(sink, b"whole clip");

    Ok(())
}
