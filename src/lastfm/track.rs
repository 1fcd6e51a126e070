use async_trait::async_trait;
use serde_json::Value;

use crate::{
    debug,
    lastfm::{LastFmClient, LastFmError, into_outcome},
    pipeline::Fetcher,
    types::{FetchOutcome, TrackIdentity, TrackInfoResponse, TrackMetadata},
};

/// Primary source: Last.fm `track.getInfo` by `(name, artist)`.
pub struct TrackInfoFetcher {
    client: LastFmClient,
}

impl TrackInfoFetcher {
    pub fn new(client: LastFmClient) -> Self {
        Self { client }
    }

    async fn load(&self, track: &TrackIdentity) -> Result<TrackMetadata, LastFmError> {
        let request = self
            .client
            .request("track.getInfo")
            .query("track", &track.name)
            .query("artist", &track.artist_name);

        let body = self.client.call(request).await?;
        Ok(parse_track_info(body)?)
    }
}

#[async_trait]
impl Fetcher for TrackInfoFetcher {
    type Item = TrackIdentity;
    type Output = TrackMetadata;

    fn name(&self) -> &'static str {
        "Last.fm track info"
    }

    async fn fetch(&self, track: &TrackIdentity) -> FetchOutcome<TrackMetadata> {
        debug!("[GTIS] {} ({})", track.name, track.artist_name);
        into_outcome(
            &format!("track info for {} ({})", track.name, track.artist_name),
            self.load(track).await,
        )
    }
}

/// Converts a `track.getInfo` body into track metadata. A duration of 0 is
/// kept as-is: the track exists but its length is unknown.
///
/// # Errors
///
/// Fails when the body does not have the `track` shape.
pub fn parse_track_info(body: Value) -> Result<TrackMetadata, serde_json::Error> {
    let info = serde_json::from_value::<TrackInfoResponse>(body)?.track;

    Ok(TrackMetadata {
        artist_mbid: info.artist.mbid.filter(|mbid| !mbid.is_empty()),
        album_name: info.album.map(|album| album.title),
        duration_ms: info.duration,
        play_count: info.playcount,
    })
}
