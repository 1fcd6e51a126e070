use async_trait::async_trait;
use serde_json::Value;

use crate::{
    debug,
    lastfm::{LastFmClient, LastFmError, into_outcome},
    management::{USER_TTL, user_namespace},
    pipeline::Fetcher,
    types::{
        FetchOutcome, LastFmRecentTrack, RecentTrack, RecentTracksPage, RecentTracksResponse,
        TrackIdentity,
    },
};

/// Largest page size `user.getRecentTracks` accepts.
const PAGE_LIMIT: u32 = 200;

/// Fetches one page of the user's scrobble history.
pub struct RecentTracksFetcher {
    client: LastFmClient,
}

impl RecentTracksFetcher {
    pub fn new(client: LastFmClient) -> Self {
        Self { client }
    }

    async fn load(&self, page: u32) -> Result<RecentTracksPage, LastFmError> {
        let request = self
            .client
            .request("user.getRecentTracks")
            .query("user", self.client.username())
            .query("page", page)
            .query("limit", PAGE_LIMIT)
            .cache(user_namespace(self.client.username()), USER_TTL);

        let body = self.client.call(request).await?;
        Ok(parse_recent_tracks(body)?)
    }
}

#[async_trait]
impl Fetcher for RecentTracksFetcher {
    type Item = u32;
    type Output = RecentTracksPage;

    fn name(&self) -> &'static str {
        "Last.fm history"
    }

    async fn fetch(&self, page: &u32) -> FetchOutcome<RecentTracksPage> {
        debug!("[GRTP] Retrieving page {}...", page);
        into_outcome(&format!("history page {page}"), self.load(*page).await)
    }
}

/// Converts a `user.getRecentTracks` body into a page of scrobbles.
///
/// # Errors
///
/// Fails when the body does not have the `recenttracks` shape.
pub fn parse_recent_tracks(body: Value) -> Result<RecentTracksPage, serde_json::Error> {
    let response: RecentTracksResponse = serde_json::from_value(body)?;
    let container = response.recenttracks;

    Ok(RecentTracksPage {
        page: container.attr.page,
        total_pages: container.attr.total_pages,
        tracks: container.track.into_iter().map(to_recent_track).collect(),
    })
}

fn to_recent_track(track: LastFmRecentTrack) -> RecentTrack {
    let now_playing = track
        .attr
        .as_ref()
        .is_some_and(|attr| attr.nowplaying.eq_ignore_ascii_case("true"));
    let played_at = if now_playing {
        0
    } else {
        track.date.map_or(0, |date| date.uts)
    };

    let mut identity = TrackIdentity::new(track.name, track.artist.text).with_external_id(track.mbid);
    if let Some(album) = track.album {
        identity = identity.with_album(album.text);
    }

    RecentTrack {
        identity,
        artist_mbid: Some(track.artist.mbid).filter(|mbid| !mbid.is_empty()),
        now_playing,
        played_at,
    }
}
