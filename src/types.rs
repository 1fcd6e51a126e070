use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use tabled::Tabled;

use crate::utils::{de_number, de_one_or_many};

// Domain

/// Identity key of a track: two scrobbles are the same track when both the
/// track name and the artist name are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TrackKey {
    pub name: String,
    pub artist: String,
}

/// A track as identified across all sources.
///
/// Equality and hashing only look at `(name, artist_name)`; album and
/// external id travel along as lookup hints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackIdentity {
    pub name: String,
    pub artist_name: String,
    pub album_name: Option<String>,
    pub external_id: Option<String>,
}

impl TrackIdentity {
    pub fn new(name: impl Into<String>, artist_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            artist_name: artist_name.into(),
            album_name: None,
            external_id: None,
        }
    }

    pub fn with_album(mut self, album_name: impl Into<String>) -> Self {
        let album_name = album_name.into();
        self.album_name = (!album_name.is_empty()).then_some(album_name);
        self
    }

    pub fn with_external_id(mut self, external_id: impl Into<String>) -> Self {
        let external_id = external_id.into();
        self.external_id = (!external_id.is_empty()).then_some(external_id);
        self
    }

    pub fn key(&self) -> TrackKey {
        TrackKey {
            name: self.name.clone(),
            artist: self.artist_name.clone(),
        }
    }
}

impl PartialEq for TrackIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.artist_name == other.artist_name
    }
}

impl Eq for TrackIdentity {}

impl Hash for TrackIdentity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.artist_name.hash(state);
    }
}

/// One scrobble event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentTrack {
    pub identity: TrackIdentity,
    pub artist_mbid: Option<String>,
    pub now_playing: bool,
    /// Epoch seconds; 0 while the track is still playing.
    pub played_at: i64,
}

impl RecentTrack {
    pub fn played(identity: TrackIdentity, played_at: i64) -> Self {
        Self {
            identity,
            artist_mbid: None,
            now_playing: false,
            played_at,
        }
    }

    pub fn now_playing(identity: TrackIdentity) -> Self {
        Self {
            identity,
            artist_mbid: None,
            now_playing: true,
            played_at: 0,
        }
    }
}

/// One page of a user's history as returned by the page fetcher.
#[derive(Debug, Clone)]
pub struct RecentTracksPage {
    pub page: u32,
    pub total_pages: u32,
    pub tracks: Vec<RecentTrack>,
}

/// Metadata returned by the primary (Last.fm) source.
#[derive(Debug, Clone)]
pub struct TrackMetadata {
    pub artist_mbid: Option<String>,
    pub album_name: Option<String>,
    /// 0 when the source knows the track but not its length.
    pub duration_ms: u64,
    pub play_count: u64,
}

/// The per-identity record enriched across pipeline stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedTrackInfo {
    pub identity: TrackIdentity,
    pub artist_mbid: Option<String>,
    /// 0 means unknown.
    pub duration_ms: u64,
    pub play_count: u64,
}

impl EnrichedTrackInfo {
    pub fn from_identity(identity: TrackIdentity) -> Self {
        Self {
            identity,
            artist_mbid: None,
            duration_ms: 0,
            play_count: 0,
        }
    }

    pub fn has_duration(&self) -> bool {
        self.duration_ms != 0
    }
}

/// A scrobble joined with the resolved duration of its track.
#[derive(Debug, Clone)]
pub struct EnrichedRecentTrack {
    pub track: RecentTrack,
    pub duration_ms: u64,
}

/// Result of one fetcher invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome<T> {
    Success(T),
    NoMatch,
    RateLimited,
}

impl<T> FetchOutcome<T> {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, FetchOutcome::RateLimited)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> FetchOutcome<U> {
        match self {
            FetchOutcome::Success(value) => FetchOutcome::Success(f(value)),
            FetchOutcome::NoMatch => FetchOutcome::NoMatch,
            FetchOutcome::RateLimited => FetchOutcome::RateLimited,
        }
    }
}

impl<T> From<Option<T>> for FetchOutcome<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => FetchOutcome::Success(value),
            None => FetchOutcome::NoMatch,
        }
    }
}

/// Statistics for one timeframe.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AggregateResult {
    pub top_tracks: Vec<TrackIdentity>,
    pub top_artists: Vec<String>,
    pub top_albums: Vec<String>,
    pub total_duration_ms: u64,
}

/// The report written as JSON and shown in the terminal.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub toptrack: String,
    pub topartist: String,
    pub topalbum: String,
    pub duration: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_datetime: Option<String>,
    pub tracks: TrackCount,
    pub timeframe: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TrackCount {
    Message(String),
    Raw(usize),
}

#[derive(Tabled)]
pub struct SummaryTableRow {
    pub statistic: String,
    pub value: String,
}

#[derive(Tabled)]
pub struct TimeframeTableRow {
    pub timeframe: String,
    pub start: String,
    pub end: String,
}

// Last.fm

#[derive(Debug, Clone, Deserialize)]
pub struct RecentTracksResponse {
    pub recenttracks: RecentTracksContainer,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecentTracksContainer {
    #[serde(default, deserialize_with = "de_one_or_many")]
    pub track: Vec<LastFmRecentTrack>,
    #[serde(rename = "@attr")]
    pub attr: RecentTracksAttr,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecentTracksAttr {
    #[serde(default, deserialize_with = "de_number")]
    pub page: u32,
    #[serde(rename = "totalPages", default, deserialize_with = "de_number")]
    pub total_pages: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LastFmRecentTrack {
    pub name: String,
    #[serde(default)]
    pub mbid: String,
    pub artist: LastFmText,
    pub album: Option<LastFmText>,
    #[serde(rename = "@attr")]
    pub attr: Option<NowPlayingAttr>,
    pub date: Option<LastFmDate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LastFmText {
    #[serde(rename = "#text", default)]
    pub text: String,
    #[serde(default)]
    pub mbid: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NowPlayingAttr {
    #[serde(default)]
    pub nowplaying: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LastFmDate {
    #[serde(deserialize_with = "de_number")]
    pub uts: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackInfoResponse {
    pub track: LastFmTrackInfo,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LastFmTrackInfo {
    pub name: String,
    #[serde(default, deserialize_with = "de_number")]
    pub duration: u64,
    #[serde(default, deserialize_with = "de_number")]
    pub playcount: u64,
    pub artist: LastFmArtistRef,
    pub album: Option<LastFmAlbumRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LastFmArtistRef {
    pub name: String,
    pub mbid: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LastFmAlbumRef {
    pub title: String,
}

// Spotify

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientCredentialsToken {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifySearchResponse {
    pub tracks: SpotifyTrackPage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyTrackPage {
    #[serde(default)]
    pub items: Vec<Option<SpotifyTrack>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyTrack {
    pub name: String,
    #[serde(default)]
    pub artists: Vec<Option<SpotifyArtist>>,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyArtist {
    pub name: String,
}

// MusicBrainz

#[derive(Debug, Clone, Deserialize)]
pub struct RecordingSearchResponse {
    #[serde(default)]
    pub recordings: Vec<Recording>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Recording {
    pub title: String,
    pub length: Option<u64>,
    #[serde(rename = "artist-credit", default)]
    pub artist_credit: Vec<ArtistCredit>,
    #[serde(default)]
    pub releases: Vec<RecordingRelease>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArtistCredit {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecordingRelease {
    #[serde(default)]
    pub media: Vec<ReleaseMedium>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseMedium {
    #[serde(default)]
    pub track: Vec<MediumTrack>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediumTrack {
    pub id: String,
}
