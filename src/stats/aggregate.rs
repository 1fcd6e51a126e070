use std::{collections::HashMap, hash::Hash};

use crate::{
    stats::Window,
    types::{AggregateResult, EnrichedRecentTrack, TrackIdentity},
};

/// Top tracks, artists and albums plus total listening time of the plays
/// inside `window`.
///
/// Tracks are counted by name and reported with the identity of their first
/// play. Every entry tied for the highest count is returned, in order of
/// first appearance. Plays without an album do not count towards albums.
pub fn aggregate(tracks: &[EnrichedRecentTrack], window: &Window) -> AggregateResult {
    let plays: Vec<&EnrichedRecentTrack> = tracks
        .iter()
        .filter(|play| window.contains(play.track.played_at))
        .collect();

    let mut first_identity: HashMap<&str, &TrackIdentity> = HashMap::new();
    for play in &plays {
        let identity = &play.track.identity;
        first_identity.entry(identity.name.as_str()).or_insert(identity);
    }

    let top_tracks = top_entries(plays.iter().map(|play| play.track.identity.name.as_str()))
        .into_iter()
        .filter_map(|name| first_identity.get(name).map(|identity| (*identity).clone()))
        .collect();

    let top_artists = top_entries(
        plays
            .iter()
            .map(|play| play.track.identity.artist_name.as_str()),
    )
    .into_iter()
    .map(str::to_string)
    .collect();

    let top_albums = top_entries(
        plays
            .iter()
            .filter_map(|play| play.track.identity.album_name.as_deref())
            .filter(|album| !album.is_empty()),
    )
    .into_iter()
    .map(str::to_string)
    .collect();

    AggregateResult {
        top_tracks,
        top_artists,
        top_albums,
        total_duration_ms: plays.iter().map(|play| play.duration_ms).sum(),
    }
}

/// Values tied for the highest count, in order of first appearance.
pub fn top_entries<K>(values: impl IntoIterator<Item = K>) -> Vec<K>
where
    K: Eq + Hash + Clone,
{
    let mut order: Vec<K> = Vec::new();
    let mut counts: HashMap<K, usize> = HashMap::new();

    for value in values {
        let count = counts.entry(value.clone()).or_insert(0);
        if *count == 0 {
            order.push(value);
        }
        *count += 1;
    }

    let Some(max) = counts.values().copied().max() else {
        return Vec::new();
    };

    order
        .into_iter()
        .filter(|value| counts.get(value) == Some(&max))
        .collect()
}
