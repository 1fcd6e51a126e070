use acoustats::{
    management::history_csv,
    types::{RecentTrack, TrackIdentity},
    utils::*,
};
use chrono::{Datelike, NaiveDate, Weekday};
use serde::Deserialize;

#[derive(Deserialize)]
struct Numbers {
    #[serde(deserialize_with = "de_number")]
    duration: u64,
    #[serde(default, deserialize_with = "de_number")]
    uts: i64,
}

#[derive(Deserialize)]
struct Listing {
    #[serde(deserialize_with = "de_one_or_many")]
    items: Vec<u32>,
}

#[test]
fn test_de_number_accepts_strings_and_numbers() {
    let parsed: Numbers = serde_json::from_str(r#"{"duration": "240000", "uts": 17}"#).unwrap();
    assert_eq!(parsed.duration, 240_000);
    assert_eq!(parsed.uts, 17);

    let parsed: Numbers = serde_json::from_str(r#"{"duration": "", "uts": null}"#).unwrap();
    assert_eq!(parsed.duration, 0);
    assert_eq!(parsed.uts, 0);

    assert!(serde_json::from_str::<Numbers>(r#"{"duration": "long"}"#).is_err());
}

#[test]
fn test_de_one_or_many() {
    let one: Listing = serde_json::from_str(r#"{"items": 3}"#).unwrap();
    let many: Listing = serde_json::from_str(r#"{"items": [1, 2]}"#).unwrap();

    assert_eq!(one.items, vec![3]);
    assert_eq!(many.items, vec![1, 2]);
}

#[test]
fn test_remove_duplicate_tracks() {
    let mut tracks = vec![
        TrackIdentity::new("Song", "A").with_album("First"),
        TrackIdentity::new("Song", "B"),
        TrackIdentity::new("Song", "A").with_album("Second"),
    ];

    remove_duplicate_tracks(&mut tracks);

    // Should keep the first occurrence of each pair
    assert_eq!(tracks.len(), 2);
    assert_eq!(tracks[0].album_name.as_deref(), Some("First"));
    assert_eq!(tracks[1].artist_name, "B");
}

#[test]
fn test_join_strings() {
    let names = |values: &[&str]| values.iter().map(|v| v.to_string()).collect::<Vec<_>>();

    assert_eq!(join_strings(&[]), "");
    assert_eq!(join_strings(&names(&["A"])), "A");
    assert_eq!(join_strings(&names(&["A", "B"])), "A and B");
    assert_eq!(join_strings(&names(&["A", "B", "C"])), "A, B, and C");
}

#[test]
fn test_basic_pluralize() {
    assert_eq!(basic_pluralize("track", 0), "tracks");
    assert_eq!(basic_pluralize("track", 1), "track");
    assert_eq!(basic_pluralize("track", 2), "tracks");
}

#[test]
fn test_format_thousands() {
    assert_eq!(format_thousands(0), "0");
    assert_eq!(format_thousands(999), "999");
    assert_eq!(format_thousands(1234), "1,234");
    assert_eq!(format_thousands(1_234_567), "1,234,567");
}

#[test]
fn test_last_sunday() {
    for day in 9..=15 {
        let date = NaiveDate::from_ymd_opt(2024, 6, day).unwrap();
        let sunday = last_sunday(date);

        assert_eq!(sunday.weekday(), Weekday::Sun);
        assert!(sunday <= date);
        assert!((date - sunday).num_days() < 7);
    }
}

#[test]
fn test_first_of_month_crosses_years() {
    let date = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();

    assert_eq!(first_of_month(date, -1), NaiveDate::from_ymd_opt(2023, 12, 1));
    assert_eq!(first_of_month(date, 0), NaiveDate::from_ymd_opt(2024, 1, 1));
    assert_eq!(first_of_month(date, 13), NaiveDate::from_ymd_opt(2025, 2, 1));
}

#[test]
fn test_history_csv() {
    let tracks = vec![
        RecentTrack::played(
            TrackIdentity::new("Say \"Hi\"", "Band").with_album("Album"),
            1_700_000_000,
        ),
        RecentTrack::now_playing(TrackIdentity::new("Live", "Band")),
    ];

    let csv = history_csv(&tracks);
    let lines: Vec<&str> = csv.lines().collect();

    assert_eq!(
        lines,
        vec![
            "trackName,artistName,albumName,nowPlaying,epochStarted",
            "\"Say Hi\",\"Band\",\"Album\",false,1700000000",
            "\"Live\",\"Band\",\"\",true,0",
        ]
    );
}
