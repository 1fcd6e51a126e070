use acoustats::{
    stats::{DurationBreakdown, Timeframe, Window, aggregate, generate_messages, top_entries},
    types::{AggregateResult, EnrichedRecentTrack, RecentTrack, TrackCount, TrackIdentity},
};
use chrono::{NaiveDate, Utc};

// Helper function to create an enriched scrobble
fn scrobble(name: &str, artist: &str, album: &str, played_at: i64, duration_ms: u64) -> EnrichedRecentTrack {
    EnrichedRecentTrack {
        track: RecentTrack::played(TrackIdentity::new(name, artist).with_album(album), played_at),
        duration_ms,
    }
}

fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
}

const EVERYTHING: Window = Window {
    start: 0,
    end: i64::MAX,
};

#[test]
fn test_top_entries_keeps_ties_in_first_appearance_order() {
    let values = ["C", "B", "A", "A", "B", "C", "A", "B"];

    assert_eq!(top_entries(values), vec!["B", "A"]);
    assert!(top_entries(Vec::<&str>::new()).is_empty());
}

#[test]
fn test_aggregate_counts_tracks_artists_albums() {
    let tracks = vec![
        scrobble("Intro", "Band", "Debut", 10, 60_000),
        scrobble("Hit", "Band", "Debut", 20, 180_000),
        scrobble("Hit", "Band", "Debut", 30, 180_000),
        scrobble("Ballad", "Singer", "", 40, 240_000),
        scrobble("Ballad", "Singer", "", 50, 240_000),
    ];

    let result = aggregate(&tracks, &EVERYTHING);

    assert_eq!(
        result.top_tracks,
        vec![
            TrackIdentity::new("Hit", "Band"),
            TrackIdentity::new("Ballad", "Singer")
        ]
    );
    assert_eq!(result.top_artists, vec!["Band".to_string()]);
    // Plays without an album are not counted
    assert_eq!(result.top_albums, vec!["Debut".to_string()]);
    assert_eq!(result.total_duration_ms, 900_000);
}

#[test]
fn test_aggregate_is_idempotent() {
    let tracks = vec![
        scrobble("A", "X", "One", 10, 1000),
        scrobble("B", "Y", "Two", 20, 2000),
        scrobble("A", "X", "One", 30, 1000),
    ];

    assert_eq!(aggregate(&tracks, &EVERYTHING), aggregate(&tracks, &EVERYTHING));
}

#[test]
fn test_aggregate_window_is_half_open() {
    let tracks = vec![
        scrobble("Before", "X", "", 99, 1),
        scrobble("Start", "X", "", 100, 10),
        scrobble("Inside", "X", "", 150, 100),
        scrobble("End", "X", "", 200, 1000),
    ];

    let result = aggregate(&tracks, &Window { start: 100, end: 200 });

    assert_eq!(result.total_duration_ms, 110);
    assert_eq!(result.top_tracks.len(), 2);
}

#[test]
fn test_aggregate_empty_window() {
    let tracks = vec![scrobble("A", "X", "One", 10, 1000)];

    let result = aggregate(&tracks, &Window { start: 500, end: 600 });

    assert_eq!(result, AggregateResult::default());
}

#[test]
fn test_timeframe_parsing() {
    assert_eq!("this week".parse::<Timeframe>(), Ok(Timeframe::ThisWeek));
    assert_eq!("THIS_WEEK".parse::<Timeframe>(), Ok(Timeframe::ThisWeek));
    assert_eq!("last-month".parse::<Timeframe>(), Ok(Timeframe::LastMonth));
    assert_eq!(" Today ".parse::<Timeframe>(), Ok(Timeframe::Today));
    assert!("fortnight".parse::<Timeframe>().is_err());

    for timeframe in Timeframe::all() {
        assert_eq!(timeframe.to_string().parse::<Timeframe>(), Ok(timeframe));
    }
}

#[test]
fn test_week_starts_on_sunday() {
    // 2024-06-12 is a Wednesday
    let wednesday = date("2024-06-12");
    assert_eq!(
        Timeframe::ThisWeek.dates(wednesday),
        (date("2024-06-09"), date("2024-06-16"))
    );
    assert_eq!(
        Timeframe::LastWeek.dates(wednesday),
        (date("2024-06-02"), date("2024-06-09"))
    );

    // On a Sunday the week starts today
    let sunday = date("2024-06-09");
    assert_eq!(
        Timeframe::ThisWeek.dates(sunday),
        (date("2024-06-09"), date("2024-06-16"))
    );
}

#[test]
fn test_month_and_year_windows() {
    let today = date("2024-01-15");

    assert_eq!(
        Timeframe::ThisMonth.dates(today),
        (date("2024-01-01"), date("2024-02-01"))
    );
    assert_eq!(
        Timeframe::LastMonth.dates(today),
        (date("2023-12-01"), date("2024-01-01"))
    );
    assert_eq!(
        Timeframe::ThisYear.dates(today),
        (date("2024-01-01"), date("2025-01-01"))
    );
    assert_eq!(
        Timeframe::LastYear.dates(today),
        (date("2023-01-01"), date("2024-01-01"))
    );
    assert_eq!(
        Timeframe::Yesterday.dates(today),
        (date("2024-01-14"), date("2024-01-15"))
    );
}

#[test]
fn test_window_in_utc() {
    let today = date("2024-06-12");

    let window = Timeframe::Today.window_in(today, &Utc);
    assert_eq!(
        window,
        Window {
            start: 1_718_150_400,
            end: 1_718_236_800
        }
    );
    assert!(window.contains(1_718_150_400));
    assert!(!window.contains(1_718_236_800));

    let week = Timeframe::ThisWeek.window_in(today, &Utc);
    assert_eq!(week.start, 1_717_891_200);
    assert_eq!(week.end, 1_718_496_000);
}

#[test]
fn test_duration_breakdown() {
    let duration = DurationBreakdown::from_millis(7_384_000);
    assert_eq!(
        duration,
        DurationBreakdown {
            hours: 2,
            minutes: 3,
            seconds: 4
        }
    );
    assert_eq!(duration.describe(), "2 hours, 3 minutes, and 4 seconds");
    assert_eq!(duration.iso(), "T2H3M4S");

    assert_eq!(DurationBreakdown::from_millis(1_000).describe(), "1 second");
    assert_eq!(DurationBreakdown::from_millis(0).describe(), "0 seconds");
    assert_eq!(
        DurationBreakdown::from_millis(61_000).describe(),
        "1 minute, and 1 second"
    );
    assert_eq!(
        DurationBreakdown::from_millis(3_600_400).describe(),
        "1 hour, and 0 seconds"
    );
    // Rounds to the nearest second
    assert_eq!(DurationBreakdown::from_millis(59_600).describe(), "1 minute, and 0 seconds");
}

fn sample_result() -> AggregateResult {
    AggregateResult {
        top_tracks: vec![
            TrackIdentity::new("Song A", "Artist X"),
            TrackIdentity::new("Song B", "Artist Y"),
        ],
        top_artists: vec![
            "Artist X".to_string(),
            "Artist Y".to_string(),
            "Artist Z".to_string(),
        ],
        top_albums: vec![],
        total_duration_ms: 7_384_000,
    }
}

#[test]
fn test_generate_messages_display_mode() {
    let report = generate_messages(&sample_result(), 1234, Timeframe::LastWeek, false);

    assert_eq!(
        report.toptrack,
        "Your top tracks were Song A (Artist X) and Song B (Artist Y)"
    );
    assert_eq!(
        report.topartist,
        "Your top artists were Artist X, Artist Y, and Artist Z"
    );
    assert_eq!(report.topalbum, "Your top album was nothing");
    assert_eq!(
        report.duration,
        "You listened for 2 hours, 3 minutes, and 4 seconds"
    );
    assert_eq!(report.duration_datetime, None);
    assert_eq!(
        report.tracks,
        TrackCount::Message("You listened to 1,234 tracks".to_string())
    );
    assert_eq!(report.timeframe, "last week");

    let json = serde_json::to_value(&report).unwrap();
    assert!(json.get("duration_datetime").is_none());
}

#[test]
fn test_generate_messages_single_entries() {
    let result = AggregateResult {
        top_tracks: vec![TrackIdentity::new("Only", "One")],
        top_artists: vec!["One".to_string()],
        top_albums: vec!["Record".to_string()],
        total_duration_ms: 1_000,
    };

    let report = generate_messages(&result, 1, Timeframe::Today, false);

    assert_eq!(report.toptrack, "Your top track was Only (One)");
    assert_eq!(report.topalbum, "Your top album was Record");
    assert_eq!(report.duration, "You listened for 1 second");
    assert_eq!(
        report.tracks,
        TrackCount::Message("You listened to 1 track".to_string())
    );
}

#[test]
fn test_generate_messages_raw_mode() {
    let report = generate_messages(&sample_result(), 1234, Timeframe::ThisMonth, true);

    assert_eq!(report.toptrack, "Song A (Artist X) and Song B (Artist Y)");
    assert_eq!(report.topalbum, "");
    assert_eq!(report.duration, "2 hours, 3 minutes, and 4 seconds");
    assert_eq!(report.duration_datetime.as_deref(), Some("T2H3M4S"));
    assert_eq!(report.tracks, TrackCount::Raw(1234));

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["tracks"], 1234);
    assert_eq!(json["timeframe"], "this month");
}

#[test]
fn test_report_json_field_names() {
    let report = generate_messages(&sample_result(), 1234, Timeframe::ThisMonth, false);
    let json = serde_json::to_value(&report).unwrap();

    let mut keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
    keys.sort();

    // Readers of user_output_<user>.json rely on these names
    assert_eq!(
        keys,
        vec!["duration", "timeframe", "topalbum", "topartist", "toptrack", "tracks"]
    );
    assert_eq!(json["tracks"], "You listened to 1,234 tracks");
}
