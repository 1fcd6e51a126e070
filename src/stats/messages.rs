use crate::{
    stats::Timeframe,
    types::{AggregateResult, AnalysisReport, TrackCount},
    utils::{basic_pluralize, format_thousands, join_strings},
};

const NOTHING: &str = "nothing";

/// Listening time split into whole hours, minutes and rounded seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationBreakdown {
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl DurationBreakdown {
    pub fn from_millis(duration_ms: u64) -> Self {
        let total_seconds = (duration_ms + 500) / 1000;
        Self {
            hours: total_seconds / 3600,
            minutes: total_seconds % 3600 / 60,
            seconds: total_seconds % 60,
        }
    }

    /// `2 hours, 5 minutes, and 1 second`; zero hours and minutes are left
    /// out, seconds are always present.
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if self.hours > 0 {
            parts.push(format!("{} {}", self.hours, basic_pluralize("hour", self.hours)));
        }
        if self.minutes > 0 {
            parts.push(format!(
                "{} {}",
                self.minutes,
                basic_pluralize("minute", self.minutes)
            ));
        }

        let seconds = format!("{} {}", self.seconds, basic_pluralize("second", self.seconds));
        if parts.is_empty() {
            seconds
        } else {
            format!("{}, and {}", parts.join(", "), seconds)
        }
    }

    /// ISO-8601-style time part, `T2H5M1S`.
    pub fn iso(&self) -> String {
        format!("T{}H{}M{}S", self.hours, self.minutes, self.seconds)
    }
}

/// Builds the report for one timeframe.
///
/// Display mode phrases every field as a sentence. Raw mode keeps only the
/// joined values, adds `duration_datetime` and reports `tracks` as a number.
pub fn generate_messages(
    result: &AggregateResult,
    track_count: usize,
    timeframe: Timeframe,
    raw: bool,
) -> AnalysisReport {
    let tracks: Vec<String> = result
        .top_tracks
        .iter()
        .map(|track| format!("{} ({})", track.name, track.artist_name))
        .collect();
    let duration = DurationBreakdown::from_millis(result.total_duration_ms);

    if raw {
        return AnalysisReport {
            toptrack: join_strings(&tracks),
            topartist: join_strings(&result.top_artists),
            topalbum: join_strings(&result.top_albums),
            duration: duration.describe(),
            duration_datetime: Some(duration.iso()),
            tracks: TrackCount::Raw(track_count),
            timeframe: timeframe.label().to_string(),
        };
    }

    AnalysisReport {
        toptrack: top_message("track", &tracks),
        topartist: top_message("artist", &result.top_artists),
        topalbum: top_message("album", &result.top_albums),
        duration: format!("You listened for {}", duration.describe()),
        duration_datetime: None,
        tracks: TrackCount::Message(format!(
            "You listened to {} {}",
            format_thousands(track_count),
            basic_pluralize("track", track_count as u64)
        )),
        timeframe: timeframe.label().to_string(),
    }
}

/// `Your top artist was A` / `Your top artists were A and B`.
fn top_message(subject: &str, values: &[String]) -> String {
    match values.len() {
        0 => format!("Your top {subject} was {NOTHING}"),
        1 => format!("Your top {subject} was {}", join_strings(values)),
        _ => format!("Your top {subject}s were {}", join_strings(values)),
    }
}
