use chrono::{Duration, Local};
use tabled::Table;

use crate::{stats::Timeframe, types::TimeframeTableRow};

/// Prints every timeframe with the dates it currently covers.
pub fn list_timeframes() {
    let today = Local::now().date_naive();

    let rows: Vec<TimeframeTableRow> = Timeframe::all()
        .into_iter()
        .map(|timeframe| {
            let (start, end) = timeframe.dates(today);
            TimeframeTableRow {
                timeframe: timeframe.to_string(),
                start: start.to_string(),
                end: (end - Duration::days(1)).to_string(),
            }
        })
        .collect();

    println!("{}", Table::new(rows));
}
