//! Statistics over an enriched listening history: timeframe windows, top
//! lists, total listening time and the human-readable report.

mod aggregate;
mod messages;
mod timeframe;

pub use aggregate::aggregate;
pub use aggregate::top_entries;
pub use messages::DurationBreakdown;
pub use messages::generate_messages;
pub use timeframe::Timeframe;
pub use timeframe::Window;
