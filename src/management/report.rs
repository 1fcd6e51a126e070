use std::path::PathBuf;

use thiserror::Error;

use crate::{
    types::{AnalysisReport, RecentTrack},
    utils::strip_quotes,
};

const HISTORY_HEADER: &str = "trackName,artistName,albumName,nowPlaying,epochStarted";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("cannot write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot serialize report: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Writes the JSON report of one analysis run.
pub struct ReportManager {
    path: PathBuf,
}

impl ReportManager {
    pub fn new(path: Option<PathBuf>, username: &str) -> Self {
        Self {
            path: path.unwrap_or_else(|| PathBuf::from(format!("user_output_{username}.json"))),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    pub async fn save(&self, report: &AnalysisReport) -> Result<(), ReportError> {
        let json = serde_json::to_string(report)?;
        write(&self.path, json).await
    }
}

/// Writes the full scrobble history as CSV.
pub struct HistoryManager {
    path: PathBuf,
}

impl HistoryManager {
    pub fn new(username: &str) -> Self {
        Self {
            path: PathBuf::from(format!("tracks_{username}.csv")),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    pub async fn save(&self, tracks: &[RecentTrack]) -> Result<(), ReportError> {
        write(&self.path, history_csv(tracks)).await
    }
}

/// Renders scrobbles as CSV. Text fields are quoted with embedded quotes
/// stripped.
pub fn history_csv(tracks: &[RecentTrack]) -> String {
    let mut lines = Vec::with_capacity(tracks.len() + 1);
    lines.push(HISTORY_HEADER.to_string());

    for track in tracks {
        lines.push(format!(
            "\"{}\",\"{}\",\"{}\",{},{}",
            strip_quotes(&track.identity.name),
            strip_quotes(&track.identity.artist_name),
            strip_quotes(track.identity.album_name.as_deref().unwrap_or_default()),
            track.now_playing,
            track.played_at
        ));
    }

    lines.join("\n")
}

async fn write(path: &PathBuf, contents: String) -> Result<(), ReportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|source| ReportError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
    }

    async_fs::write(path, contents)
        .await
        .map_err(|source| ReportError::Io {
            path: path.clone(),
            source,
        })
}
