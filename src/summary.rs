use crate::model::{Album, Artist, Track};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

const MS_PER_HOUR: u64 = 3_600_000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RankBy {
    #[default]
    Plays,
    ListenTime,
}

impl RankBy {
    pub fn label(self) -> &'static str {
        match self {
            Self::Plays => "plays",
            Self::ListenTime => "listen",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Self::Plays => Self::ListenTime,
            Self::ListenTime => Self::Plays,
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "plays" => Some(Self::Plays),
            "listen" => Some(Self::ListenTime),
            _ => None,
        }
    }
}

/// Headline numbers for whatever collections are currently shown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    pub total_plays: u64,
    pub total_duration_ms: u64,
    pub total_hours: u64,
    pub top_track: Option<Track>,
    pub top_artist: Option<Artist>,
    pub top_album: Option<Album>,
}

pub fn summarize(tracks: &[Track], artists: &[Artist], albums: &[Album]) -> DashboardSummary {
    let total_plays = tracks
        .iter()
        .fold(0_u64, |sum, track| sum.saturating_add(track.play_count));
    let total_duration_ms = tracks
        .iter()
        .fold(0_u64, |sum, track| sum.saturating_add(track.total_duration));

    DashboardSummary {
        total_plays,
        total_duration_ms,
        total_hours: rounded_hours(total_duration_ms),
        top_track: most_played(tracks, |track| track.play_count).cloned(),
        top_artist: most_played(artists, |artist| artist.play_count).cloned(),
        top_album: most_played(albums, |album| album.play_count).cloned(),
    }
}

fn rounded_hours(ms: u64) -> u64 {
    ms.saturating_add(MS_PER_HOUR / 2) / MS_PER_HOUR
}

/// Highest play count wins; on a tie the earlier entry is kept.
fn most_played<T>(items: &[T], plays: impl Fn(&T) -> u64) -> Option<&T> {
    items.iter().fold(None, |best: Option<&T>, item| match best {
        Some(current) if plays(current) >= plays(item) => Some(current),
        _ => Some(item),
    })
}

pub fn rank_tracks(tracks: &[Track], rank_by: RankBy, limit: usize) -> Vec<Track> {
    rank(tracks, rank_by, limit, |track| {
        (track.play_count, track.total_duration, track.name.as_str())
    })
}

pub fn rank_artists(artists: &[Artist], rank_by: RankBy, limit: usize) -> Vec<Artist> {
    rank(artists, rank_by, limit, |artist| {
        (artist.play_count, artist.total_duration, artist.name.as_str())
    })
}

pub fn rank_albums(albums: &[Album], rank_by: RankBy, limit: usize) -> Vec<Album> {
    rank(albums, rank_by, limit, |album| {
        (album.play_count, album.total_duration, album.name.as_str())
    })
}

fn rank<T, F>(items: &[T], rank_by: RankBy, limit: usize, metrics: F) -> Vec<T>
where
    T: Clone,
    F: Fn(&T) -> (u64, u64, &str),
{
    let mut ranked: Vec<T> = items.to_vec();
    ranked.sort_by(|a, b| compare_metrics(metrics(a), metrics(b), rank_by));
    ranked.truncate(limit);
    ranked
}

fn compare_metrics(a: (u64, u64, &str), b: (u64, u64, &str), rank_by: RankBy) -> Ordering {
    let (a_plays, a_ms, a_name) = a;
    let (b_plays, b_ms, b_name) = b;
    let primary = match rank_by {
        RankBy::Plays => b_plays.cmp(&a_plays),
        RankBy::ListenTime => b_ms.cmp(&a_ms),
    };
    if primary != Ordering::Equal {
        return primary;
    }

    let secondary = match rank_by {
        RankBy::Plays => b_ms.cmp(&a_ms),
        RankBy::ListenTime => b_plays.cmp(&a_plays),
    };
    secondary.then_with(|| a_name.to_lowercase().cmp(&b_name.to_lowercase()))
}
