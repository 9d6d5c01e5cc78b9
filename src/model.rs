use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// One play attempt as it appears in a streaming-history export.
///
/// Only the fields the aggregation reads are modelled; everything else in the
/// export (platform, country, shuffle flags, ...) is ignored on deserialize.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPlayEvent {
    #[serde(rename = "ts", default)]
    pub timestamp: Option<String>,
    #[serde(rename = "master_metadata_track_name", default)]
    pub track_name: Option<String>,
    #[serde(rename = "master_metadata_album_artist_name", default)]
    pub artist_name: Option<String>,
    #[serde(rename = "master_metadata_album_album_name", default)]
    pub album_name: Option<String>,
    #[serde(default)]
    pub ms_played: Option<u64>,
}

impl RawPlayEvent {
    /// Track name if this event is music. Podcast episodes and other
    /// non-music content carry no track name.
    pub fn music_track_name(&self) -> Option<&str> {
        self.track_name.as_deref().filter(|name| !name.is_empty())
    }

    pub fn artist(&self) -> &str {
        self.artist_name.as_deref().unwrap_or_default()
    }

    pub fn album(&self) -> &str {
        self.album_name.as_deref().unwrap_or_default()
    }

    pub fn timestamp(&self) -> &str {
        self.timestamp.as_deref().unwrap_or_default()
    }

    pub fn played_ms(&self) -> u64 {
        self.ms_played.unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TrackKey {
    pub name: String,
    pub artist: String,
}

impl TrackKey {
    pub fn new(name: &str, artist: &str) -> Self {
        Self {
            name: name.to_string(),
            artist: artist.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AlbumKey {
    pub name: String,
    pub artist: String,
}

impl AlbumKey {
    pub fn new(name: &str, artist: &str) -> Self {
        Self {
            name: name.to_string(),
            artist: artist.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: TrackKey,
    pub name: String,
    pub artist: String,
    /// Album of the first event seen for this track.
    pub album: String,
    pub play_count: u64,
    /// Milliseconds actually played, summed over all plays.
    pub total_duration: u64,
    /// Latest play with a readable timestamp; `None` if no play had one.
    #[serde(with = "time::serde::rfc3339::option", default)]
    pub last_played: Option<OffsetDateTime>,
}

impl Track {
    pub(crate) fn first_play(
        key: TrackKey,
        album: &str,
        played_at: Option<OffsetDateTime>,
    ) -> Self {
        Self {
            name: key.name.clone(),
            artist: key.artist.clone(),
            id: key,
            album: album.to_string(),
            play_count: 0,
            total_duration: 0,
            last_played: played_at,
        }
    }

    pub(crate) fn record_play(&mut self, ms_played: u64, played_at: Option<OffsetDateTime>) {
        self.play_count = self.play_count.saturating_add(1);
        self.total_duration = self.total_duration.saturating_add(ms_played);
        if let Some(played_at) = played_at
            && self.last_played.is_none_or(|last| played_at > last)
        {
            self.last_played = Some(played_at);
        }
    }

    pub fn album_key(&self) -> AlbumKey {
        AlbumKey::new(&self.album, &self.artist)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artist {
    pub name: String,
    pub play_count: u64,
    pub total_duration: u64,
}

impl Artist {
    pub(crate) fn empty(name: &str) -> Self {
        Self {
            name: name.to_string(),
            play_count: 0,
            total_duration: 0,
        }
    }

    pub(crate) fn add(&mut self, play_count: u64, duration: u64) {
        self.play_count = self.play_count.saturating_add(play_count);
        self.total_duration = self.total_duration.saturating_add(duration);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    pub name: String,
    pub artist: String,
    pub play_count: u64,
    pub total_duration: u64,
}

impl Album {
    pub(crate) fn empty(key: &AlbumKey) -> Self {
        Self {
            name: key.name.clone(),
            artist: key.artist.clone(),
            play_count: 0,
            total_duration: 0,
        }
    }

    pub(crate) fn add(&mut self, play_count: u64, duration: u64) {
        self.play_count = self.play_count.saturating_add(play_count);
        self.total_duration = self.total_duration.saturating_add(duration);
    }

    pub fn key(&self) -> AlbumKey {
        AlbumKey::new(&self.name, &self.artist)
    }
}

/// The three cross-referential rollups, always built and replaced together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Library {
    pub tracks: Vec<Track>,
    pub artists: Vec<Artist>,
    pub albums: Vec<Album>,
}

impl Library {
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}
