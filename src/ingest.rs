use crate::error::IngestError;
use crate::model::{Album, AlbumKey, Artist, Library, RawPlayEvent, Track, TrackKey};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime};
use tracing::{debug, warn};

/// Contents of one export file, already acquired by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSource {
    pub name: String,
    pub contents: String,
}

impl ExportSource {
    pub fn new(name: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            contents: contents.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub files: usize,
    pub events_read: usize,
    pub events_retained: usize,
    pub skipped_non_music: usize,
    /// Retained plays whose timestamp could not be read.
    pub undated: usize,
}

pub fn read_export(path: &Path) -> Result<ExportSource, IngestError> {
    let contents = fs::read_to_string(path).map_err(|source| IngestError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(ExportSource {
        name: path.display().to_string(),
        contents,
    })
}

pub fn read_exports(paths: &[PathBuf]) -> Result<Vec<ExportSource>, IngestError> {
    paths.iter().map(|path| read_export(path)).collect()
}

/// Parses one export. The top level must be an array of play records.
pub fn parse_export(source_name: &str, contents: &str) -> Result<Vec<RawPlayEvent>, IngestError> {
    serde_json::from_str(contents).map_err(|source| IngestError::Parse {
        source_name: source_name.to_string(),
        source,
    })
}

/// Parses every source into one event stream. Fails on the first bad source,
/// so a batch is either fully parsed or not at all.
pub fn parse_exports(sources: &[ExportSource]) -> Result<Vec<RawPlayEvent>, IngestError> {
    let mut events = Vec::new();
    for source in sources {
        let mut parsed = parse_export(&source.name, &source.contents)?;
        debug!(source = %source.name, events = parsed.len(), "parsed export");
        events.append(&mut parsed);
    }
    Ok(events)
}

pub fn ingest_sources(sources: &[ExportSource]) -> Result<(Library, IngestReport), IngestError> {
    let events = parse_exports(sources)?;
    let (library, mut report) = aggregate(&events);
    report.files = sources.len();
    Ok((library, report))
}

/// Builds the base tracks, artists and albums from a flat event stream.
pub fn aggregate(events: &[RawPlayEvent]) -> (Library, IngestReport) {
    let mut report = IngestReport {
        events_read: events.len(),
        ..IngestReport::default()
    };
    let mut tracks: Vec<Track> = Vec::new();
    let mut track_lookup: HashMap<TrackKey, usize> = HashMap::new();
    let mut rollups = Rollups::default();

    for event in events {
        let Some(track_name) = event.music_track_name() else {
            report.skipped_non_music += 1;
            continue;
        };
        let played_at = parse_timestamp(event.timestamp());
        if played_at.is_none() {
            warn!(
                track = track_name,
                ts = event.timestamp(),
                "play has no readable timestamp, counting it without a date"
            );
            report.undated += 1;
        }

        let key = TrackKey::new(track_name, event.artist());
        let index = match track_lookup.get(&key) {
            Some(index) => *index,
            None => {
                tracks.push(Track::first_play(key.clone(), event.album(), played_at));
                track_lookup.insert(key, tracks.len() - 1);
                tracks.len() - 1
            }
        };
        tracks[index].record_play(event.played_ms(), played_at);

        rollups.add(
            event.artist(),
            AlbumKey::new(event.album(), event.artist()),
            1,
            event.played_ms(),
        );
        report.events_retained += 1;
    }

    debug!(
        skipped_non_music = report.skipped_non_music,
        undated = report.undated,
        "aggregated play events"
    );

    let (artists, albums) = rollups.finish();
    (
        Library {
            tracks,
            artists,
            albums,
        },
        report,
    )
}

/// RFC 3339 first; ISO-8601 local date-times and bare dates are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<OffsetDateTime> {
    let raw = raw.trim();
    if let Ok(instant) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(instant);
    }
    if let Ok(local) = PrimitiveDateTime::parse(
        raw,
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
    ) {
        return Some(local.assume_utc());
    }
    if let Ok(local) = PrimitiveDateTime::parse(
        raw,
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    ) {
        return Some(local.assume_utc());
    }
    Date::parse(raw, format_description!("[year]-[month]-[day]"))
        .ok()
        .map(|date| date.midnight().assume_utc())
}

/// Per-artist and per-album accumulation, keyed structurally and kept in
/// first-seen order.
#[derive(Debug, Default)]
pub(crate) struct Rollups {
    artists: Vec<Artist>,
    artist_lookup: HashMap<String, usize>,
    albums: Vec<Album>,
    album_lookup: HashMap<AlbumKey, usize>,
}

impl Rollups {
    pub(crate) fn add(&mut self, artist: &str, album: AlbumKey, play_count: u64, duration: u64) {
        let artist_index = match self.artist_lookup.get(artist) {
            Some(index) => *index,
            None => {
                self.artists.push(Artist::empty(artist));
                self.artist_lookup
                    .insert(artist.to_string(), self.artists.len() - 1);
                self.artists.len() - 1
            }
        };
        self.artists[artist_index].add(play_count, duration);

        let album_index = match self.album_lookup.get(&album) {
            Some(index) => *index,
            None => {
                self.albums.push(Album::empty(&album));
                self.album_lookup.insert(album, self.albums.len() - 1);
                self.albums.len() - 1
            }
        };
        self.albums[album_index].add(play_count, duration);
    }

    pub(crate) fn finish(self) -> (Vec<Artist>, Vec<Album>) {
        (self.artists, self.albums)
    }
}
