use crate::error::IngestError;
use crate::filter::{self, YearSelector};
use crate::ingest::{self, ExportSource, IngestReport};
use crate::model::{Album, Artist, Library, Track};
use crate::summary::{self, DashboardSummary};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, info, warn};

/// Shared view of the "ingestion in progress" flag. Clones observe the same
/// flag, so a presentation thread can disable submissions while it is set.
#[derive(Debug, Clone, Default)]
pub struct ProcessingFlag(Arc<AtomicBool>);

impl ProcessingFlag {
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Claims the flag, or `None` if an ingestion already holds it.
    pub fn try_begin(&self) -> Option<ProcessingGuard> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| ProcessingGuard(Arc::clone(&self.0)))
    }
}

/// Clears the flag when dropped, on success and failure alike.
#[derive(Debug)]
pub struct ProcessingGuard(Arc<AtomicBool>);

impl Drop for ProcessingGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Owns the base and filtered collections. Every recomputation builds a
/// complete new set and swaps it in; nothing is patched in place.
#[derive(Debug, Default)]
pub struct HistoryStore {
    base: Library,
    filtered: Library,
    selected_year: YearSelector,
    processing: ProcessingFlag,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submit_files(&mut self, paths: &[PathBuf]) -> Result<IngestReport, IngestError> {
        let Some(_guard) = self.processing.try_begin() else {
            return Err(IngestError::Busy);
        };
        info!(files = paths.len(), "ingesting streaming history files");
        let result =
            ingest::read_exports(paths).and_then(|sources| ingest::ingest_sources(&sources));
        self.publish(result)
    }

    pub fn submit_sources(&mut self, sources: &[ExportSource]) -> Result<IngestReport, IngestError> {
        let Some(_guard) = self.processing.try_begin() else {
            return Err(IngestError::Busy);
        };
        info!(files = sources.len(), "ingesting streaming history sources");
        let result = ingest::ingest_sources(sources);
        self.publish(result)
    }

    fn publish(
        &mut self,
        result: Result<(Library, IngestReport), IngestError>,
    ) -> Result<IngestReport, IngestError> {
        match result {
            Ok((library, report)) => {
                info!(
                    files = report.files,
                    events = report.events_read,
                    retained = report.events_retained,
                    tracks = library.tracks.len(),
                    artists = library.artists.len(),
                    albums = library.albums.len(),
                    "streaming history ingested"
                );
                if library.is_empty() {
                    warn!("no music plays found in the submitted history");
                }
                self.filtered = library.clone();
                self.base = library;
                self.selected_year = YearSelector::All;
                Ok(report)
            }
            Err(err) => {
                error!("failed to ingest streaming history: {err}");
                Err(err)
            }
        }
    }

    pub fn set_year(&mut self, selector: YearSelector) {
        let filtered = filter::filter_by_year(&self.base.tracks, &selector);
        info!(
            year = %selector,
            tracks = filtered.tracks.len(),
            "applied year filter"
        );
        self.filtered = filtered;
        self.selected_year = selector;
    }

    pub fn tracks(&self) -> &[Track] {
        &self.base.tracks
    }

    pub fn artists(&self) -> &[Artist] {
        &self.base.artists
    }

    pub fn albums(&self) -> &[Album] {
        &self.base.albums
    }

    pub fn filtered_tracks(&self) -> &[Track] {
        &self.filtered.tracks
    }

    pub fn filtered_artists(&self) -> &[Artist] {
        &self.filtered.artists
    }

    pub fn filtered_albums(&self) -> &[Album] {
        &self.filtered.albums
    }

    pub fn selected_year(&self) -> &YearSelector {
        &self.selected_year
    }

    pub fn is_processing(&self) -> bool {
        self.processing.is_set()
    }

    pub fn processing_flag(&self) -> ProcessingFlag {
        self.processing.clone()
    }

    pub fn available_years(&self) -> Vec<String> {
        filter::available_years(&self.base.tracks)
    }

    pub fn summary(&self) -> DashboardSummary {
        summary::summarize(
            &self.filtered.tracks,
            &self.filtered.artists,
            &self.filtered.albums,
        )
    }
}
