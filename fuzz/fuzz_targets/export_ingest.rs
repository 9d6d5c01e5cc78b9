#![no_main]

use libfuzzer_sys::fuzz_target;
use replay::filter::{YearSelector, available_years, filter_by_year};
use replay::ingest::{aggregate, parse_export};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(events) = parse_export("fuzz", text) else {
        return;
    };

    let (library, _) = aggregate(&events);
    let track_plays: u64 = library.tracks.iter().map(|track| track.play_count).sum();
    let artist_plays: u64 = library.artists.iter().map(|artist| artist.play_count).sum();
    assert_eq!(track_plays, artist_plays);

    for label in available_years(&library.tracks) {
        let view = filter_by_year(&library.tracks, &YearSelector::from(label.as_str()));
        assert!(view.tracks.len() <= library.tracks.len());
    }
});
