use replay::config::{self, Settings};
use replay::filter::YearSelector;
use replay::store::HistoryStore;
use replay::summary::{self, RankBy};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default)]
struct CliArgs {
    year: Option<String>,
    top: Option<usize>,
    rank_by: Option<RankBy>,
    files: Vec<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args(std::env::args().skip(1).collect())?;
    if args.files.is_empty() {
        print_help();
        anyhow::bail!("no export files given");
    }
    let settings = config::load_settings()?;

    let mut store = HistoryStore::new();
    store.submit_files(&args.files)?;
    let year = args.year.as_deref().unwrap_or(&settings.default_year);
    store.set_year(YearSelector::from(year));

    print_report(&store, &settings, &args);
    Ok(())
}

fn print_report(store: &HistoryStore, settings: &Settings, args: &CliArgs) {
    let limit = args.top.unwrap_or(usize::from(settings.top_count));
    let rank_by = args.rank_by.unwrap_or(settings.rank_by);
    let overview = store.summary();

    println!(
        "Year: {}  (available: {})",
        store.selected_year(),
        store.available_years().join(", ")
    );
    println!("Total plays: {}", overview.total_plays);
    println!("Total hours: {} hrs", overview.total_hours);
    if let Some(artist) = &overview.top_artist {
        println!("Top artist: {} ({} plays)", artist.name, artist.play_count);
    }
    if let Some(track) = &overview.top_track {
        println!("Top track: {} - {}", track.name, track.artist);
    }

    println!();
    println!("Songs by {}:", rank_by.label());
    for track in summary::rank_tracks(store.filtered_tracks(), rank_by, limit) {
        println!(
            "  {:>6}  {:>9}  {} - {}",
            track.play_count,
            hours_minutes(track.total_duration),
            track.name,
            track.artist
        );
    }

    println!();
    println!("Artists by {}:", rank_by.label());
    for artist in summary::rank_artists(store.filtered_artists(), rank_by, limit) {
        println!(
            "  {:>6}  {:>9}  {}",
            artist.play_count,
            hours_minutes(artist.total_duration),
            artist.name
        );
    }

    println!();
    println!("Albums by {}:", rank_by.label());
    for album in summary::rank_albums(store.filtered_albums(), rank_by, limit) {
        println!(
            "  {:>6}  {:>9}  {} - {}",
            album.play_count,
            hours_minutes(album.total_duration),
            album.name,
            album.artist
        );
    }
}

fn hours_minutes(ms: u64) -> String {
    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    format!("{hours}h {minutes}m")
}

fn parse_args(args: Vec<String>) -> anyhow::Result<CliArgs> {
    let mut out = CliArgs::default();
    let mut index = 0;
    while index < args.len() {
        match args[index].as_str() {
            "--year" => {
                index += 1;
                let Some(value) = args.get(index) else {
                    anyhow::bail!("--year requires a year or \"all\"");
                };
                out.year = Some(value.trim().to_string());
            }
            "--top" => {
                index += 1;
                let Some(value) = args.get(index) else {
                    anyhow::bail!("--top requires a count");
                };
                let count = value
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| anyhow::anyhow!("--top expects a number, got {value}"))?;
                out.top = Some(count);
            }
            "--sort" => {
                index += 1;
                let Some(value) = args.get(index) else {
                    anyhow::bail!("--sort requires plays or listen");
                };
                let Some(rank_by) = RankBy::from_label(value) else {
                    anyhow::bail!("unknown sort {value}, expected plays or listen");
                };
                out.rank_by = Some(rank_by);
            }
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            other if other.starts_with("--") => anyhow::bail!("unknown argument {other}"),
            file => out.files.push(PathBuf::from(file)),
        }
        index += 1;
    }
    Ok(out)
}

fn print_help() {
    println!("replay <export.json>...");
    println!("  --year <year|all>       Show tracks last played in this year");
    println!("  --top <n>               Rows per table");
    println!("  --sort plays|listen     Rank by play count or listening time");
}
