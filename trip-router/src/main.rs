use std::process::ExitCode;

use tracing::{error, info, level_filters::LevelFilter};
use tracing_subscriber::EnvFilter;

use trip_router::domain::DomainError;
use trip_router::network::{NetworkSnapshot, SnapshotError, TripCatalogue};
use trip_router::query::{QueryError, QueryFile};
use trip_router::router::{Itinerary, RouterError, TripBasedRouter};

const USAGE: &str = "usage: trip-router <network.json> <query.json>";

/// Errors from the command-line front end.
#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{}", USAGE)]
    Usage,

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Router(#[from] RouterError),

    #[error("failed to write results: {0}")]
    Output(#[from] serde_json::Error),
}

fn main() -> ExitCode {
    init_tracing();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::Usage) => {
            eprintln!("{USAGE}");
            ExitCode::from(2)
        }
        Err(err) => {
            error!(%err, "Routing failed");
            ExitCode::FAILURE
        }
    }
}

/// Log to stderr, filtered by `RUST_LOG` (default `info`).
fn init_tracing() {
    let default_level = LevelFilter::INFO;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(default_level.to_string())
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> Result<(), CliError> {
    let mut args = std::env::args().skip(1);
    let (Some(network_path), Some(query_path), None) = (args.next(), args.next(), args.next())
    else {
        return Err(CliError::Usage);
    };

    let network = NetworkSnapshot::from_path(&network_path)?.build()?;
    info!(
        trips = network.timetable.trip_count(),
        patterns = network.timetable.patterns().len(),
        transfers = network.transfers.len(),
        "Loaded network"
    );

    let query = QueryFile::from_path(&query_path)?;
    let parameters = query.parameters()?;
    let mut router = TripBasedRouter::new(
        &network.timetable,
        &network.transfers,
        parameters.clone(),
        query.config(),
    );

    if query.naive_betas {
        router.route_naive_profile_with_naive_betas(parameters)?;
    } else {
        router.route_naive_profile(parameters)?;
    }

    let itineraries = router
        .ranked_results()
        .iter()
        .map(|label| router.itinerary(label))
        .collect::<Result<Vec<Itinerary>, _>>()?;
    info!(results = itineraries.len(), "Routing complete");

    println!("{}", serde_json::to_string_pretty(&itineraries)?);
    Ok(())
}
