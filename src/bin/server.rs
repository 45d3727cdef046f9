use std::{fs::OpenOptions, net::SocketAddr, process::exit, sync::Arc};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware,
};
use axum_server::Handle;
use clap::Parser;
use rusqlite::Connection;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{EnvFilter, Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use expenseshub::{AppState, build_router, graceful_shutdown, logging_middleware};

/// The web server for ExpensesHub.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long, env = "EXPENSESHUB_DB_PATH", default_value = "expenseshub.db")]
    db_path: String,

    /// The port to serve the app from.
    #[arg(short, long, env = "EXPENSESHUB_PORT", default_value_t = 3000)]
    port: u16,

    /// The canonical name of the timezone that periods are calculated in, e.g. "Pacific/Auckland".
    #[arg(long, env = "EXPENSESHUB_TIMEZONE", default_value = "Etc/UTC")]
    timezone: String,

    /// File path to write debug logs to.
    #[arg(long, default_value = "debug.log")]
    log_path: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(error) = setup_logging(&args.log_path) {
        eprintln!("Could not open log file {}: {error}", args.log_path);
        exit(1);
    }

    if time_tz::timezones::get_by_name(&args.timezone).is_none() {
        tracing::error!("\"{}\" is not a valid timezone name", args.timezone);
        exit(1);
    }

    let state = match Connection::open(&args.db_path)
        .map_err(expenseshub::Error::from)
        .and_then(|connection| AppState::new(connection, &args.timezone))
    {
        Ok(state) => state,
        Err(error) => {
            tracing::error!(
                "Could not open the database at {}, starting without it: {error}",
                args.db_path
            );
            AppState::degraded(&args.timezone)
        }
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = add_tracing_layer(
        build_router(state).layer(middleware::from_fn(logging_middleware)),
    );

    tracing::info!("HTTP server listening on {}", addr);
    if let Err(error) = axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
    {
        tracing::error!("Server stopped unexpectedly: {error}");
        exit(1);
    }
}

fn setup_logging(log_path: &str) -> std::io::Result<()> {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();

    let log_file = OpenOptions::new().create(true).append(true).open(log_path)?;

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(Arc::new(log_file));

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            stdout_log
                .with_filter(filter::LevelFilter::INFO)
                .and_then(debug_log)
                .with_filter(filter::LevelFilter::DEBUG),
        )
        .init();

    Ok(())
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // By default, `TraceLayer` will log 5xx responses but errors are
        // logged where they happen
        .on_failure(());

    router.layer(tracing_layer)
}
