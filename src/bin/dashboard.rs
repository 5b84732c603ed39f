use std::{net::SocketAddr, path::Path, process::ExitCode, sync::Arc};

use axum_server::Handle;
use clap::Parser;

#[cfg(debug_assertions)]
use tower_livereload::LiveReloadLayer;

use sales_dashboard::{
    Dashboard, HttpDataSource, Month, add_tracing_layer, build_dashboard_router,
    graceful_shutdown, setup_logging,
};

/// The web dashboard for exploring sales transactions by month.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The base URL of the data service.
    #[arg(long, default_value = "http://localhost:5000")]
    api_url: String,

    /// The port to serve the dashboard from.
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// The month shown when the dashboard starts, as two digits from 01 to 12.
    #[arg(long, default_value = "03")]
    month: Month,

    /// File path to write debug logs to.
    #[arg(long, default_value = "dashboard-debug.log")]
    log_path: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(error) = setup_logging(Path::new(&args.log_path)) {
        eprintln!("Could not open log file {}: {error}", args.log_path);
        return ExitCode::FAILURE;
    }

    let data_source = match HttpDataSource::new(&args.api_url) {
        Ok(data_source) => data_source,
        Err(error) => {
            tracing::error!("Could not create the data service client: {error}");
            return ExitCode::FAILURE;
        }
    };

    let dashboard = Arc::new(Dashboard::new(data_source, args.month));
    // Failed reads are logged and leave the dashboard empty until the month changes.
    dashboard.select_month(args.month).await;

    let router = add_tracing_layer(build_dashboard_router(dashboard));

    #[cfg(debug_assertions)]
    let router = router.layer(LiveReloadLayer::new());

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    tracing::info!(
        "Dashboard listening on {} using the data service at {}",
        addr,
        args.api_url
    );
    if let Err(error) = axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
    {
        tracing::error!("Server error: {error}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
