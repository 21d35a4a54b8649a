//! elgato-hue-cycler binary: loads the config, resolves the requested mode and drives the light
//! until interrupted.

use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{
    EnvFilter, Registry, layer::SubscriberExt, reload, util::SubscriberInitExt,
};

use elgato_hue_cycler::{
    cli::Cli, color::Color, config::AppConfig, cycler::HueCycler, device::ElgatoClient,
    error::AppError,
};

/// Handle used to raise the log level once the config file is known.
type LogFilter = reload::Handle<EnvFilter, Registry>;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let log_filter = init_tracing(cli.verbose);

    match run(cli, &log_filter).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let code = err.exit_code();
            let report = anyhow::Error::from(err);
            error!("{report:#}");
            code
        }
    }
}

async fn run(cli: Cli, log_filter: &LogFilter) -> Result<(), AppError> {
    let config = AppConfig::load(&cli.config)?;
    let verbose = cli.verbose || config.verbose();
    if verbose && !cli.verbose {
        if let Err(err) = log_filter.reload(build_filter(true)) {
            warn!(error = %err, "failed to raise log level");
        }
    }

    let strategy = config.resolve_strategy(&cli.mode)?;
    let client = ElgatoClient::new(config.device_config())?;

    info!(
        mode = %cli.mode,
        strategy = %strategy.kind(),
        gradient_len = strategy.gradient().map_or(0, <[Color]>::len),
        url = client.base_url(),
        "starting hue cycler"
    );
    if let Some(gradient) = strategy.gradient() {
        let colors = gradient
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        debug!(%colors, "gradient colors");
    }

    match client.fetch_accessory_info().await {
        Ok(accessory) => info!(
            product = %accessory.product_name,
            name = %accessory.display_name,
            firmware = %accessory.firmware_version,
            "connected to accessory"
        ),
        Err(err) => warn!(error = %err, "could not read accessory info"),
    }

    HueCycler::new(client, strategy)
        .with_verbose(verbose)
        .with_interval(config.interval())
        .run(shutdown_signal())
        .await?;

    Ok(())
}

/// Configure tracing subscribers behind a reloadable filter.
fn init_tracing(verbose: bool) -> LogFilter {
    let (filter, handle) = reload::Layer::new(build_filter(verbose));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
    handle
}

/// `RUST_LOG` takes precedence over the verbose flag.
fn build_filter(verbose: bool) -> EnvFilter {
    let default_filter = if verbose {
        "info,elgato_hue_cycler=debug"
    } else {
        "info"
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into())
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    info!("shutdown requested");
}
