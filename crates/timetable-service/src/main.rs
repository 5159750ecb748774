use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use timetable_config::{ConfigLoader, TimetableConfig};
use timetable_core::SchoolService;
use timetable_service::api::ApiServer;
use timetable_service::cli::{Cli, Command, DEFAULT_CONFIG};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();

	let config = load_config(&cli).await;
	let log_level = cli
		.log_level
		.clone()
		.or_else(|| config.as_ref().ok().map(|c| c.service.log_level.clone()))
		.unwrap_or_else(|| "info".to_string());

	// Initialize tracing
	setup_tracing(&log_level)?;

	let config = config?;

	match cli.command {
		Some(Command::Start) | None => start_service(config).await,
		Some(Command::Validate) => validate_config(&cli, &config),
		Some(Command::RebuildPrompt { shift }) => rebuild_prompt(config, shift).await,
	}
}

async fn load_config(cli: &Cli) -> Result<TimetableConfig> {
	let mut loader = ConfigLoader::new();
	// A missing default file falls back to built-in defaults
	if cli.config.exists() || cli.config != Path::new(DEFAULT_CONFIG) {
		loader = loader.with_file(&cli.config);
	}

	loader.load().await.context("Failed to load configuration")
}

async fn start_service(config: TimetableConfig) -> Result<()> {
	info!("Starting {} service", config.service.name);

	let school = SchoolService::from_config(&config)
		.await
		.context("Failed to open school data")?;

	let server = ApiServer::new(
		config.service.bind_address(),
		config.service.name.clone(),
		Arc::new(school),
	);

	server.run(setup_shutdown_signal()).await?;

	info!("{} service stopped", config.service.name);
	Ok(())
}

fn validate_config(cli: &Cli, config: &TimetableConfig) -> Result<()> {
	info!("Configuration is valid: {:?}", cli.config);
	info!("Service name: {}", config.service.name);
	info!("Listen address: {}", config.service.bind_address());
	info!("Storage backend: {:?}", config.storage.backend);
	info!(
		"Weekly grid: {} days x {} lessons",
		config.schedule.days_per_week, config.schedule.lessons_per_day
	);
	Ok(())
}

async fn rebuild_prompt(config: TimetableConfig, shift_id: u32) -> Result<()> {
	let school = SchoolService::from_config(&config)
		.await
		.context("Failed to open school data")?;

	let summary = school
		.rebuild_prompt(shift_id)
		.await
		.with_context(|| format!("Failed to rebuild prompt for shift {}", shift_id))?;

	println!("{}", serde_json::to_string_pretty(&summary)?);
	Ok(())
}

fn setup_tracing(log_level: &str) -> Result<()> {
	let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

	tracing_subscriber::registry()
		.with(env_filter)
		.with(tracing_subscriber::fmt::layer())
		.init();

	Ok(())
}

async fn setup_shutdown_signal() {
	let ctrl_c = async {
		signal::ctrl_c()
			.await
			.expect("failed to install Ctrl+C handler");
	};

	#[cfg(unix)]
	let terminate = async {
		signal::unix::signal(signal::unix::SignalKind::terminate())
			.expect("failed to install signal handler")
			.recv()
			.await;
	};

	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		_ = ctrl_c => {},
		_ = terminate => {},
	}

	info!("Shutdown signal received");
}
