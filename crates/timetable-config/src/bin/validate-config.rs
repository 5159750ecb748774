//! Configuration validation utility
//!
//! Usage: cargo run --bin validate-config config/local.toml

use std::env;
use std::process;

use timetable_config::ConfigLoader;

#[tokio::main(flavor = "current_thread")]
async fn main() {
	let args: Vec<String> = env::args().collect();

	if args.len() != 2 {
		eprintln!("Usage: {} <config-file>", args[0]);
		process::exit(1);
	}

	let config_path = &args[1];

	println!("Validating configuration file: {}", config_path);

	match ConfigLoader::new().with_file(config_path).load().await {
		Ok(config) => {
			println!("✅ Configuration is valid!");
			println!("Service name: {}", config.service.name);
			println!("Listen address: {}", config.service.bind_address());
			println!("Storage backend: {:?}", config.storage.backend);
			println!(
				"Weekly grid: {} days x {} lessons",
				config.schedule.days_per_week, config.schedule.lessons_per_day
			);
			println!("Prompt auto-rebuild: {}", config.prompt.auto_rebuild);
		}
		Err(e) => {
			eprintln!("❌ Configuration validation failed:");
			eprintln!("{}", e);
			process::exit(1);
		}
	}
}
