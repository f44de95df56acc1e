//! Tavernkeep - companion toolkit for TrinityCore servers
//!
//! Previews loot tables with simulated kills, exports them as SQL,
//! converts BLP textures to PNG and sends GM commands to a running
//! worldserver over SOAP.

mod cli;
mod common;
mod config;
mod loot;
mod soap;
mod texture;

use std::fs;

use anyhow::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{error, info, warn};

use cli::{Command, ReloadTarget, USAGE};
use common::error::{BlpError, SoapError, SoapResult};
use config::{env::get_config_path, load_and_validate, Config};
use soap::SoapClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (stderr, so command output stays pipeable)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let command = match cli::parse_args(std::env::args().skip(1)) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(2);
        }
    };

    if command == Command::Help {
        println!("{}", USAGE);
        return Ok(());
    }

    // Load configuration
    let config_path = get_config_path();
    let config = load_and_validate(&config_path).map_err(|e| {
        error!("Failed to load configuration: {}", e);
        error!("Please check {} and the TAVERNKEEP_* environment variables.", config_path);
        e
    })?;

    if let Err(e) = run(command, &config).await {
        error!("{}", e);
        std::process::exit(e.exit_code());
    }
    Ok(())
}

async fn run(command: Command, config: &Config) -> common::error::Result<()> {
    match command {
        Command::LootSimulate { path, kills, seed } => {
            let table = loot::load_table(&path)?;
            let loot_config = config.loot_or_default();
            let kills = kills.unwrap_or(loot_config.kills);
            let mut rng = match seed.or(loot_config.seed) {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };

            let references = table.references().count();
            if references > 0 {
                warn!(
                    "Loot table {} has {} reference entries; they are not rolled",
                    table.entry, references
                );
            }

            info!("Simulating {} kill(s) against loot table {}", kills, table.entry);
            if kills == 1 {
                let drops = loot::simulate_kill(&table.entries, &mut rng)?;
                println!("{}", cli::format_drops(&drops));
            } else {
                let report = loot::simulate_kills(&table.entries, kills, &mut rng)?;
                println!("{}", cli::format_report(&report));
            }
        }
        Command::LootSql { path } => {
            let table = loot::load_table(&path)?;
            print!("{}", loot::export_sql(&table));
        }
        Command::BlpConvert { input, output } => {
            let data = fs::read(&input).map_err(|e| BlpError::Io {
                path: input.display().to_string(),
                source: e,
            })?;
            let png = texture::blp_to_png(&data)?;
            fs::write(&output, png).map_err(|e| BlpError::Io {
                path: output.display().to_string(),
                source: e,
            })?;
            info!("Wrote {}", output.display());
        }
        Command::BlpConvertDir { dirs } => {
            let (src, dest) = cli::texture_dirs(dirs, config.textures.as_ref())?;
            let summary = texture::convert_directory(&src, &dest, |s| {
                info!("Converting: {}/{}", s.converted, s.total);
            })?;
            println!(
                "Converted {} of {} textures ({} errors)",
                summary.converted, summary.total, summary.errors
            );
        }
        Command::SoapTest => {
            let client = soap_client(config)?;
            let check = client.test_connection().await;
            if !check.success {
                return Err(SoapError::CheckFailed {
                    endpoint: client.endpoint(),
                    message: check.message,
                }
                .into());
            }
            println!("{}", check.message);
        }
        Command::SoapInfo => println!("{}", soap_client(config)?.server_info().await?),
        Command::SoapOnline => println!("{}", soap_client(config)?.online_list().await?),
        Command::SoapAnnounce { message } => {
            println!("{}", soap_client(config)?.announce(&message).await?)
        }
        Command::SoapNotify { message } => {
            println!("{}", soap_client(config)?.notify(&message).await?)
        }
        Command::SoapReload(target) => {
            let client = soap_client(config)?;
            let output = match target {
                ReloadTarget::Config => client.reload_config().await?,
                ReloadTarget::GameEvent => client.reload_game_event().await?,
                ReloadTarget::Loot => client.reload_loot_tables().await?,
                ReloadTarget::Creature(entry) => client.reload_creature_template(entry).await?,
            };
            println!("{}", output);
        }
        Command::SoapShutdown { seconds, message } => {
            let client = soap_client(config)?;
            println!("{}", client.shutdown(seconds, message.as_deref()).await?);
        }
        Command::SoapCancelShutdown => {
            println!("{}", soap_client(config)?.cancel_shutdown().await?)
        }
        Command::SoapCommand { command } => {
            println!("{}", soap_client(config)?.send_with_retry(&command).await?);
        }
        Command::Help => println!("{}", USAGE),
    }
    Ok(())
}

fn soap_client(config: &Config) -> SoapResult<SoapClient> {
    SoapClient::new(&config.soap_or_default())
}
