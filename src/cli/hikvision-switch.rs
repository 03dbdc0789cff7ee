mod commands;
mod utils;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use hikvision_switch_rs::logging::{LogConfig, RotationPeriod, setup_logging};
use tracing::error;

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// List the switches created so far
    Devices,
    /// Create a switch bound to a camera
    Create {
        #[arg(long, value_enum)]
        kind: utils::KindArg,
        #[arg(long)]
        camera: String,
    },
    /// Turn a switch on (light on, alarm tripped)
    On { id: String },
    /// Turn a switch off (light off, alarm reset)
    Off { id: String },
    Status { id: String },
    /// Show the settings of a switch
    Settings { id: String },
    /// Change one setting of a switch
    Set { id: String, key: String, value: String },
    Readme { id: String },
}

#[derive(Parser, Debug)]
pub struct Params {
    /// Settings file with the camera directory (if not set, defaults are used)
    #[clap(long, env = "HIKVISION_SWITCH_CONFIG")]
    config: Option<String>,
    /// Device store path, overrides the one in the settings file
    #[clap(long, env = "HIKVISION_SWITCH_STORE")]
    store: Option<String>,
    /// Log directory (if not set, logs to stdout)
    #[clap(long)]
    log_dir: Option<String>,
    /// Log rotation period: minutely, hourly, daily or never
    #[clap(long, default_value = "daily")]
    log_rotation: RotationPeriod,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> ExitCode {
    let params = Params::parse();

    let log_config = params.log_dir.clone().map(|log_dir| LogConfig {
        log_dir,
        rotation: params.log_rotation,
        ..Default::default()
    });
    let _guard = match setup_logging(log_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Cannot set up logging: {e}");
            return ExitCode::FAILURE;
        }
    };

    let result = match params.command.clone() {
        Commands::Devices => commands::list_devices(&params),
        Commands::Create { kind, camera } => commands::create_device(&params, kind, &camera).await,
        Commands::On { id } => commands::turn_on(&params, &id).await,
        Commands::Off { id } => commands::turn_off(&params, &id).await,
        Commands::Status { id } => commands::status(&params, &id).await,
        Commands::Settings { id } => commands::show_settings(&params, &id).await,
        Commands::Set { id, key, value } => commands::put_setting(&params, &id, &key, &value).await,
        Commands::Readme { id } => commands::readme(&params, &id).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
