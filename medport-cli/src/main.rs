use std::path::PathBuf;
use std::process::exit;

use clap::{Args, Parser, Subcommand};
use medport::config::Config;
use medport::controller::BearerToken;
use medport::logging::Logger;

mod logging;
mod messages;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[arg(long, global = true, help = "Configuration file (default: medport.toml)")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    subcommands: Subcommands,
}

#[derive(Subcommand, Debug)]
enum Subcommands {
    /// Run the HTTP server.
    Serve {
        #[arg(long, help = "Address to bind to")]
        host: Option<String>,

        #[arg(long, help = "Port to listen on")]
        port: Option<u16>,
    },

    Messages(MessagesSubcommand),

    /// Generate a random admin token.
    Token,
}

#[derive(Args, Debug)]
struct MessagesSubcommand {
    #[command(subcommand)]
    command: Messages,
}

/// Read stored contact messages.
#[derive(Subcommand, Debug)]
enum Messages {
    /// List messages in the order they were received.
    List {
        #[arg(long, help = "Only messages with this status: new, read or archived")]
        status: Option<String>,
    },

    /// Show one message.
    Show {
        /// Message id.
        id: String,
    },
}

fn load_config(path: Option<PathBuf>) -> Result<Config, medport::config::Error> {
    match path {
        Some(path) => {
            let mut config = Config::load_file(path)?;
            config.apply_env(|name| std::env::var(name).ok())?;
            Ok(config)
        }
        None => Config::load(),
    }
}

#[tokio::main]
async fn main() {
    let args = Cli::parse();

    let mut config = match load_config(args.config) {
        Ok(config) => config,
        Err(err) => {
            logging::error(err);
            exit(1);
        }
    };

    let ok = match args.subcommands {
        Subcommands::Serve { host, port } => {
            if let Some(host) = host {
                config.host = host;
            }

            if let Some(port) = port {
                config.port = port;
            }

            Logger::init(&config);

            match medport::app::launch(config).await {
                Ok(()) => true,
                Err(err) => {
                    log::error!("{}", err);
                    false
                }
            }
        }

        Subcommands::Messages(subcommand) => match subcommand.command {
            Messages::List { status } => messages::list(&config, status).await,
            Messages::Show { id } => messages::show(&config, &id).await,
        },

        Subcommands::Token => {
            println!("{}", BearerToken::generate());
            logging::created("admin token, set it as admin_token or MEDPORT_ADMIN_TOKEN");
            true
        }
    };

    if !ok {
        exit(1);
    }
}
