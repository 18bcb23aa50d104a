use std::path::PathBuf;

use clap::{Parser, Subcommand};
use sbcert_cli::commands;

#[derive(Parser)]
#[command(name = "sbcert", about = "Secure-boot debug certificate chain builder")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a key certificate
    KeyCert {
        /// Key certificate configuration file
        #[arg(long, short)]
        config: PathBuf,
    },
    /// Build an enabler debug certificate, appended to a key certificate package
    EnablerCert {
        /// Enabler certificate configuration file
        #[arg(long, short)]
        config: PathBuf,
    },
    /// Build a developer debug certificate, appended to an enabler package
    DeveloperCert {
        /// Developer certificate configuration file
        #[arg(long, short)]
        config: PathBuf,
    },
    /// Print the structure of a generated certificate chain
    Inspect {
        /// Chain binary to inspect
        file: PathBuf,
    },
    /// Check that a signer can resolve a key index
    VerifyKey {
        /// Signer configuration file
        #[arg(long)]
        signer_config: PathBuf,
        /// Key index to check
        #[arg(long)]
        key_index: String,
        /// Signer implementation overriding the config's `[plugin]` entry
        #[arg(long)]
        signer_impl: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        Commands::KeyCert { config } => commands::generate::run_key_cert(&config).await?,
        Commands::EnablerCert { config } => commands::generate::run_enabler_cert(&config).await?,
        Commands::DeveloperCert { config } => {
            commands::generate::run_developer_cert(&config).await?;
        }
        Commands::Inspect { file } => commands::inspect::run_inspect(&file)?,
        Commands::VerifyKey {
            signer_config,
            key_index,
            signer_impl,
        } => {
            commands::verify_key::run_verify_key(&signer_config, &key_index, signer_impl.as_deref())
                .await?;
        }
    }
    Ok(())
}
