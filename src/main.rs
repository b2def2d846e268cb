//! Portal Content Restore Tool
//!
//! Restores a previously captured snapshot of portal content (pages,
//! layouts, media, configuration) into a destination service instance:
//! wipes the destination, re-imports the snapshot, and publishes it.
//!
//! Auto-publishing is not available for self-hosted portal deployments;
//! after the restore completes, publish locally and upload the generated
//! static files to your hosting.

// portalrestore/src/main.rs
mod client;
mod config;
mod errors;
mod restore;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use config::{DEFAULT_SNAPSHOT_FOLDER, DestinationIdentity, RestoreSettings};

#[derive(Debug, Parser)]
#[command(name = "portalrestore")]
#[command(about = "Restores previously captured portal content into a destination service instance")]
struct Cli {
    /// Azure subscription ID.
    #[arg(long = "subscriptionId")]
    subscription_id: String,

    /// Azure resource group name.
    #[arg(long = "resourceGroupName")]
    resource_group_name: String,

    /// API Management service name.
    #[arg(long = "serviceName")]
    service_name: String,

    /// Path to the folder that contains the previously captured portal content.
    #[arg(long = "folder", default_value = DEFAULT_SNAPSHOT_FOLDER)]
    folder: PathBuf,
}

/// Main entry point: maps the restore outcome to the process exit code.
#[tokio::main]
async fn main() -> ExitCode {
    match run_app().await {
        Ok(_) => {
            println!("✅ DONE");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("❌ {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run_app() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let settings = RestoreSettings {
        destination: DestinationIdentity::new(
            cli.subscription_id,
            cli.resource_group_name,
            cli.service_name,
        ),
        snapshot_folder: cli.folder,
    };
    // Reject incomplete identities here, before any network interaction.
    settings.destination.validate()?;

    println!(
        "🔄 Restoring portal content to service '{}' from {}...",
        settings.destination.service_name,
        settings.snapshot_folder.display()
    );
    restore::run_restore_flow(&settings)
        .await
        .context("Restore process failed")?;
    Ok(())
}
