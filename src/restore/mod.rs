// portalrestore/src/restore/mod.rs
mod logic;

pub use logic::{RestorePhase, RestoreSession};

use crate::client::ManagementClient;
use crate::config::{ManagementCredentials, RestoreSettings};
use crate::errors::Result;

/// Public entry point for the restore process: binds one destination and one
/// snapshot folder to a fresh management client and runs the three phases.
pub async fn run_restore_flow(settings: &RestoreSettings) -> Result<()> {
    settings.destination.validate()?;
    let credentials = ManagementCredentials::from_env()?;
    let client = ManagementClient::new(credentials)?;

    let mut session = RestoreSession::new(
        client,
        settings.destination.clone(),
        settings.snapshot_folder.clone(),
    );
    session.run().await
}
