// portalrestore/src/restore/logic.rs
use std::path::PathBuf;

use crate::client::PortalClient;
use crate::config::DestinationIdentity;
use crate::errors::{AppError, Result};

/// Where a restore session currently stands. Phases only ever advance
/// `NotStarted → CleaningUp → Importing → Publishing → Done`; any phase
/// failure lands in the single `Failed` sink and nothing runs afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestorePhase {
    NotStarted,
    CleaningUp,
    Importing,
    Publishing,
    Done,
    Failed,
}

/// Single-use coordinator for one restore run. Owns the content service
/// client for its whole lifetime; a session is never reused.
pub struct RestoreSession<C> {
    client: C,
    destination: DestinationIdentity,
    snapshot_folder: PathBuf,
    phase: RestorePhase,
}

impl<C: PortalClient> RestoreSession<C> {
    pub fn new(client: C, destination: DestinationIdentity, snapshot_folder: PathBuf) -> Self {
        RestoreSession {
            client,
            destination,
            snapshot_folder,
            phase: RestorePhase::NotStarted,
        }
    }

    pub fn phase(&self) -> RestorePhase {
        self.phase
    }

    /// Runs cleanup, import, and publish, strictly in that order. The first
    /// phase failure aborts the run; there is no retry and no rollback of
    /// whatever cleanup or import already changed on the destination.
    pub async fn run(&mut self) -> Result<()> {
        if let Err(err) = self.destination.validate() {
            self.phase = RestorePhase::Failed;
            return Err(err);
        }

        self.phase = RestorePhase::CleaningUp;
        println!(
            "🧹 Removing existing content from service '{}'...",
            self.destination.service_name
        );
        let cleanup = self.client.cleanup(&self.destination).await;
        if let Err(err) = cleanup {
            return Err(self.fail(err));
        }

        self.phase = RestorePhase::Importing;
        println!(
            "📦 Importing snapshot from {}...",
            self.snapshot_folder.display()
        );
        let import = self
            .client
            .import(&self.destination, &self.snapshot_folder)
            .await;
        if let Err(err) = import {
            return Err(self.fail(err));
        }

        self.phase = RestorePhase::Publishing;
        println!("🚀 Publishing restored content...");
        let publish = self.client.publish(&self.destination).await;
        if let Err(err) = publish {
            return Err(self.fail(err));
        }

        self.phase = RestorePhase::Done;
        Ok(())
    }

    /// Sinks the session into `Failed` and wraps the phase error into the
    /// single user-facing restore error, keeping the original message.
    fn fail(&mut self, err: AppError) -> AppError {
        self.phase = RestorePhase::Failed;
        AppError::Restore(err.to_string())
    }
}
