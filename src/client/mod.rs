// portalrestore/src/client/mod.rs
pub(crate) mod management;
pub(crate) mod media;
pub(crate) mod snapshot;

use std::path::Path;

use crate::config::DestinationIdentity;
use crate::errors::Result;

pub use management::ManagementClient;

/// Low-level content operations against a destination portal instance.
///
/// The restore flow only ever talks to this trait; the production
/// implementation is [`ManagementClient`], and tests substitute a fake that
/// records calls and injects failures. Each operation is expected to be
/// called at most once per restore session and to surface any failure as a
/// single error carrying a human-readable message.
#[allow(async_fn_in_trait)]
pub trait PortalClient {
    /// Removes all existing content (records and media) from the destination.
    async fn cleanup(&self, destination: &DestinationIdentity) -> Result<()>;

    /// Reads every artifact under `snapshot_path` and creates the
    /// corresponding content records and media blobs on the destination.
    async fn import(&self, destination: &DestinationIdentity, snapshot_path: &Path) -> Result<()>;

    /// Triggers the destination's publish pipeline so imported content goes live.
    async fn publish(&self, destination: &DestinationIdentity) -> Result<()>;
}
