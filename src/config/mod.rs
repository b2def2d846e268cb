// portalrestore/src/config/mod.rs
use std::env;
use std::path::PathBuf;

use crate::errors::{AppError, Result};

/// Default location of the snapshot produced by the capture step.
pub const DEFAULT_SNAPSHOT_FOLDER: &str = "../dist/snapshot";

/// Environment variable holding the management-plane bearer token.
pub const MANAGEMENT_TOKEN_VAR: &str = "MANAGEMENT_ACCESS_TOKEN";

/// The triple addressing one destination service instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationIdentity {
    pub subscription_id: String,
    pub resource_group_name: String,
    pub service_name: String,
}

impl DestinationIdentity {
    pub fn new(
        subscription_id: impl Into<String>,
        resource_group_name: impl Into<String>,
        service_name: impl Into<String>,
    ) -> Self {
        DestinationIdentity {
            subscription_id: subscription_id.into(),
            resource_group_name: resource_group_name.into(),
            service_name: service_name.into(),
        }
    }

    /// All three identity fields must be non-empty; a missing field is a
    /// configuration problem and must be rejected before any network call.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("subscriptionId", &self.subscription_id),
            ("resourceGroupName", &self.resource_group_name),
            ("serviceName", &self.service_name),
        ];
        for (flag, value) in required {
            if value.trim().is_empty() {
                return Err(AppError::Config(format!(
                    "{} must be provided and non-empty.",
                    flag
                )));
            }
        }
        Ok(())
    }
}

/// Everything one restore run needs besides credentials: where to restore
/// to, and which snapshot folder to restore from.
#[derive(Debug, Clone)]
pub struct RestoreSettings {
    pub destination: DestinationIdentity,
    pub snapshot_folder: PathBuf,
}

/// Bearer token for the destination management plane.
#[derive(Debug, Clone)]
pub struct ManagementCredentials {
    access_token: String,
}

impl ManagementCredentials {
    pub fn from_env() -> Result<Self> {
        Self::from_token(env::var(MANAGEMENT_TOKEN_VAR).ok())
    }

    pub fn from_token(token: Option<String>) -> Result<Self> {
        let token = token.unwrap_or_default();
        if token.trim().is_empty() {
            return Err(AppError::Config(format!(
                "{} must be set to a management-plane access token.",
                MANAGEMENT_TOKEN_VAR
            )));
        }
        Ok(ManagementCredentials {
            access_token: token.trim().to_string(),
        })
    }

    /// Value for the `Authorization` header. Accepts tokens captured with or
    /// without the scheme prefix (e.g. from `az account get-access-token`).
    pub fn authorization_header(&self) -> String {
        if self.access_token.starts_with("Bearer ") {
            self.access_token.clone()
        } else {
            format!("Bearer {}", self.access_token)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> DestinationIdentity {
        DestinationIdentity::new("s1", "rg1", "portal1")
    }

    #[test]
    fn complete_identity_validates() -> Result<()> {
        identity().validate()
    }

    #[test]
    fn empty_subscription_id_is_rejected() {
        let mut dest = identity();
        dest.subscription_id = "".to_string();
        let err = dest.validate().unwrap_err();
        assert!(err.to_string().contains("subscriptionId"));
    }

    #[test]
    fn blank_resource_group_is_rejected() {
        let mut dest = identity();
        dest.resource_group_name = "   ".to_string();
        let err = dest.validate().unwrap_err();
        assert!(err.to_string().contains("resourceGroupName"));
    }

    #[test]
    fn empty_service_name_is_rejected() {
        let mut dest = identity();
        dest.service_name = "".to_string();
        let err = dest.validate().unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
        assert!(err.to_string().contains("serviceName"));
    }

    #[test]
    fn missing_token_is_a_config_error() {
        let err = ManagementCredentials::from_token(None).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));

        let err = ManagementCredentials::from_token(Some("  ".to_string())).unwrap_err();
        assert!(err.to_string().contains(MANAGEMENT_TOKEN_VAR));
    }

    #[test]
    fn authorization_header_adds_scheme_once() -> Result<()> {
        let bare = ManagementCredentials::from_token(Some("abc123".to_string()))?;
        assert_eq!(bare.authorization_header(), "Bearer abc123");

        let prefixed = ManagementCredentials::from_token(Some("Bearer abc123".to_string()))?;
        assert_eq!(prefixed.authorization_header(), "Bearer abc123");
        Ok(())
    }
}
