//! OAuth provider listing command.
//!
//! Useful when wiring up a new environment: confirms the storefront can
//! reach the commerce API and shows which provider buttons the login page
//! will render.

use thiserror::Error;

use larkspur_storefront::commerce::{CommerceClient, CommerceError};
use larkspur_storefront::config::{CommerceApiConfig, ConfigError};

/// Errors that can occur while listing providers.
#[derive(Debug, Error)]
pub enum ProvidersError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Commerce API error: {0}")]
    Commerce(#[from] CommerceError),
}

/// Print the OAuth providers the commerce API has enabled.
///
/// # Errors
///
/// Returns an error if the API configuration is missing or the request fails.
pub async fn list() -> Result<(), ProvidersError> {
    dotenvy::dotenv().ok();

    let config = CommerceApiConfig::from_env()?;
    let client = CommerceClient::new(&config);

    let providers = client.oauth_providers().await?;

    if providers.is_empty() {
        println!("No OAuth providers enabled");
    } else {
        for provider in providers {
            println!("{provider}");
        }
    }

    Ok(())
}
