// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use crate::error::Result;
use crate::models::BackendConfig;

/// Create a configured asynchronous HTTP client.
pub fn create_async_client(config: &BackendConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .map_err(crate::error::FetchError::from)?;
    Ok(client)
}
