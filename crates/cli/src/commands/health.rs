//! API health check.

use thiserror::Error;
use toys_marketplace_web::api::ApiClient;

#[derive(Debug, Error)]
#[error("Marketplace API at {0} is not healthy")]
pub struct Unhealthy(String);

/// Call `GET /health` and fail unless it answers with a 2xx.
///
/// # Errors
///
/// Returns `Unhealthy` if the API is unreachable or reports an error.
pub async fn check(api: &ApiClient) -> Result<(), Unhealthy> {
    if api.health().await {
        tracing::info!("Marketplace API at {} is healthy", api.base_url());
        Ok(())
    } else {
        Err(Unhealthy(api.base_url().to_string()))
    }
}
