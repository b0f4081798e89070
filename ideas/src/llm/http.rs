//! Transport shared by the provider clients.

use super::config::LlmTimeouts;
use super::types::LlmError;

pub(crate) fn build_client(timeouts: LlmTimeouts) -> Result<reqwest::Client, LlmError> {
    reqwest::Client::builder()
        .timeout(timeouts.request())
        .connect_timeout(timeouts.connect())
        .build()
        .map_err(|e| LlmError::HttpClientBuild(e.to_string()))
}

/// Send `request` and return the body of a 2xx response.
pub(crate) async fn send(request: reqwest::RequestBuilder) -> Result<String, LlmError> {
    let response = request.send().await.map_err(|e| LlmError::ApiRequest(e.to_string()))?;
    let status = response.status();
    let body = response.text().await.map_err(|e| LlmError::ApiRequest(e.to_string()))?;
    if !status.is_success() {
        return Err(LlmError::ApiResponse { status: status.as_u16(), body });
    }
    Ok(body)
}
