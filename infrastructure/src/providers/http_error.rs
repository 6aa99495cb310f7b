//! Mapping of transport failures into the domain error taxonomy.

use reqwest::Response;
use schatphone_domain::ApiError;
use serde_json::Value;

/// Classify a `reqwest` failure. Callers never see the raw error.
pub(crate) fn classify_transport_error(err: reqwest::Error) -> ApiError {
    if err.is_builder() {
        ApiError::invalid_url(&err)
    } else if err.is_timeout() {
        ApiError::timeout()
    } else if err.is_decode() {
        ApiError::parse(&err)
    } else if err.is_connect() || err.is_request() {
        ApiError::network(&err)
    } else {
        ApiError::unknown(err.to_string())
    }
}

/// Read the body and parse it as JSON.
pub(crate) async fn read_json(response: Response) -> Result<Value, ApiError> {
    let text = response.text().await.map_err(classify_transport_error)?;
    serde_json::from_str(&text).map_err(ApiError::parse)
}
