//! Weather lookup against the OpenWeatherMap current-conditions API.

use serde_json::{Value, json};
use tracing::debug;

use crate::error::BuiltinError;

/// HTTP client for current weather conditions.
///
/// The endpoint and API key come from configuration; a missing key yields a
/// structured failure rather than a panic or a silent retry.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl WeatherClient {
    /// Creates a client for the given endpoint and optional API key.
    #[must_use]
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key,
        }
    }

    /// Fetches current conditions for a city, in metric units.
    ///
    /// # Errors
    ///
    /// Returns [`BuiltinError::MissingApiKey`] when no key is configured and
    /// [`BuiltinError::Weather`] for transport failures, non-success status
    /// codes, or responses that do not match the expected shape.
    pub async fn current(&self, city: &str) -> Result<Value, BuiltinError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(BuiltinError::MissingApiKey);
        };

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", city), ("appid", api_key), ("units", "metric")])
            .send()
            .await
            .map_err(|err| BuiltinError::Weather {
                reason: err.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(BuiltinError::Weather {
                reason: format!("service answered with status {status}"),
            });
        }

        let body: Value = response.json().await.map_err(|err| BuiltinError::Weather {
            reason: format!("unreadable response body: {err}"),
        })?;

        debug!(city, "weather lookup succeeded");
        summarize(&body)
    }
}

/// Extracts the caller-facing summary from a raw API response.
fn summarize(body: &Value) -> Result<Value, BuiltinError> {
    let field = |pointer: &str| {
        body.pointer(pointer)
            .cloned()
            .ok_or_else(|| BuiltinError::Weather {
                reason: format!("response is missing `{pointer}`"),
            })
    };

    Ok(json!({
        "city": field("/name")?,
        "country": field("/sys/country")?,
        "temperature": field("/main/temp")?,
        "feels_like": field("/main/feels_like")?,
        "humidity": field("/main/humidity")?,
        "pressure": field("/main/pressure")?,
        "description": field("/weather/0/description")?,
        "wind_speed": field("/wind/speed")?,
        "visibility": body.pointer("/visibility").cloned().unwrap_or(Value::Null),
    }))
}
