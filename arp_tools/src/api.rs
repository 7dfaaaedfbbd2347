use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, COOKIE},
    Client,
};
use sales_common::{DateRange, Secret};
use serde_json::Value;

use crate::{backoff_delay, ArpApiError, ArpConfig};

#[derive(Clone)]
pub struct ArpApi {
    config: ArpConfig,
    client: Arc<Client>,
}

impl ArpApi {
    pub fn new(config: ArpConfig) -> Result<Self, ArpApiError> {
        let mut headers = HeaderMap::with_capacity(1);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ArpApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn config(&self) -> &ArpConfig {
        &self.config
    }

    /// The sales URL for the given range. The range goes in unencoded (`r=2024-01-05/2024-01-07`), which is what the
    /// feed expects.
    pub fn sales_url(&self, range: &DateRange, user_id: Option<i64>) -> String {
        let mut url = format!("{}/sells?r={range}", self.config.base_url);
        if let Some(id) = user_id {
            url.push_str(&format!("&user_id={id}"));
        }
        url
    }

    /// Fetches the raw sales payload for `range`, authenticating with the merchant's session token.
    ///
    /// Transient failures are retried up to `max_attempts` times in total, with exponential backoff between attempts.
    /// Client errors (4xx other than 429) and malformed bodies are returned immediately.
    pub async fn fetch_sales(
        &self,
        range: &DateRange,
        session: &Secret<String>,
        user_id: Option<i64>,
    ) -> Result<Value, ArpApiError> {
        if session.is_blank() {
            return Err(ArpApiError::InvalidCredential("the session token is empty".into()));
        }
        let cookie = HeaderValue::from_str(&format!("session={}", session.reveal().trim()))
            .map_err(|e| ArpApiError::InvalidCredential(e.to_string()))?;
        let url = self.sales_url(range, user_id);
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            debug!("Fetching sales for {range} (attempt {attempt}/{max_attempts})");
            match self.get_json(&url, &cookie).await {
                Ok(value) => {
                    info!("Fetched sales for {range}");
                    return Ok(value);
                },
                Err(e) if e.is_transient() && attempt < max_attempts => {
                    let delay = backoff_delay(attempt, self.config.min_backoff, self.config.max_backoff);
                    warn!("Sales fetch for {range} failed: {e}. Retrying in {}ms", delay.as_millis());
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                },
                Err(e) => {
                    error!("Sales fetch for {range} failed after {attempt} attempt(s): {e}");
                    return Err(e);
                },
            }
        }
    }

    async fn get_json(&self, url: &str, cookie: &HeaderValue) -> Result<Value, ArpApiError> {
        trace!("Sending REST query: {url}");
        let response = self
            .client
            .get(url)
            .header(COOKIE, cookie.clone())
            .send()
            .await
            .map_err(|e| ArpApiError::RestResponseError(e.to_string()))?;
        if response.status().is_success() {
            trace!("REST query successful. {}", response.status());
            response.json::<Value>().await.map_err(|e| ArpApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| ArpApiError::RestResponseError(e.to_string()))?;
            Err(ArpApiError::QueryError { status, message })
        }
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use super::*;

    fn api(base_url: &str) -> ArpApi {
        let config = ArpConfig {
            base_url: base_url.to_string(),
            request_timeout: Duration::from_secs(2),
            ..Default::default()
        }
        .without_backoff();
        ArpApi::new(config).unwrap()
    }

    #[test]
    fn sales_urls() {
        let api = api("https://feed.example.com");
        let day = "2024-01-05".parse::<DateRange>().unwrap();
        assert_eq!(api.sales_url(&day, None), "https://feed.example.com/sells?r=2024-01-05");
        let range = "2024-01-05/2024-01-07".parse::<DateRange>().unwrap();
        assert_eq!(api.sales_url(&range, Some(42)), "https://feed.example.com/sells?r=2024-01-05/2024-01-07&user_id=42");
    }

    #[tokio::test]
    async fn blank_session_is_rejected_without_a_request() {
        let api = api("http://127.0.0.1:1");
        let day = "2024-01-05".parse::<DateRange>().unwrap();
        let err = api.fetch_sales(&day, &Secret::new("  ".to_string()), None).await.unwrap_err();
        assert!(matches!(err, ArpApiError::InvalidCredential(_)));
    }

    #[tokio::test]
    async fn unreachable_feed_fails_after_retries() {
        let _ = env_logger::try_init();
        let api = api("http://127.0.0.1:1");
        let day = "2024-01-05".parse::<DateRange>().unwrap();
        let err = api.fetch_sales(&day, &Secret::from("token"), Some(1)).await.unwrap_err();
        assert!(matches!(err, ArpApiError::RestResponseError(_)));
        assert!(err.is_transient());
    }
}
