use crate::data_source::{DataSource, FetchResponse};
use crate::error::FetchError;
use locustrack_protocol::LocusState;
use reqwest::Url;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// A remote data API answering `GET base?chr=&start=&end=&fields=` with
/// `{"body": [...]}`.
#[derive(Debug, Clone)]
pub struct HttpSource {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl HttpSource {
    pub fn new(base_url: impl Into<String>) -> Result<Self, FetchError> {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("locustrack/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    pub fn request_url(&self, state: &LocusState, fields: &[String]) -> Result<Url, FetchError> {
        Url::parse_with_params(
            &self.base_url,
            &[
                ("chr", state.chr.clone()),
                ("start", state.start.to_string()),
                ("end", state.end.to_string()),
                ("fields", fields.join(",")),
            ],
        )
        .map_err(|e| FetchError::InvalidUrl(format!("{}: {e}", self.base_url)))
    }
}

impl DataSource for HttpSource {
    fn fetch(&self, state: &LocusState, fields: &[String]) -> Result<FetchResponse, FetchError> {
        if fields.is_empty() {
            return Ok(FetchResponse::default());
        }
        let url = self.request_url(state, fields)?;
        tracing::debug!("GET {url}");
        let response = self.client.get(url.clone()).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        let text = response.text()?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_url() {
        let source = HttpSource::new("https://example.org/api/data").unwrap();
        let state = LocusState::new("10", 114_550_452, 115_067_678);
        let fields = vec!["id".to_string(), "ld:best".to_string()];
        let url = source.request_url(&state, &fields).unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.org/api/data?chr=10&start=114550452&end=115067678&fields=id%2Cld%3Abest"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let source = HttpSource::new("not a url").unwrap();
        assert!(matches!(
            source.request_url(&LocusState::default(), &[]),
            Err(FetchError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_empty_fields_skip_the_request() {
        let source = HttpSource::new("http://127.0.0.1:9/unreachable").unwrap();
        let response = source.fetch(&LocusState::default(), &[]).unwrap();
        assert!(response.body.is_empty());
    }
}
