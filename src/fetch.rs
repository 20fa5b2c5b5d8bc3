use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use thiserror::Error;
use tracing::debug;

use crate::config::Settings;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Status code {status} from {url}")]
    Status { url: String, status: u16 },
    #[error("cannot build URL from {base} + {link}")]
    Url { base: String, link: String },
}

/// Anything that can turn a URL into page markup.
pub trait PageSource {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Live source: one GET per call, browser-like User-Agent, no retries.
pub struct HttpSource {
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(settings: &Settings) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_str(&settings.user_agent)?);
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(HttpSource { client })
    }
}

impl PageSource for HttpSource {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let transport = |source| FetchError::Transport {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(transport)?;
        let status = response.status();
        debug!(url, status = status.as_u16(), "fetched");
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        response.text().await.map_err(transport)
    }
}

/// Resolve a party's relative results link against the site base.
pub fn join_url(base: &str, link: &str) -> Result<String, FetchError> {
    let err = || FetchError::Url {
        base: base.to_string(),
        link: link.to_string(),
    };
    let base_url = reqwest::Url::parse(base).map_err(|_| err())?;
    let joined = base_url.join(link).map_err(|_| err())?;
    Ok(joined.to_string())
}


#[cfg(test)]
mod tests {
    use super::fixtures::FixtureSource;
    use super::*;

    #[test]
    fn relative_link_joins_base_directory() {
        let url = join_url(
            "https://results.eci.gov.in/PcResultGenJune2024/",
            "partywisewinresult-369.htm",
        )
        .unwrap();
        assert_eq!(
            url,
            "https://results.eci.gov.in/PcResultGenJune2024/partywisewinresult-369.htm"
        );
    }

    #[test]
    fn absolute_link_wins() {
        let url = join_url("https://a.example/x/", "https://b.example/y.htm").unwrap();
        assert_eq!(url, "https://b.example/y.htm");
    }

    #[test]
    fn bad_base_is_url_error() {
        assert!(matches!(
            join_url("not a url", "x.htm"),
            Err(FetchError::Url { .. })
        ));
    }

    #[tokio::test]
    async fn fixture_source_serves_pages_and_statuses() {
        let src = FixtureSource::new()
            .page("http://t/ok", "<p>hi</p>")
            .status("http://t/gone", 410);
        assert_eq!(src.fetch("http://t/ok").await.unwrap(), "<p>hi</p>");
        assert!(matches!(
            src.fetch("http://t/gone").await,
            Err(FetchError::Status { status: 410, .. })
        ));
        assert!(matches!(
            src.fetch("http://t/missing").await,
            Err(FetchError::Status { status: 404, .. })
        ));
    }
}
