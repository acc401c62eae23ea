use std::fmt;
use std::path::PathBuf;

use crate::error::FetchError;

/// Where the dataset comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Path(PathBuf),
    Url(String),
}

impl DataSource {
    /// `http://` and `https://` locations are fetched, anything else is a
    /// filesystem path.
    pub fn parse(location: &str) -> Self {
        let location = location.trim();
        if location.starts_with("http://") || location.starts_with("https://") {
            Self::Url(location.to_string())
        } else {
            Self::Path(PathBuf::from(location))
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => write!(f, "{}", path.display()),
            Self::Url(url) => write!(f, "{}", url),
        }
    }
}

/// Result of reading a dataset source
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub text: String,
    /// Final location after redirects
    pub location: String,
    pub content_type: Option<String>,
}

/// Read the dataset text (blocking).
pub fn fetch_source(source: &DataSource) -> Result<FetchResult, FetchError> {
    match source {
        DataSource::Path(path) => {
            let text = std::fs::read_to_string(path).map_err(|e| FetchError::Io {
                path: path.display().to_string(),
                source: e,
            })?;
            log::debug!("Read {} bytes from {}", text.len(), path.display());
            Ok(FetchResult {
                text,
                location: path.display().to_string(),
                content_type: None,
            })
        }
        DataSource::Url(url) => fetch_url(url),
    }
}

#[cfg(feature = "remote")]
fn fetch_url(url_str: &str) -> Result<FetchResult, FetchError> {
    let parsed = url::Url::parse(url_str).map_err(|e| FetchError::Url(format!("{}: {}", url_str, e)))?;

    let client = reqwest::blocking::Client::builder()
        .user_agent(concat!("dotstory/", env!("CARGO_PKG_VERSION")))
        .timeout(std::time::Duration::from_secs(15))
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(|e| FetchError::Request(format!("client error: {}", e)))?;

    let response = client
        .get(parsed.as_str())
        .header("Accept", "text/csv,text/plain;q=0.9,*/*;q=0.8")
        .send()
        .map_err(|e| FetchError::Request(e.to_string()))?;

    let status = response.status();
    let final_url = response.url().to_string();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: final_url,
            status: status.as_u16(),
        });
    }

    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());

    let text = response
        .text()
        .map_err(|e| FetchError::Request(format!("failed to read body: {}", e)))?;
    log::debug!("Fetched {} bytes from {} ({:?})", text.len(), final_url, content_type);

    Ok(FetchResult {
        text,
        location: final_url,
        content_type,
    })
}

#[cfg(not(feature = "remote"))]
fn fetch_url(url_str: &str) -> Result<FetchResult, FetchError> {
    Err(FetchError::RemoteDisabled(url_str.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_source() {
        assert_eq!(
            DataSource::parse("https://example.org/laureates.csv"),
            DataSource::Url("https://example.org/laureates.csv".to_string())
        );
        assert_eq!(
            DataSource::parse(" data/laureates.csv "),
            DataSource::Path(PathBuf::from("data/laureates.csv"))
        );
    }

    #[test]
    fn test_read_local_file() {
        let path = std::env::temp_dir().join(format!("dotstory-fetch-{}.csv", std::process::id()));
        std::fs::write(&path, "id,Category,Gender\n1,physics,male\n").unwrap();

        let result = fetch_source(&DataSource::Path(path.clone())).unwrap();
        assert!(result.text.starts_with("id,Category"));
        assert_eq!(result.content_type, None);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = fetch_source(&DataSource::parse("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, FetchError::Io { .. }), "unexpected error: {}", err);
    }

    #[cfg(feature = "remote")]
    #[test]
    fn test_invalid_url() {
        let err = fetch_source(&DataSource::Url("http://".to_string())).unwrap_err();
        assert!(matches!(err, FetchError::Url(_)), "unexpected error: {}", err);
    }
}
