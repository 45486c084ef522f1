use crate::prelude::*;
use tempfile::NamedTempFile;
use url::Url;

/// Downloads `url` into a temporary file that is removed when dropped.
///
/// Any transport failure, timeout or non-success status is reported as
/// `FeedError::NotFound`.
#[cfg(feature = "api")]
pub async fn fetch_to_temp(url: &Url, timeout: Duration) -> FeedResult<NamedTempFile> {
    let not_found = |reason: String| FeedError::NotFound {
        location: url.to_string(),
        reason,
    };

    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| not_found(format!("Failed to build HTTP client: {}", e)))?;

    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| not_found(format!("HTTP request failed: {}", e)))?
        .error_for_status()
        .map_err(|e| not_found(format!("HTTP request failed: {}", e)))?;

    let content = response
        .bytes()
        .await
        .map_err(|e| not_found(format!("Failed to get response content: {}", e)))?;

    let mut file = tempfile::Builder::new()
        .prefix("feedtable-")
        .suffix(&temp_suffix(url))
        .tempfile()?;
    file.write_all(&content)?;
    file.flush()?;

    info!(
        "Downloaded {} bytes from {} to {}",
        content.len(),
        url,
        file.path().display()
    );

    Ok(file)
}

#[cfg(not(feature = "api"))]
pub async fn fetch_to_temp(_url: &Url, _timeout: Duration) -> FeedResult<NamedTempFile> {
    Err(FeedError::Custom("*** Warning ***: API feature not enabled. Add feature = [\"api\"] under [dependencies]".to_string()))
}

/// `-<basename>` of the URL path so the temp file stays recognizable.
#[cfg_attr(not(feature = "api"), allow(dead_code))]
fn temp_suffix(url: &Url) -> String {
    let basename = url
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .unwrap_or("feed.xml");
    let cleaned: String = basename
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    if cleaned.is_empty() {
        "-feed.xml".to_string()
    } else {
        format!("-{}", cleaned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_suffix_uses_basename() {
        let url = Url::parse("https://example.com/exports/feed.xml?token=1").unwrap();
        assert_eq!(temp_suffix(&url), "-feed.xml");

        let url = Url::parse("https://example.com/").unwrap();
        assert_eq!(temp_suffix(&url), "-feed.xml");

        let url = Url::parse("https://example.com/a/%20weird%20name.xml").unwrap();
        assert_eq!(temp_suffix(&url), "-20weird20name.xml");
    }

    #[cfg(feature = "api")]
    #[tokio::test]
    async fn test_unreachable_host_is_not_found() {
        let url = Url::parse("http://127.0.0.1:9/feed.xml").unwrap();
        let err = fetch_to_temp(&url, Duration::from_secs(2)).await.unwrap_err();
        assert!(matches!(err, FeedError::NotFound { .. }));
    }
}
