// ABOUTME: Resource handling module for fetching site pages over HTTP.
// ABOUTME: Handles content-length limits, status checks, timeout mapping and charset decoding.

use std::collections::HashMap;

use bytes::Bytes;
use tracing::debug;
use url::Url;

use crate::error::AdapterError;

/// Maximum allowed content length (10 MB).
pub const MAX_CONTENT_LENGTH: usize = 10 * 1024 * 1024;

/// A fetched page body with the metadata needed to decode it.
#[derive(Debug, Clone)]
pub struct Page {
    pub final_url: String,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl Page {
    /// Decode the body as text, using the charset from the content-type header
    /// when present and detection otherwise.
    pub fn text(&self) -> String {
        decode_body(&self.body, self.content_type.as_deref())
    }
}

/// Decode body bytes to a String using charset from content-type header or detection.
fn decode_body(body: &[u8], content_type: Option<&str>) -> String {
    let declared = content_type
        .and_then(extract_charset)
        .and_then(|label| encoding_rs::Encoding::for_label(label.as_bytes()));

    let encoding = declared.unwrap_or_else(|| {
        let mut detector = chardetng::EncodingDetector::new();
        detector.feed(body, true);
        detector.guess(None, true)
    });
    encoding.decode(body).0.into_owned()
}

/// Extract charset value from Content-Type header.
fn extract_charset(content_type: &str) -> Option<String> {
    content_type.split(';').find_map(|param| {
        let (key, value) = param.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches(|c| c == '"' || c == '\'').to_ascii_lowercase())
    })
}

fn request_error(url: &Url, what: &str, e: reqwest::Error) -> AdapterError {
    let source = Some(anyhow::anyhow!("{}: {}", what, e));
    if e.is_timeout() {
        AdapterError::timeout(url.as_str(), "Fetch", source)
    } else {
        AdapterError::fetch(url.as_str(), "Fetch", source)
    }
}

fn too_large(url: &Url, size: u64) -> AdapterError {
    AdapterError::fetch(
        url.as_str(),
        "Fetch",
        Some(anyhow::anyhow!(
            "content too large: {} bytes (limit {})",
            size,
            MAX_CONTENT_LENGTH
        )),
    )
}

/// GET `url` with the extra `headers`. Anything but HTTP 200 is an error.
pub async fn fetch(
    client: &reqwest::Client,
    url: &Url,
    headers: &HashMap<String, String>,
) -> Result<Page, AdapterError> {
    if !matches!(url.scheme(), "http" | "https") {
        return Err(AdapterError::invalid_url(
            url.as_str(),
            "Fetch",
            Some(anyhow::anyhow!("scheme must be http or https")),
        ));
    }

    let mut request = client.get(url.clone());
    for (key, value) in headers {
        request = request.header(key, value);
    }

    debug!(url = %url, "fetching");
    let response = request
        .send()
        .await
        .map_err(|e| request_error(url, "request failed", e))?;

    let status = response.status();
    if status != reqwest::StatusCode::OK {
        return Err(AdapterError::fetch(
            url.as_str(),
            "Fetch",
            Some(anyhow::anyhow!("HTTP status {}", status.as_u16())),
        ));
    }

    if let Some(len) = response.content_length() {
        if len > MAX_CONTENT_LENGTH as u64 {
            return Err(too_large(url, len));
        }
    }

    let final_url = response.url().to_string();
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    let body = response
        .bytes()
        .await
        .map_err(|e| request_error(url, "failed to read body", e))?;
    if body.len() > MAX_CONTENT_LENGTH {
        return Err(too_large(url, body.len() as u64));
    }

    debug!(url = %url, bytes = body.len(), "fetched");
    Ok(Page {
        final_url,
        content_type,
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use std::time::Duration;

    fn http() -> reqwest::Client {
        reqwest::Client::builder()
            .user_agent("gte-test")
            .build()
            .unwrap()
    }

    fn url(server: &MockServer, path: &str) -> Url {
        Url::parse(&server.url(path)).unwrap()
    }

    #[tokio::test]
    async fn fetches_tab_page_as_text() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/nirvana-tabs/polly-tab.html");
            then.status(200)
                .header("content-type", "text/html; charset=utf-8")
                .body("<pre>e|--0--|</pre>");
        });

        let page = fetch(&http(), &url(&server, "/nirvana-tabs/polly-tab.html"), &HashMap::new())
            .await
            .expect("fetch should succeed");
        mock.assert();
        assert_eq!(page.text(), "<pre>e|--0--|</pre>");
        assert!(page.final_url.ends_with("/nirvana-tabs/polly-tab.html"));
    }

    #[tokio::test]
    async fn sends_configured_headers() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/").header("referer", "http://www.guitartabsexplorer.com/");
            then.status(200).body("ok");
        });

        let mut headers = HashMap::new();
        headers.insert(
            "Referer".to_string(),
            "http://www.guitartabsexplorer.com/".to_string(),
        );
        fetch(&http(), &url(&server, "/"), &headers)
            .await
            .expect("fetch should succeed");
        mock.assert();
    }

    #[tokio::test]
    async fn not_found_is_fetch_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/missing-Tabs/1/");
            then.status(404).body("not found");
        });

        let err = fetch(&http(), &url(&server, "/missing-Tabs/1/"), &HashMap::new())
            .await
            .expect_err("404 should fail");
        assert!(err.is_fetch());
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn slow_response_is_timeout() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/slow");
            then.status(200).delay(Duration::from_millis(500)).body("late");
        });

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(50))
            .build()
            .unwrap();
        let err = fetch(&client, &url(&server, "/slow"), &HashMap::new())
            .await
            .expect_err("should time out");
        assert!(err.is_timeout());
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn rejects_non_http_scheme() {
        let ftp = Url::parse("ftp://guitartabsexplorer.com/").unwrap();
        let err = fetch(&http(), &ftp, &HashMap::new())
            .await
            .expect_err("should reject ftp");
        assert!(err.is_invalid_url());
    }

    #[test]
    fn decodes_declared_latin1() {
        let bytes: &[u8] = &[0x4d, 0x6f, 0x74, 0xf6, 0x72, 0x68, 0x65, 0x61, 0x64];
        let text = decode_body(bytes, Some("text/html; charset=ISO-8859-1"));
        assert_eq!(text, "Mot\u{f6}rhead");
    }

    #[test]
    fn charset_parameter_is_found_anywhere() {
        assert_eq!(extract_charset("text/html; charset=utf-8").as_deref(), Some("utf-8"));
        assert_eq!(extract_charset("text/html;CHARSET=\"UTF-8\"").as_deref(), Some("utf-8"));
        assert_eq!(extract_charset("text/html"), None);
    }
}
