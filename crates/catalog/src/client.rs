//! Catalog API client.
//!
//! Async HTTP client using `reqwest`.

use gamedir_model::{Catalog, CatalogEntry, CatalogError, CatalogFuture, InstallerScript};
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::types::{GamesQuery, Page};

pub const DEFAULT_BASE_URL: &str = "https://lutris.net";

/// Client for a Lutris-compatible catalog API.
pub struct CatalogClient {
    http: reqwest::Client,
    base_url: String,
}

fn http_error(e: reqwest::Error) -> CatalogError {
    CatalogError::Http(e.to_string())
}

impl CatalogClient {
    /// Creates a client for the API rooted at `base_url`.
    pub fn new(base_url: &str) -> Result<Self, CatalogError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("gamedir/", env!("CARGO_PKG_VERSION"))),
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(http_error)?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sends a request and decodes the JSON body of a 2xx response.
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, CatalogError> {
        let resp = request.send().await.map_err(http_error)?;
        let status = resp.status();

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(CatalogError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.bytes().await.map_err(http_error)?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Looks up catalog entries for the given slugs, following pagination.
    pub async fn fetch_entries(&self, slugs: &[String]) -> Result<Vec<CatalogEntry>, CatalogError> {
        if slugs.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/api/games", self.base_url);
        let query = GamesQuery { games: slugs };
        let mut entries = Vec::new();
        let mut page_number = 1u32;

        loop {
            let request = self
                .http
                .post(&url)
                .query(&[("page", page_number)])
                .json(&query);
            let page: Page<CatalogEntry> = self.send(request).await?;
            debug!(
                page = page_number,
                results = page.results.len(),
                total = page.count,
                "catalog page received"
            );
            entries.extend(page.results);

            if page.next.is_none() {
                break;
            }
            page_number += 1;
        }

        Ok(entries)
    }

    /// Returns the installer scripts published for a game.
    pub async fn fetch_installers(&self, slug: &str) -> Result<Vec<InstallerScript>, CatalogError> {
        let encoded = utf8_percent_encode(slug, NON_ALPHANUMERIC).to_string();
        let url = format!("{}/api/installers/{encoded}", self.base_url);
        let page: Page<InstallerScript> = self.send(self.http.get(&url)).await?;
        debug!(game = slug, installers = page.results.len(), "installers received");
        Ok(page.results)
    }
}

impl Catalog for CatalogClient {
    fn get_catalog_entries<'a>(
        &'a self,
        slugs: &'a [String],
    ) -> CatalogFuture<'a, Vec<CatalogEntry>> {
        Box::pin(self.fetch_entries(slugs))
    }

    fn get_installer_scripts<'a>(
        &'a self,
        slug: &'a str,
    ) -> CatalogFuture<'a, Vec<InstallerScript>> {
        Box::pin(self.fetch_installers(slug))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    /// A request as seen by the mock server.
    #[derive(Debug, Clone)]
    struct Seen {
        request_line: String,
        body: String,
    }

    /// Reads one HTTP/1.1 request: headers, then `Content-Length` bytes.
    async fn read_request(stream: &mut TcpStream) -> Seen {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        let header_end = loop {
            let n = stream.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed before headers");
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
        };

        let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
        let content_length = head
            .lines()
            .find_map(|l| {
                let (name, value) = l.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().unwrap())
            })
            .unwrap_or(0);

        while buf.len() < header_end + content_length {
            let n = stream.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed before body");
            buf.extend_from_slice(&chunk[..n]);
        }

        Seen {
            request_line: head.lines().next().unwrap_or_default().to_string(),
            body: String::from_utf8_lossy(&buf[header_end..header_end + content_length])
                .to_string(),
        }
    }

    /// Starts a mock HTTP server answering each connection with the next
    /// scripted `(status, body)` pair. Returns its URL and the requests seen.
    async fn mock_server(responses: Vec<(u16, String)>) -> (String, Arc<Mutex<Vec<Seen>>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let url = format!("http://127.0.0.1:{port}");
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&seen);

        tokio::spawn(async move {
            for (status, body) in responses {
                let Ok((mut stream, _)) = listener.accept().await else {
                    return;
                };
                let request = read_request(&mut stream).await;
                recorded.lock().unwrap().push(request);

                let resp = format!(
                    "HTTP/1.1 {status} Status\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = stream.write_all(resp.as_bytes()).await;
                let _ = stream.shutdown().await;
            }
        });

        (url, seen)
    }

    fn slugs(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    #[tokio::test]
    async fn entries_follow_pagination() {
        let page1 = r#"{"count": 3, "next": "http://x/api/games?page=2", "previous": null,
            "results": [{"slug": "quake", "name": "Quake"}, {"slug": "doom", "name": "Doom"}]}"#;
        let page2 = r#"{"count": 3, "next": null, "previous": "http://x/api/games?page=1",
            "results": [{"slug": "hexen", "name": "Hexen", "aliases": [{"slug": "hexen-1"}]}]}"#;
        let (url, seen) = mock_server(vec![(200, page1.into()), (200, page2.into())]).await;

        let client = CatalogClient::new(&url).unwrap();
        let entries = client
            .get_catalog_entries(&slugs(&["quake", "doom", "hexen-1"]))
            .await
            .unwrap();

        let got: Vec<&str> = entries.iter().map(|e| e.slug.as_str()).collect();
        assert_eq!(got, ["quake", "doom", "hexen"]);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen[0].request_line.starts_with("POST /api/games?page=1 "));
        assert!(seen[1].request_line.starts_with("POST /api/games?page=2 "));
        let body: serde_json::Value = serde_json::from_str(&seen[0].body).unwrap();
        assert_eq!(body, serde_json::json!({"games": ["quake", "doom", "hexen-1"]}));
    }

    #[tokio::test]
    async fn empty_slug_list_makes_no_request() {
        // Nothing listens here; any request would fail.
        let client = CatalogClient::new("http://127.0.0.1:9").unwrap();
        let entries = client.get_catalog_entries(&[]).await.unwrap();
        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn installers_for_slug() {
        let json = r#"{"count": 2, "results": [
            {"slug": "quake-gog", "game_slug": "quake", "version": "GOG", "runner": "linux",
             "script": {"game": {"exe": "$GAMEDIR/quake"}}},
            {"slug": "quake-steam", "game_slug": "quake", "version": "Steam", "runner": "steam",
             "script": {"game": {"appid": 2310}}}
        ]}"#;
        let (url, seen) = mock_server(vec![(200, json.into())]).await;

        let client = CatalogClient::new(&format!("{url}/")).unwrap();
        let installers = client.get_installer_scripts("quake").await.unwrap();

        assert_eq!(installers.len(), 2);
        assert_eq!(installers[0].slug, "quake-gog");
        assert_eq!(installers[1].runner, "steam");
        assert!(seen.lock().unwrap()[0].request_line.starts_with("GET /api/installers/quake "));
    }

    #[tokio::test]
    async fn installer_slug_is_percent_encoded() {
        let (url, seen) = mock_server(vec![(200, r#"{"count": 0, "results": []}"#.into())]).await;

        let client = CatalogClient::new(&url).unwrap();
        let installers = client.get_installer_scripts("a b/c").await.unwrap();

        assert!(installers.is_empty());
        assert!(
            seen.lock().unwrap()[0]
                .request_line
                .starts_with("GET /api/installers/a%20b%2Fc ")
        );
    }

    #[tokio::test]
    async fn api_error_carries_status_and_body() {
        let (url, _) = mock_server(vec![(404, r#"{"detail":"Not found."}"#.into())]).await;

        let client = CatalogClient::new(&url).unwrap();
        let err = client.get_installer_scripts("nope").await.unwrap_err();

        match err {
            CatalogError::Api { status, body } => {
                assert_eq!(status, 404);
                assert!(body.contains("Not found"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn invalid_json_is_a_json_error() {
        let (url, _) = mock_server(vec![(200, "not json".into())]).await;

        let client = CatalogClient::new(&url).unwrap();
        let err = client.get_catalog_entries(&slugs(&["quake"])).await.unwrap_err();
        assert!(matches!(err, CatalogError::Json(_)));
    }

    #[tokio::test]
    async fn unreachable_server_is_an_http_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let client = CatalogClient::new(&format!("http://127.0.0.1:{port}")).unwrap();
        let err = client.get_installer_scripts("quake").await.unwrap_err();
        assert!(matches!(err, CatalogError::Http(_)));
    }

    #[tokio::test]
    async fn base_url_trailing_slash_is_trimmed() {
        let client = CatalogClient::new("https://lutris.net/").unwrap();
        assert_eq!(client.base_url(), DEFAULT_BASE_URL);
    }
}
