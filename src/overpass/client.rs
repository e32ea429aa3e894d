use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::OverpassClient;
use crate::error::FetchError;
use crate::types::Category;

/// Overpass responses for a dense square kilometre can exceed ureq's default
/// body limit.
const MAX_BODY_BYTES: u64 = 64 * 1024 * 1024;

/// How much of an error body is kept for the log.
const ERROR_BODY_CHARS: usize = 300;

/// One query against the map-data service.
#[derive(Debug, Clone, Copy)]
pub struct QueryRequest<'a> {
    pub category: Category,
    pub query: &'a str,
}

/// Something that can answer an Overpass query with a raw response body.
///
/// Implemented by the HTTP client and by [`ReplayService`]; tests supply
/// scripted fakes.
pub trait QueryService {
    fn execute(&self, request: &QueryRequest<'_>) -> Result<String, FetchError>;
}

impl QueryService for OverpassClient {
    fn execute(&self, request: &QueryRequest<'_>) -> Result<String, FetchError> {
        debug!(category = %request.category, url = %self.url(), "Sending query:\n{}", request.query);
        let mut response = self
            .agent
            .post(self.url())
            .send(request.query)
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .body_mut()
            .with_config()
            .limit(MAX_BODY_BYTES)
            .read_to_string()
            .map_err(|e| FetchError::Body(e.to_string()))?;

        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                body: body.chars().take(ERROR_BODY_CHARS).collect(),
            });
        }
        Ok(body)
    }
}

/// Answers queries from raw snapshots saved by an earlier run, one
/// `<category>.json` per category.
#[derive(Debug, Clone)]
pub struct ReplayService {
    dir: PathBuf,
}

impl ReplayService {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn snapshot_path(&self, category: Category) -> PathBuf {
        snapshot_path(&self.dir, category)
    }
}

impl QueryService for ReplayService {
    fn execute(&self, request: &QueryRequest<'_>) -> Result<String, FetchError> {
        let path = self.snapshot_path(request.category);
        fs::read_to_string(&path).map_err(|source| FetchError::Replay { path, source })
    }
}

/// Location of the raw response snapshot for `category` under `dir`.
pub fn snapshot_path(dir: &Path, category: Category) -> PathBuf {
    dir.join(format!("{}.json", category.name()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overpass::{Fetcher, RetryPolicy};
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::thread;
    use std::time::Duration;

    /// Answers `connections` requests on a local port with a fixed status and
    /// body. The join handle yields the number of requests served.
    fn serve(
        status_line: &'static str,
        body: &'static str,
        connections: usize,
    ) -> (String, thread::JoinHandle<usize>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/api/interpreter", listener.local_addr().unwrap());
        let handle = thread::spawn(move || {
            let mut served = 0;
            for stream in listener.incoming().take(connections) {
                let mut stream = stream.unwrap();
                read_request(&mut stream);
                let response = format!(
                    "HTTP/1.1 {status_line}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                stream.write_all(response.as_bytes()).unwrap();
                served += 1;
            }
            served
        });
        (url, handle)
    }

    fn read_request(stream: &mut TcpStream) {
        let mut reader = BufReader::new(stream);
        let mut content_length = 0;
        loop {
            let mut line = String::new();
            if reader.read_line(&mut line).unwrap() == 0 {
                return;
            }
            if line == "\r\n" {
                break;
            }
            if let Some((name, value)) = line.split_once(':') {
                if name.eq_ignore_ascii_case("content-length") {
                    content_length = value.trim().parse().unwrap();
                }
            }
        }
        let mut body = vec![0; content_length];
        reader.read_exact(&mut body).unwrap();
    }

    fn request() -> QueryRequest<'static> {
        QueryRequest {
            category: Category::Roads,
            query: "[out:json];way(0,0,1,1);out geom;",
        }
    }

    fn quick(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            backoff: Duration::ZERO,
        }
    }

    #[test]
    fn server_error_status_is_a_fetch_error() {
        let (url, server) = serve("503 Service Unavailable", "busy, try later", 1);
        let client = OverpassClient::new(&url, Duration::from_secs(5));

        let result = client.execute(&request());
        match result {
            Err(FetchError::Status { status, body }) => {
                assert_eq!(status, 503);
                assert_eq!(body, "busy, try later");
            }
            other => panic!("expected a status error, got {other:?}"),
        }
        assert_eq!(server.join().unwrap(), 1);
    }

    #[test]
    fn fetcher_retries_server_errors_then_gives_up() {
        let (url, server) = serve("503 Service Unavailable", "busy", 3);
        let client = OverpassClient::new(&url, Duration::from_secs(5));

        let outcome = Fetcher::new(&client, quick(3)).fetch(Category::Roads, request().query);
        assert!(outcome.failed());
        assert_eq!(outcome.attempts, 3);
        assert_eq!(server.join().unwrap(), 3);
    }

    #[test]
    fn non_json_success_body_is_retried_then_gives_up() {
        let (url, server) = serve("200 OK", "<html>rate limited</html>", 2);
        let client = OverpassClient::new(&url, Duration::from_secs(5));

        assert_eq!(client.execute(&request()).unwrap(), "<html>rate limited</html>");
        let outcome = Fetcher::new(&client, quick(1)).fetch(Category::Roads, request().query);
        assert!(outcome.failed());
        assert_eq!(server.join().unwrap(), 2);
    }

    #[test]
    fn successful_response_parses() {
        let (url, server) = serve("200 OK", r#"{"elements": []}"#, 1);
        let client = OverpassClient::new(&url, Duration::from_secs(5));

        let outcome = Fetcher::new(&client, quick(3)).fetch(Category::Roads, request().query);
        assert_eq!(outcome.attempts, 1);
        assert!(outcome.response.unwrap().elements.is_empty());
        assert_eq!(server.join().unwrap(), 1);
    }

    #[test]
    fn replay_reads_the_category_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("roads.json"), r#"{"elements": []}"#).unwrap();

        let service = ReplayService::new(dir.path());
        let body = service
            .execute(&QueryRequest {
                category: Category::Roads,
                query: "ignored",
            })
            .unwrap();
        assert_eq!(body, r#"{"elements": []}"#);
    }

    #[test]
    fn replay_of_missing_snapshot_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let service = ReplayService::new(dir.path());
        let result = service.execute(&QueryRequest {
            category: Category::Lakes,
            query: "ignored",
        });
        assert!(matches!(result, Err(FetchError::Replay { .. })));
    }
}
