//! Logging through tracing while driving the client

use crate::support::mock_transport::MockTransport;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use tempodb::Filter;
use tracing_subscriber::EnvFilter;

/// In-memory log sink shared between the subscriber and the test
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Two pages of series followed by a failing third page
fn paged_transport() -> MockTransport {
    let transport = MockTransport::new();
    transport
        .respond(200, r#"{"data":[{"key":"a"}],"next":"/v1/series/?page=2"}"#)
        .respond(200, r#"{"data":[{"key":"b"}],"next":"/v1/series/?page=3"}"#)
        .respond(500, "boom");
    transport
}

fn drain_series(transport: &MockTransport) -> Vec<Result<String, tempodb::ClientError>> {
    transport
        .client()
        .get_series_by_filter(&Filter::new())
        .unwrap()
        .map(|series| series.map(|s| s.key))
        .collect()
}

#[test]
fn test_requests_and_page_fetches_are_logged() {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("tempodb=debug"))
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();

    let transport = paged_transport();
    let results = tracing::subscriber::with_default(subscriber, || drain_series(&transport));

    assert_eq!(results.len(), 3);
    assert!(results[2].is_err());

    let output = logs.contents();
    assert!(output.contains("GET /{version}/series/ with 0 params"), "{output}");
    assert!(output.contains("Fetching page 2 from /v1/series/?page=2"), "{output}");
    assert!(output.contains("Fetching page 3 from /v1/series/?page=3"), "{output}");
    assert!(output.contains("WARN"), "{output}");
    assert!(output.contains("Request failed with status 500: boom"), "{output}");
    assert!(!output.contains("secret"), "{output}");
}

#[test]
fn test_json_events_carry_level_and_message() {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::new("tempodb=debug"))
        .with_writer(move || writer.clone())
        .finish();

    let transport = paged_transport();
    tracing::subscriber::with_default(subscriber, || drain_series(&transport));

    let output = logs.contents();
    let events: Vec<serde_json::Value> = output
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    let page_fetches = events
        .iter()
        .filter(|e| e["level"] == "DEBUG")
        .filter(|e| {
            e["fields"]["message"]
                .as_str()
                .is_some_and(|m| m.starts_with("Fetching page"))
        })
        .count();
    assert_eq!(page_fetches, 2);

    let warnings: Vec<_> = events.iter().filter(|e| e["level"] == "WARN").collect();
    assert_eq!(warnings.len(), 1);
    assert_eq!(
        warnings[0]["fields"]["message"],
        "Request failed with status 500: boom"
    );
    assert!(!output.contains("secret"), "{output}");
}

#[test]
fn test_nothing_below_filter_level_is_written() {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("tempodb=warn"))
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();

    let transport = paged_transport();
    tracing::subscriber::with_default(subscriber, || drain_series(&transport));

    let output = logs.contents();
    assert!(!output.contains("Fetching page"), "{output}");
    assert_eq!(output.lines().count(), 1, "{output}");
}

#[test]
fn test_credentials_secret_not_in_debug_output() {
    let client = MockTransport::new().client();
    let debug = format!("{:?}", client.credentials());
    assert!(!debug.contains("\"secret\""), "{debug}");
    assert!(debug.contains("***"));
}
