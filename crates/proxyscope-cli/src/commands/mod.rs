pub(crate) mod blocklist;
pub(crate) mod scheduler;
pub(crate) mod watch;

#[cfg(test)]
pub(crate) mod test_support {
    use httpmock::MockServer;
    use httpmock::prelude::*;
    use reqwest::Client;
    use serde_json::{Value, json};
    use tempfile::TempDir;

    use crate::client::AppContext;

    pub(crate) fn context(server: &MockServer, dir: &TempDir) -> AppContext {
        AppContext {
            client: Client::new(),
            base_url: server.base_url().parse().expect("valid URL"),
            state_file: dir.path().join("state.json"),
        }
    }

    pub(crate) fn status_body(status: &str, interval: u32, threads: u32) -> Value {
        json!({
            "status": status,
            "validation_in_progress": false,
            "interval_seconds": interval,
            "validation_threads": threads,
            "test_url": "http://httpbin.org/ip",
            "last_run_time": "2025-06-01T10:00:00",
            "next_run_time": null,
            "current_proxy_count": 2,
            "valid_proxy_count": 1
        })
    }

    pub(crate) fn proxies_body() -> Value {
        json!([
            {"ip": "10.0.0.1", "port": 8080, "protocol": "http", "country": "US",
             "anonymity": "elite", "response_time": 40.0, "is_valid": true},
            {"ip": "10.0.0.2", "port": 3128, "protocol": "socks5", "country": "DE",
             "anonymity": "anonymous", "response_time": null, "is_valid": false}
        ])
    }

    pub(crate) fn mock_status<'a>(server: &'a MockServer, body: Value) -> httpmock::Mock<'a> {
        server.mock(|when, then| {
            when.method(GET).path("/scheduler/status");
            then.status(200).json_body(body);
        })
    }

    pub(crate) fn mock_proxies(server: &MockServer) -> httpmock::Mock<'_> {
        server.mock(|when, then| {
            when.method(GET)
                .path("/proxies")
                .query_param("only_valid", "false");
            then.status(200).json_body(proxies_body());
        })
    }
}
