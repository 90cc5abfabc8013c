//! Test server management.
//!
//! Runs the real router on an ephemeral localhost port inside the test's
//! runtime, with whatever [`AppState`] the test assembled.

use std::net::SocketAddr;

use confdesk::config::Config;
use confdesk::state::AppState;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Minimal valid configuration. Tests adjust fields directly.
pub fn test_config() -> Config {
    toml::from_str(
        r#"
[server]
listen = "127.0.0.1:0"

[backend]
url = "http://store.invalid"
service_key = "service-key"

[ai]
api_key = "sk-test"

[line]
channel_access_token = "line-token"

[line.login]
channel_id = "1650000000"
"#,
    )
    .expect("test config parses")
}

/// A running router instance.
pub struct TestServer {
    addr: SocketAddr,
    handle: JoinHandle<()>,
    client: reqwest::Client,
}

impl TestServer {
    /// Bind an ephemeral port and serve `state` on it.
    pub async fn spawn(state: AppState) -> anyhow::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let app = confdesk::http::router(state);
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        Ok(Self {
            addr,
            handle,
            client: reqwest::Client::new(),
        })
    }

    /// Absolute URL for `path`.
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Shared HTTP client.
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
