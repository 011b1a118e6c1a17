//! Shared setup for integration tests: a live server on an ephemeral port
//! backed by a temporary file database.

use url::Url;

use cookbook_server::http_server;
use cookbook_server::{ApiClient, Config, ServiceState, DEFAULT_PASSWORD, SEED_ADMIN_EMAIL};

pub struct TestServer {
    pub url: Url,
    pub state: ServiceState,
    _temp: tempfile::TempDir,
}

pub async fn spawn() -> TestServer {
    let temp = tempfile::tempdir().expect("temp dir");
    let config = Config {
        listen_addr: "127.0.0.1:0".parse().expect("loopback address"),
        database_path: Some(temp.path().join("cookbook.db")),
        log_filter: "info".to_string(),
        config_file: None,
    };

    let state = ServiceState::from_config(&config).await.expect("state");
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");

    let server_state = state.clone();
    tokio::spawn(async move {
        http_server::serve(listener, server_state).await.expect("serve");
    });

    TestServer {
        url: Url::parse(&format!("http://{addr}")).expect("server url"),
        state,
        _temp: temp,
    }
}

impl TestServer {
    /// Client authenticated as the seeded administrator.
    pub fn admin_client(&self) -> ApiClient {
        ApiClient::new(&self.url, SEED_ADMIN_EMAIL, DEFAULT_PASSWORD).expect("client")
    }

    /// Client authenticated as an arbitrary person.
    pub fn client(&self, email: &str, password: &str) -> ApiClient {
        ApiClient::new(&self.url, email, password).expect("client")
    }
}
