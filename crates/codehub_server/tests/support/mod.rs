//! Shared integration-test server bootstrap helpers.

use axum_test::TestServer;
use codehub_server::{create_app, AppState, Config, MemoryBackend};

pub(crate) fn test_config() -> Config {
    Config {
        port: 0,
        max_upload_size: 64 * 1024,
        ..Config::default()
    }
}

pub(crate) fn test_server_for_config(config: Config) -> TestServer {
    let state = AppState::new(config, MemoryBackend::new());
    let app = create_app(state, false);
    TestServer::new(app).expect("server")
}

pub(crate) fn setup_test_server() -> TestServer {
    test_server_for_config(test_config())
}
