//! Common test utilities shared across integration tests.
#![allow(dead_code)]

use std::path::Path;
use std::sync::{Arc, Once};

use kyckit_core::storage::{FileBackend, KeyValueBackend, MemoryBackend};
use kyckit_core::{ClientConfig, KycClient};
use tracing_subscriber::EnvFilter;

/// Routes `log` output of the crate to the test harness. Set `RUST_LOG` to see it.
pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Client over an in-memory backend; the backend is returned for direct inspection.
pub fn memory_client(base_url: &str) -> (KycClient, Arc<dyn KeyValueBackend>) {
    init_logging();
    let backend: Arc<dyn KeyValueBackend> = Arc::new(MemoryBackend::new());
    let client = KycClient::new(ClientConfig::with_base_url(base_url), backend.clone());
    (client, backend)
}

/// Client persisting under `root`.
pub fn file_client(root: &Path, base_url: &str) -> KycClient {
    init_logging();
    let backend = FileBackend::open(root).expect("open file backend");
    KycClient::new(ClientConfig::with_base_url(base_url), Arc::new(backend))
}

/// Successful response envelope around `data`.
pub fn envelope(data: &serde_json::Value) -> String {
    serde_json::json!({ "success": true, "data": data }).to_string()
}
