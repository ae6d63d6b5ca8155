#![allow(dead_code)]

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use url::Url;

use onetime_daemon::http_server::api::client::ApiClient;
use onetime_daemon::http_server::{self, Config};
use onetime_daemon::store::{DynSecretStore, MemoryStore};
use onetime_daemon::ServiceState;

pub const FRONTEND: &str = "https://secrets.example.com";

/// A real API server on a loopback port
pub struct TestServer {
    pub base_url: Url,
    pub client: ApiClient,
    pub store: DynSecretStore,
    shutdown_tx: watch::Sender<()>,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub async fn start() -> Self {
        Self::with_store(Arc::new(MemoryStore::new())).await
    }

    pub async fn with_store(store: DynSecretStore) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let config = Config::new(addr, Some(Url::parse(FRONTEND).unwrap()));
        let router = http_server::router(&config, ServiceState::new(store.clone()));

        let (shutdown_tx, mut shutdown_rx) = watch::channel(());
        let handle = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.changed().await;
                })
                .await
                .unwrap();
        });

        let base_url = Url::parse(&format!("http://{}", addr)).unwrap();
        let client = ApiClient::new(&base_url).unwrap();

        Self {
            base_url,
            client,
            store,
            shutdown_tx,
            handle,
        }
    }

    pub fn url(&self, path: &str) -> Url {
        self.base_url.join(path).unwrap()
    }

    pub async fn stop(self) {
        let _ = self.shutdown_tx.send(());
        self.handle.await.unwrap();
    }
}
