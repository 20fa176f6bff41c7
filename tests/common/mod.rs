#![allow(dead_code)]

use async_trait::async_trait;
use axum::{Router, routing::get};
use axum_test::TestServer;
use link_shortener::api::handlers::{health_handler, redirect_handler};
use link_shortener::api::routes::link_routes;
use link_shortener::application::services::LinkService;
use link_shortener::domain::click_event::ClickEvent;
use link_shortener::domain::entities::NewLink;
use link_shortener::domain::repositories::LinkRepository;
use link_shortener::infrastructure::cache::{CacheResult, CacheService, NullCache};
use link_shortener::infrastructure::persistence::MemoryLinkRepository;
use link_shortener::state::{AppState, DynLinkService};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{RwLock, mpsc};

/// State over an empty in-memory store, plus the click receiver and the store itself.
pub fn create_test_state() -> (
    AppState,
    mpsc::Receiver<ClickEvent>,
    Arc<MemoryLinkRepository>,
) {
    create_test_state_with_capacity(100)
}

pub fn create_test_state_with_capacity(
    capacity: usize,
) -> (
    AppState,
    mpsc::Receiver<ClickEvent>,
    Arc<MemoryLinkRepository>,
) {
    build_state(capacity, Arc::new(NullCache::new()))
}

/// Like [`create_test_state`], but redirects go through `cache`.
pub fn create_test_state_with_cache(
    cache: Arc<MapCache>,
) -> (
    AppState,
    mpsc::Receiver<ClickEvent>,
    Arc<MemoryLinkRepository>,
) {
    build_state(100, cache)
}

fn build_state(
    capacity: usize,
    cache: Arc<dyn CacheService>,
) -> (
    AppState,
    mpsc::Receiver<ClickEvent>,
    Arc<MemoryLinkRepository>,
) {
    let (tx, rx) = mpsc::channel(capacity);
    let repo = Arc::new(MemoryLinkRepository::new());

    let link_repo: Arc<dyn LinkRepository> = repo.clone();
    let link_service: Arc<DynLinkService> = Arc::new(LinkService::new(link_repo));

    let state = AppState::new(link_service, cache, tx);

    (state, rx, repo)
}

/// Redirect cache held in a map, standing in for Redis.
#[derive(Default)]
pub struct MapCache {
    entries: RwLock<HashMap<String, String>>,
}

impl MapCache {
    pub async fn get(&self, code: &str) -> Option<String> {
        self.entries.read().await.get(code).cloned()
    }

    pub async fn insert(&self, code: &str, url: &str) {
        self.entries
            .write()
            .await
            .insert(code.to_string(), url.to_string());
    }

    /// Waits for the background fill after a cache miss.
    pub async fn wait_for(&self, code: &str) -> Option<String> {
        for _ in 0..100 {
            if let Some(url) = self.get(code).await {
                return Some(url);
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        None
    }
}

#[async_trait]
impl CacheService for MapCache {
    async fn get_url(&self, code: &str) -> CacheResult<Option<String>> {
        Ok(self.get(code).await)
    }

    async fn set_url(&self, code: &str, url: &str, _ttl: Option<u64>) -> CacheResult<()> {
        self.insert(code, url).await;
        Ok(())
    }

    async fn invalidate(&self, code: &str) -> CacheResult<()> {
        self.entries.write().await.remove(code);
        Ok(())
    }
}

pub async fn create_test_link(repo: &MemoryLinkRepository, code: &str, url: &str) {
    repo.create(NewLink::new(code, url)).await.unwrap();
}

/// Every route of the service without the rate limiter.
pub fn test_server(state: AppState) -> TestServer {
    let app = Router::new()
        .route("/healthz", get(health_handler))
        .route("/{code}", get(redirect_handler))
        .nest("/api", link_routes())
        .with_state(state);

    TestServer::new(app).unwrap()
}
