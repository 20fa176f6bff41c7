//! In-process implementation of link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use tokio::sync::RwLock;

use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

/// Link store kept in memory.
///
/// Honors the same contract as [`super::PgLinkRepository`]: inserts of an
/// existing code fail with a conflict, increments are atomic, and listing is
/// newest first. Contents are lost on restart.
///
/// Used by HTTP tests and by `STORAGE_BACKEND=memory` for local runs.
#[derive(Default)]
pub struct MemoryLinkRepository {
    links: RwLock<HashMap<String, Link>>,
}

impl MemoryLinkRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LinkRepository for MemoryLinkRepository {
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        let mut links = self.links.write().await;

        match links.entry(new_link.code) {
            Entry::Occupied(entry) => Err(AppError::code_taken(entry.key())),
            Entry::Vacant(entry) => {
                let link = Link::new(entry.key().clone(), new_link.url, 0, None, Utc::now());
                entry.insert(link.clone());
                Ok(link)
            }
        }
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError> {
        Ok(self.links.read().await.get(code).cloned())
    }

    async fn list(&self) -> Result<Vec<Link>, AppError> {
        let mut links: Vec<Link> = self.links.read().await.values().cloned().collect();

        links.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.code.cmp(&b.code))
        });

        Ok(links)
    }

    async fn increment_clicks(
        &self,
        code: &str,
        clicked_at: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let mut links = self.links.write().await;

        match links.get_mut(code) {
            Some(link) => {
                link.clicks += 1;
                link.last_clicked_at = link.last_clicked_at.max(Some(clicked_at));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, code: &str) -> Result<bool, AppError> {
        Ok(self.links.write().await.remove(code).is_some())
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(self.links.read().await.len() as i64)
    }

    async fn total_clicks(&self) -> Result<i64, AppError> {
        Ok(self.links.read().await.values().map(|link| link.clicks).sum())
    }
}
