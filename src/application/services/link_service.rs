//! Link creation, lookup, click recording and deletion.

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::domain::validation::validate_create_link;
use crate::error::AppError;
use crate::utils::code_generator::{DEFAULT_CODE_LENGTH, generate_code, is_well_formed_code};
use serde_json::json;

/// Number of fresh codes tried before a generated-code creation gives up.
const MAX_GENERATE_ATTEMPTS: usize = 5;

/// Service for creating, resolving and deleting short links.
///
/// Uniqueness is left to the store: the service inserts and reacts to
/// [`AppError::Conflict`] instead of checking first.
pub struct LinkService<L: LinkRepository + ?Sized> {
    link_repository: Arc<L>,
    code_length: usize,
}

impl<L: LinkRepository + ?Sized> LinkService<L> {
    /// Creates a new link service generating codes of the default length.
    pub fn new(link_repository: Arc<L>) -> Self {
        Self {
            link_repository,
            code_length: DEFAULT_CODE_LENGTH,
        }
    }

    /// Sets the length of generated codes.
    ///
    /// The value is validated by [`crate::config::Config::validate`].
    pub fn with_code_length(mut self, code_length: usize) -> Self {
        self.code_length = code_length;
        self
    }

    /// Creates a short link.
    ///
    /// # Code Generation
    ///
    /// - If `custom_code` is provided it is validated and inserted once; a
    ///   taken code is reported as a conflict.
    /// - Otherwise a random code is generated and inserted, with a fresh code
    ///   on each collision, up to 5 attempts.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the URL or custom code is invalid.
    /// Returns [`AppError::Conflict`] naming the code if a custom code is taken.
    /// Returns [`AppError::Internal`] if generated codes kept colliding or the
    /// store failed.
    pub async fn create_link(
        &self,
        url: String,
        custom_code: Option<String>,
    ) -> Result<Link, AppError> {
        let validated = validate_create_link(&url, custom_code.as_deref())?;

        if let Some(code) = validated.code {
            return self
                .link_repository
                .create(NewLink::new(code, validated.url))
                .await;
        }

        for attempt in 1..=MAX_GENERATE_ATTEMPTS {
            let code = generate_code(self.code_length);

            match self
                .link_repository
                .create(NewLink::new(code.clone(), validated.url.clone()))
                .await
            {
                Err(AppError::Conflict { .. }) => {
                    tracing::debug!(code = %code, attempt, "Generated code collided, retrying");
                }
                result => return result,
            }
        }

        Err(AppError::internal(
            "Failed to generate unique code",
            json!({ "reason": "Too many collisions", "attempts": MAX_GENERATE_ATTEMPTS }),
        ))
    }

    /// Retrieves a link by its short code.
    ///
    /// Codes that cannot exist are answered without a store lookup.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link matches the code.
    /// Returns [`AppError::Internal`] on storage errors.
    pub async fn get_link(&self, code: &str) -> Result<Link, AppError> {
        if !is_well_formed_code(code) {
            return Err(AppError::link_not_found(code));
        }

        self.link_repository
            .find_by_code(code)
            .await?
            .ok_or_else(|| AppError::link_not_found(code))
    }

    /// Lists all links, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    pub async fn list_links(&self) -> Result<Vec<Link>, AppError> {
        self.link_repository.list().await
    }

    /// Records one click on `code` that happened at `clicked_at`.
    ///
    /// Returns `Ok(false)` if the link no longer exists.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    pub async fn record_click(
        &self,
        code: &str,
        clicked_at: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        self.link_repository.increment_clicks(code, clicked_at).await
    }

    /// Deletes a link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the link does not exist, including when
    /// a concurrent delete removed it first.
    /// Returns [`AppError::Internal`] on storage errors.
    pub async fn delete_link(&self, code: &str) -> Result<(), AppError> {
        self.get_link(code).await?;

        if self.link_repository.delete(code).await? {
            Ok(())
        } else {
            Err(AppError::link_not_found(code))
        }
    }

    /// Returns `(links, total_clicks)` across the whole store.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    pub async fn totals(&self) -> Result<(i64, i64), AppError> {
        let links = self.link_repository.count().await?;
        let clicks = self.link_repository.total_clicks().await?;
        Ok((links, clicks))
    }
}
