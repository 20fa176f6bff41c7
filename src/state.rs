//! Shared application state injected into every handler.

use std::sync::Arc;
use tokio::sync::mpsc;

use crate::application::services::LinkService;
use crate::domain::click_event::ClickEvent;
use crate::domain::repositories::LinkRepository;
use crate::infrastructure::cache::CacheService;

/// Link service over whichever store backend was configured.
pub type DynLinkService = LinkService<dyn LinkRepository>;

/// Handles shared by all requests.
///
/// Cloning is cheap: every field is reference counted or a channel handle.
/// Dropping the last clone closes the click channel, which lets the click
/// worker drain and stop.
#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<DynLinkService>,
    pub cache: Arc<dyn CacheService>,
    pub click_sender: mpsc::Sender<ClickEvent>,
}

impl AppState {
    pub fn new(
        link_service: Arc<DynLinkService>,
        cache: Arc<dyn CacheService>,
        click_sender: mpsc::Sender<ClickEvent>,
    ) -> Self {
        Self {
            link_service,
            cache,
            click_sender,
        }
    }
}
