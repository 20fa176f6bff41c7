//! Domain layer containing business entities and logic.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`validation`] - Creation input validation
//! - [`click_event`] - Click tracking event model
//! - [`click_worker`] - Asynchronous click processing worker
//!
//! # Click Processing Flow
//!
//! 1. HTTP handler serves the redirect
//! 2. [`click_event::ClickEvent`] is offered to a bounded channel without waiting
//! 3. [`click_worker::run_click_worker`] applies events concurrently
//! 4. Counters are updated via [`repositories::LinkRepository::increment_clicks`]

pub mod click_event;
pub mod click_worker;
pub mod entities;
pub mod repositories;
pub mod validation;
