//! # superexpat-core
//!
//! Core library for superexpat - a terminal chat client for the SuperExpat
//! events & jobs backend.
//!
//! This library provides:
//! - Wire types for the backend API and the chat log
//! - An HTTP client ([`ChatClient`]) and the blocking [`ChatBackend`] seam
//! - The chat session state machine ([`ChatSession`])
//! - The presentation model for assistant turns ([`render`])
//! - Configuration management and logging infrastructure
//!
//! ## Example
//!
//! ```rust,no_run
//! use superexpat_core::{ChatSession, Config, HttpChatBackend};
//!
//! let config = Config::load().expect("failed to load config");
//! let backend = HttpChatBackend::new(&config.backend).expect("failed to create client");
//!
//! let mut session = ChatSession::new();
//! session.submit(&backend, "events in London");
//! for message in session.messages() {
//!     for line in superexpat_core::render::plain_lines(message) {
//!         println!("{line}");
//!     }
//! }
//! ```

// Re-export commonly used items at the crate root
pub use chat::{ChatSession, PendingTurn};
pub use client::{ChatBackend, ChatClient, HttpChatBackend};
pub use config::Config;
pub use error::{Error, Result};
pub use types::*;

// Public modules
pub mod chat;
pub mod client;
pub mod config;
pub mod error;
pub mod format;
pub mod logging;
pub mod render;
pub mod types;
