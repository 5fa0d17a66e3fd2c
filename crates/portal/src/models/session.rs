//! Session-related types for portal authentication.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use flash_pagamentos_core::Role;

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in user and
/// resolve their allowed pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Login name.
    pub username: String,
    /// Display name.
    pub name: String,
    /// Access tier driving the page permission table.
    pub role: Role,
}

/// A single assistant chat message kept in the session transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// "user" or "assistant".
    pub role: String,
    /// Message text.
    pub content: String,
}

/// Session keys for portal session data.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the assistant page's chat transcript.
    pub const CHAT_TRANSCRIPT: &str = "chat_transcript";
}
