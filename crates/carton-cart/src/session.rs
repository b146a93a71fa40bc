//! # Session and Identity Seams
//!
//! Trait seams for the collaborators a host framework supplies: a session
//! subsystem handing out stable per-client keys, and an optional
//! authenticated-user supplier.
//!
//! ## Ownership Key Derivation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 How a request maps to a cart                            │
//! │                                                                         │
//! │  SessionProvider.client_key("default")  ──► "3f2a…"  (stable uuid)     │
//! │  SessionProvider.client_key("wishlist") ──► "9c41…"  (separate key)    │
//! │                                                                         │
//! │  Each named instance gets its own session key, so "default" and        │
//! │  "wishlist" resolve to distinct cart rows for the same client.         │
//! │                                                                         │
//! │  UserProvider.current_user_id() ──► Some("42") after login             │
//! │                                     None while anonymous               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! These are explicit injected dependencies, never ambient globals: every
//! cart call threads (owner_key, user_id) through from here.

use std::collections::HashMap;
use std::sync::Mutex;

use uuid::Uuid;

// =============================================================================
// Traits
// =============================================================================

/// Supplies the session-derived ownership key for a cart instance.
///
/// Implementations wrap the host framework's session store. The key must
/// be stable for one client across requests and opaque to this crate.
pub trait SessionProvider: Send + Sync {
    /// Returns the client key for a named cart instance, creating and
    /// storing one on first access.
    fn client_key(&self, instance: &str) -> String;

    /// Forgets the stored key for an instance (used by destroy).
    fn forget(&self, instance: &str);
}

/// Supplies the currently authenticated user, if any.
pub trait UserProvider: Send + Sync {
    /// Returns the authenticated user id, or `None` while anonymous.
    fn current_user_id(&self) -> Option<String>;
}

// =============================================================================
// In-Process Implementations
// =============================================================================

/// In-process session store: one generated uuid per instance name.
///
/// Suitable for tests and for hosts without a session subsystem of their
/// own (single-client tools). Web hosts should implement
/// [`SessionProvider`] over their real session store instead.
#[derive(Debug, Default)]
pub struct MemorySession {
    keys: Mutex<HashMap<String, String>>,
}

impl MemorySession {
    /// Creates an empty in-process session store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionProvider for MemorySession {
    fn client_key(&self, instance: &str) -> String {
        let mut keys = self.keys.lock().unwrap_or_else(|e| e.into_inner());
        keys.entry(instance.to_string())
            .or_insert_with(|| Uuid::new_v4().to_string())
            .clone()
    }

    fn forget(&self, instance: &str) {
        let mut keys = self.keys.lock().unwrap_or_else(|e| e.into_inner());
        keys.remove(instance);
    }
}

/// User provider for hosts without authentication: always anonymous.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoUser;

impl UserProvider for NoUser {
    fn current_user_id(&self) -> Option<String> {
        None
    }
}

/// Switchable in-process user provider.
///
/// Lets tests (and simple hosts) flip between anonymous and logged-in
/// within one process.
#[derive(Debug, Default)]
pub struct MemoryUser {
    user_id: Mutex<Option<String>>,
}

impl MemoryUser {
    /// Creates an anonymous provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a user as logged in.
    pub fn login(&self, user_id: impl Into<String>) {
        let mut slot = self.user_id.lock().unwrap_or_else(|e| e.into_inner());
        *slot = Some(user_id.into());
    }

    /// Back to anonymous.
    pub fn logout(&self) {
        let mut slot = self.user_id.lock().unwrap_or_else(|e| e.into_inner());
        *slot = None;
    }
}

impl UserProvider for MemoryUser {
    fn current_user_id(&self) -> Option<String> {
        self.user_id
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
