//! Supabase store boundary for the Marinex push service.
//!
//! The relational store (users, boats, marinas, the launch queue) is an
//! external collaborator; this crate specifies it at its interface boundary
//! only: typed row models, point and `IN` lookups, the transition RPC, the
//! notification insert and the GoTrue user/administrator checks.

pub mod client;
pub mod error;
pub mod models;

pub use client::StoreClient;
pub use error::StoreError;
pub use models::{
    AuthUser, BoatRow, MarinaRow, NotificationRow, ProfileRow, PushTokenRow, QueueEntryRow,
    TransitionedEntry,
};
