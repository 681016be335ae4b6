// --- File: crates/marinex_common/src/http.rs ---

pub mod client;
