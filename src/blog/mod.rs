//! Blog posts and their ownership rules.

pub mod access;
mod store;

pub use access::{AccessError, ensure_owner, load_owned};
pub use store::BlogStore;
