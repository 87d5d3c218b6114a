//! API endpoint handlers.

pub mod entanglement;
pub mod health;
pub mod keys;
pub mod messages;
pub mod nodes;
