//! Business logic services.

pub mod catalog;
pub mod requests;
pub mod state_count;
