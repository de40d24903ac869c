//! Domain models and request/response DTOs.

pub mod params;
pub mod request;
pub mod state;
