mod auth_service;
mod profile_service;
mod relationship_service;

pub use auth_service::*;
pub use profile_service::*;
pub use relationship_service::*;
