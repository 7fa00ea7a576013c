mod auth_service_fake;
mod profile_service_impl;
mod relationship_service_impl;

pub use auth_service_fake::*;
pub use profile_service_impl::*;
pub use relationship_service_impl::*;
