mod friend_request;
mod profile;
mod relationship;

pub use friend_request::*;
pub use profile::*;
pub use relationship::*;
