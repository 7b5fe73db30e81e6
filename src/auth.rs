//! Auth-domain scope lists, token secrets, and token grants.

pub mod scope;
pub mod token;

pub use scope::*;
pub use token::{grant::*, secret::*};
