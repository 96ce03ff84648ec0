//! Auth-domain identifiers, scope sets, token responses, and identity claims.

pub mod claim;
pub mod id;
pub mod scope;
pub mod token;

pub use claim::*;
pub use id::*;
pub use scope::*;
pub use token::*;
