//! Auth-domain credential material and token models.

pub mod credentials;
pub mod token;

pub use credentials::*;
pub use token::{record::*, secret::*};
