//! Server communication: wire protocol and UDP link

pub mod link;
pub mod protocol;

pub use link::{Link, LinkError};
