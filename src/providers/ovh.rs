mod client;
mod error;

pub use client::{OVH_EU_API_BASE, OvhClient};
pub use error::OvhError;
