//! Network layer - the HTTP transport collaborator
//!
//! The send pipeline only sees [`Transport`]; [`HttpTransport`] is the
//! `reqwest` implementation used by the binary.

pub mod client;

use crate::error::TransportError;
use crate::models::{ResolvedRequest, ResponseData};

pub use client::HttpTransport;

/// Sends one resolved request. Implementations never retry.
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn send(&self, request: &ResolvedRequest) -> Result<ResponseData, TransportError>;
}
