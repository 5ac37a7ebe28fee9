//! Blocking JSON-RPC 2.0 implementation of [`chain_eth::RpcGateway`] over
//! HTTP.

mod client;
mod dto;

pub use client::{HttpGateway, DEFAULT_TIMEOUT};
