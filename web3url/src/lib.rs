#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Resolution engine for the EIP-4804 `web3://` URL scheme.
//!
//! A `web3://` URL addresses content and computation living on a blockchain:
//! `web3://<host>[:<chainId>]/<path>[?<query>]`, where the host is a literal
//! contract address or a resolvable name. This crate turns such a URL into a
//! read-only contract call and an HTTP-like response, implementing the full
//! decision tree: chain selection, ENS resolution with EIP-6821 content
//! pointers (including cross-chain EIP-3770 redirects), contract resolve-mode
//! detection (`auto` / `manual` / EIP-5219), typed argument coercion, and
//! response encoding with MIME detection and the optional JSON envelope.
//!
//! The engine is read-only and chain-agnostic: it reaches nodes exclusively
//! through the [`rpc::ChainClient`] / [`rpc::ClientFactory`] traits. The
//! companion `web3url-evm` crate provides an alloy-backed implementation.
//!
//! # Modules
//!
//! - [`chains`] - chain registry (ids, short names, RPC endpoints)
//! - [`url`] - web3:// URL parsing
//! - [`name`] - ENS resolution and content pointers
//! - [`args`] - path-segment type coercion
//! - [`mode`] - contract resolve-mode detection
//! - [`dispatch`] - the request pipeline
//! - [`response`] - response assembly and encoding
//! - [`rpc`] - the RPC capability seam
//! - [`error`] - error types

pub mod args;
pub mod chains;
pub mod dispatch;
pub mod error;
pub mod mode;
pub mod name;
pub mod response;
pub mod rpc;
pub mod url;

pub use chains::{ChainInfo, ChainRegistry};
pub use dispatch::Resolver;
pub use error::{ResolveError, RpcError};
pub use mode::Mode;
pub use response::Response;
pub use rpc::{ChainClient, ClientFactory};
pub use url::Web3Url;
