#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Alloy-backed EVM chain access for the `web3url` resolution engine.
//!
//! Implements [`web3url::ChainClient`] over an HTTP JSON-RPC provider,
//! including the ENS registry and resolver reads the engine's name resolver
//! depends on.
//!
//! ```no_run
//! use web3url::{ChainRegistry, Resolver};
//! use web3url_evm::HttpClientFactory;
//!
//! # async fn run() {
//! let resolver = Resolver::new(ChainRegistry::known(), HttpClientFactory::new());
//! let response = resolver.resolve("web3://vitalik.eth/").await;
//! # let _ = response;
//! # }
//! ```

pub mod client;
pub mod ens;

pub use client::{HttpClient, HttpClientFactory};
