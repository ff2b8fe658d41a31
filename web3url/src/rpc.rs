//! The RPC capability seam.
//!
//! The engine never speaks a wire protocol itself. Everything it needs from a
//! chain node is expressed by [`ChainClient`]: a raw read-only call plus the
//! two ENS primitives used by the domain resolver. A [`ClientFactory`] hands
//! the dispatcher a client for whatever chain a request ends up on, which may
//! differ from the chain it started on when a contentcontract record points
//! elsewhere.
//!
//! Policy decisions deliberately left to implementations: timeouts, retries,
//! rate limiting, transport fallback. The engine treats every failure from
//! this seam as terminal for the request.

use alloy_primitives::{Address, Bytes};

use crate::chains::ChainInfo;
use crate::error::RpcError;

/// Read-only access to one chain.
#[async_trait::async_trait]
pub trait ChainClient: Send + Sync {
    /// Submits a raw read-only call and returns the raw return data.
    ///
    /// Calling an address with no code must return empty bytes, not an
    /// error; the dispatcher relies on that to distinguish "not a contract"
    /// from a true revert.
    ///
    /// # Errors
    ///
    /// Returns an error if the call reverts or the transport fails.
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, RpcError>;

    /// Forward-resolves a name to an address.
    ///
    /// Returns the all-zero address when the name is unregistered; the
    /// domain resolver owns the interpretation of that sentinel.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup itself fails.
    async fn ens_address(&self, name: &str) -> Result<Address, RpcError>;

    /// Reads a text record for a name, `None` when the record is unset.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup itself fails.
    async fn ens_text(&self, name: &str, key: &str) -> Result<Option<String>, RpcError>;
}

#[async_trait::async_trait]
impl<T: ChainClient + ?Sized> ChainClient for std::sync::Arc<T> {
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, RpcError> {
        (**self).call(to, data).await
    }
    async fn ens_address(&self, name: &str) -> Result<Address, RpcError> {
        (**self).ens_address(name).await
    }
    async fn ens_text(&self, name: &str, key: &str) -> Result<Option<String>, RpcError> {
        (**self).ens_text(name, key).await
    }
}

/// Produces a [`ChainClient`] for a given chain.
pub trait ClientFactory: Send + Sync {
    /// The client type this factory builds.
    type Client: ChainClient;

    /// Builds a client connected to `chain`'s RPC endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint is unusable (malformed URL, etc.).
    fn client(&self, chain: &ChainInfo) -> Result<Self::Client, RpcError>;
}
