//! HTTP JSON-RPC chain client.

use alloy_network::TransactionBuilder;
use alloy_primitives::{Address, Bytes};
use alloy_provider::{Provider, RootProvider};
use alloy_rpc_types_eth::TransactionRequest;
use url::Url;

use web3url::chains::ChainInfo;
use web3url::{ChainClient, ClientFactory, RpcError};

use crate::ens;

/// Read-only chain client over an HTTP JSON-RPC endpoint.
#[derive(Debug, Clone)]
pub struct HttpClient {
    provider: RootProvider,
}

impl HttpClient {
    /// Connects to an HTTP JSON-RPC endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error when `rpc_url` is not a valid URL.
    pub fn new(rpc_url: &str) -> Result<Self, RpcError> {
        let url = Url::parse(rpc_url)
            .map_err(|e| RpcError::new(format!("invalid rpc url {rpc_url}: {e}")))?;
        Ok(Self { provider: RootProvider::new_http(url) })
    }

    /// The underlying alloy provider.
    #[must_use]
    pub const fn provider(&self) -> &RootProvider {
        &self.provider
    }
}

#[async_trait::async_trait]
impl ChainClient for HttpClient {
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, RpcError> {
        let tx = TransactionRequest::default().with_to(to).with_input(data);
        self.provider
            .call(tx)
            .await
            .map_err(|e| RpcError::new(e.to_string()))
    }

    async fn ens_address(&self, name: &str) -> Result<Address, RpcError> {
        ens::resolve_address(&self.provider, name).await
    }

    async fn ens_text(&self, name: &str, key: &str) -> Result<Option<String>, RpcError> {
        ens::resolve_text(&self.provider, name, key).await
    }
}

/// Builds an [`HttpClient`] per chain from the registry's RPC endpoint.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpClientFactory;

impl HttpClientFactory {
    /// Creates the factory.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ClientFactory for HttpClientFactory {
    type Client = HttpClient;

    fn client(&self, chain: &ChainInfo) -> Result<Self::Client, RpcError> {
        HttpClient::new(&chain.rpc_url)
    }
}
