//! ENS registry and resolver reads.
//!
//! Forward resolution (name to address) and text-record reads against the
//! canonical registry via plain `eth_call`, without a dedicated ENS crate.
//! The registry lives at the same address on every chain that carries an ENS
//! deployment (mainnet, Goerli, Sepolia).

use alloy_network::TransactionBuilder;
use alloy_primitives::{Address, B256, Bytes, keccak256};
use alloy_provider::{Provider, RootProvider};
use alloy_rpc_types_eth::TransactionRequest;
use alloy_sol_types::SolCall;

use web3url::RpcError;

/// The ENS registry contract address, identical across deployments.
pub const ENS_REGISTRY: Address =
    alloy_primitives::address!("00000000000C2E074eC69A0dFb2997BA6C7d2e1e");

mod abi {
    alloy_sol_types::sol! {
        function resolver(bytes32 node) external view returns (address);
        function addr(bytes32 node) external view returns (address);
        function text(bytes32 node, string key) external view returns (string);
    }
}

/// Computes the EIP-137 namehash of a domain name.
#[must_use]
pub fn namehash(name: &str) -> B256 {
    let mut node = B256::ZERO;
    if name.is_empty() {
        return node;
    }
    for label in name.rsplit('.') {
        let label_hash = keccak256(label.as_bytes());
        let mut buf = [0u8; 64];
        buf[..32].copy_from_slice(node.as_slice());
        buf[32..].copy_from_slice(label_hash.as_slice());
        node = keccak256(buf);
    }
    node
}

async fn eth_call(provider: &RootProvider, to: Address, data: Vec<u8>) -> Result<Bytes, RpcError> {
    let tx = TransactionRequest::default()
        .with_to(to)
        .with_input(Bytes::from(data));
    provider
        .call(tx)
        .await
        .map_err(|e| RpcError::new(e.to_string()))
}

/// Looks up the resolver contract for `node`, `None` when the registry has
/// no entry.
async fn resolver_for(provider: &RootProvider, node: B256) -> Result<Option<Address>, RpcError> {
    let data = abi::resolverCall { node }.abi_encode();
    let raw = eth_call(provider, ENS_REGISTRY, data).await?;
    let resolver = abi::resolverCall::abi_decode_returns(&raw)
        .map_err(|e| RpcError::new(format!("ens resolver decode failed: {e}")))?;
    Ok((!resolver.is_zero()).then_some(resolver))
}

/// Forward-resolves `name` to an address.
///
/// Returns the all-zero address when the name has no resolver or no address
/// record; interpreting that sentinel is the caller's business.
///
/// # Errors
///
/// Returns an error when a registry or resolver call fails on the wire or
/// returns undecodable data.
pub async fn resolve_address(provider: &RootProvider, name: &str) -> Result<Address, RpcError> {
    let node = namehash(name);
    let Some(resolver) = resolver_for(provider, node).await? else {
        return Ok(Address::ZERO);
    };

    let data = abi::addrCall { node }.abi_encode();
    let raw = eth_call(provider, resolver, data).await?;
    abi::addrCall::abi_decode_returns(&raw)
        .map_err(|e| RpcError::new(format!("ens addr decode failed: {e}")))
}

/// Reads the text record `key` for `name`, `None` when the name has no
/// resolver or the record is unset.
///
/// # Errors
///
/// Returns an error when a registry or resolver call fails on the wire or
/// returns undecodable data.
pub async fn resolve_text(
    provider: &RootProvider,
    name: &str,
    key: &str,
) -> Result<Option<String>, RpcError> {
    let node = namehash(name);
    let Some(resolver) = resolver_for(provider, node).await? else {
        return Ok(None);
    };

    let data = abi::textCall { node, key: key.to_owned() }.abi_encode();
    let raw = eth_call(provider, resolver, data).await?;
    let record = abi::textCall::abi_decode_returns(&raw)
        .map_err(|e| RpcError::new(format!("ens text decode failed: {e}")))?;
    Ok((!record.is_empty()).then_some(record))
}
