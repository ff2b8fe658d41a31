//! Domain name resolution.
//!
//! Currently ENS only: names ending in `.eth`, resolvable when the active
//! chain is mainnet, Goerli, or Sepolia. Content-pointer resolution follows
//! EIP-6821: a `contentcontract` text record, when set, redirects the name to
//! a contract address, optionally on another chain via an EIP-3770
//! `shortName:address` pair. The plain forward resolution is only the
//! fallback for a genuinely absent record; a malformed record is a hard
//! failure.

use std::str::FromStr;

use alloy_primitives::Address;

use crate::chains::ChainRegistry;
use crate::error::ResolveError;
use crate::rpc::ChainClient;

/// Name suffix handled by the ENS resolver.
pub const ENS_SUFFIX: &str = ".eth";

/// Chains on which ENS resolution is available.
pub const ENS_CHAIN_IDS: &[u64] = &[1, 5, 11155111];

/// Text record key for EIP-6821 content pointers.
pub const CONTENT_CONTRACT_KEY: &str = "contentcontract";

/// Result of content-pointer resolution: a target address and, when the
/// record carried an EIP-3770 pair, the id of the chain it lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentTarget {
    /// The resolved contract address.
    pub address: Address,
    /// Chain override from the record, absent when the target stays on the
    /// chain the name was resolved on.
    pub chain_id: Option<u64>,
}

/// Returns `true` when `host` is a name this resolver can handle on `chain_id`.
#[must_use]
pub fn is_supported_name(host: &str, chain_id: u64) -> bool {
    host.ends_with(ENS_SUFFIX) && ENS_CHAIN_IDS.contains(&chain_id)
}

/// Lowercases a name before hashing or lookup.
///
/// Full UTS-46/ENSIP-15 normalization is not performed; ASCII names are
/// unaffected and non-ASCII names should be pre-normalized by the caller.
#[must_use]
pub fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Plain forward resolution of a name to an address.
///
/// # Errors
///
/// [`ResolveError::UnsupportedName`] for an unrecognized suffix,
/// [`ResolveError::NameResolution`] when the name resolves to the all-zero
/// sentinel (unregistered), and any [`ResolveError::Rpc`] from the lookup.
pub async fn resolve_address<C: ChainClient + ?Sized>(
    name: &str,
    client: &C,
) -> Result<Address, ResolveError> {
    if !name.ends_with(ENS_SUFFIX) {
        return Err(ResolveError::UnsupportedName(name.to_owned()));
    }
    let address = client.ens_address(&normalize(name)).await?;
    if address.is_zero() {
        return Err(ResolveError::NameResolution(name.to_owned()));
    }
    Ok(address)
}

/// Content-pointer resolution per EIP-6821.
///
/// Reads the `contentcontract` text record first. When present it must be
/// either a bare `0x` address or a `shortName:address` pair whose short name
/// is known to `registry`. When absent (or empty), falls back to
/// [`resolve_address`] on the original chain.
///
/// # Errors
///
/// [`ResolveError::InvalidContentPointer`] for a malformed record, plus
/// everything [`resolve_address`] can raise on the fallback path.
pub async fn resolve_content_target<C: ChainClient + ?Sized>(
    name: &str,
    client: &C,
    registry: &ChainRegistry,
) -> Result<ContentTarget, ResolveError> {
    let record = client
        .ens_text(&normalize(name), CONTENT_CONTRACT_KEY)
        .await?
        .filter(|r| !r.is_empty());

    let Some(record) = record else {
        let address = resolve_address(name, client).await?;
        return Ok(ContentTarget { address, chain_id: None });
    };

    tracing::debug!(name, record, "found contentcontract record");
    parse_content_pointer(&record, registry)
}

/// Parses a `contentcontract` record body.
fn parse_content_pointer(
    record: &str,
    registry: &ChainRegistry,
) -> Result<ContentTarget, ResolveError> {
    let parts: Vec<&str> = record.split(':').collect();
    match parts.as_slice() {
        [address] => Ok(ContentTarget {
            address: parse_literal_address(address)?,
            chain_id: None,
        }),
        [short_name, address] => {
            let chain = registry.by_short_name(short_name).ok_or_else(|| {
                ResolveError::InvalidContentPointer(format!(
                    "unknown chain short name '{short_name}'"
                ))
            })?;
            Ok(ContentTarget {
                address: parse_literal_address(address)?,
                chain_id: Some(chain.id),
            })
        }
        _ => Err(ResolveError::InvalidContentPointer(format!(
            "expected 'address' or 'shortName:address', got '{record}'"
        ))),
    }
}

fn parse_literal_address(raw: &str) -> Result<Address, ResolveError> {
    if !raw.starts_with("0x") || raw.len() != 42 {
        return Err(ResolveError::InvalidContentPointer(format!(
            "invalid address '{raw}'"
        )));
    }
    Address::from_str(raw)
        .map_err(|_| ResolveError::InvalidContentPointer(format!("invalid address '{raw}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Bytes, address};

    use crate::error::RpcError;

    /// Canned ENS answers for resolver tests.
    #[derive(Default)]
    struct FakeEns {
        address: Option<Address>,
        text: Option<String>,
    }

    #[async_trait::async_trait]
    impl ChainClient for FakeEns {
        async fn call(&self, _to: Address, _data: Bytes) -> Result<Bytes, RpcError> {
            Err(RpcError::new("not a call test"))
        }

        async fn ens_address(&self, _name: &str) -> Result<Address, RpcError> {
            Ok(self.address.unwrap_or(Address::ZERO))
        }

        async fn ens_text(&self, _name: &str, key: &str) -> Result<Option<String>, RpcError> {
            assert_eq!(key, CONTENT_CONTRACT_KEY);
            Ok(self.text.clone())
        }
    }

    const TARGET: Address = address!("00000000000000000000000000000000000000aa");

    #[test]
    fn test_supported_names() {
        assert!(is_supported_name("vitalik.eth", 1));
        assert!(is_supported_name("vitalik.eth", 5));
        assert!(is_supported_name("vitalik.eth", 11155111));
        assert!(!is_supported_name("vitalik.eth", 10));
        assert!(!is_supported_name("vitalik.com", 1));
    }

    #[tokio::test]
    async fn test_plain_resolution_zero_is_unregistered() {
        let client = FakeEns::default();
        let err = resolve_address("ghost.eth", &client).await.unwrap_err();
        assert!(matches!(err, ResolveError::NameResolution(_)));
    }

    #[tokio::test]
    async fn test_plain_resolution_rejects_unknown_suffix() {
        let client = FakeEns { address: Some(TARGET), ..Default::default() };
        let err = resolve_address("a.com", &client).await.unwrap_err();
        assert!(matches!(err, ResolveError::UnsupportedName(_)));
    }

    #[tokio::test]
    async fn test_content_target_bare_address() {
        let client = FakeEns {
            text: Some(format!("{TARGET}")),
            ..Default::default()
        };
        let target = resolve_content_target("a.eth", &client, &ChainRegistry::known())
            .await
            .unwrap();
        assert_eq!(target.address, TARGET);
        assert_eq!(target.chain_id, None);
    }

    #[tokio::test]
    async fn test_content_target_eip3770_pair() {
        let client = FakeEns {
            text: Some(format!("oeth:{TARGET}")),
            ..Default::default()
        };
        let target = resolve_content_target("a.eth", &client, &ChainRegistry::known())
            .await
            .unwrap();
        assert_eq!(target.address, TARGET);
        assert_eq!(target.chain_id, Some(10));
    }

    #[tokio::test]
    async fn test_content_target_unknown_short_name_is_hard_failure() {
        let client = FakeEns {
            // Plain resolution would succeed, but must not be tried.
            address: Some(TARGET),
            text: Some(format!("nochain:{TARGET}")),
        };
        let err = resolve_content_target("a.eth", &client, &ChainRegistry::known())
            .await
            .unwrap_err();
        assert!(matches!(err, ResolveError::InvalidContentPointer(_)));
    }

    #[tokio::test]
    async fn test_content_target_malformed_address_is_hard_failure() {
        let client = FakeEns {
            address: Some(TARGET),
            text: Some("0x1234".into()),
        };
        let err = resolve_content_target("a.eth", &client, &ChainRegistry::known())
            .await
            .unwrap_err();
        assert!(matches!(err, ResolveError::InvalidContentPointer(_)));
    }

    #[tokio::test]
    async fn test_content_target_absent_falls_back_to_plain() {
        let client = FakeEns { address: Some(TARGET), text: None };
        let target = resolve_content_target("a.eth", &client, &ChainRegistry::known())
            .await
            .unwrap();
        assert_eq!(target.address, TARGET);
        assert_eq!(target.chain_id, None);
    }

    #[tokio::test]
    async fn test_content_target_empty_record_treated_as_absent() {
        let client = FakeEns { address: Some(TARGET), text: Some(String::new()) };
        let target = resolve_content_target("a.eth", &client, &ChainRegistry::known())
            .await
            .unwrap();
        assert_eq!(target.address, TARGET);
    }
}
