//! Path-segment type coercion for auto-mode calls.
//!
//! Five recognized argument types, probed in a fixed order. The table order
//! is the tie-break rule: auto-detection accepts the first type whose parser
//! succeeds, so a 42-character hex literal becomes `address`, never `bytes`,
//! because `address` sits earlier in the table. `string` is not
//! auto-detectable; it is the unconditional fallback once every probe has
//! declined.
//!
//! A segment may also request a type explicitly with a `type!value` prefix.
//! Explicit casts never fall through: a parse failure there is a hard
//! [`ResolveError::ArgumentCast`].

use std::str::FromStr;

use alloy_dyn_abi::{DynSolType, DynSolValue};
use alloy_primitives::{Address, B256, U256, hex};

use crate::error::ResolveError;
use crate::name;
use crate::rpc::ChainClient;

/// The closed set of argument types the coercion engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    /// Non-negative base-10 integer.
    Uint256,
    /// `0x`-prefixed 32-hex-digit word, left-aligned into 32 bytes.
    Bytes32,
    /// `0x`-prefixed 40-hex-digit literal, or a resolvable name.
    Address,
    /// `0x`-prefixed hex blob.
    Bytes,
    /// Anything; the fallback.
    String,
}

/// Probe table. Order is normative.
pub const ARG_KINDS: [ArgKind; 5] = [
    ArgKind::Uint256,
    ArgKind::Bytes32,
    ArgKind::Address,
    ArgKind::Bytes,
    ArgKind::String,
];

impl ArgKind {
    /// Solidity name of the type, as written in explicit casts and
    /// function signatures.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Uint256 => "uint256",
            Self::Bytes32 => "bytes32",
            Self::Address => "address",
            Self::Bytes => "bytes",
            Self::String => "string",
        }
    }

    /// Whether the type participates in auto-detection.
    #[must_use]
    pub const fn auto_detectable(self) -> bool {
        !matches!(self, Self::String)
    }

    /// The ABI type used when building the call signature.
    #[must_use]
    pub fn sol_type(self) -> DynSolType {
        match self {
            Self::Uint256 => DynSolType::Uint(256),
            Self::Bytes32 => DynSolType::FixedBytes(32),
            Self::Address => DynSolType::Address,
            Self::Bytes => DynSolType::Bytes,
            Self::String => DynSolType::String,
        }
    }
}

/// What a segment parser needs to know about the request it serves: the
/// active chain (for the name-resolution allow-list) and a client to resolve
/// names with.
#[derive(Debug, Clone, Copy)]
pub struct CoerceCtx<'a, C: ChainClient + ?Sized> {
    /// Id of the chain the call will be issued on.
    pub chain_id: u64,
    /// Client for the active chain.
    pub client: &'a C,
}

/// Coerces one path segment into a typed call argument.
///
/// Resolution order: explicit `type!` cast (strict), then the
/// auto-detectable probes in [`ARG_KINDS`] order, then `string`.
///
/// # Errors
///
/// [`ResolveError::ArgumentCast`] when an explicit cast fails. Auto-detection
/// itself cannot fail; `string` accepts everything.
pub async fn coerce_segment<C: ChainClient + ?Sized>(
    index: usize,
    segment: &str,
    ctx: &CoerceCtx<'_, C>,
) -> Result<(ArgKind, DynSolValue), ResolveError> {
    // Explicit cast?
    for kind in ARG_KINDS {
        if let Some(rest) = segment.strip_prefix(kind.name()).and_then(|s| s.strip_prefix('!')) {
            let value = parse_as(kind, rest, ctx).await.map_err(|reason| {
                ResolveError::ArgumentCast { index, kind: kind.name(), reason }
            })?;
            return Ok((kind, value));
        }
    }

    // Auto-detection, first match wins.
    for kind in ARG_KINDS.into_iter().filter(|k| k.auto_detectable()) {
        if let Ok(value) = parse_as(kind, segment, ctx).await {
            return Ok((kind, value));
        }
    }

    Ok((ArgKind::String, DynSolValue::String(segment.to_owned())))
}

/// Parses `raw` strictly as `kind`, returning a human-readable reason on
/// failure.
async fn parse_as<C: ChainClient + ?Sized>(
    kind: ArgKind,
    raw: &str,
    ctx: &CoerceCtx<'_, C>,
) -> Result<DynSolValue, String> {
    match kind {
        ArgKind::Uint256 => {
            if raw.starts_with("0x") {
                return Err("number must not be in hexadecimal format".into());
            }
            let value = U256::from_str_radix(raw, 10)
                .map_err(|_| "number is not parseable".to_owned())?;
            Ok(DynSolValue::Uint(value, 256))
        }
        ArgKind::Bytes32 => {
            if raw.len() != 34 {
                return Err("bad length (must be 0x plus 32 hex digits)".into());
            }
            let digits = raw.strip_prefix("0x").ok_or("must start with 0x")?;
            let decoded = hex::decode(digits).map_err(|_| "invalid hex digits".to_owned())?;
            // Fixed bytes are left-aligned in the 32-byte word.
            let mut word = B256::ZERO;
            word[..decoded.len()].copy_from_slice(&decoded);
            Ok(DynSolValue::FixedBytes(word, 32))
        }
        ArgKind::Address => {
            if raw.len() == 42 && raw.starts_with("0x") {
                let address =
                    Address::from_str(raw).map_err(|_| "invalid address literal".to_owned())?;
                return Ok(DynSolValue::Address(address));
            }
            if name::is_supported_name(raw, ctx.chain_id) {
                let address = name::resolve_address(raw, ctx.client)
                    .await
                    .map_err(|e| e.to_string())?;
                return Ok(DynSolValue::Address(address));
            }
            Err("unrecognized address".into())
        }
        ArgKind::Bytes => {
            let digits = raw.strip_prefix("0x").ok_or("must start with 0x")?;
            let decoded = hex::decode(digits).map_err(|_| "invalid hex digits".to_owned())?;
            Ok(DynSolValue::Bytes(decoded))
        }
        ArgKind::String => Ok(DynSolValue::String(raw.to_owned())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Bytes, address};

    use crate::error::RpcError;

    /// Client stub: optionally resolves every name to one address.
    struct Stub(Option<Address>);

    #[async_trait::async_trait]
    impl ChainClient for Stub {
        async fn call(&self, _to: Address, _data: Bytes) -> Result<Bytes, RpcError> {
            Err(RpcError::new("no calls in coercion tests"))
        }
        async fn ens_address(&self, _name: &str) -> Result<Address, RpcError> {
            Ok(self.0.unwrap_or(Address::ZERO))
        }
        async fn ens_text(&self, _name: &str, _key: &str) -> Result<Option<String>, RpcError> {
            Ok(None)
        }
    }

    fn ctx(client: &Stub) -> CoerceCtx<'_, Stub> {
        CoerceCtx { chain_id: 1, client }
    }

    #[tokio::test]
    async fn test_auto_detect_uint256() {
        let client = Stub(None);
        let (kind, value) = coerce_segment(0, "1234", &ctx(&client)).await.unwrap();
        assert_eq!(kind, ArgKind::Uint256);
        assert_eq!(value, DynSolValue::Uint(U256::from(1234u64), 256));
    }

    #[tokio::test]
    async fn test_auto_detect_address_before_bytes() {
        // 42 characters of hex parse as both address and bytes; the table
        // order makes address win.
        let client = Stub(None);
        let (kind, _) = coerce_segment(0, "0x1234567890123456789012345678901234567890", &ctx(&client))
            .await
            .unwrap();
        assert_eq!(kind, ArgKind::Address);
    }

    #[tokio::test]
    async fn test_auto_detect_bytes32() {
        let client = Stub(None);
        let raw = "0x00000000000000000000000000001234";
        assert_eq!(raw.len(), 34);
        let (kind, value) = coerce_segment(0, raw, &ctx(&client)).await.unwrap();
        assert_eq!(kind, ArgKind::Bytes32);
        let DynSolValue::FixedBytes(word, 32) = value else {
            panic!("expected fixed bytes")
        };
        // Left-aligned into the word.
        assert_eq!(word[13], 0x12);
        assert_eq!(word[14], 0x34);
        assert_eq!(word[16..], [0u8; 16]);
    }

    #[tokio::test]
    async fn test_auto_detect_bytes_and_string_fallback() {
        let client = Stub(None);
        let (kind, _) = coerce_segment(0, "0xdeadbeef", &ctx(&client)).await.unwrap();
        assert_eq!(kind, ArgKind::Bytes);

        let (kind, value) = coerce_segment(0, "hello world", &ctx(&client)).await.unwrap();
        assert_eq!(kind, ArgKind::String);
        assert_eq!(value, DynSolValue::String("hello world".into()));
    }

    #[tokio::test]
    async fn test_hex_number_is_not_uint() {
        // A short hex literal fails uint256, bytes32 and address, and lands
        // on bytes.
        let client = Stub(None);
        let (kind, _) = coerce_segment(0, "0x12", &ctx(&client)).await.unwrap();
        assert_eq!(kind, ArgKind::Bytes);
    }

    #[tokio::test]
    async fn test_explicit_cast_never_falls_through() {
        let client = Stub(None);
        let err = coerce_segment(3, "uint256!abc", &ctx(&client)).await.unwrap_err();
        match err {
            ResolveError::ArgumentCast { index, kind, .. } => {
                assert_eq!(index, 3);
                assert_eq!(kind, "uint256");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_explicit_string_cast_skips_detection() {
        let client = Stub(None);
        let (kind, value) = coerce_segment(0, "string!123", &ctx(&client)).await.unwrap();
        assert_eq!(kind, ArgKind::String);
        assert_eq!(value, DynSolValue::String("123".into()));
    }

    #[tokio::test]
    async fn test_name_resolves_as_address_argument() {
        let target = address!("00000000000000000000000000000000000000aa");
        let client = Stub(Some(target));
        let (kind, value) = coerce_segment(0, "vitalik.eth", &ctx(&client)).await.unwrap();
        assert_eq!(kind, ArgKind::Address);
        assert_eq!(value, DynSolValue::Address(target));
    }

    #[tokio::test]
    async fn test_name_on_unsupported_chain_falls_back_to_string() {
        let target = address!("00000000000000000000000000000000000000aa");
        let client = Stub(Some(target));
        let ctx = CoerceCtx { chain_id: 10, client: &client };
        let (kind, _) = coerce_segment(0, "vitalik.eth", &ctx).await.unwrap();
        assert_eq!(kind, ArgKind::String);
    }
}
