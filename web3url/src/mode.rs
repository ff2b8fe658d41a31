//! Contract resolve-mode detection.
//!
//! Two ordered probes, first success wins, evaluated once per request:
//!
//! 1. a trial `request(string[],(string,string)[])` call with empty
//!    arguments — success means the contract implements EIP-5219;
//! 2. a `resolveMode()` read returning a `bytes32` word decoded as a
//!    NUL-stripped UTF-8 string — `"manual"` selects manual mode, `""` and
//!    `"auto"` (or any call failure) select auto mode, and anything else is
//!    an [`ResolveError::UnsupportedMode`] hard failure.
//!
//! Both probes are best-effort. A revert or transport failure during a probe
//! reads as "this probe did not match", never as a request error; the
//! capability seam deliberately does not distinguish the two. The only fatal
//! outcomes are an explicit-but-unrecognized mode string and a mode word
//! that is not valid UTF-8.

use std::fmt;

use alloy_primitives::Address;
use alloy_sol_types::{SolCall, sol};

use crate::error::ResolveError;
use crate::rpc::ChainClient;

sol! {
    /// Key/value pair used by EIP-5219 request parameters and response
    /// headers.
    #[derive(Debug, PartialEq, Eq)]
    struct KeyValue {
        string key;
        string value;
    }

    /// EIP-5219 `IDecentralizedApp` entry point.
    #[allow(missing_docs)]
    function request(string[] resource, KeyValue[] params) external view returns (uint256 statusCode, string body, KeyValue[] headers);

    /// EIP-4804 resolve-mode probe.
    #[allow(missing_docs)]
    function resolveMode() external view returns (bytes32);
}

/// The calling convention a target contract expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Path and query parsed into a typed method call.
    Auto,
    /// Raw path forwarded as calldata.
    Manual,
    /// EIP-5219 `request()` interface.
    Eip5219,
}

impl Mode {
    /// The mode's wire name, as reported in the `web3-resolve-mode` header.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Manual => "manual",
            Self::Eip5219 => "eip5219",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a single best-effort probe.
enum Probe<T> {
    /// The probe identified the mode.
    Matched(T),
    /// The probe did not apply; try the next one.
    NotMatched,
    /// The probe produced an answer the engine must not guess around.
    Fatal(ResolveError),
}

/// Detects the resolve mode of the contract at `address`.
///
/// # Errors
///
/// [`ResolveError::UnsupportedMode`] when `resolveMode()` returns an
/// unrecognized or non-UTF-8 value. Probe call failures are swallowed.
pub async fn detect_mode<C: ChainClient + ?Sized>(
    address: Address,
    client: &C,
) -> Result<Mode, ResolveError> {
    match probe_eip5219(address, client).await {
        Probe::Matched(()) => return Ok(Mode::Eip5219),
        Probe::NotMatched => {}
        Probe::Fatal(err) => return Err(err),
    }
    match probe_resolve_mode(address, client).await {
        Probe::Matched(mode) => Ok(mode),
        Probe::NotMatched => Ok(Mode::Auto),
        Probe::Fatal(err) => Err(err),
    }
}

/// Trial call to `request([], [])`. Matches only if the call succeeds and
/// the return data decodes with the EIP-5219 shape.
async fn probe_eip5219<C: ChainClient + ?Sized>(address: Address, client: &C) -> Probe<()> {
    let data = requestCall { resource: vec![], params: vec![] }.abi_encode();
    match client.call(address, data.into()).await {
        Ok(ret) if requestCall::abi_decode_returns(&ret).is_ok() => Probe::Matched(()),
        _ => Probe::NotMatched,
    }
}

/// Reads `resolveMode()` and classifies the decoded string.
async fn probe_resolve_mode<C: ChainClient + ?Sized>(address: Address, client: &C) -> Probe<Mode> {
    let data = resolveModeCall {}.abi_encode();
    let raw = match client.call(address, data.into()).await {
        Ok(raw) => raw,
        Err(_) => return Probe::NotMatched,
    };
    let Ok(word) = resolveModeCall::abi_decode_returns(&raw) else {
        return Probe::NotMatched;
    };

    let bytes: Vec<u8> = word.iter().copied().filter(|b| *b != 0).collect();
    let Ok(decoded) = String::from_utf8(bytes) else {
        return Probe::Fatal(ResolveError::UnsupportedMode(word.to_string()));
    };
    match decoded.as_str() {
        "" | "auto" => Probe::Matched(Mode::Auto),
        "manual" => Probe::Matched(Mode::Manual),
        _ => Probe::Fatal(ResolveError::UnsupportedMode(decoded)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use alloy_dyn_abi::DynSolValue;
    use alloy_primitives::{B256, Bytes, U256, address};

    use crate::error::RpcError;

    const TARGET: Address = address!("00000000000000000000000000000000000000aa");

    /// Answers calls by selector; everything else reverts.
    #[derive(Default)]
    struct SelectorClient {
        answers: HashMap<[u8; 4], Bytes>,
    }

    impl SelectorClient {
        fn answer(mut self, selector: [u8; 4], ret: Bytes) -> Self {
            self.answers.insert(selector, ret);
            self
        }
    }

    #[async_trait::async_trait]
    impl ChainClient for SelectorClient {
        async fn call(&self, _to: Address, data: Bytes) -> Result<Bytes, RpcError> {
            let selector: [u8; 4] = data
                .get(..4)
                .and_then(|s| s.try_into().ok())
                .unwrap_or_default();
            self.answers
                .get(&selector)
                .cloned()
                .ok_or_else(|| RpcError::new("execution reverted"))
        }
        async fn ens_address(&self, _name: &str) -> Result<Address, RpcError> {
            Ok(Address::ZERO)
        }
        async fn ens_text(&self, _name: &str, _key: &str) -> Result<Option<String>, RpcError> {
            Ok(None)
        }
    }

    fn encoded_5219_return() -> Bytes {
        DynSolValue::Tuple(vec![
            DynSolValue::Uint(U256::from(200u64), 256),
            DynSolValue::String("ok".into()),
            DynSolValue::Array(vec![]),
        ])
        .abi_encode_params()
        .into()
    }

    fn mode_word(text: &str) -> Bytes {
        let mut word = B256::ZERO;
        word[..text.len()].copy_from_slice(text.as_bytes());
        word.to_vec().into()
    }

    #[tokio::test]
    async fn test_request_probe_wins_first() {
        let client = SelectorClient::default()
            .answer(requestCall::SELECTOR, encoded_5219_return())
            .answer(resolveModeCall::SELECTOR, mode_word("manual"));
        assert_eq!(detect_mode(TARGET, &client).await.unwrap(), Mode::Eip5219);
    }

    #[tokio::test]
    async fn test_all_probes_failing_defaults_to_auto() {
        let client = SelectorClient::default();
        assert_eq!(detect_mode(TARGET, &client).await.unwrap(), Mode::Auto);
    }

    #[tokio::test]
    async fn test_resolve_mode_manual() {
        let client =
            SelectorClient::default().answer(resolveModeCall::SELECTOR, mode_word("manual"));
        assert_eq!(detect_mode(TARGET, &client).await.unwrap(), Mode::Manual);
    }

    #[tokio::test]
    async fn test_resolve_mode_auto_and_empty() {
        for text in ["auto", ""] {
            let client =
                SelectorClient::default().answer(resolveModeCall::SELECTOR, mode_word(text));
            assert_eq!(detect_mode(TARGET, &client).await.unwrap(), Mode::Auto);
        }
    }

    #[tokio::test]
    async fn test_unrecognized_resolve_mode_is_fatal() {
        let client =
            SelectorClient::default().answer(resolveModeCall::SELECTOR, mode_word("weird"));
        let err = detect_mode(TARGET, &client).await.unwrap_err();
        match err {
            ResolveError::UnsupportedMode(mode) => assert_eq!(mode, "weird"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_undecodable_probe_returns_fall_back_to_auto() {
        // Calls against a code-less address succeed with empty return data;
        // neither probe may treat that as a match.
        let client = SelectorClient::default()
            .answer(requestCall::SELECTOR, Bytes::new())
            .answer(resolveModeCall::SELECTOR, Bytes::new());
        assert_eq!(detect_mode(TARGET, &client).await.unwrap(), Mode::Auto);
    }

    #[tokio::test]
    async fn test_detection_is_idempotent() {
        let client =
            SelectorClient::default().answer(resolveModeCall::SELECTOR, mode_word("manual"));
        let first = detect_mode(TARGET, &client).await.unwrap();
        let second = detect_mode(TARGET, &client).await.unwrap();
        assert_eq!(first, second);
    }
}
