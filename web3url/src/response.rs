//! Terminal response assembly.
//!
//! A resolution always ends in a [`Response`]: either the contract output
//! wrapped with the right content type, or the fixed-shape error page
//! carrying whatever diagnostic headers had accumulated before the failure.

use std::collections::BTreeMap;

use alloy_dyn_abi::DynSolValue;
use alloy_primitives::hex;

use crate::error::ResolveError;

/// Content type used when nothing better is known.
pub const DEFAULT_MIME: &str = "text/html";

/// The HTTP-like response delivered to the hosting shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Outer status code.
    pub status_code: u16,
    /// Response headers, including the engine's `web3-*` diagnostics.
    pub headers: BTreeMap<String, String>,
    /// Raw body bytes.
    pub body: Vec<u8>,
    /// Content type, when the engine (rather than the contract) decided it.
    pub mime_type: Option<String>,
}

impl Response {
    /// Builds a success response and stamps the `Content-Type` header when a
    /// mime type is known.
    #[must_use]
    pub fn ok(mut headers: BTreeMap<String, String>, body: Vec<u8>, mime_type: Option<String>) -> Self {
        if let Some(mime) = &mime_type {
            headers.insert("Content-Type".to_owned(), mime.clone());
        }
        Self { status_code: 200, headers, body, mime_type }
    }

    /// Builds the uniform error page: the message inside `<pre>` at status
    /// 500, with the diagnostic headers accumulated so far.
    #[must_use]
    pub fn error_page(error: &ResolveError, headers: BTreeMap<String, String>) -> Self {
        let body = format!(
            "<html><head><meta charset=\"utf-8\" /></head><body><pre>{error}</pre></body></html>"
        );
        Self {
            status_code: 500,
            headers,
            body: body.into_bytes(),
            mime_type: Some(DEFAULT_MIME.to_owned()),
        }
    }
}

/// Looks up the MIME type for a trailing file extension.
#[must_use]
pub fn mime_for_extension(extension: &str) -> Option<String> {
    mime_guess::from_ext(extension)
        .first()
        .map(|mime| mime.essence_str().to_owned())
}

/// Renders one decoded value the way the original gateway stringified it:
/// decimal for integers, `0x` hex for bytes and words, EIP-55 checksum for
/// addresses, comma-joined elements for sequences.
#[must_use]
pub fn render_value(value: &DynSolValue) -> String {
    match value {
        DynSolValue::Bool(b) => b.to_string(),
        DynSolValue::Int(i, _) => i.to_string(),
        DynSolValue::Uint(u, _) => u.to_string(),
        DynSolValue::Address(a) => a.to_string(),
        DynSolValue::Function(f) => format!("0x{}", hex::encode(f.as_slice())),
        DynSolValue::FixedBytes(word, size) => format!("0x{}", hex::encode(&word[..*size])),
        DynSolValue::Bytes(bytes) => format!("0x{}", hex::encode(bytes)),
        DynSolValue::String(s) => s.clone(),
        DynSolValue::Array(items)
        | DynSolValue::FixedArray(items)
        | DynSolValue::Tuple(items) => items
            .iter()
            .map(render_value)
            .collect::<Vec<_>>()
            .join(","),
    }
}

/// JSON-encodes decoded call outputs for the `returns=` override: every
/// element stringified, always an array even for a single value.
///
/// # Errors
///
/// [`ResolveError::ResponseDecode`] if serialization fails, which for an
/// array of strings it cannot in practice.
pub fn json_encode_values(values: &[DynSolValue]) -> Result<Vec<u8>, ResolveError> {
    let rendered: Vec<String> = values.iter().map(render_value).collect();
    serde_json::to_vec(&rendered).map_err(|e| ResolveError::ResponseDecode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{B256, U256, address};

    #[test]
    fn test_mime_for_extension() {
        assert_eq!(mime_for_extension("svg").as_deref(), Some("image/svg+xml"));
        assert_eq!(mime_for_extension("html").as_deref(), Some("text/html"));
        assert_eq!(mime_for_extension("zzznope"), None);
    }

    #[test]
    fn test_render_values() {
        assert_eq!(render_value(&DynSolValue::Uint(U256::from(42u64), 256)), "42");
        assert_eq!(
            render_value(&DynSolValue::Address(address!(
                "d8dA6BF26964aF9D7eEd9e03E53415D37aA96045"
            ))),
            "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045"
        );
        assert_eq!(render_value(&DynSolValue::Bytes(vec![0xde, 0xad])), "0xdead");
        assert_eq!(render_value(&DynSolValue::String("hi".into())), "hi");
        let mut word = B256::ZERO;
        word[0] = 0xab;
        assert_eq!(
            render_value(&DynSolValue::FixedBytes(word, 32)),
            format!("0x{}", "ab".to_owned() + &"00".repeat(31))
        );
    }

    #[test]
    fn test_json_encode_always_an_array() {
        let body = json_encode_values(&[DynSolValue::Uint(U256::from(4u64), 256)]).unwrap();
        assert_eq!(body, br#"["4"]"#);

        let body = json_encode_values(&[
            DynSolValue::Uint(U256::from(4u64), 256),
            DynSolValue::String("x".into()),
        ])
        .unwrap();
        assert_eq!(body, br#"["4","x"]"#);
    }

    #[test]
    fn test_error_page_shape() {
        let err = ResolveError::UnknownChain(999);
        let response = Response::error_page(&err, BTreeMap::new());
        assert_eq!(response.status_code, 500);
        assert_eq!(response.mime_type.as_deref(), Some("text/html"));
        let body = String::from_utf8(response.body).unwrap();
        assert!(body.contains("<pre>no chain found for id 999</pre>"));
    }
}
