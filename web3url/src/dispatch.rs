//! Request dispatch: the resolution pipeline.
//!
//! One request is one strictly sequential pass: parse the URL, select the
//! chain, resolve the host to an address, detect the contract's resolve
//! mode, build and issue the mode-specific call, encode the response. Each
//! stage gates the next; the first failure short-circuits into the uniform
//! error page, carrying whatever diagnostic headers had been stamped by the
//! stages that did run.

use std::collections::BTreeMap;
use std::str::FromStr;

use alloy_dyn_abi::{DynSolType, DynSolValue};
use alloy_primitives::{Address, Bytes, hex, keccak256};

use crate::args::{self, ArgKind, CoerceCtx};
use crate::chains::{ChainRegistry, DEFAULT_CHAIN_ID};
use crate::error::ResolveError;
use crate::mode::{self, KeyValue, Mode, requestCall};
use crate::name;
use crate::response::{self, DEFAULT_MIME, Response};
use crate::rpc::{ChainClient, ClientFactory};
use crate::url::Web3Url;

use alloy_sol_types::SolCall;

/// The web3:// resolution engine.
///
/// Owns the immutable chain registry and a factory for per-chain RPC
/// clients. Requests are independent: the resolver holds no per-request
/// state and can serve concurrent resolutions without locking.
#[derive(Debug)]
pub struct Resolver<F: ClientFactory> {
    chains: ChainRegistry,
    factory: F,
}

impl<F: ClientFactory> Resolver<F> {
    /// Creates a resolver over the given registry and client factory.
    pub const fn new(chains: ChainRegistry, factory: F) -> Self {
        Self { chains, factory }
    }

    /// Returns the chain registry.
    #[must_use]
    pub const fn chains(&self) -> &ChainRegistry {
        &self.chains
    }

    /// Resolves a web3:// URL into a response.
    ///
    /// Never fails: every error becomes the fixed-shape HTML error page at
    /// status 500, carrying the diagnostics accumulated before the failure.
    pub async fn resolve(&self, raw_url: &str) -> Response {
        let mut headers = BTreeMap::new();
        match self.resolve_inner(raw_url, &mut headers).await {
            Ok(response) => response,
            Err(error) => {
                tracing::debug!(%error, url = raw_url, "resolution failed");
                Response::error_page(&error, headers)
            }
        }
    }

    async fn resolve_inner(
        &self,
        raw_url: &str,
        headers: &mut BTreeMap<String, String>,
    ) -> Result<Response, ResolveError> {
        let url = Web3Url::parse(raw_url)?;

        let mut chain = match url.chain_id {
            Some(id) => self
                .chains
                .by_id(id)
                .ok_or(ResolveError::UnknownChain(id))?,
            None => self
                .chains
                .mainnet()
                .ok_or(ResolveError::UnknownChain(DEFAULT_CHAIN_ID))?,
        }
        .clone();
        let mut client = self.factory.client(&chain)?;

        // Literal addresses skip name resolution entirely.
        let address = if let Some(address) = literal_address(&url.host) {
            address
        } else if name::is_supported_name(&url.host, chain.id) {
            headers.insert("web3-nameservice-chainid".into(), chain.id.to_string());
            let target = name::resolve_content_target(&url.host, &client, &self.chains).await?;
            if let Some(id) = target.chain_id {
                // The contentcontract record moved us to another chain.
                chain = self
                    .chains
                    .by_id(id)
                    .ok_or(ResolveError::UnknownChain(id))?
                    .clone();
                client = self.factory.client(&chain)?;
            }
            target.address
        } else {
            return Err(ResolveError::UnsupportedName(url.host.clone()));
        };
        headers.insert("web3-target-chainid".into(), chain.id.to_string());
        headers.insert("web3-contract-address".into(), address.to_string());

        // A dot in the final segment may carry a file extension. It only
        // influences auto-mode arguments and the auto/manual content type;
        // eip5219 contracts see the path untouched and set their own headers.
        let (segments, extension_mime) = strip_extension(&url.segments);

        let resolve_mode = mode::detect_mode(address, &client).await?;
        headers.insert("web3-resolve-mode".into(), resolve_mode.to_string());
        tracing::debug!(mode = %resolve_mode, %address, chain = chain.id, "dispatching call");

        match resolve_mode {
            Mode::Manual => {
                self.call_raw(&url, address, &client, headers, extension_mime, false)
                    .await
            }
            Mode::Auto if url.is_root() => {
                // Auto-mode frontpage: an empty-calldata call.
                self.call_raw(&url, address, &client, headers, extension_mime, true)
                    .await
            }
            Mode::Auto => {
                self.call_auto(&url, &segments, address, chain.id, &client, headers, extension_mime)
                    .await
            }
            Mode::Eip5219 => self.call_eip5219(&url, address, &client, headers).await,
        }
    }

    /// Manual-mode call (or the auto-mode frontpage): the raw path and query
    /// as calldata, return data decoded as one ABI `bytes` value.
    async fn call_raw(
        &self,
        url: &Web3Url,
        address: Address,
        client: &F::Client,
        headers: &mut BTreeMap<String, String>,
        extension_mime: Option<String>,
        empty_calldata: bool,
    ) -> Result<Response, ResolveError> {
        let calldata: Bytes = if empty_calldata {
            Bytes::new()
        } else {
            let mut payload = url.raw_path.clone();
            if let Some(query) = url.raw_query.as_deref().filter(|q| !q.is_empty()) {
                payload.push('?');
                payload.push_str(query);
            }
            payload.into_bytes().into()
        };
        headers.insert("web3-calldata".into(), format!("0x{}", hex::encode(&calldata)));

        let raw = client
            .call(address, calldata)
            .await
            .map_err(|e| ResolveError::CallReverted(e.to_string()))?;
        // A successful call with no return data is what calling a code-less
        // address looks like.
        if raw.is_empty() {
            return Err(ResolveError::NotAContract(address));
        }

        let body = decode_single_bytes(&raw)?;
        let mime = extension_mime.unwrap_or_else(|| DEFAULT_MIME.to_owned());
        Ok(Response::ok(std::mem::take(headers), body, Some(mime)))
    }

    /// Auto-mode call: first segment is the method, the rest are coerced
    /// arguments, `returns=` overrides the assumed `(string)` output.
    #[allow(clippy::too_many_arguments)]
    async fn call_auto(
        &self,
        url: &Web3Url,
        segments: &[String],
        address: Address,
        chain_id: u64,
        client: &F::Client,
        headers: &mut BTreeMap<String, String>,
        extension_mime: Option<String>,
    ) -> Result<Response, ResolveError> {
        let method = segments.get(1).cloned().unwrap_or_default();

        let ctx = CoerceCtx { chain_id, client };
        let mut kinds: Vec<ArgKind> = Vec::new();
        let mut values: Vec<DynSolValue> = Vec::new();
        for (index, segment) in segments.iter().skip(2).enumerate() {
            let (kind, value) = args::coerce_segment(index, segment, &ctx).await?;
            kinds.push(kind);
            values.push(value);
        }

        let returns = parse_returns_param(url.query_value("returns"))?;

        headers.insert("web3-auto-method".into(), method.clone());
        headers.insert("web3-auto-method-arg-types".into(), type_list_json(kinds.iter().map(|k| k.name().to_owned())));
        headers.insert(
            "web3-auto-method-arg-values".into(),
            serde_json::to_string(&values.iter().map(response::render_value).collect::<Vec<_>>())
                .map_err(|e| ResolveError::ResponseDecode(e.to_string()))?,
        );
        headers.insert(
            "web3-auto-method-return".into(),
            type_list_json(returns.types.iter().map(|t| t.sol_type_name().into_owned())),
        );

        let signature = format!(
            "{method}({})",
            kinds.iter().map(|k| k.name()).collect::<Vec<_>>().join(",")
        );
        let mut calldata = keccak256(signature.as_bytes())[..4].to_vec();
        if !values.is_empty() {
            calldata.extend(DynSolValue::Tuple(values).abi_encode_params());
        }

        let raw = client
            .call(address, calldata.into())
            .await
            .map_err(|e| ResolveError::CallReverted(e.to_string()))?;
        let outputs = decode_params(&returns.types, &raw)?;

        if returns.json_encode {
            let body = response::json_encode_values(&outputs)?;
            Ok(Response::ok(
                std::mem::take(headers),
                body,
                Some("application/json".to_owned()),
            ))
        } else {
            let first = outputs
                .first()
                .ok_or_else(|| ResolveError::ResponseDecode("call returned no value".into()))?;
            let body = response::render_value(first).into_bytes();
            let mime = extension_mime.unwrap_or_else(|| DEFAULT_MIME.to_owned());
            Ok(Response::ok(std::mem::take(headers), body, Some(mime)))
        }
    }

    /// EIP-5219 call: path segments and query pairs forwarded verbatim, the
    /// contract's `(statusCode, body, headers)` used as-is.
    async fn call_eip5219(
        &self,
        url: &Web3Url,
        address: Address,
        client: &F::Client,
        headers: &mut BTreeMap<String, String>,
    ) -> Result<Response, ResolveError> {
        let mut resource: Vec<String> = url
            .raw_path
            .split('/')
            .skip(1)
            .map(str::to_owned)
            .collect();
        // The frontpage is an empty resource list.
        if resource.as_slice() == [String::new()] {
            resource.clear();
        }
        let params: Vec<KeyValue> = url
            .query
            .iter()
            .map(|(key, value)| KeyValue { key: key.clone(), value: value.clone() })
            .collect();

        let data = requestCall { resource, params }.abi_encode();
        let raw = client
            .call(address, data.into())
            .await
            .map_err(|e| ResolveError::CallReverted(e.to_string()))?;
        let ret = requestCall::abi_decode_returns(&raw)
            .map_err(|e| ResolveError::ResponseDecode(e.to_string()))?;

        for kv in ret.headers {
            headers.insert(kv.key, kv.value);
        }
        Ok(Response {
            status_code: ret.statusCode.try_into().unwrap_or(u16::MAX),
            headers: std::mem::take(headers),
            body: ret.body.into_bytes(),
            mime_type: None,
        })
    }
}

/// Parsed `returns=` override.
#[derive(Debug)]
struct ReturnsParam {
    types: Vec<DynSolType>,
    json_encode: bool,
}

/// Parses the optional `returns=` query parameter.
///
/// Absent (or too short to carry brackets): the assumed `(string)` output,
/// no JSON envelope. Present: a parenthesized comma-separated type list;
/// an empty list means `(bytes)`. Presence always forces JSON output.
fn parse_returns_param(raw: Option<&str>) -> Result<ReturnsParam, ResolveError> {
    let Some(raw) = raw.filter(|r| r.len() >= 2) else {
        return Ok(ReturnsParam { types: vec![DynSolType::String], json_encode: false });
    };
    let inner = raw
        .strip_prefix('(')
        .and_then(|r| r.strip_suffix(')'))
        .ok_or_else(|| {
            ResolveError::UrlParse(format!("returns parameter must be parenthesized, got '{raw}'"))
        })?;

    let parts: Vec<&str> = inner.split(',').map(str::trim).filter(|p| !p.is_empty()).collect();
    if parts.is_empty() {
        return Ok(ReturnsParam { types: vec![DynSolType::Bytes], json_encode: true });
    }
    let types = parts
        .into_iter()
        .map(|part| {
            DynSolType::parse(part).map_err(|_| {
                ResolveError::UrlParse(format!("unknown type '{part}' in returns parameter"))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ReturnsParam { types, json_encode: true })
}

/// Strips a recognized file extension from the final path segment.
///
/// Returns the (possibly rewritten) segments and the MIME type of the
/// extension. Unrecognized extensions leave the segment untouched.
fn strip_extension(segments: &[String]) -> (Vec<String>, Option<String>) {
    let mut segments = segments.to_vec();
    let mime = segments.last().and_then(|last| {
        let (stem, extension) = last.rsplit_once('.')?;
        let mime = response::mime_for_extension(extension)?;
        Some((stem.to_owned(), mime))
    });
    match mime {
        Some((stem, mime)) => {
            if let Some(last) = segments.last_mut() {
                *last = stem;
            }
            (segments, Some(mime))
        }
        None => (segments, None),
    }
}

/// Parses the host as a literal 20-byte address.
fn literal_address(host: &str) -> Option<Address> {
    if host.len() == 42 && host.starts_with("0x") {
        Address::from_str(host).ok()
    } else {
        None
    }
}

/// Decodes return data as a single ABI-encoded `bytes` value.
fn decode_single_bytes(raw: &[u8]) -> Result<Vec<u8>, ResolveError> {
    let outputs = decode_params(&[DynSolType::Bytes], raw)?;
    match outputs.into_iter().next() {
        Some(DynSolValue::Bytes(body)) => Ok(body),
        _ => Err(ResolveError::ResponseDecode("expected a single bytes value".into())),
    }
}

/// Decodes return data against an expected output type list.
fn decode_params(types: &[DynSolType], raw: &[u8]) -> Result<Vec<DynSolValue>, ResolveError> {
    let tuple = DynSolType::Tuple(types.to_vec());
    match tuple
        .abi_decode_params(raw)
        .map_err(|e| ResolveError::ResponseDecode(e.to_string()))?
    {
        DynSolValue::Tuple(values) => Ok(values),
        other => Ok(vec![other]),
    }
}

/// Serializes a type-name list the way the original gateway logged ABI
/// fragments: `[{"type":"uint256"},{"type":"string"}]`.
fn type_list_json(names: impl Iterator<Item = String>) -> String {
    let fragments: Vec<serde_json::Value> = names
        .map(|name| serde_json::json!({ "type": name }))
        .collect();
    serde_json::Value::Array(fragments).to_string()
}
