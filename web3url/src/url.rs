//! web3:// URL parsing.
//!
//! The shape is `web3://<host>[:<chainId>]/<path>[?<query>]`. The chain
//! selector rides in the port position but is a full EIP-155 chain id, which
//! routinely exceeds the 16-bit port range of generic URL parsers (Sepolia is
//! 11155111), so the authority is split by hand here. Query strings are still
//! decoded with the `url` crate's form decoder.

use crate::error::ResolveError;

/// A parsed web3:// URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Web3Url {
    /// Literal contract address or a resolvable name.
    pub host: String,
    /// Port-encoded chain id, absent when the request targets the default
    /// chain.
    pub chain_id: Option<u64>,
    /// The path exactly as written, normalized to at least `/`.
    pub raw_path: String,
    /// `raw_path` split on `/`. The leading empty root segment is kept, so
    /// `/a/b` yields `["", "a", "b"]` and `/` yields `["", ""]`.
    pub segments: Vec<String>,
    /// The query string exactly as written, without the leading `?`.
    pub raw_query: Option<String>,
    /// Decoded query pairs in document order.
    pub query: Vec<(String, String)>,
}

impl Web3Url {
    /// Parses a raw URL string.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::UrlParse`] when the scheme is not `web3`, the
    /// host is missing, or the chain selector is not a decimal integer.
    pub fn parse(raw: &str) -> Result<Self, ResolveError> {
        let raw = raw.trim();
        let rest = strip_scheme(raw)
            .ok_or_else(|| ResolveError::UrlParse(format!("expected a web3:// URL, got {raw}")))?;

        // Authority ends at the first `/` or `?`, whichever comes first.
        let (authority, tail) = match rest.find(['/', '?']) {
            Some(idx) => (&rest[..idx], &rest[idx..]),
            None => (rest, ""),
        };
        if authority.is_empty() {
            return Err(ResolveError::UrlParse("missing host".into()));
        }

        let (host, chain_id) = match authority.rsplit_once(':') {
            Some((host, selector)) => {
                let id = selector.parse::<u64>().map_err(|_| {
                    ResolveError::UrlParse(format!("invalid chain id '{selector}'"))
                })?;
                (host, Some(id))
            }
            None => (authority, None),
        };

        let (path, raw_query) = match tail.split_once('?') {
            Some((path, query)) => (path, Some(query.to_owned())),
            None => (tail, None),
        };
        // Browsers treat `web3://host` as `web3://host/`.
        let raw_path = if path.is_empty() { "/".to_owned() } else { path.to_owned() };
        let segments = raw_path.split('/').map(str::to_owned).collect();

        let query = raw_query
            .as_deref()
            .map(|q| {
                url::form_urlencoded::parse(q.as_bytes())
                    .map(|(k, v)| (k.into_owned(), v.into_owned()))
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            host: host.to_owned(),
            chain_id,
            raw_path,
            segments,
            raw_query,
            query,
        })
    }

    /// Returns the first value of a query parameter, decoded.
    #[must_use]
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns `true` when the request targets the bare root path.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.raw_path == "/"
    }
}

fn strip_scheme(raw: &str) -> Option<&str> {
    let (scheme, rest) = raw.split_once("://")?;
    scheme.eq_ignore_ascii_case("web3").then_some(rest)
}
