//! Error types for web3:// resolution.
//!
//! Every variant is terminal for the request that produced it: the dispatcher
//! never retries, and the only errors swallowed anywhere in the pipeline are
//! the two best-effort probes in [`crate::mode`].

use alloy_primitives::Address;

/// Error raised by the RPC capability seam.
///
/// The engine core never sees transport types; implementations of
/// [`ChainClient`](crate::rpc::ChainClient) flatten whatever their transport
/// produces (revert, timeout, connection failure) into this message-carrying
/// error.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct RpcError {
    message: String,
}

impl RpcError {
    /// Creates a new RPC error from a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Terminal failure of a web3:// resolution.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// The request URL could not be parsed, or is not a web3:// URL.
    #[error("unable to parse URL: {0}")]
    UrlParse(String),

    /// No chain registered for the requested id.
    #[error("no chain found for id {0}")]
    UnknownChain(u64),

    /// The host is a name whose suffix or chain has no supported resolver.
    #[error("unresolvable domain name {0}: no supported resolvers found on this chain")]
    UnsupportedName(String),

    /// Forward resolution failed or the name is unregistered.
    #[error("unable to resolve domain name {0}")]
    NameResolution(String),

    /// The contentcontract text record is present but malformed.
    #[error("invalid contentcontract text record: {0}")]
    InvalidContentPointer(String),

    /// The contract advertises a resolve mode this engine does not implement.
    #[error("resolve mode '{0}' is not supported")]
    UnsupportedMode(String),

    /// An argument segment could not be cast to its requested or assumed type.
    #[error("argument {index} cannot be cast to {kind}: {reason}")]
    ArgumentCast {
        /// Zero-based position of the offending path segment.
        index: usize,
        /// The type the cast targeted.
        kind: &'static str,
        /// Why the cast failed.
        reason: String,
    },

    /// A low-level call returned no data, which is what calling a
    /// code-less address looks like.
    #[error("address {0} does not appear to be a contract")]
    NotAContract(Address),

    /// The final contract call reverted or otherwise failed.
    #[error("contract call failed: {0}")]
    CallReverted(String),

    /// The call succeeded but its return data did not decode as expected.
    #[error("unable to decode call output: {0}")]
    ResponseDecode(String),

    /// A failure surfaced by the RPC capability outside the final call
    /// (name lookups, text records).
    #[error(transparent)]
    Rpc(#[from] RpcError),
}
