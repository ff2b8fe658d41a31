//! Chain registry: chain ids, short names, and RPC endpoints.
//!
//! The registry is the only process-wide state in the engine and is read-only
//! once built. It is passed explicitly into the resolver rather than living
//! in a global.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Connection parameters for one chain.
///
/// Serializable so hosts can load chain lists from configuration files
/// instead of the bundled dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainInfo {
    /// EIP-155 chain id.
    pub id: u64,
    /// Short textual alias per ethereum-lists/chains, used in EIP-3770
    /// cross-chain address notation (e.g. `oeth:0x...`).
    pub short_name: String,
    /// HTTP JSON-RPC endpoint.
    pub rpc_url: String,
}

impl ChainInfo {
    /// Creates a chain descriptor.
    pub fn new(id: u64, short_name: impl Into<String>, rpc_url: impl Into<String>) -> Self {
        Self {
            id,
            short_name: short_name.into(),
            rpc_url: rpc_url.into(),
        }
    }
}

/// Chain id of Ethereum mainnet, the default chain for every request that
/// does not select one explicitly.
pub const DEFAULT_CHAIN_ID: u64 = 1;

/// Returns the bundled chain dataset.
#[must_use]
pub fn known_chains() -> Vec<ChainInfo> {
    vec![
        ChainInfo::new(1, "eth", "https://cloudflare-eth.com"),
        ChainInfo::new(5, "gor", "https://rpc.ankr.com/eth_goerli"),
        ChainInfo::new(10, "oeth", "https://mainnet.optimism.io"),
        ChainInfo::new(56, "bnb", "https://bsc-dataseed.binance.org"),
        ChainInfo::new(100, "gno", "https://rpc.gnosischain.com"),
        ChainInfo::new(137, "matic", "https://polygon-rpc.com"),
        ChainInfo::new(8453, "base", "https://mainnet.base.org"),
        ChainInfo::new(42161, "arb1", "https://arb1.arbitrum.io/rpc"),
        ChainInfo::new(43114, "avax", "https://api.avax.network/ext/bc/C/rpc"),
        ChainInfo::new(11155111, "sep", "https://rpc.sepolia.org"),
    ]
}

/// Immutable lookup table from chain id or short name to [`ChainInfo`].
///
/// Ids are unique: registering a chain with an id already present replaces
/// the previous entry (and unmaps its short name).
#[derive(Debug, Clone)]
pub struct ChainRegistry {
    by_id: HashMap<u64, ChainInfo>,
    id_by_short_name: HashMap<String, u64>,
}

impl ChainRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            by_id: HashMap::new(),
            id_by_short_name: HashMap::new(),
        }
    }

    /// Creates a registry pre-populated with the bundled dataset.
    #[must_use]
    pub fn known() -> Self {
        Self::from_chains(known_chains())
    }

    /// Creates a registry from an explicit chain list.
    #[must_use]
    pub fn from_chains(chains: impl IntoIterator<Item = ChainInfo>) -> Self {
        let mut registry = Self::new();
        for chain in chains {
            registry.register(chain);
        }
        registry
    }

    /// Registers a chain, replacing any entry with the same id.
    pub fn register(&mut self, chain: ChainInfo) {
        if let Some(previous) = self.by_id.remove(&chain.id) {
            self.id_by_short_name.remove(&previous.short_name);
        }
        self.id_by_short_name.insert(chain.short_name.clone(), chain.id);
        self.by_id.insert(chain.id, chain);
    }

    /// Builder-style method: registers a chain and returns `self`.
    #[must_use]
    pub fn with_chain(mut self, chain: ChainInfo) -> Self {
        self.register(chain);
        self
    }

    /// Looks up a chain by id.
    #[must_use]
    pub fn by_id(&self, id: u64) -> Option<&ChainInfo> {
        self.by_id.get(&id)
    }

    /// Looks up a chain by its short name.
    #[must_use]
    pub fn by_short_name(&self, short_name: &str) -> Option<&ChainInfo> {
        self.id_by_short_name
            .get(short_name)
            .and_then(|id| self.by_id.get(id))
    }

    /// Returns the default chain (id 1), if registered.
    #[must_use]
    pub fn mainnet(&self) -> Option<&ChainInfo> {
        self.by_id(DEFAULT_CHAIN_ID)
    }

    /// Returns the number of registered chains.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Returns `true` if no chains are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

impl Default for ChainRegistry {
    fn default() -> Self {
        Self::known()
    }
}
