/// Definition of an EVM-compatible network.
#[derive(Debug, Clone)]
pub struct EvmChain {
    pub chain_id: u64,
    pub name: &'static str,
    pub symbol: &'static str,
    pub decimals: u8,
    pub rpc_url: &'static str,
    pub explorer_url: &'static str,
    pub is_testnet: bool,
    /// Subdomain of `infura.io`, when Infura serves the network.
    pub infura_network: Option<&'static str>,
}

impl EvmChain {
    /// `https://{network}.infura.io/v3/{project_id}`.
    pub fn infura_url(&self, project_id: &str) -> Option<String> {
        self.infura_network
            .map(|network| format!("https://{network}.infura.io/v3/{project_id}"))
    }
}

/// Ethereum Mainnet (chain ID 1).
pub const ETHEREUM: EvmChain = EvmChain {
    chain_id: 1,
    name: "Ethereum",
    symbol: "ETH",
    decimals: 18,
    rpc_url: "https://eth.llamarpc.com",
    explorer_url: "https://etherscan.io",
    is_testnet: false,
    infura_network: Some("mainnet"),
};

/// Sepolia Testnet (chain ID 11155111).
pub const SEPOLIA: EvmChain = EvmChain {
    chain_id: 11155111,
    name: "Sepolia",
    symbol: "ETH",
    decimals: 18,
    rpc_url: "https://rpc.sepolia.org",
    explorer_url: "https://sepolia.etherscan.io",
    is_testnet: true,
    infura_network: Some("sepolia"),
};

/// BNB Smart Chain (chain ID 56).
pub const BSC: EvmChain = EvmChain {
    chain_id: 56,
    name: "BNB Smart Chain",
    symbol: "BNB",
    decimals: 18,
    rpc_url: "https://bsc-dataseed.binance.org",
    explorer_url: "https://bscscan.com",
    is_testnet: false,
    infura_network: Some("bsc-mainnet"),
};

/// BNB Smart Chain Testnet (chain ID 97).
pub const BSC_TESTNET: EvmChain = EvmChain {
    chain_id: 97,
    name: "BNB Smart Chain Testnet",
    symbol: "tBNB",
    decimals: 18,
    rpc_url: "https://data-seed-prebsc-1-s1.binance.org:8545",
    explorer_url: "https://testnet.bscscan.com",
    is_testnet: true,
    infura_network: Some("bsc-testnet"),
};

/// Polygon PoS (chain ID 137).
pub const POLYGON: EvmChain = EvmChain {
    chain_id: 137,
    name: "Polygon",
    symbol: "MATIC",
    decimals: 18,
    rpc_url: "https://polygon-rpc.com",
    explorer_url: "https://polygonscan.com",
    is_testnet: false,
    infura_network: Some("polygon-mainnet"),
};

/// Polygon Amoy Testnet (chain ID 80002).
pub const POLYGON_AMOY: EvmChain = EvmChain {
    chain_id: 80002,
    name: "Polygon Amoy",
    symbol: "MATIC",
    decimals: 18,
    rpc_url: "https://rpc-amoy.polygon.technology",
    explorer_url: "https://amoy.polygonscan.com",
    is_testnet: true,
    infura_network: Some("polygon-amoy"),
};

/// Arbitrum One (chain ID 42161).
pub const ARBITRUM: EvmChain = EvmChain {
    chain_id: 42161,
    name: "Arbitrum One",
    symbol: "ETH",
    decimals: 18,
    rpc_url: "https://arb1.arbitrum.io/rpc",
    explorer_url: "https://arbiscan.io",
    is_testnet: false,
    infura_network: Some("arbitrum-mainnet"),
};

/// Optimism (chain ID 10).
pub const OPTIMISM: EvmChain = EvmChain {
    chain_id: 10,
    name: "Optimism",
    symbol: "ETH",
    decimals: 18,
    rpc_url: "https://mainnet.optimism.io",
    explorer_url: "https://optimistic.etherscan.io",
    is_testnet: false,
    infura_network: Some("optimism-mainnet"),
};

/// Base (chain ID 8453).
pub const BASE: EvmChain = EvmChain {
    chain_id: 8453,
    name: "Base",
    symbol: "ETH",
    decimals: 18,
    rpc_url: "https://mainnet.base.org",
    explorer_url: "https://basescan.org",
    is_testnet: false,
    infura_network: Some("base-mainnet"),
};

const ALL_CHAINS: &[&EvmChain] = &[
    &ETHEREUM,
    &SEPOLIA,
    &BSC,
    &BSC_TESTNET,
    &POLYGON,
    &POLYGON_AMOY,
    &ARBITRUM,
    &OPTIMISM,
    &BASE,
];

/// Returns the chain definition for a given chain ID, or `None` if unknown.
pub fn get_chain(chain_id: u64) -> Option<&'static EvmChain> {
    ALL_CHAINS
        .iter()
        .find(|c| c.chain_id == chain_id)
        .copied()
}

/// Looks a chain up by display name or Infura network name, ignoring case.
/// `find_by_name("sepolia")` and `find_by_name("bsc-testnet")` both resolve.
pub fn find_by_name(name: &str) -> Option<&'static EvmChain> {
    ALL_CHAINS
        .iter()
        .find(|c| {
            c.name.eq_ignore_ascii_case(name)
                || c.infura_network
                    .is_some_and(|network| network.eq_ignore_ascii_case(name))
        })
        .copied()
}

pub fn supported_chains() -> Vec<&'static EvmChain> {
    ALL_CHAINS.to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_ethereum() {
        let chain = get_chain(1).expect("Ethereum should be supported");
        assert_eq!(chain.name, "Ethereum");
        assert_eq!(chain.symbol, "ETH");
        assert!(!chain.is_testnet);
    }

    #[test]
    fn get_sepolia_testnet() {
        let chain = get_chain(11155111).expect("Sepolia should be supported");
        assert_eq!(chain.name, "Sepolia");
        assert!(chain.is_testnet);
    }

    #[test]
    fn get_bsc_testnet() {
        let chain = get_chain(97).expect("BSC testnet should be supported");
        assert_eq!(chain.symbol, "tBNB");
        assert!(chain.is_testnet);
    }

    #[test]
    fn unsupported_chain_returns_none() {
        assert!(get_chain(999999).is_none());
    }

    #[test]
    fn find_by_display_or_network_name() {
        assert_eq!(find_by_name("sepolia").map(|c| c.chain_id), Some(11155111));
        assert_eq!(find_by_name("BSC-TESTNET").map(|c| c.chain_id), Some(97));
        assert_eq!(find_by_name("Arbitrum One").map(|c| c.chain_id), Some(42161));
        assert!(find_by_name("ropsten").is_none());
    }

    #[test]
    fn infura_urls() {
        assert_eq!(
            SEPOLIA.infura_url("abc123").as_deref(),
            Some("https://sepolia.infura.io/v3/abc123")
        );
        assert_eq!(
            BSC_TESTNET.infura_url("abc123").as_deref(),
            Some("https://bsc-testnet.infura.io/v3/abc123")
        );
    }

    #[test]
    fn chain_ids_are_unique() {
        let chains = supported_chains();
        for (i, a) in chains.iter().enumerate() {
            for b in &chains[i + 1..] {
                assert_ne!(a.chain_id, b.chain_id, "{} and {}", a.name, b.name);
            }
        }
    }

    #[test]
    fn all_chains_have_18_decimals_and_https_urls() {
        for chain in supported_chains() {
            assert_eq!(chain.decimals, 18, "{} should have 18 decimals", chain.name);
            assert!(chain.rpc_url.starts_with("https://"), "{}", chain.name);
            assert!(chain.explorer_url.starts_with("https://"), "{}", chain.name);
        }
    }
}
