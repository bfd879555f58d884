use serde::{Deserialize, Serialize};

pub const DEFAULT_RPC_URL: &str = "https://mainnet.infura.io/v3/your_api_key";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub rpc_url: String,
    pub blocks: u64,
    pub max_logs: usize,
    pub max_block_range: u64,
    pub concurrency: usize,
    pub deadline_secs: u64,
    pub retry: RetrySettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Settings {
    pub fn uses_placeholder_rpc(&self) -> bool {
        self.rpc_url.contains("your_api_key")
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Chain {
    Ethereum,
    Sepolia,
    Optimism,
    Polygon,
    ArbitrumOne,
    Base,
}

impl Chain {
    pub fn from_chain_id(chain_id: u64) -> Option<Self> {
        match chain_id {
            1 => Some(Self::Ethereum),
            11155111 => Some(Self::Sepolia),
            10 => Some(Self::Optimism),
            137 => Some(Self::Polygon),
            42161 => Some(Self::ArbitrumOne),
            8453 => Some(Self::Base),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Ethereum => "Ethereum Mainnet",
            Self::Sepolia => "Sepolia Testnet",
            Self::Optimism => "Optimism",
            Self::Polygon => "Polygon",
            Self::ArbitrumOne => "Arbitrum One",
            Self::Base => "Base",
        }
    }
}

/// Chain identity reported in the payload envelope. Both fields are null when the RPC could
/// not report a chain id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChainInfo {
    pub chain_id: Option<u64>,
    pub network: Option<String>,
}

impl ChainInfo {
    pub fn from_chain_id(chain_id: u64) -> Self {
        let network = match Chain::from_chain_id(chain_id) {
            Some(chain) => chain.name().to_string(),
            None => format!("Unknown (chain ID {chain_id})"),
        };
        Self {
            chain_id: Some(chain_id),
            network: Some(network),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_names() {
        assert_eq!(
            ChainInfo::from_chain_id(1).network.as_deref(),
            Some("Ethereum Mainnet")
        );
        assert_eq!(
            ChainInfo::from_chain_id(8453).network.as_deref(),
            Some("Base")
        );
        assert_eq!(
            ChainInfo::from_chain_id(324).network.as_deref(),
            Some("Unknown (chain ID 324)")
        );
        assert_eq!(ChainInfo::default().chain_id, None);
    }
}
