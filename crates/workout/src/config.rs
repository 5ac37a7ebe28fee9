//! Runtime configuration.
//!
//! Values come from command-line flags, then the environment (a `.env` file
//! is loaded into the environment by the binary before parsing). The library
//! crates never read the environment; everything is handed over from here.

use std::fmt;
use std::time::Duration;

use chain_eth::chains::{self, EvmChain};
use chain_eth::{EthError, PrivateKey};
use clap::Args;
use rpc_gateway::HttpGateway;
use secrecy::{ExposeSecret, SecretString};

use crate::error::{Result, WorkoutError};

pub const DEFAULT_NETWORK: &str = "sepolia";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection and credential flags shared by every subcommand.
#[derive(Clone, Args)]
pub struct ConfigArgs {
    /// JSON-RPC endpoint. Overrides the endpoint derived from --network.
    #[arg(long, env = "RPC_URL", global = true)]
    pub rpc_url: Option<String>,

    /// Network name (e.g. sepolia, bsc-testnet) used for the default chain id
    /// and endpoint.
    #[arg(long, env = "NETWORK", default_value = DEFAULT_NETWORK, global = true)]
    pub network: String,

    /// Infura project id; selects the Infura endpoint for --network.
    #[arg(long, env = "INFURA_PROJECT_ID", hide_env_values = true, global = true)]
    pub infura_project_id: Option<String>,

    /// Chain id for replay protection. Defaults to the network's.
    #[arg(long, env = "CHAIN_ID", global = true)]
    pub chain_id: Option<u64>,

    /// Hex private key. Prefer the PRIVATE_KEY environment variable.
    #[arg(long, env = "PRIVATE_KEY", hide_env_values = true, global = true)]
    pub private_key: Option<String>,

    /// Per-request RPC timeout in seconds.
    #[arg(long, env = "RPC_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS, global = true)]
    pub timeout_secs: u64,
}

impl Default for ConfigArgs {
    fn default() -> Self {
        Self {
            rpc_url: None,
            network: DEFAULT_NETWORK.to_string(),
            infura_project_id: None,
            chain_id: None,
            private_key: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

pub struct Config {
    pub rpc_url: String,
    pub chain_id: u64,
    pub private_key: Option<SecretString>,
    pub timeout: Duration,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Infura URLs carry the project id in the path.
        let endpoint = self.rpc_url.split("/v3/").next().unwrap_or_default();
        f.debug_struct("Config")
            .field("rpc_url", &endpoint)
            .field("chain_id", &self.chain_id)
            .field("private_key", &self.private_key.as_ref().map(|_| "[REDACTED]"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Config {
    /// Resolves the endpoint and chain id.
    ///
    /// With `--rpc-url` and `--chain-id` both given they are used as is,
    /// which is how local devnets are reached. An explicit chain id without
    /// an endpoint selects that chain from the table, overriding `--network`;
    /// otherwise `--network` decides both. The endpoint is the Infura URL
    /// when a project id is set, else the chain's public endpoint.
    pub fn from_args(args: ConfigArgs) -> Result<Self> {
        if args.chain_id == Some(0) {
            return Err(WorkoutError::Config("chain id must be positive".into()));
        }
        if args.timeout_secs == 0 {
            return Err(WorkoutError::Config("timeout must be at least 1 second".into()));
        }

        let (rpc_url, chain_id) = match (args.rpc_url, args.chain_id) {
            (Some(url), Some(id)) => (url, id),
            (None, Some(id)) => {
                let chain = chains::get_chain(id).ok_or(EthError::UnsupportedChain(id))?;
                (endpoint(chain, args.infura_project_id.as_deref())?, id)
            }
            (url, None) => {
                let chain = chains::find_by_name(&args.network).ok_or_else(|| {
                    WorkoutError::Config(format!(
                        "unknown network {:?}; pass --rpc-url and --chain-id",
                        args.network
                    ))
                })?;
                let url = match url {
                    Some(url) => url,
                    None => endpoint(chain, args.infura_project_id.as_deref())?,
                };
                (url, chain.chain_id)
            }
        };

        Ok(Self {
            rpc_url,
            chain_id,
            private_key: args.private_key.map(SecretString::from),
            timeout: Duration::from_secs(args.timeout_secs),
        })
    }

    /// Parses the configured key. The hex string is only exposed for the
    /// duration of the parse.
    pub fn private_key(&self) -> Result<PrivateKey> {
        let secret = self
            .private_key
            .as_ref()
            .ok_or(WorkoutError::MissingPrivateKey)?;
        Ok(PrivateKey::from_hex(secret.expose_secret())?)
    }

    pub fn gateway(&self) -> Result<HttpGateway> {
        tracing::debug!(chain_id = self.chain_id, timeout = ?self.timeout, "connecting gateway");
        Ok(HttpGateway::new(self.rpc_url.clone(), self.timeout)?)
    }
}

fn endpoint(chain: &EvmChain, infura_project_id: Option<&str>) -> Result<String> {
    match infura_project_id {
        Some(project_id) => chain.infura_url(project_id).ok_or_else(|| {
            WorkoutError::Config(format!("{} is not served by Infura", chain.name))
        }),
        None => Ok(chain.rpc_url.to_string()),
    }
}
