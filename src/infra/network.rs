//! Required-network check and the switch/add prompt flow.

use crate::infra::wallet::{chain_id_hex, WalletContext, WalletProvider};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use utoipa::ToSchema;

/// Chain ids the client can name. Anything else shows up as an unknown network.
pub const KNOWN_NETWORKS: &[(u64, &str)] = &[
    (0x1, "Mainnet"),
    (0x3, "Ropsten"),
    (0x2a, "Kovan"),
    (0x4, "Rinkeby"),
    (0x5, "Goerli"),
    (0x3d, "Ethereum Classic Mainnet"),
    (0x89, "Polygon Mainnet"),
    (0x13881, "Mumbai Testnet"),
    (0xa86a, "AVAX Mainnet"),
    (0x1c03, "Bitrock Mainnet"),
];

pub fn network_name(chain_id: u64) -> Option<&'static str> {
    KNOWN_NETWORKS
        .iter()
        .find(|(id, _)| *id == chain_id)
        .map(|(_, name)| *name)
}

#[derive(Debug, Clone, Serialize)]
pub struct NativeCurrency {
    pub name: &'static str,
    pub symbol: &'static str,
    pub decimals: u8,
}

/// Everything a wallet needs to register a network it does not know yet.
#[derive(Debug, Clone, Serialize)]
pub struct NetworkDescriptor {
    #[serde(skip)]
    pub chain_id: u64,
    pub chain_name: &'static str,
    pub rpc_url: &'static str,
    pub native_currency: NativeCurrency,
    pub explorer_url: &'static str,
}

impl NetworkDescriptor {
    pub fn tx_url(&self, tx_hash: &str) -> String {
        format!("{}/tx/{}", self.explorer_url.trim_end_matches('/'), tx_hash)
    }

    fn add_chain_params(&self) -> serde_json::Value {
        json!([{
            "chainId": chain_id_hex(self.chain_id),
            "chainName": self.chain_name,
            "rpcUrls": [self.rpc_url],
            "nativeCurrency": {
                "name": self.native_currency.name,
                "symbol": self.native_currency.symbol,
                "decimals": self.native_currency.decimals,
            },
            "blockExplorerUrls": [self.explorer_url],
        }])
    }
}

pub const BITROCK_MAINNET: NetworkDescriptor = NetworkDescriptor {
    chain_id: 0x1c03,
    chain_name: "Bitrock Mainnet",
    rpc_url: "https://connect.bit-rock.io",
    native_currency: NativeCurrency {
        name: "Bitrock",
        symbol: "BROCK",
        decimals: 18,
    },
    explorer_url: "https://explorer.bit-rock.io/",
};

/// Result of a switch attempt. Failures are never errors to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SwitchOutcome {
    AlreadyOnNetwork,
    Switched,
    /// The wallet did not know the network; it was added, then selected.
    Added,
    NoAccount,
    StillOnWrongNetwork,
}

pub struct NetworkGuard {
    wallet: Arc<dyn WalletProvider>,
    required: NetworkDescriptor,
}

impl NetworkGuard {
    pub fn new(wallet: Arc<dyn WalletProvider>, required: NetworkDescriptor) -> Self {
        Self { wallet, required }
    }

    pub fn required(&self) -> &NetworkDescriptor {
        &self.required
    }

    /// Goes through the name table, like the UI does, rather than comparing raw ids.
    pub fn is_on_required_network(&self, chain_id: u64) -> bool {
        network_name(chain_id) == Some(self.required.chain_name)
    }

    /// Reads the wallet and checks the active chain. A wallet that cannot be read counts as
    /// being on the wrong network.
    pub async fn check(&self) -> bool {
        match WalletContext::read(self.wallet.as_ref()).await {
            Ok(ctx) => self.is_on_required_network(ctx.chain_id),
            Err(e) => {
                eprintln!("> NetworkGuard: could not read wallet context: {}", e);
                false
            }
        }
    }

    /// Asks the wallet to switch to the required network, falling back to adding it when the
    /// wallet reports the chain as unrecognized. Not retried.
    pub async fn request_switch(&self) -> SwitchOutcome {
        let ctx = match WalletContext::read(self.wallet.as_ref()).await {
            Ok(ctx) => ctx,
            Err(e) => {
                eprintln!("> NetworkGuard: could not read wallet context: {}", e);
                return SwitchOutcome::StillOnWrongNetwork;
            }
        };
        if ctx.account.is_none() {
            return SwitchOutcome::NoAccount;
        }
        if self.is_on_required_network(ctx.chain_id) {
            return SwitchOutcome::AlreadyOnNetwork;
        }

        let params = json!([{ "chainId": chain_id_hex(self.required.chain_id) }]);
        match self.wallet.request("wallet_switchEthereumChain", params).await {
            Ok(_) => {
                println!("> NetworkGuard: switched to {}", self.required.chain_name);
                SwitchOutcome::Switched
            }
            Err(e) if e.is_unrecognized_chain() => {
                println!(
                    "> NetworkGuard: wallet does not know {}, asking it to add the network",
                    self.required.chain_name
                );
                self.request_add().await
            }
            Err(e) => {
                eprintln!("> NetworkGuard: switch request failed: {}", e);
                SwitchOutcome::StillOnWrongNetwork
            }
        }
    }

    /// Supplies the full network descriptor so the wallet can register and select it.
    pub async fn request_add(&self) -> SwitchOutcome {
        match self
            .wallet
            .request("wallet_addEthereumChain", self.required.add_chain_params())
            .await
        {
            Ok(_) => {
                println!("> NetworkGuard: added {}", self.required.chain_name);
                SwitchOutcome::Added
            }
            Err(e) => {
                eprintln!("> NetworkGuard: add network request failed: {}", e);
                SwitchOutcome::StillOnWrongNetwork
            }
        }
    }
}
