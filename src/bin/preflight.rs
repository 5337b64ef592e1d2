use brock_name_service::domain::PriceTier;
use brock_name_service::infra::config;
use brock_name_service::infra::ledger::{LedgerGateway, RpcLedger};
use brock_name_service::infra::network::{network_name, NetworkGuard, SwitchOutcome, BITROCK_MAINNET};
use brock_name_service::infra::wallet::{HttpWallet, WalletContext, WalletProvider};
use primitive_types::U256;
use serde_json::json;
use std::sync::Arc;

fn usage_and_exit() -> ! {
    eprintln!(
        "Usage: cargo run --bin preflight -- [--switch-network]\n\
         \n\
         Reads env vars (all optional):\n\
           WALLET_RPC_URL, REGISTRY_CONTRACT_ADDRESS, REVERSE_CONTRACT_ADDRESS,\n\
           RECEIPT_POLL_INTERVAL_MS\n"
    );
    std::process::exit(2);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        usage_and_exit();
    }
    let switch_network = args.iter().any(|a| a == "--switch-network");

    // Force-read config (nice error messages if invalid)
    let rpc_url = config::wallet_rpc_url();
    let registry = config::registry_contract()?;
    let reverse = config::reverse_contract()?;
    let poll = config::receipt_poll_interval()?;

    println!("> Preflight:");
    println!("  WALLET_RPC_URL={}", rpc_url);
    println!("  REGISTRY_CONTRACT_ADDRESS={}", registry);
    println!("  REVERSE_CONTRACT_ADDRESS={}", reverse);

    let wallet: Arc<dyn WalletProvider> = Arc::new(HttpWallet::new(rpc_url));

    // Basic RPC connectivity
    let mut ctx = WalletContext::read(wallet.as_ref()).await?;
    println!(
        "  Chain: 0x{:x} ({})",
        ctx.chain_id,
        network_name(ctx.chain_id).unwrap_or("unknown network")
    );

    let guard = NetworkGuard::new(wallet.clone(), BITROCK_MAINNET);
    if !guard.is_on_required_network(ctx.chain_id) {
        if !switch_network {
            return Err(anyhow::anyhow!(
                "Wallet is not on {}. Re-run with --switch-network",
                BITROCK_MAINNET.chain_name
            ));
        }
        match guard.request_switch().await {
            SwitchOutcome::Switched | SwitchOutcome::Added | SwitchOutcome::AlreadyOnNetwork => {
                ctx = WalletContext::read(wallet.as_ref()).await?;
                println!("  Switched to {} (0x{:x}).", BITROCK_MAINNET.chain_name, ctx.chain_id);
            }
            other => return Err(anyhow::anyhow!("Network switch did not succeed: {:?}", other)),
        }
    }

    // Account + balance
    match ctx.account {
        Some(account) => {
            let balance = wallet
                .request("eth_getBalance", json!([account.to_string(), "latest"]))
                .await?;
            let digits = balance.as_str().unwrap_or("0x0").trim_start_matches("0x");
            let wei = U256::from_str_radix(digits, 16)
                .map_err(|e| anyhow::anyhow!("eth_getBalance returned invalid quantity: {:?}", e))?;
            println!("  Account: {}", account);
            println!(
                "  Balance: {} wei (~{:.4} {})",
                wei,
                wei.low_u128() as f64 / 1e18,
                BITROCK_MAINNET.native_currency.symbol
            );
            if wei < PriceTier::Standard.wei() {
                eprintln!("  Warning: balance is below the cheapest mint price (0.1).");
            }
        }
        None => eprintln!("  Warning: no account connected; writes will be refused."),
    }

    // Contract code present at both addresses
    for (label, address) in [("registry", registry), ("reverse", reverse)] {
        let code = wallet
            .request("eth_getCode", json!([address.to_string(), "latest"]))
            .await?;
        let deployed = code.as_str().is_some_and(|c| c.len() > 2);
        if !deployed {
            return Err(anyhow::anyhow!("No contract code at {} address {}", label, address));
        }
        println!("  {} contract is deployed.", label);
    }

    // Registry readable
    let ledger = RpcLedger::new(wallet.clone(), registry, reverse, poll);
    let names = ledger.enumerate_names(&ctx).await?;
    println!("  Registry is readable ({} names registered).", names.len());

    println!("> Preflight OK.");
    Ok(())
}
