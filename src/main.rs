// src/main.rs

use brock_name_service::app::{ResolutionWorkflow, WalletWatcher, WorkflowConfig};
use brock_name_service::infra::config::{self, LedgerBackend};
use brock_name_service::infra::ledger::{LedgerGateway, MemoryLedger, RpcLedger};
use brock_name_service::infra::network::{NetworkGuard, BITROCK_MAINNET};
use brock_name_service::infra::wallet::{HttpWallet, MemoryWallet, WalletProvider};
use brock_name_service::transport;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

// Everything runs on one cooperative scheduler: no two workflow steps execute in parallel.
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let backend = config::ledger_backend()?;
    let mint_refresh_delay = config::mint_refresh_delay()?;
    let wallet_poll_interval = config::wallet_poll_interval()?;

    // --- Wallet + Ledger Initialization ---
    let (wallet, gateway): (Arc<dyn WalletProvider>, Arc<dyn LedgerGateway>) = match backend {
        LedgerBackend::Rpc => {
            let url = config::wallet_rpc_url();
            println!("> Connecting to wallet provider at {}...", url);
            let wallet: Arc<dyn WalletProvider> = Arc::new(HttpWallet::new(url));
            let registry = config::registry_contract()?;
            let reverse = config::reverse_contract()?;
            println!("> Registry contract: {}", registry);
            println!("> Reverse contract: {}", reverse);
            let gateway: Arc<dyn LedgerGateway> = Arc::new(RpcLedger::new(
                wallet.clone(),
                registry,
                reverse,
                config::receipt_poll_interval()?,
            ));
            (wallet, gateway)
        }
        LedgerBackend::Memory => {
            let account = config::memory_wallet_account()?;
            println!("> Using in-process ledger and wallet (account {})", account);
            let wallet: Arc<dyn WalletProvider> =
                Arc::new(MemoryWallet::new(BITROCK_MAINNET.chain_id, Some(account)));
            let gateway: Arc<dyn LedgerGateway> = Arc::new(MemoryLedger::new());
            (wallet, gateway)
        }
    };

    // --- Workflow Initialization ---
    let guard = Arc::new(NetworkGuard::new(wallet.clone(), BITROCK_MAINNET));
    let workflow = Arc::new(ResolutionWorkflow::new(
        gateway,
        wallet.clone(),
        WorkflowConfig {
            mint_refresh_delay,
            network: BITROCK_MAINNET,
        },
    ));
    println!(
        "> Workflow initialized (post-mint refresh delay {:?}).",
        mint_refresh_delay
    );

    let watcher = Arc::new(WalletWatcher::new(
        wallet.clone(),
        guard.clone(),
        workflow.clone(),
        wallet_poll_interval,
    ));
    watcher.clone().start();
    println!(
        "> Wallet watcher started (polls every {:?}).",
        wallet_poll_interval
    );

    let app_state = transport::http::AppState {
        workflow,
        guard,
        wallet,
    };

    // --- API Server Initialization ---
    let bind_addr = config::api_bind_addr();
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);
    let app = transport::http::create_router(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", transport::http::ApiDoc::openapi()))
        .layer(cors);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    println!("> API server listening on http://{}", bind_addr);
    println!("> Swagger UI available at http://{}/swagger-ui", bind_addr);

    tokio::select! {
        result = axum::serve(listener, app) => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            println!("\n> Shutdown signal received (Ctrl+C)...");
            println!("> Pending confirmation waits are not cancelled; re-check the explorer for in-flight transactions.");
            watcher.shutdown();
            println!("> Graceful shutdown complete.");
        }
    }

    Ok(())
}
