pub mod app;
pub mod domain;
pub mod infra;
pub mod transport;

// Convenience re-exports (keeps call-sites clean)
pub use app::{Outcome, Resolution, ResolutionWorkflow, Skip, WorkflowConfig};
pub use domain::{Address, Name, PriceTier, RecordField, RecordSet};
pub use infra::ledger::{LedgerGateway, MemoryLedger, RpcLedger};
pub use infra::network::{NetworkGuard, BITROCK_MAINNET};
pub use infra::wallet::{HttpWallet, MemoryWallet, WalletContext, WalletProvider};
