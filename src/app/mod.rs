pub mod minted;
pub mod watcher;
pub mod workflow;

pub use minted::MintedListCache;
pub use watcher::WalletWatcher;
pub use workflow::{Outcome, Resolution, ResolutionWorkflow, Skip, WorkflowConfig, WorkflowView};
