//! External collaborators: funds transfer, artifact registry, player catalog

pub mod catalog;
pub mod funds;
pub mod registry;

pub use catalog::{demo_players, JsonFileCatalog, PlayerCatalog, StaticCatalog};
pub use funds::{DryRunTransfer, FundsTransfer, ModeratorTransfer, TransferReceipt};
pub use registry::{ArtifactReceipt, ArtifactRegistry, DryRunRegistry, HttpArtifactRegistry};
