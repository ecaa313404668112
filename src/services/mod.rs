//! Service layer for bucket-ledger
//!
//! The service layer holds the business logic on top of the storage layer:
//! reading exports, categorizing, and the commands that change balances.

pub mod categorize;
pub mod ingest;
pub mod snapshot;
pub mod source;
pub mod sync;
pub mod transfer;

pub use categorize::{plan_batch, Allocation, Categorizer, IngestPlan};
pub use ingest::{IngestOptions, IngestReport, IngestService};
pub use snapshot::SnapshotService;
pub use source::TransactionSource;
pub use sync::SyncService;
pub use transfer::{apply_transfer, apply_withdraw, BalanceChange, TransferService};
