pub mod search_client;
pub mod storage;

pub use search_client::ISearchClient;
pub use storage::{IFeedbackLog, IItemStore, IKeywordStore, ILedgerStore, LoadOutcome};

/// Shutdown signal shared by cycles and the periodic trigger. Clones share
/// one flag, and `cancelled()` can be awaited.
pub use tokio_util::sync::CancellationToken;
