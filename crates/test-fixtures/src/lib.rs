//! Shared fixtures for Scout integration tests: a scripted search client,
//! keyword corpora and a deterministic feedback simulator.

pub mod corpus;
pub mod feedback;
pub mod search_client;

pub use corpus::{keyword_corpus, records_at};
pub use feedback::FeedbackSimulator;
pub use search_client::FakeSearchClient;
