pub mod crawl;
pub mod serve;

// Re-export command functions for convenience
pub use crawl::{crawl, events, parse};
pub use serve::serve;
