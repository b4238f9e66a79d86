//! Hotel analytics API clients.

pub mod analytics;

// Re-export commonly used types
pub use analytics::AnalyticsClient;
