/// Resolve command handlers
pub mod resolve;

/// Tags command handlers
pub mod tags;

/// Update command handlers and logic
pub mod update;

/// Version command handlers
pub mod version;
