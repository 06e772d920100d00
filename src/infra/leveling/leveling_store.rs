// Implementations for the leveling system.

pub mod sqlite_store;

// Re-export for convenience
pub use sqlite_store::SqliteLevelStore;
