//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `cadence` - Purchase forecasts (next, restock)
//! - `core` - Shared utilities (load_engine, snapshot readers) and config
//! - `expire` - Expiration prediction
//! - `plan` - Budget shopping plan
//! - `prices` - Price check and best day to buy

pub mod cadence;
pub mod core;
pub mod expire;
pub mod plan;
pub mod prices;

// Re-export command functions for main.rs
pub use cadence::*;
pub use self::core::*;
pub use expire::*;
pub use plan::*;
pub use prices::*;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
