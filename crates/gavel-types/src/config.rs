//! configuration types for gavel

use serde::{Deserialize, Serialize};

/// main configuration for gavel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// public url clients use to reach the server.
    pub server_url: String,

    /// address to bind the http server to.
    pub listen_addr: String,

    /// database configuration.
    pub database: DatabaseConfig,

    /// auction subsystem tuning.
    pub auction: AuctionConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8080".to_string(),
            listen_addr: "0.0.0.0:8080".to_string(),
            database: DatabaseConfig::default(),
            auction: AuctionConfig::default(),
        }
    }
}

/// database configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// database type: "sqlite" or "postgres".
    pub db_type: String,

    /// database connection string or file path.
    pub connection_string: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            db_type: "sqlite".to_string(),
            connection_string: "/var/lib/gavel/db.sqlite".to_string(),
        }
    }
}

/// auction subsystem tuning.
///
/// the sweep interval is a stated latency contract: an expired auction is
/// finalized at most one interval after its deadline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuctionConfig {
    /// seconds between expiry sweeps.
    pub sweep_interval_secs: u64,

    /// how many times a bid submission retries after losing a
    /// version-guarded write race before giving up.
    pub bid_retry_limit: u32,

    /// buffered events per broadcast room; slow subscribers past this lag
    /// drop old events and catch up from the next snapshot.
    pub room_capacity: usize,
}

impl Default for AuctionConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: 30,
            bid_retry_limit: 8,
            room_capacity: 64,
        }
    }
}
