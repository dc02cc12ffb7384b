//! Metric categories and the mapping from each status endpoint's response
//! body to the attributes it contributes.

use super::FetchError;
use crate::record::{Attribute, PartialRecord, MINER_PLACEHOLDER};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;

/// Miner balances are reported in the smallest unit
const BALANCE_UNITS: f64 = 10_000_000.0;

/// Status dimension polled independently from the others.
///
/// Declaration order is the order partial records are merged in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Version,
    PendingTx,
    DebugInfo,
    MinerInfo,
    HistoryInfo,
    /// Privileged; only polled when explicitly enabled
    WalletSeed,
}

impl Category {
    /// Categories polled by default, in merge order
    pub const DEFAULT: [Category; 5] = [
        Category::Version,
        Category::PendingTx,
        Category::DebugInfo,
        Category::MinerInfo,
        Category::HistoryInfo,
    ];

    /// The categories to poll, in merge order.
    pub fn enabled(include_seed: bool) -> Vec<Category> {
        let mut categories = Self::DEFAULT.to_vec();
        if include_seed {
            categories.push(Category::WalletSeed);
        }
        categories
    }

    pub fn path(self) -> &'static str {
        match self {
            Category::Version => "/node/version",
            Category::PendingTx => "/transactions/unconfirmed/size",
            Category::DebugInfo => "/debug/info",
            Category::MinerInfo => "/debug/minerInfo",
            Category::HistoryInfo => "/debug/historyInfo",
            Category::WalletSeed => "/wallet/seed",
        }
    }

    /// Attributes this category contributes, in insertion order.
    pub fn attributes(self) -> &'static [Attribute] {
        match self {
            Category::Version => &[Attribute::Version],
            Category::PendingTx => &[Attribute::Utx],
            Category::DebugInfo => &[
                Attribute::State,
                Attribute::Persisted,
                Attribute::Bottom,
                Attribute::Top,
                Attribute::MicroHash,
            ],
            Category::MinerInfo => &[Attribute::Address, Attribute::MiningBalance, Attribute::In],
            Category::HistoryInfo => &[Attribute::LastMicros, Attribute::LastBlocks],
            Category::WalletSeed => &[Attribute::Seed],
        }
    }

    /// Map a successful response body to this category's attributes.
    ///
    /// `now_ms` is the current wall-clock time in milliseconds, used for the
    /// miner countdown.
    pub fn shape(self, body: Value, now_ms: i64) -> Result<PartialRecord, FetchError> {
        let record = match self {
            Category::Version => {
                let body: VersionResponse = serde_json::from_value(body)?;
                PartialRecord::new().with(Attribute::Version, body.version)
            }
            Category::PendingTx => {
                let body: UtxSizeResponse = serde_json::from_value(body)?;
                PartialRecord::new().with(Attribute::Utx, body.size)
            }
            Category::DebugInfo => {
                let body: DebugInfoResponse = serde_json::from_value(body)?;
                let chain = body.blockchain_debug_info;
                let mut record = PartialRecord::new()
                    .with(Attribute::State, format!("{},{}", body.state_height, body.state_hash))
                    .with(Attribute::Persisted, chain.persisted.to_string())
                    .with(Attribute::Bottom, chain.bottom.to_string())
                    .with(Attribute::Top, chain.top.to_string());
                if let Some(hash) = chain.micro_base_hash {
                    record.insert(Attribute::MicroHash, hash);
                }
                record
            }
            Category::MinerInfo => {
                let entries: Vec<MinerInfoEntry> = serde_json::from_value(body)?;
                let first = entries.into_iter().next().ok_or(FetchError::EmptyMinerInfo)?;
                PartialRecord::new()
                    .with(Attribute::Address, first.address)
                    .with(Attribute::MiningBalance, format_balance(first.mining_balance))
                    .with(Attribute::In, format_countdown(first.timestamp, now_ms))
            }
            Category::HistoryInfo => {
                let body: HistoryInfoResponse = serde_json::from_value(body)?;
                PartialRecord::new()
                    .with(Attribute::LastMicros, body.micro_block_ids.join("\n"))
                    .with(Attribute::LastBlocks, body.last_block_ids.join("\n"))
            }
            Category::WalletSeed => {
                let body: SeedResponse = serde_json::from_value(body)?;
                PartialRecord::new().with(Attribute::Seed, body.seed)
            }
        };
        Ok(record)
    }

    /// Record rendered in place of real data when the fetch failed.
    ///
    /// Miner info shows a fixed placeholder; every other category shows the
    /// error message under each of its attributes.
    pub fn fallback(self, error: &FetchError) -> PartialRecord {
        let display = match self {
            Category::MinerInfo => MINER_PLACEHOLDER.to_string(),
            _ => error.to_string(),
        };
        let mut record = PartialRecord::new();
        for attr in self.attributes() {
            record.insert(*attr, display.as_str());
        }
        record
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Version => "version",
            Category::PendingTx => "pending-tx",
            Category::DebugInfo => "debug-info",
            Category::MinerInfo => "miner-info",
            Category::HistoryInfo => "history-info",
            Category::WalletSeed => "wallet-seed",
        };
        f.write_str(name)
    }
}

/// `~<balance / 10^7 rounded up> waves`
fn format_balance(balance: i64) -> String {
    format!("~{} waves", (balance as f64 / BALANCE_UNITS).ceil() as i64)
}

/// Seconds until `timestamp_ms`, rounded half up.
fn format_countdown(timestamp_ms: i64, now_ms: i64) -> String {
    let seconds = ((timestamp_ms - now_ms) as f64 / 1000.0 + 0.5).floor() as i64;
    format!("{} seconds", seconds)
}

#[derive(Debug, Deserialize)]
struct VersionResponse {
    version: String,
}

#[derive(Debug, Deserialize)]
struct UtxSizeResponse {
    size: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DebugInfoResponse {
    state_height: u64,
    state_hash: String,
    blockchain_debug_info: ChainDebugInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChainDebugInfo {
    persisted: BlockRef,
    bottom: BlockRef,
    top: BlockRef,
    #[serde(default)]
    micro_base_hash: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BlockRef {
    height: u64,
    hash: String,
}

impl fmt::Display for BlockRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.height, self.hash)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HistoryInfoResponse {
    micro_block_ids: Vec<String>,
    last_block_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MinerInfoEntry {
    address: String,
    mining_balance: i64,
    timestamp: i64,
}

#[derive(Debug, Deserialize)]
struct SeedResponse {
    seed: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::TransportError;
    use crate::record::AttrValue;
    use serde_json::json;

    #[test]
    fn test_version_shape() {
        let record = Category::Version.shape(json!({"version": "Waves v1.2.3"}), 0).unwrap();
        assert_eq!(record.get(Attribute::Version), Some(&AttrValue::text("Waves v1.2.3")));
        assert_eq!(record.len(), 1);
    }

    #[test]
    fn test_utx_is_numeric() {
        let record = Category::PendingTx.shape(json!({"size": 5}), 0).unwrap();
        assert_eq!(record.get(Attribute::Utx), Some(&AttrValue::Int(5)));
    }

    #[test]
    fn test_debug_info_shape() {
        let body = json!({
            "stateHeight": 100,
            "stateHash": "s1",
            "blockchainDebugInfo": {
                "persisted": {"height": 98, "hash": "p"},
                "bottom": {"height": 99, "hash": "b"},
                "top": {"height": 100, "hash": "t"},
                "microBaseHash": "m"
            }
        });
        let record = Category::DebugInfo.shape(body, 0).unwrap();
        let attrs: Vec<_> = record.attributes().collect();
        assert_eq!(attrs, Category::DebugInfo.attributes());
        assert_eq!(record.get(Attribute::State), Some(&AttrValue::text("100,s1")));
        assert_eq!(record.get(Attribute::Persisted), Some(&AttrValue::text("98,p")));
        assert_eq!(record.get(Attribute::Bottom), Some(&AttrValue::text("99,b")));
        assert_eq!(record.get(Attribute::Top), Some(&AttrValue::text("100,t")));
        assert_eq!(record.get(Attribute::MicroHash), Some(&AttrValue::text("m")));
    }

    #[test]
    fn test_debug_info_without_micro_hash() {
        let body = json!({
            "stateHeight": 1,
            "stateHash": "s",
            "blockchainDebugInfo": {
                "persisted": {"height": 1, "hash": "p"},
                "bottom": {"height": 1, "hash": "b"},
                "top": {"height": 1, "hash": "t"},
                "microBaseHash": null
            }
        });
        let record = Category::DebugInfo.shape(body, 0).unwrap();
        assert!(record.get(Attribute::MicroHash).is_none());
    }

    #[test]
    fn test_history_joins_lines() {
        let body = json!({"microBlockIds": ["m1", "m2"], "lastBlockIds": ["b1"]});
        let record = Category::HistoryInfo.shape(body, 0).unwrap();
        assert_eq!(record.get(Attribute::LastMicros), Some(&AttrValue::text("m1\nm2")));
        assert_eq!(record.get(Attribute::LastBlocks), Some(&AttrValue::text("b1")));
    }

    #[test]
    fn test_miner_info_shape() {
        let body = json!([
            {"address": "3PAbc", "miningBalance": 150_000_001i64, "timestamp": 1_000_012_400i64},
            {"address": "3PIgnored", "miningBalance": 1, "timestamp": 0}
        ]);
        let record = Category::MinerInfo.shape(body, 1_000_000_000).unwrap();
        assert_eq!(record.get(Attribute::Address), Some(&AttrValue::text("3PAbc")));
        assert_eq!(record.get(Attribute::MiningBalance), Some(&AttrValue::text("~16 waves")));
        assert_eq!(record.get(Attribute::In), Some(&AttrValue::text("12 seconds")));
    }

    #[test]
    fn test_countdown_rounds_half_up() {
        assert_eq!(format_countdown(2_500, 0), "3 seconds");
        assert_eq!(format_countdown(0, 2_500), "-2 seconds");
        assert_eq!(format_countdown(1_499, 0), "1 seconds");
    }

    #[test]
    fn test_balance_rounds_up() {
        assert_eq!(format_balance(0), "~0 waves");
        assert_eq!(format_balance(10_000_000), "~1 waves");
        assert_eq!(format_balance(10_000_001), "~2 waves");
    }

    #[test]
    fn test_empty_miner_info_is_an_error() {
        let result = Category::MinerInfo.shape(json!([]), 0);
        assert!(matches!(result, Err(FetchError::EmptyMinerInfo)));
    }

    #[test]
    fn test_malformed_body_is_an_error() {
        let result = Category::Version.shape(json!({"unexpected": true}), 0);
        assert!(matches!(result, Err(FetchError::Decode(_))));
    }

    #[test]
    fn test_fallback_uses_error_message() {
        let error = FetchError::Transport(TransportError::Timeout);
        let record = Category::DebugInfo.fallback(&error);
        let attrs: Vec<_> = record.attributes().collect();
        assert_eq!(attrs, Category::DebugInfo.attributes());
        for (_, value) in record.iter() {
            assert_eq!(value, &AttrValue::text("timeout"));
        }
    }

    #[test]
    fn test_pending_tx_fallback_keeps_own_key() {
        let error = FetchError::Transport(TransportError::Timeout);
        let record = Category::PendingTx.fallback(&error);
        assert_eq!(record.get(Attribute::Utx), Some(&AttrValue::text("timeout")));
        assert!(record.get(Attribute::Version).is_none());
    }

    #[test]
    fn test_miner_fallback_uses_placeholder() {
        let error = FetchError::Transport(TransportError::Network("refused".to_string()));
        let record = Category::MinerInfo.fallback(&error);
        assert_eq!(record.len(), 3);
        for (_, value) in record.iter() {
            assert_eq!(value, &AttrValue::text(MINER_PLACEHOLDER));
        }
    }

    #[test]
    fn test_seed_is_opt_in() {
        assert!(!Category::enabled(false).contains(&Category::WalletSeed));
        assert_eq!(Category::enabled(true).last(), Some(&Category::WalletSeed));
    }

    #[test]
    fn test_seed_shape() {
        let body = json!({"seed": "abandon ability able"});
        let record = Category::WalletSeed.shape(body, 0).unwrap();
        assert_eq!(record.len(), 1);
        assert_eq!(record.get(Attribute::Seed), Some(&AttrValue::text("abandon ability able")));

        let result = Category::WalletSeed.shape(json!({"words": []}), 0);
        assert!(matches!(result, Err(FetchError::Decode(_))));
    }

    #[test]
    fn test_seed_fallback_uses_error_message() {
        let error = FetchError::Transport(TransportError::Status {
            code: 403,
            reason: "Forbidden".to_string(),
        });
        let record = Category::WalletSeed.fallback(&error);
        assert_eq!(record.len(), 1);
        assert_eq!(record.get(Attribute::Seed), Some(&AttrValue::text("HTTP 403 Forbidden")));
    }
}
