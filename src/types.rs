//! Core domain types

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Lowest threshold a subscriber may set (percent)
pub const MIN_THRESHOLD: u32 = 10;
/// Highest threshold a subscriber may set (percent)
pub const MAX_THRESHOLD: u32 = 50;

/// A reward incentive attached to a lending vault
#[derive(Debug, Clone, PartialEq)]
pub struct Reward {
    /// Incentive APY in percent
    pub apy: f64,
    /// Reward token symbol
    pub symbol: String,
}

/// A single lending vault from the feed
#[derive(Debug, Clone, PartialEq)]
pub struct Vault {
    /// Network the vault lives on (e.g. "ethereum")
    pub network: String,
    /// Collateral asset symbol
    pub symbol: String,
    /// Base lending APY in percent
    pub lend_apy: f64,
    /// Reward incentives, possibly empty
    pub rewards: Vec<Reward>,
    /// Deposit page URL
    pub deposit_url: String,
}

impl Vault {
    /// Sum of all reward-incentive APYs
    pub fn reward_apy(&self) -> f64 {
        self.rewards.iter().map(|r| r.apy).sum()
    }

    /// Base APY plus all reward APYs
    pub fn total_apy(&self) -> f64 {
        self.lend_apy + self.reward_apy()
    }

    /// Comma-joined reward token symbols, skipping empty names
    pub fn reward_tokens(&self) -> String {
        self.rewards
            .iter()
            .filter(|r| !r.symbol.is_empty())
            .map(|r| r.symbol.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// One fetch worth of vaults, in feed order. Never persisted.
#[derive(Debug, Clone, Default)]
pub struct VaultSnapshot {
    pub vaults: Vec<Vault>,
}

impl VaultSnapshot {
    pub fn is_empty(&self) -> bool {
        self.vaults.is_empty()
    }
}

/// Unique key for a subscription: who asked, and where
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AlertKey {
    pub user_id: i64,
    pub chat_id: i64,
}

impl AlertKey {
    pub fn new(user_id: i64, chat_id: i64) -> Self {
        Self { user_id, chat_id }
    }
}

/// A subscriber's alert configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertConfig {
    /// Minimum total APY (percent) that triggers a notification
    pub threshold: u32,
    /// Hours between scheduled checks
    pub interval_hours: u32,
    /// When this subscription was last evaluated
    pub last_check: DateTime<Utc>,
}

impl AlertConfig {
    /// Whether the subscription is due for re-evaluation at `now`
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        now - self.last_check >= Duration::hours(i64::from(self.interval_hours))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vault(lend_apy: f64, rewards: Vec<(f64, &str)>) -> Vault {
        Vault {
            network: "ethereum".to_string(),
            symbol: "USDC".to_string(),
            lend_apy,
            rewards: rewards
                .into_iter()
                .map(|(apy, symbol)| Reward {
                    apy,
                    symbol: symbol.to_string(),
                })
                .collect(),
            deposit_url: "#".to_string(),
        }
    }

    #[test]
    fn test_total_apy_sums_rewards() {
        let v = vault(5.5, vec![(2.0, "CRV"), (1.5, "ARB")]);
        assert_eq!(v.reward_apy(), 3.5);
        assert_eq!(v.total_apy(), 9.0);
    }

    #[test]
    fn test_total_apy_without_rewards() {
        let v = vault(5.5, vec![]);
        assert_eq!(v.total_apy(), 5.5);
    }

    #[test]
    fn test_reward_tokens_skips_empty_symbols() {
        let v = vault(1.0, vec![(2.0, "CRV"), (0.5, ""), (1.0, "OP")]);
        assert_eq!(v.reward_tokens(), "CRV, OP");
    }

    #[test]
    fn test_is_due_at_exact_interval() {
        let config = AlertConfig {
            threshold: 20,
            interval_hours: 6,
            last_check: Utc::now() - Duration::hours(6),
        };
        assert!(config.is_due(Utc::now()));
    }

    #[test]
    fn test_not_due_before_interval() {
        let now = Utc::now();
        let config = AlertConfig {
            threshold: 20,
            interval_hours: 6,
            last_check: now - Duration::hours(5),
        };
        assert!(!config.is_due(now));
    }
}
