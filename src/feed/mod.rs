//! Curve lending vault feed client
//!
//! Fetches the current vault snapshot from the Curve API.

#[cfg(test)]
mod tests;

use crate::error::{BotError, Result};
use crate::types::{Reward, Vault, VaultSnapshot};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// Source of vault snapshots (allows mocking)
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch(&self) -> Result<VaultSnapshot>;
}

/// HTTP client for the lending vault feed
pub struct FeedClient {
    http: Client,
    url: String,
}

#[derive(Debug, Deserialize)]
struct FeedDocument {
    #[serde(default)]
    data: FeedData,
}

#[derive(Debug, Default, Deserialize)]
struct FeedData {
    #[serde(rename = "lendingVaultData", default)]
    lending_vault_data: Vec<RawVault>,
}

#[derive(Debug, Deserialize)]
struct RawVault {
    #[serde(rename = "blockchainId", default = "unknown")]
    blockchain_id: String,
    #[serde(default)]
    assets: RawAssets,
    #[serde(default)]
    rates: RawRates,
    #[serde(rename = "gaugeRewards", default)]
    gauge_rewards: Vec<RawReward>,
    #[serde(rename = "lendingVaultUrls", default)]
    lending_vault_urls: RawUrls,
}

#[derive(Debug, Default, Deserialize)]
struct RawAssets {
    #[serde(default)]
    collateral: RawCollateral,
}

#[derive(Debug, Deserialize)]
struct RawCollateral {
    #[serde(default = "unknown")]
    symbol: String,
}

impl Default for RawCollateral {
    fn default() -> Self {
        Self { symbol: unknown() }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawRates {
    #[serde(rename = "lendApyPcent", default)]
    lend_apy_pcent: f64,
}

#[derive(Debug, Deserialize)]
struct RawReward {
    #[serde(default)]
    apy: f64,
    #[serde(default)]
    symbol: String,
}

#[derive(Debug, Deserialize)]
struct RawUrls {
    #[serde(default = "placeholder_url")]
    deposit: String,
}

impl Default for RawUrls {
    fn default() -> Self {
        Self {
            deposit: placeholder_url(),
        }
    }
}

fn unknown() -> String {
    "Unknown".to_string()
}

fn placeholder_url() -> String {
    "#".to_string()
}

impl FeedClient {
    /// Create a new feed client with a bounded request timeout
    pub fn new(url: &str, timeout_secs: u64) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| BotError::FeedUnavailable(e.to_string()))?;

        Ok(Self {
            http,
            url: url.to_string(),
        })
    }

    /// Fetch and decode the current vault snapshot.
    ///
    /// Network errors, timeouts, and non-success statuses map to
    /// `FeedUnavailable`; an undecodable body maps to `FeedMalformed`.
    /// A document with a missing or empty vault list decodes to an
    /// empty snapshot — the feed may legitimately report zero vaults.
    pub async fn fetch(&self) -> Result<VaultSnapshot> {
        let resp = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|e| BotError::FeedUnavailable(e.to_string()))?
            .error_for_status()
            .map_err(|e| BotError::FeedUnavailable(e.to_string()))?;

        let body = resp
            .text()
            .await
            .map_err(|e| BotError::FeedUnavailable(e.to_string()))?;

        parse_snapshot(&body)
    }
}

#[async_trait]
impl FeedSource for FeedClient {
    async fn fetch(&self) -> Result<VaultSnapshot> {
        FeedClient::fetch(self).await
    }
}

/// Decode a feed document body into a snapshot
pub(crate) fn parse_snapshot(body: &str) -> Result<VaultSnapshot> {
    let doc: FeedDocument =
        serde_json::from_str(body).map_err(|e| BotError::FeedMalformed(e.to_string()))?;

    let vaults = doc
        .data
        .lending_vault_data
        .into_iter()
        .map(|raw| Vault {
            network: raw.blockchain_id,
            symbol: raw.assets.collateral.symbol,
            lend_apy: raw.rates.lend_apy_pcent,
            rewards: raw
                .gauge_rewards
                .into_iter()
                .map(|r| Reward {
                    apy: r.apy,
                    symbol: r.symbol,
                })
                .collect(),
            deposit_url: raw.lending_vault_urls.deposit,
        })
        .collect();

    Ok(VaultSnapshot { vaults })
}
