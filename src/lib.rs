//! Curve Lend APY Alert Bot
//!
//! A Telegram bot that tracks crvUSD deposit APY across Curve lending
//! vaults and notifies subscribers when pools cross their thresholds.

pub mod bot;
pub mod config;
pub mod dedup;
pub mod dialog;
pub mod error;
pub mod feed;
pub mod report;
pub mod scheduler;
pub mod store;
pub mod telegram;
pub mod types;
