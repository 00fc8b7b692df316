//! Report formatting
//!
//! Turns a vault snapshot into a ranked, network-grouped HTML message.


use crate::types::{Vault, VaultSnapshot};

/// Fixed filter floor for the on-demand "top pools" view (percent)
pub const ON_DEMAND_FLOOR: f64 = 1.0;
/// Total APY above which an entry gets the rocket marker (percent)
const HOT_APY: f64 = 20.0;

/// Which header and no-matches wording a rendered report uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    /// `/apy` command output
    OnDemand,
    /// Scheduled subscription alert
    Alert,
    /// Immediate check right after a subscription is created
    TestAlert,
}

/// Message returned when the feed reports zero vaults
pub const DATA_UNAVAILABLE: &str = "Could not fetch pool data. Please try again later.";

/// Render a report that always produces a message.
///
/// Used by the on-demand and test-alert paths: a zero-vault snapshot
/// yields the data-unavailable message, and an all-filtered snapshot
/// yields an explicit no-matches message.
pub fn render(
    snapshot: &VaultSnapshot,
    kind: ReportKind,
    threshold: f64,
    top_n: Option<usize>,
) -> String {
    if snapshot.is_empty() {
        return DATA_UNAVAILABLE.to_string();
    }

    match body(snapshot, threshold, top_n) {
        Some(entries) => format!("{}\n\n{}", header(kind, threshold), entries),
        None => no_matches(kind, threshold),
    }
}

/// Render a scheduled alert, or `None` when no vault clears the
/// threshold. Scheduled checks stay silent on zero matches.
pub fn render_alert(snapshot: &VaultSnapshot, threshold: f64) -> Option<String> {
    if snapshot.is_empty() {
        return None;
    }
    body(snapshot, threshold, None)
        .map(|entries| format!("{}\n\n{}", header(ReportKind::Alert, threshold), entries))
}

fn header(kind: ReportKind, threshold: f64) -> String {
    match kind {
        ReportKind::OnDemand => format!(
            "crvUSD deposit APY on Curve Lend (>= {threshold:.0}%)"
        ),
        ReportKind::Alert => format!(
            "\u{1F6A8} Alert: Curve Lend crvUSD deposit APY (>= {threshold:.0}%)"
        ),
        ReportKind::TestAlert => format!(
            "\u{1F6A8} Test alert: Curve Lend crvUSD deposit APY (>= {threshold:.0}%)"
        ),
    }
}

fn no_matches(kind: ReportKind, threshold: f64) -> String {
    match kind {
        ReportKind::TestAlert => format!(
            "No pools matched your target APY ({threshold:.0}%) in the test check."
        ),
        _ => format!("There are currently no pools with APY >= {threshold:.0}%."),
    }
}

/// Grouped, sorted, truncated entry lines; `None` if nothing survives
/// the threshold filter.
fn body(snapshot: &VaultSnapshot, threshold: f64, top_n: Option<usize>) -> Option<String> {
    // Group by network, preserving first-seen network order
    let mut groups: Vec<(&str, Vec<&Vault>)> = Vec::new();
    for vault in &snapshot.vaults {
        if vault.total_apy() < threshold {
            continue;
        }
        match groups.iter_mut().find(|(n, _)| *n == vault.network) {
            Some((_, list)) => list.push(vault),
            None => groups.push((vault.network.as_str(), vec![vault])),
        }
    }

    if groups.is_empty() {
        return None;
    }

    let mut out = String::new();
    for (network, mut vaults) in groups {
        // Stable sort: ties keep feed order
        vaults.sort_by(|a, b| {
            b.total_apy()
                .partial_cmp(&a.total_apy())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        if let Some(n) = top_n {
            vaults.truncate(n);
        }

        out.push_str(&format!("{}:\n", capitalize(network)));
        for vault in vaults {
            out.push_str(&entry_line(vault));
        }
        out.push('\n');
    }

    Some(out.trim_end().to_string())
}

fn entry_line(vault: &Vault) -> String {
    let reward_apy = vault.reward_apy();
    let reward_text = if reward_apy > 0.0 {
        format!("+ {:.2}% ({}) ", reward_apy, vault.reward_tokens())
    } else {
        String::new()
    };
    let rocket = if vault.total_apy() > HOT_APY {
        "\u{1F680} "
    } else {
        ""
    };

    format!(
        "<a href='{}'>{}</a>: {:.2}% {}{}\n",
        vault.deposit_url, vault.symbol, vault.lend_apy, reward_text, rocket
    )
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
