//! Tests for feed module

#[cfg(test)]
mod tests {
    use super::super::parse_snapshot;
    use crate::error::BotError;

    #[test]
    fn test_parses_full_document() {
        let body = r#"{
            "success": true,
            "data": {
                "lendingVaultData": [
                    {
                        "blockchainId": "ethereum",
                        "assets": {
                            "collateral": {"symbol": "wstETH"},
                            "borrowed": {"symbol": "crvUSD"}
                        },
                        "rates": {"lendApyPcent": 7.25, "borrowApyPcent": 9.1},
                        "gaugeRewards": [
                            {"apy": 2.5, "symbol": "CRV"},
                            {"apy": 0.75, "symbol": "ARB"}
                        ],
                        "lendingVaultUrls": {
                            "deposit": "https://lend.curve.fi/#/ethereum/markets/one-lendingVault/deposit",
                            "withdraw": "https://lend.curve.fi/#/ethereum/markets/one-lendingVault/withdraw"
                        }
                    }
                ]
            }
        }"#;

        let snapshot = parse_snapshot(body).unwrap();
        assert_eq!(snapshot.vaults.len(), 1);

        let vault = &snapshot.vaults[0];
        assert_eq!(vault.network, "ethereum");
        assert_eq!(vault.symbol, "wstETH");
        assert_eq!(vault.lend_apy, 7.25);
        assert_eq!(vault.rewards.len(), 2);
        assert_eq!(vault.reward_apy(), 3.25);
        assert_eq!(vault.total_apy(), 10.5);
        assert_eq!(vault.reward_tokens(), "CRV, ARB");
        assert!(vault.deposit_url.ends_with("/deposit"));
    }

    #[test]
    fn test_absent_fields_default() {
        let body = r#"{"data": {"lendingVaultData": [{}]}}"#;

        let snapshot = parse_snapshot(body).unwrap();
        let vault = &snapshot.vaults[0];
        assert_eq!(vault.network, "Unknown");
        assert_eq!(vault.symbol, "Unknown");
        assert_eq!(vault.lend_apy, 0.0);
        assert!(vault.rewards.is_empty());
        assert_eq!(vault.deposit_url, "#");
    }

    #[test]
    fn test_missing_vault_list_is_empty_snapshot() {
        // Zero vaults is "no data", not a parse failure
        assert!(parse_snapshot(r#"{"data": {}}"#).unwrap().is_empty());
        assert!(parse_snapshot(r#"{}"#).unwrap().is_empty());
        assert!(parse_snapshot(r#"{"data": {"lendingVaultData": []}}"#)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_undecodable_body_is_malformed() {
        let err = parse_snapshot("<html>502 Bad Gateway</html>").unwrap_err();
        assert!(matches!(err, BotError::FeedMalformed(_)));

        let err = parse_snapshot(r#"{"data": {"lendingVaultData": "nope"}}"#).unwrap_err();
        assert!(matches!(err, BotError::FeedMalformed(_)));
    }

    #[test]
    fn test_feed_order_preserved() {
        let body = r#"{"data": {"lendingVaultData": [
            {"blockchainId": "ethereum", "assets": {"collateral": {"symbol": "A"}}},
            {"blockchainId": "arbitrum", "assets": {"collateral": {"symbol": "B"}}},
            {"blockchainId": "ethereum", "assets": {"collateral": {"symbol": "C"}}}
        ]}}"#;

        let snapshot = parse_snapshot(body).unwrap();
        let symbols: Vec<&str> = snapshot.vaults.iter().map(|v| v.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["A", "B", "C"]);
    }
}
