//! Market snapshot types.
//!
//! `Coin` mirrors the upstream market payload field-for-field so a snapshot
//! deserializes straight off the wire and serializes back out to clients
//! unchanged. `last_updated` is overwritten by the refresh coordinator at
//! persist time, so it reflects when *we* stored the snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Return-on-investment sub-object. Not every coin has one; absence is
/// preserved through the store as SQL NULL rather than an empty object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Roi {
    pub times: f64,
    pub currency: String,
    pub percentage: f64,
}

/// A full market snapshot for one coin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coin {
    /// Canonical upstream identifier (e.g. "bitcoin").
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub image: String,
    pub current_price: f64,
    pub market_cap: i64,
    pub market_cap_rank: i32,
    pub fully_diluted_valuation: i64,
    pub total_volume: i64,
    pub high_24h: f64,
    pub low_24h: f64,
    pub price_change_24h: f64,
    pub price_change_percentage_24h: f64,
    pub market_cap_change_24h: i64,
    pub market_cap_change_percentage_24h: f64,
    pub circulating_supply: f64,
    pub total_supply: f64,
    pub max_supply: Option<f64>,
    pub ath: f64,
    pub ath_change_percentage: f64,
    pub ath_date: DateTime<Utc>,
    pub atl: f64,
    pub atl_change_percentage: f64,
    pub atl_date: DateTime<Utc>,
    pub roi: Option<Roi>,
    /// When the snapshot was persisted locally.
    pub last_updated: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json(roi: &str) -> String {
        format!(
            r#"{{
                "id": "ethereum",
                "symbol": "eth",
                "name": "Ethereum",
                "image": "https://example.com/eth.png",
                "current_price": 2500.12,
                "market_cap": 300000000000,
                "market_cap_rank": 2,
                "fully_diluted_valuation": 300000000000,
                "total_volume": 12000000000,
                "high_24h": 2550.0,
                "low_24h": 2450.0,
                "price_change_24h": -12.5,
                "price_change_percentage_24h": -0.5,
                "market_cap_change_24h": -1000000000,
                "market_cap_change_percentage_24h": -0.33,
                "circulating_supply": 120000000.0,
                "total_supply": 120000000.0,
                "max_supply": null,
                "ath": 4800.0,
                "ath_change_percentage": -47.9,
                "ath_date": "2021-11-10T14:24:11.849Z",
                "atl": 0.43,
                "atl_change_percentage": 580000.0,
                "atl_date": "2015-10-20T00:00:00.000Z",
                "roi": {roi},
                "last_updated": "2024-06-01T12:00:00.000Z"
            }}"#
        )
    }

    #[test]
    fn test_deserialize_with_null_roi() {
        let coin: Coin = serde_json::from_str(&sample_json("null")).unwrap();
        assert_eq!(coin.id, "ethereum");
        assert!(coin.roi.is_none());
        assert!(coin.max_supply.is_none());
    }

    #[test]
    fn test_deserialize_with_roi() {
        let roi = r#"{"times": 60.5, "currency": "btc", "percentage": 6050.0}"#;
        let coin: Coin = serde_json::from_str(&sample_json(roi)).unwrap();
        let roi = coin.roi.expect("roi should be present");
        assert_eq!(roi.currency, "btc");
        assert_eq!(roi.times, 60.5);
    }

    #[test]
    fn test_serialize_preserves_absent_roi() {
        let coin: Coin = serde_json::from_str(&sample_json("null")).unwrap();
        let value = serde_json::to_value(&coin).unwrap();
        assert!(value.get("roi").unwrap().is_null());
    }
}
