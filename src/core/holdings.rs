//! Ordered collection of stock holdings

use crate::core::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HoldingId(pub u64);

impl Display for HoldingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub id: HoldingId,
    pub ticker: String,
    pub quantity: f64,
}

/// Holdings in insertion order. Ids are handed out monotonically until the
/// id space runs out and are never shared by two holdings in the ledger.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HoldingsLedger {
    holdings: Vec<Holding>,
    next_id: u64,
}

impl HoldingsLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a ledger from persisted holdings. Later entries reusing an
    /// id already seen are dropped.
    pub fn from_holdings(holdings: Vec<Holding>) -> Self {
        let mut ledger = Self::new();
        for holding in holdings {
            if ledger.get(holding.id).is_some() {
                tracing::warn!(id = %holding.id, "Dropping holding with duplicate id");
                continue;
            }
            ledger.next_id = ledger.next_id.max(holding.id.0.saturating_add(1));
            ledger.holdings.push(holding);
        }
        ledger
    }

    /// Appends a holding parsed from raw user input.
    pub fn add(&mut self, ticker: &str, quantity_input: &str) -> Result<HoldingId, ValidationError> {
        let ticker = ticker.trim();
        if ticker.is_empty() {
            return Err(ValidationError::EmptyTicker);
        }
        let quantity = parse_number(quantity_input)
            .ok_or_else(|| ValidationError::InvalidQuantity(quantity_input.to_string()))?;

        let id = self.allocate_id();
        self.holdings.push(Holding {
            id,
            ticker: ticker.to_uppercase(),
            quantity,
        });
        Ok(id)
    }

    // Hands out `next_id` while it is free. Once the ids above the highest
    // one are used up, falls back to the smallest unused id.
    fn allocate_id(&mut self) -> HoldingId {
        let id = if self.get(HoldingId(self.next_id)).is_none() {
            self.next_id
        } else {
            (0..=u64::MAX)
                .find(|candidate| self.get(HoldingId(*candidate)).is_none())
                .unwrap_or(self.next_id)
        };
        self.next_id = self.next_id.max(id.saturating_add(1));
        HoldingId(id)
    }

    /// Removes the holding with `id`. Returns false if there was none.
    pub fn remove(&mut self, id: HoldingId) -> bool {
        let before = self.holdings.len();
        self.holdings.retain(|h| h.id != id);
        self.holdings.len() != before
    }

    pub fn get(&self, id: HoldingId) -> Option<&Holding> {
        self.holdings.iter().find(|h| h.id == id)
    }

    pub fn holdings(&self) -> &[Holding] {
        &self.holdings
    }

    pub fn len(&self) -> usize {
        self.holdings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }
}

/// Parses a finite number, ignoring surrounding whitespace.
pub(crate) fn parse_number(input: &str) -> Option<f64> {
    input
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_add_normalizes_ticker() {
        let mut ledger = HoldingsLedger::new();
        let id = ledger.add("hfcl.ns", "10").unwrap();

        let holding = ledger.get(id).unwrap();
        assert_eq!(holding.ticker, "HFCL.NS");
        assert_eq!(holding.quantity, 10.0);
    }

    #[test]
    fn test_add_rejects_bad_input() {
        let mut ledger = HoldingsLedger::new();

        assert_eq!(ledger.add("", "10"), Err(ValidationError::EmptyTicker));
        assert_eq!(ledger.add("   ", "10"), Err(ValidationError::EmptyTicker));
        assert_eq!(
            ledger.add("ABC", "abc"),
            Err(ValidationError::InvalidQuantity("abc".to_string()))
        );
        assert_eq!(
            ledger.add("ABC", ""),
            Err(ValidationError::InvalidQuantity(String::new()))
        );
        assert!(ledger.add("ABC", "NaN").is_err());
        assert!(ledger.add("ABC", "inf").is_err());
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_add_keeps_permissive_quantities() {
        let mut ledger = HoldingsLedger::new();
        ledger.add("ABC", "0").unwrap();
        ledger.add("DEF", "-5").unwrap();
        ledger.add("GHI", " 2.5 ").unwrap();

        let quantities: Vec<f64> = ledger.holdings().iter().map(|h| h.quantity).collect();
        assert_eq!(quantities, vec![0.0, -5.0, 2.5]);
    }

    #[test]
    fn test_remove_preserves_order_and_is_idempotent() {
        let mut ledger = HoldingsLedger::new();
        let a = ledger.add("A", "1").unwrap();
        let b = ledger.add("B", "2").unwrap();
        let c = ledger.add("C", "3").unwrap();

        assert!(ledger.remove(b));
        assert!(!ledger.remove(b));
        assert!(!ledger.remove(HoldingId(999)));

        let ids: Vec<HoldingId> = ledger.holdings().iter().map(|h| h.id).collect();
        assert_eq!(ids, vec![a, c]);
    }

    #[test]
    fn test_ids_unique_across_mixed_operations() {
        let mut ledger = HoldingsLedger::new();
        let mut expected: Vec<String> = Vec::new();

        for round in 0..20 {
            let ticker = format!("T{round}");
            let id = ledger.add(&ticker, "1").unwrap();
            expected.push(ticker);
            if round % 3 == 0 {
                ledger.remove(id);
                expected.pop();
            }
            if round % 5 == 4 {
                let first = ledger.holdings()[0].id;
                ledger.remove(first);
                expected.remove(0);
            }

            let ids: HashSet<HoldingId> = ledger.holdings().iter().map(|h| h.id).collect();
            assert_eq!(ids.len(), ledger.len());
        }

        let tickers: Vec<String> = ledger.holdings().iter().map(|h| h.ticker.clone()).collect();
        assert_eq!(tickers, expected);
    }

    #[test]
    fn test_from_holdings_continues_ids() {
        let ledger = HoldingsLedger::from_holdings(vec![
            Holding {
                id: HoldingId(1717000000000),
                ticker: "AAA".to_string(),
                quantity: 1.0,
            },
            Holding {
                id: HoldingId(4),
                ticker: "BBB".to_string(),
                quantity: 2.0,
            },
            Holding {
                id: HoldingId(4),
                ticker: "DUP".to_string(),
                quantity: 3.0,
            },
        ]);
        assert_eq!(ledger.len(), 2);

        let mut ledger = ledger;
        let id = ledger.add("CCC", "1").unwrap();
        assert_eq!(id, HoldingId(1717000000001));
    }

    #[test]
    fn test_add_after_highest_possible_id() {
        let mut ledger = HoldingsLedger::from_holdings(vec![Holding {
            id: HoldingId(u64::MAX),
            ticker: "AAA".to_string(),
            quantity: 1.0,
        }]);

        let first = ledger.add("BBB", "1").unwrap();
        let second = ledger.add("CCC", "2").unwrap();

        let ids: Vec<HoldingId> = ledger.holdings().iter().map(|h| h.id).collect();
        assert_eq!(ids, vec![HoldingId(u64::MAX), HoldingId(0), HoldingId(1)]);
        assert_eq!((first, second), (HoldingId(0), HoldingId(1)));

        ledger.remove(first);
        let third = ledger.add("DDD", "3").unwrap();
        assert_eq!(third, HoldingId(0));
        let unique: HashSet<HoldingId> = ledger.holdings().iter().map(|h| h.id).collect();
        assert_eq!(unique.len(), ledger.len());
    }
}
