//! Open positions and closed trades held by the strategy ledger.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    /// +1 for long, -1 for short.
    pub fn sign(self) -> f64 {
        match self {
            Direction::Long => 1.0,
            Direction::Short => -1.0,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Long => Direction::Short,
            Direction::Short => Direction::Long,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Long => "long",
            Direction::Short => "short",
        }
    }

    /// Accepts `long`/`short` in any case; also `buy`/`sell`.
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "long" | "buy" => Some(Direction::Long),
            "short" | "sell" => Some(Direction::Short),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LedgerPosition {
    pub id: String,
    pub direction: Direction,
    /// Always positive while open.
    pub quantity: f64,
    pub entry_price: f64,
    pub entry_time: i64,
    pub entry_bar: usize,
}

impl LedgerPosition {
    pub fn is_long(&self) -> bool {
        self.direction == Direction::Long
    }

    pub fn is_short(&self) -> bool {
        self.direction == Direction::Short
    }

    /// Quantity signed by direction.
    pub fn signed_quantity(&self) -> f64 {
        self.direction.sign() * self.quantity
    }

    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        self.direction.sign() * (price - self.entry_price) * self.quantity
    }

    pub fn market_value(&self, price: f64) -> f64 {
        self.quantity * price
    }

    /// Close at `price`, consuming the position.
    pub fn close(self, exit_price: f64, exit_time: i64) -> ClosedTrade {
        let profit = self.unrealized_pnl(exit_price);
        ClosedTrade {
            id: self.id,
            direction: self.direction,
            quantity: self.quantity,
            entry_price: self.entry_price,
            exit_price,
            profit,
            entry_time: self.entry_time,
            exit_time,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClosedTrade {
    pub id: String,
    pub direction: Direction,
    pub quantity: f64,
    pub entry_price: f64,
    pub exit_price: f64,
    pub profit: f64,
    pub entry_time: i64,
    pub exit_time: i64,
}

impl ClosedTrade {
    pub fn is_win(&self) -> bool {
        self.profit > 0.0
    }

    pub fn is_loss(&self) -> bool {
        self.profit < 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_long_position() -> LedgerPosition {
        LedgerPosition {
            id: "L1".into(),
            direction: Direction::Long,
            quantity: 100.0,
            entry_price: 50.0,
            entry_time: 1_705_276_800_000,
            entry_bar: 3,
        }
    }

    fn sample_short_position() -> LedgerPosition {
        LedgerPosition {
            id: "S1".into(),
            direction: Direction::Short,
            quantity: 100.0,
            entry_price: 100.0,
            entry_time: 1_705_276_800_000,
            entry_bar: 3,
        }
    }

    #[test]
    fn direction_flags() {
        assert!(sample_long_position().is_long());
        assert!(sample_short_position().is_short());
        assert_eq!(sample_short_position().signed_quantity(), -100.0);
    }

    #[test]
    fn direction_parsing() {
        assert_eq!(Direction::parse("long"), Some(Direction::Long));
        assert_eq!(Direction::parse("SHORT"), Some(Direction::Short));
        assert_eq!(Direction::parse("sideways"), None);
        assert_eq!(Direction::Long.opposite(), Direction::Short);
    }

    #[test]
    fn unrealized_pnl_long_profit() {
        let pos = sample_long_position();
        assert!((pos.unrealized_pnl(55.0) - 500.0).abs() < f64::EPSILON);
    }

    #[test]
    fn unrealized_pnl_short_profit() {
        let pos = sample_short_position();
        assert!((pos.unrealized_pnl(90.0) - 1000.0).abs() < f64::EPSILON);
        assert!((pos.unrealized_pnl(110.0) + 1000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn market_value_uses_absolute_quantity() {
        assert!((sample_short_position().market_value(95.0) - 9500.0).abs() < f64::EPSILON);
    }

    #[test]
    fn close_long_records_profit() {
        let trade = sample_long_position().close(60.0, 1_705_363_200_000);
        assert_eq!(trade.id, "L1");
        assert!((trade.profit - 1000.0).abs() < f64::EPSILON);
        assert!(trade.is_win());
        assert_eq!(trade.exit_time, 1_705_363_200_000);
    }

    #[test]
    fn close_short_records_loss() {
        let trade = sample_short_position().close(105.0, 0);
        assert!((trade.profit + 500.0).abs() < f64::EPSILON);
        assert!(trade.is_loss());
    }
}
