//! Strategy ledger: open positions, pending orders, closed trades and the
//! equity curve.
//!
//! Cash moves only on realized profit, so at any mark price
//! `equity = initial_capital + Σ closed profit + Σ open unrealized`.

use crate::domain::error::LedgerError;
use crate::domain::ohlcv::Bar;
use crate::domain::position::{ClosedTrade, Direction, LedgerPosition};

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EquityPoint {
    pub time: i64,
    pub equity: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OrderKind {
    Entry { direction: Direction, quantity: f64 },
    /// Take-profit / stop-loss exit for the open position `from_entry`.
    Exit { from_entry: String },
}

/// Resting order filled against a later bar's range.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingOrder {
    pub id: String,
    pub kind: OrderKind,
    pub limit: Option<f64>,
    pub stop: Option<f64>,
}

impl PendingOrder {
    /// Price at which the order triggers within `bar`, stop checked before limit.
    fn trigger_price(&self, bar: &Bar, direction: Direction) -> Option<f64> {
        // An entry buys for long and sells for short; an exit does the reverse.
        let buys = match self.kind {
            OrderKind::Entry { .. } => direction == Direction::Long,
            OrderKind::Exit { .. } => direction == Direction::Short,
        };
        let stop_hit = self
            .stop
            .filter(|&stop| if buys { bar.high >= stop } else { bar.low <= stop });
        let limit_hit = self
            .limit
            .filter(|&limit| if buys { bar.low <= limit } else { bar.high >= limit });
        stop_hit.or(limit_hit)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyAccount {
    pub initial_capital: f64,
    pub cash: f64,
    open_positions: Vec<LedgerPosition>,
    closed_trades: Vec<ClosedTrade>,
    pending_orders: Vec<PendingOrder>,
    equity_curve: Vec<EquityPoint>,
}

impl StrategyAccount {
    pub fn new(initial_capital: f64) -> Self {
        Self {
            initial_capital,
            cash: initial_capital,
            open_positions: Vec::new(),
            closed_trades: Vec::new(),
            pending_orders: Vec::new(),
            equity_curve: Vec::new(),
        }
    }

    pub fn open_positions(&self) -> &[LedgerPosition] {
        &self.open_positions
    }

    pub fn closed_trades(&self) -> &[ClosedTrade] {
        &self.closed_trades
    }

    pub fn pending_orders(&self) -> &[PendingOrder] {
        &self.pending_orders
    }

    pub fn equity_curve(&self) -> &[EquityPoint] {
        &self.equity_curve
    }

    pub fn position(&self, id: &str) -> Option<&LedgerPosition> {
        self.open_positions.iter().find(|p| p.id == id)
    }

    pub fn has_position(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    /// Open a position. Fails on a non-positive quantity or an id that is already open.
    pub fn entry(
        &mut self,
        id: &str,
        direction: Direction,
        quantity: f64,
        price: f64,
        time: i64,
        bar: usize,
    ) -> Result<&LedgerPosition, LedgerError> {
        if quantity.is_nan() || quantity <= 0.0 {
            return Err(LedgerError::NonPositiveQuantity(quantity));
        }
        if self.has_position(id) {
            return Err(LedgerError::DuplicatePosition(id.to_string()));
        }
        tracing::debug!(id, %direction, quantity, price, bar, "position opened");
        self.open_positions.push(LedgerPosition {
            id: id.to_string(),
            direction,
            quantity,
            entry_price: price,
            entry_time: time,
            entry_bar: bar,
        });
        let last = self.open_positions.len() - 1;
        Ok(&self.open_positions[last])
    }

    /// Close every position opposite to `direction` at `price`, then open `id`.
    /// An id that is already open is left untouched and yields no trades.
    pub fn enter_reversing(
        &mut self,
        id: &str,
        direction: Direction,
        quantity: f64,
        price: f64,
        time: i64,
        bar: usize,
    ) -> Result<Vec<ClosedTrade>, LedgerError> {
        if self.has_position(id) {
            return Ok(Vec::new());
        }
        if quantity.is_nan() || quantity <= 0.0 {
            return Err(LedgerError::NonPositiveQuantity(quantity));
        }
        let opposite: Vec<String> = self
            .open_positions
            .iter()
            .filter(|p| p.direction == direction.opposite())
            .map(|p| p.id.clone())
            .collect();
        let mut closed = Vec::with_capacity(opposite.len());
        for other in opposite {
            closed.push(self.exit(&other, price, time)?);
        }
        self.entry(id, direction, quantity, price, time, bar)?;
        Ok(closed)
    }

    /// Close the open position `id` at `price`. Its resting exit orders are dropped.
    pub fn exit(&mut self, id: &str, price: f64, time: i64) -> Result<ClosedTrade, LedgerError> {
        let index = self
            .open_positions
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| LedgerError::UnknownPosition(id.to_string()))?;
        let trade = self.open_positions.remove(index).close(price, time);
        self.cash += trade.profit;
        self.pending_orders.retain(
            |o| !matches!(&o.kind, OrderKind::Exit { from_entry } if from_entry == id),
        );
        tracing::debug!(id, price, profit = trade.profit, "position closed");
        self.closed_trades.push(trade.clone());
        Ok(trade)
    }

    pub fn close_all(&mut self, price: f64, time: i64) -> Vec<ClosedTrade> {
        let ids: Vec<String> = self.open_positions.iter().map(|p| p.id.clone()).collect();
        ids.iter()
            .filter_map(|id| self.exit(id, price, time).ok())
            .collect()
    }

    /// Queue an order, replacing any pending order with the same id.
    pub fn place_order(&mut self, order: PendingOrder) {
        self.pending_orders.retain(|o| o.id != order.id);
        tracing::debug!(id = %order.id, limit = ?order.limit, stop = ?order.stop, "order placed");
        self.pending_orders.push(order);
    }

    /// Remove the pending order `id`. Returns whether one existed.
    pub fn cancel(&mut self, id: &str) -> bool {
        let before = self.pending_orders.len();
        self.pending_orders.retain(|o| o.id != id);
        before != self.pending_orders.len()
    }

    pub fn cancel_all(&mut self) -> usize {
        let count = self.pending_orders.len();
        self.pending_orders.clear();
        count
    }

    /// Fill resting orders whose price lies inside `bar`'s range, in placement order.
    /// Returns the number of orders filled.
    pub fn fill_pending(&mut self, bar: &Bar, bar_index: usize) -> usize {
        let orders = std::mem::take(&mut self.pending_orders);
        let mut filled = 0;
        for order in orders {
            let direction = match &order.kind {
                OrderKind::Entry { direction, .. } => {
                    if self.has_position(&order.id) {
                        tracing::debug!(id = %order.id, "entry order dropped, position already open");
                        continue;
                    }
                    Some(*direction)
                }
                OrderKind::Exit { from_entry } => self.position(from_entry).map(|p| p.direction),
            };
            // an exit whose entry is still resting waits until the position opens
            let Some(direction) = direction else {
                self.pending_orders.push(order);
                continue;
            };
            let Some(price) = order.trigger_price(bar, direction) else {
                self.pending_orders.push(order);
                continue;
            };
            let result = match order.kind {
                OrderKind::Entry {
                    direction,
                    quantity,
                } => self
                    .enter_reversing(&order.id, direction, quantity, price, bar.time, bar_index)
                    .map(|_| ()),
                OrderKind::Exit { from_entry } => {
                    self.exit(&from_entry, price, bar.time).map(|_| ())
                }
            };
            match result {
                Ok(()) => filled += 1,
                Err(e) => tracing::warn!(id = %order.id, error = %e, "order rejected"),
            }
        }
        filled
    }

    /// Net open quantity: positive when long, negative when short.
    pub fn position_size(&self) -> f64 {
        self.open_positions.iter().map(|p| p.signed_quantity()).sum()
    }

    /// Quantity-weighted average entry price of open positions, NaN when flat.
    pub fn position_avg_price(&self) -> f64 {
        let quantity: f64 = self.open_positions.iter().map(|p| p.quantity).sum();
        if quantity == 0.0 {
            return f64::NAN;
        }
        let cost: f64 = self
            .open_positions
            .iter()
            .map(|p| p.entry_price * p.quantity)
            .sum();
        cost / quantity
    }

    pub fn open_profit(&self, price: f64) -> f64 {
        self.open_positions
            .iter()
            .map(|p| p.unrealized_pnl(price))
            .sum()
    }

    pub fn equity(&self, price: f64) -> f64 {
        self.cash + self.open_profit(price)
    }

    /// Mark to market at `price`. A second mark with the same time revises the last point.
    pub fn record_equity(&mut self, time: i64, price: f64) {
        let equity = self.equity(price);
        match self.equity_curve.last_mut() {
            Some(last) if last.time == time => last.equity = equity,
            _ => self.equity_curve.push(EquityPoint { time, equity }),
        }
    }
}
