//! Strategy performance metrics.
//!
//! Nothing here is maintained incrementally: each query folds over the closed
//! trades and the equity curve, O(trades + curve length).

use super::account::{EquityPoint, StrategyAccount};
use super::position::ClosedTrade;
use super::registry::StrategyMetric;

/// Win/loss statistics folded over closed trades.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TradeStats {
    pub trades_won: usize,
    pub trades_lost: usize,
    pub trades_even: usize,
    /// Sum of every trade's profit, in closing order.
    pub net_profit: f64,
    pub gross_profit: f64,
    /// Sum of losing trades as a positive number.
    pub gross_loss: f64,
    pub largest_win: f64,
    pub largest_loss: f64,
}

impl TradeStats {
    pub fn compute(trades: &[ClosedTrade]) -> Self {
        let mut stats = TradeStats::default();
        for trade in trades {
            let pnl = trade.profit;
            stats.net_profit += pnl;
            if pnl > 0.0 {
                stats.trades_won += 1;
                stats.gross_profit += pnl;
                stats.largest_win = stats.largest_win.max(pnl);
            } else if pnl < 0.0 {
                stats.trades_lost += 1;
                stats.gross_loss += pnl.abs();
                stats.largest_loss = stats.largest_loss.max(pnl.abs());
            } else {
                stats.trades_even += 1;
            }
        }
        stats
    }

    pub fn total_trades(&self) -> usize {
        self.trades_won + self.trades_lost + self.trades_even
    }

    /// Gross profit over gross loss; infinite with wins and no losses, 0 without trades.
    pub fn profit_factor(&self) -> f64 {
        if self.gross_loss > 0.0 {
            self.gross_profit / self.gross_loss
        } else if self.gross_profit > 0.0 {
            f64::INFINITY
        } else {
            0.0
        }
    }

    /// Winning trades as a percentage of all closed trades.
    pub fn percent_profitable(&self) -> f64 {
        let total = self.total_trades();
        if total == 0 {
            0.0
        } else {
            self.trades_won as f64 / total as f64 * 100.0
        }
    }
}

/// Largest peak-to-trough decline of the curve: (absolute, percent of the peak).
pub fn max_drawdown(curve: &[EquityPoint]) -> (f64, f64) {
    let Some(first) = curve.first() else {
        return (0.0, 0.0);
    };
    let mut peak = first.equity;
    let mut max_dd = 0.0_f64;
    let mut max_dd_pct = 0.0_f64;
    for point in curve {
        if point.equity > peak {
            peak = point.equity;
            continue;
        }
        let dd = peak - point.equity;
        max_dd = max_dd.max(dd);
        if peak > 0.0 {
            max_dd_pct = max_dd_pct.max(dd / peak * 100.0);
        }
    }
    (max_dd, max_dd_pct)
}

/// Largest trough-to-peak rise of the curve: (absolute, percent of the trough).
pub fn max_runup(curve: &[EquityPoint]) -> (f64, f64) {
    let Some(first) = curve.first() else {
        return (0.0, 0.0);
    };
    let mut trough = first.equity;
    let mut max_ru = 0.0_f64;
    let mut max_ru_pct = 0.0_f64;
    for point in curve {
        if point.equity < trough {
            trough = point.equity;
            continue;
        }
        let ru = point.equity - trough;
        max_ru = max_ru.max(ru);
        if trough > 0.0 {
            max_ru_pct = max_ru_pct.max(ru / trough * 100.0);
        }
    }
    (max_ru, max_ru_pct)
}

/// Current value of a `strategy*` metric, marking open positions at `mark_price`.
pub fn strategy_metric(account: &StrategyAccount, metric: StrategyMetric, mark_price: f64) -> f64 {
    let stats = || TradeStats::compute(account.closed_trades());
    match metric {
        StrategyMetric::PositionSize => account.position_size(),
        StrategyMetric::PositionAvgPrice => account.position_avg_price(),
        StrategyMetric::NetProfit => stats().net_profit,
        StrategyMetric::GrossProfit => stats().gross_profit,
        StrategyMetric::GrossLoss => stats().gross_loss,
        StrategyMetric::Equity => account.equity(mark_price),
        StrategyMetric::OpenProfit => account.open_profit(mark_price),
        StrategyMetric::InitialCapital => account.initial_capital,
        StrategyMetric::Cash => account.cash,
        StrategyMetric::OpenTrades => account.open_positions().len() as f64,
        StrategyMetric::ClosedTrades => account.closed_trades().len() as f64,
        StrategyMetric::WinTrades => stats().trades_won as f64,
        StrategyMetric::LossTrades => stats().trades_lost as f64,
        StrategyMetric::EvenTrades => stats().trades_even as f64,
        StrategyMetric::MaxDrawdown => max_drawdown(account.equity_curve()).0,
        StrategyMetric::MaxDrawdownPercent => max_drawdown(account.equity_curve()).1,
        StrategyMetric::MaxRunup => max_runup(account.equity_curve()).0,
        StrategyMetric::MaxRunupPercent => max_runup(account.equity_curve()).1,
        StrategyMetric::ProfitFactor => stats().profit_factor(),
        StrategyMetric::PercentProfitable => stats().percent_profitable(),
    }
}
