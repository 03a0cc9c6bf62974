//! Market data port trait.

use crate::domain::error::DevScriptError;
use crate::domain::ohlcv::Bar;

/// Source of historical bars, oldest first.
pub trait BarFeed {
    fn fetch_bars(&self) -> Result<Vec<Bar>, DevScriptError>;

    /// Human-readable origin of the bars, used in error messages.
    fn source_name(&self) -> String;
}
