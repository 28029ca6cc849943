//! Price data port trait.

use crate::domain::error::SignalbenchError;
use crate::domain::ohlcv::PriceBar;
use crate::domain::timeframe::Timeframe;

pub trait DataPort {
    /// The most recent `limit` bars for `market` (e.g. `INJ/USDT`), oldest
    /// first.
    fn fetch_candles(
        &self,
        market: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<PriceBar>, SignalbenchError>;

    fn list_markets(&self, timeframe: Timeframe) -> Result<Vec<String>, SignalbenchError>;
}
