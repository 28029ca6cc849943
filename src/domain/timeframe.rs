//! Candle timeframes and their annualization factors.

use chrono::TimeDelta;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Supported candle intervals. Markets trade around the clock, so a year is
/// 365 days of bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Timeframe {
    #[serde(rename = "1m")]
    M1,
    #[serde(rename = "5m")]
    M5,
    #[serde(rename = "15m")]
    M15,
    #[serde(rename = "1h")]
    H1,
    #[serde(rename = "4h")]
    H4,
    #[serde(rename = "1d")]
    D1,
}

impl Timeframe {
    pub const ALL: [Timeframe; 6] = [
        Timeframe::M1,
        Timeframe::M5,
        Timeframe::M15,
        Timeframe::H1,
        Timeframe::H4,
        Timeframe::D1,
    ];

    pub fn minutes(&self) -> i64 {
        match self {
            Timeframe::M1 => 1,
            Timeframe::M5 => 5,
            Timeframe::M15 => 15,
            Timeframe::H1 => 60,
            Timeframe::H4 => 240,
            Timeframe::D1 => 1440,
        }
    }

    pub fn bar_duration(&self) -> TimeDelta {
        TimeDelta::minutes(self.minutes())
    }

    pub fn periods_per_year(&self) -> f64 {
        (365 * 24 * 60 / self.minutes()) as f64
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::M1 => "1m",
            Timeframe::M5 => "5m",
            Timeframe::M15 => "15m",
            Timeframe::H1 => "1h",
            Timeframe::H4 => "4h",
            Timeframe::D1 => "1d",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Timeframe::ALL
            .iter()
            .copied()
            .find(|tf| tf.as_str() == trimmed)
            .ok_or_else(|| {
                format!("unknown timeframe '{trimmed}' (expected one of 1m, 5m, 15m, 1h, 4h, 1d)")
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn periods_per_year() {
        assert_eq!(Timeframe::M1.periods_per_year(), 525_600.0);
        assert_eq!(Timeframe::M5.periods_per_year(), 105_120.0);
        assert_eq!(Timeframe::M15.periods_per_year(), 35_040.0);
        assert_eq!(Timeframe::H1.periods_per_year(), 8_760.0);
        assert_eq!(Timeframe::H4.periods_per_year(), 2_190.0);
        assert_eq!(Timeframe::D1.periods_per_year(), 365.0);
    }

    #[test]
    fn parse_round_trips_display() {
        for tf in Timeframe::ALL {
            assert_eq!(tf.to_string().parse::<Timeframe>().unwrap(), tf);
        }
    }

    #[test]
    fn parse_rejects_unknown() {
        assert!("2h".parse::<Timeframe>().is_err());
        assert!("".parse::<Timeframe>().is_err());
    }

    #[test]
    fn bar_duration() {
        assert_eq!(Timeframe::H4.bar_duration(), TimeDelta::hours(4));
    }
}
