// =============================================================================
// Kline intervals
// =============================================================================

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Candle intervals accepted by the analysis endpoints. Deserialised through
/// [`FromStr`] so a bad code reports the supported set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum KlineInterval {
    #[serde(rename = "30m")]
    Minute30,
    #[serde(rename = "1h")]
    Hour1,
    #[serde(rename = "4h")]
    Hour4,
    #[serde(rename = "1d")]
    Day1,
    #[serde(rename = "1w")]
    Week1,
    #[serde(rename = "1M")]
    Month1,
}

impl KlineInterval {
    pub const ALL: [KlineInterval; 6] = [
        KlineInterval::Minute30,
        KlineInterval::Hour1,
        KlineInterval::Hour4,
        KlineInterval::Day1,
        KlineInterval::Week1,
        KlineInterval::Month1,
    ];

    /// Exchange wire code.
    pub fn as_str(&self) -> &'static str {
        match self {
            KlineInterval::Minute30 => "30m",
            KlineInterval::Hour1 => "1h",
            KlineInterval::Hour4 => "4h",
            KlineInterval::Day1 => "1d",
            KlineInterval::Week1 => "1w",
            KlineInterval::Month1 => "1M",
        }
    }

    /// Nominal bar length in milliseconds (a month counts as 30 days).
    pub fn to_millis(&self) -> i64 {
        const MINUTE: i64 = 60_000;
        match self {
            KlineInterval::Minute30 => 30 * MINUTE,
            KlineInterval::Hour1 => 60 * MINUTE,
            KlineInterval::Hour4 => 4 * 60 * MINUTE,
            KlineInterval::Day1 => 24 * 60 * MINUTE,
            KlineInterval::Week1 => 7 * 24 * 60 * MINUTE,
            KlineInterval::Month1 => 30 * 24 * 60 * MINUTE,
        }
    }
}

impl fmt::Display for KlineInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KlineInterval {
    type Err = String;

    /// Case-sensitive: `1m` is not a supported interval, `1M` is one month.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|interval| interval.as_str() == s.trim())
            .ok_or_else(|| {
                format!(
                    "unsupported interval '{s}' (expected one of 30m, 1h, 4h, 1d, 1w, 1M)"
                )
            })
    }
}

impl TryFrom<String> for KlineInterval {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
