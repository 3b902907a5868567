//! Fixed indicator catalogs
//!
//! The backend accepts a closed set of fundamental and technical indicator
//! ids. Both catalogs are enums so an unknown id can only appear at the
//! parsing edge, never inside a selection or request.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

/// A selectable indicator from one of the fixed catalogs
pub trait Indicator: Copy + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static {
    /// Human readable catalog name ("fundamental" / "technical")
    const KIND: &'static str;

    /// Query parameter the backend expects for this catalog
    const QUERY_PARAM: &'static str;

    /// Every indicator of the catalog, in display order
    fn catalog() -> &'static [Self];

    /// Wire id of the indicator
    fn id(self) -> &'static str;

    fn from_id(id: &str) -> Option<Self> {
        let id = id.trim();
        Self::catalog()
            .iter()
            .copied()
            .find(|indicator| indicator.id().eq_ignore_ascii_case(id))
    }
}

macro_rules! indicator_catalog {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal, $param:literal {
            $($(#[$vmeta:meta])* $variant:ident => $id:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
            Serialize, Deserialize, clap::ValueEnum,
        )]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $id)]
                #[value(name = $id)]
                $variant,
            )+
        }

        impl Indicator for $name {
            const KIND: &'static str = $kind;
            const QUERY_PARAM: &'static str = $param;

            fn catalog() -> &'static [Self] {
                &[$(Self::$variant,)+]
            }

            fn id(self) -> &'static str {
                match self {
                    $(Self::$variant => $id,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.id())
            }
        }

        impl FromStr for $name {
            type Err = UnknownIndicator;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_id(s).ok_or_else(|| UnknownIndicator {
                    kind: $kind,
                    id: s.to_string(),
                })
            }
        }
    };
}

indicator_catalog! {
    /// Fundamental indicators (12)
    Fundamental, "fundamental", "selected_fundamentals" {
        /// Return on equity
        Roe => "roe",
        /// Return on assets
        Roa => "roa",
        NetMargin => "net_margin",
        OperatingMargin => "operating_margin",
        RevenueCagr3y => "revenue_cagr_3y",
        EpsCagr3y => "eps_cagr_3y",
        FcfCagr3y => "fcf_cagr_3y",
        DebtToEquity => "debt_to_equity",
        CurrentRatio => "current_ratio",
        InterestCoverage => "interest_coverage",
        PeRatio => "pe_ratio",
        EvToEbitda => "ev_to_ebitda",
    }
}

indicator_catalog! {
    /// Technical indicators (10)
    Technical, "technical", "selected_technicals" {
        Sma50 => "sma_50",
        Sma200 => "sma_200",
        Ema20 => "ema_20",
        Rsi => "rsi",
        Macd => "macd",
        /// Stochastic oscillator
        Stoch => "stoch",
        /// On-balance volume
        Obv => "obv",
        VolumeSpike => "volume_spike",
        /// Average true range
        Atr => "atr",
        /// Bollinger bands
        Bbands => "bbands",
    }
}

/// An id that is not part of the catalog it was parsed against
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} indicator '{id}'")]
pub struct UnknownIndicator {
    pub kind: &'static str,
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_sizes() {
        assert_eq!(Fundamental::catalog().len(), 12);
        assert_eq!(Technical::catalog().len(), 10);
    }

    #[test]
    fn test_ids_are_unique() {
        let ids: HashSet<_> = Fundamental::catalog().iter().map(|f| f.id()).collect();
        assert_eq!(ids.len(), Fundamental::catalog().len());

        let ids: HashSet<_> = Technical::catalog().iter().map(|t| t.id()).collect();
        assert_eq!(ids.len(), Technical::catalog().len());
    }

    #[test]
    fn test_parse_ids() {
        assert_eq!("pe_ratio".parse::<Fundamental>(), Ok(Fundamental::PeRatio));
        assert_eq!(" RSI ".parse::<Technical>(), Ok(Technical::Rsi));
        assert_eq!(Technical::Sma200.to_string(), "sma_200");

        let err = "rsi".parse::<Fundamental>().unwrap_err();
        assert_eq!(err.to_string(), "unknown fundamental indicator 'rsi'");
    }

    #[test]
    fn test_serde_uses_wire_ids() {
        let json = serde_json::to_string(&Fundamental::EvToEbitda).unwrap();
        assert_eq!(json, "\"ev_to_ebitda\"");

        let tech: Technical = serde_json::from_str("\"volume_spike\"").unwrap();
        assert_eq!(tech, Technical::VolumeSpike);
    }

    #[test]
    fn test_clap_value_names() {
        use clap::ValueEnum;

        let parsed = <Technical as ValueEnum>::from_str("sma_50", false);
        assert_eq!(parsed, Ok(Technical::Sma50));
        assert_eq!(Fundamental::value_variants().len(), 12);
    }
}
