use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// The marital property arrangement ("Güterstand") of the deceased and
/// their spouse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub enum MatrimonialRegime {
    /// Community of accrued gains, the statutory default.
    #[default]
    #[serde(rename = "zugewinngemeinschaft")]
    CommunityOfAccruedGains,
    /// Community of property.
    #[serde(rename = "guetergemeinschaft")]
    CommunityOfProperty,
    /// Separation of property.
    #[serde(rename = "guetertrennung")]
    SeparationOfProperty,
}

impl MatrimonialRegime {
    /// Every regime, default first.
    pub const ALL: [Self; 3] = [
        Self::CommunityOfAccruedGains,
        Self::CommunityOfProperty,
        Self::SeparationOfProperty,
    ];

    /// The identifier used in configuration and snapshot files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CommunityOfAccruedGains => "zugewinngemeinschaft",
            Self::CommunityOfProperty => "guetergemeinschaft",
            Self::SeparationOfProperty => "guetertrennung",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::CommunityOfAccruedGains => "Zugewinngemeinschaft (community of accrued gains)",
            Self::CommunityOfProperty => "Gütergemeinschaft (community of property)",
            Self::SeparationOfProperty => "Gütertrennung (separation of property)",
        }
    }
}

impl fmt::Display for MatrimonialRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatrimonialRegime {
    type Err = ParseRegimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "zugewinngemeinschaft" | "accrued_gains" | "community_of_accrued_gains" => {
                Ok(Self::CommunityOfAccruedGains)
            }
            "guetergemeinschaft" | "gütergemeinschaft" | "community" | "community_of_property" => {
                Ok(Self::CommunityOfProperty)
            }
            "guetertrennung" | "gütertrennung" | "separation" | "separation_of_property" => {
                Ok(Self::SeparationOfProperty)
            }
            _ => Err(ParseRegimeError(s.to_string())),
        }
    }
}

/// Error returned when a string names no known matrimonial regime.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Unknown matrimonial regime '{0}'")]
pub struct ParseRegimeError(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_identifiers_and_aliases() {
        for regime in MatrimonialRegime::ALL {
            assert_eq!(regime.as_str().parse(), Ok(regime));
        }
        assert_eq!(
            "Separation".parse(),
            Ok(MatrimonialRegime::SeparationOfProperty)
        );
        assert!("polygamy".parse::<MatrimonialRegime>().is_err());
    }
}
