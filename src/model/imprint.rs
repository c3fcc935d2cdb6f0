/// Imprint definitions
///
/// The publisher's catalog is partitioned into a small, fixed set of imprints,
/// each addressed on the site by its slug.
use crate::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A publishing sub-brand whose catalog is scraped independently
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Imprint {
    /// Matthes & Seitz Berlin, the main list
    MatthesSeitzBerlin,

    /// Friedenauer Presse
    FriedenauerPresse,

    /// August Verlag
    AugustVerlag,
}

impl Imprint {
    /// All known imprints, in the order a full run visits them
    pub const ALL: [Imprint; 3] = [
        Imprint::MatthesSeitzBerlin,
        Imprint::FriedenauerPresse,
        Imprint::AugustVerlag,
    ];

    /// The URL slug identifying this imprint on the site
    pub fn slug(&self) -> &'static str {
        match self {
            Self::MatthesSeitzBerlin => "matthes-seitz-berlin",
            Self::FriedenauerPresse => "friedenauer-presse",
            Self::AugustVerlag => "august-verlag",
        }
    }

    /// Human-readable imprint name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::MatthesSeitzBerlin => "Matthes & Seitz Berlin",
            Self::FriedenauerPresse => "Friedenauer Presse",
            Self::AugustVerlag => "August Verlag",
        }
    }
}

impl fmt::Display for Imprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Imprint {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let slug = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|imprint| imprint.slug().eq_ignore_ascii_case(slug))
            .ok_or_else(|| ConfigError::UnknownImprint(s.to_string()))
    }
}
