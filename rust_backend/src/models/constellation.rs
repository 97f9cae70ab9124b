use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::HandoverError;

/// Satellite constellation a track belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Constellation {
    Starlink,
    OneWeb,
    Other,
}

impl Constellation {
    pub const ALL: [Constellation; 3] = [
        Constellation::Starlink,
        Constellation::OneWeb,
        Constellation::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Constellation::Starlink => "starlink",
            Constellation::OneWeb => "oneweb",
            Constellation::Other => "other",
        }
    }
}

impl fmt::Display for Constellation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Constellation {
    type Err = HandoverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "starlink" => Ok(Constellation::Starlink),
            "oneweb" | "one_web" | "one-web" => Ok(Constellation::OneWeb),
            "other" => Ok(Constellation::Other),
            unknown => Err(HandoverError::Configuration(format!(
                "Unsupported constellation tag: '{}'",
                unknown
            ))),
        }
    }
}

impl TryFrom<String> for Constellation {
    type Error = HandoverError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
