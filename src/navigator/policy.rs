use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How long and for what a navigation waits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavigationPolicy {
    /// Wait for the DOM to be parsed only.
    #[default]
    Fast,
    /// Wait for network quiescence; for pages that render client-side.
    Patient,
}

impl NavigationPolicy {
    /// The other policy, used when a navigation under this one failed.
    #[must_use]
    pub const fn alternate(self) -> Self {
        match self {
            Self::Fast => Self::Patient,
            Self::Patient => Self::Fast,
        }
    }
}

impl fmt::Display for NavigationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fast => f.write_str("fast"),
            Self::Patient => f.write_str("patient"),
        }
    }
}

impl FromStr for NavigationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fast" | "domcontentloaded" => Ok(Self::Fast),
            "patient" | "networkidle" => Ok(Self::Patient),
            other => Err(format!("unknown navigation policy '{other}' (expected fast|patient)")),
        }
    }
}
