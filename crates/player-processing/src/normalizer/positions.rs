//! Coarse grouping of fine-grained position codes.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Tactical role a position code belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PositionGroup {
    /// Goalkeepers
    #[serde(rename = "GK")]
    Goalkeeper,
    /// Center backs, full backs and wing backs
    #[serde(rename = "DEF")]
    Defender,
    /// Defensive, central, attacking and wide midfielders
    #[serde(rename = "MDF")]
    Midfielder,
    /// Strikers, forwards and wingers
    #[serde(rename = "ATT")]
    Attacker,
    /// Unknown or missing codes
    Other,
}

impl PositionGroup {
    pub const ALL: [PositionGroup; 5] = [
        Self::Goalkeeper,
        Self::Defender,
        Self::Midfielder,
        Self::Attacker,
        Self::Other,
    ];

    /// Label stored in the `Position_Group` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Goalkeeper => "GK",
            Self::Defender => "DEF",
            Self::Midfielder => "MDF",
            Self::Attacker => "ATT",
            Self::Other => "Other",
        }
    }

    /// Position codes that map to this group.
    pub fn codes(&self) -> &'static [&'static str] {
        match self {
            Self::Goalkeeper => &["GK"],
            Self::Defender => &["CB", "RCB", "LCB", "LB", "RB", "LWB", "RWB"],
            Self::Midfielder => &[
                "CM", "LCM", "RCM", "CDM", "LDM", "RDM", "CAM", "LAM", "RAM", "LM", "RM",
            ],
            Self::Attacker => &["ST", "LS", "RS", "CF", "RF", "LF", "LW", "RW"],
            Self::Other => &[],
        }
    }

    /// Group for a position code; anything unlisted, including a missing code, is `Other`.
    pub fn from_code(code: Option<&str>) -> Self {
        code.and_then(|c| POSITION_GROUPS.get(c).copied())
            .unwrap_or(Self::Other)
    }
}

impl fmt::Display for PositionGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

static POSITION_GROUPS: Lazy<HashMap<&'static str, PositionGroup>> = Lazy::new(|| {
    PositionGroup::ALL
        .iter()
        .flat_map(|group| group.codes().iter().map(move |code| (*code, *group)))
        .collect()
});
