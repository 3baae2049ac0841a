use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Sheet rows
// ---------------------------------------------------------------------------

/// One line of the odds sheet: one team's odds for one match.
/// Empty cells are `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SheetRow {
    pub match_code: Option<String>,
    pub team_name: Option<String>,
    pub updated_odds: Option<String>,
    /// Any other named columns, kept for the debug endpoint.
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl SheetRow {
    /// True when all three required cells are present.
    pub fn is_complete(&self) -> bool {
        self.match_code.is_some() && self.team_name.is_some() && self.updated_odds.is_some()
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamOdds {
    pub team_name: String,
    pub pre_match_win_odds: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    pub city: String,
    pub stadium: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefenderOdds {
    pub player_code: String,
    pub player_name: String,
    pub pre_match_top_defender_odds: f64,
    pub role: String,
    pub team_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaiderOdds {
    pub player_code: String,
    pub player_name: String,
    pub pre_match_top_raider_odds: f64,
    pub role: String,
    pub team_name: String,
}

/// A scheduled match as rendered by the frontend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    pub match_code: i64,
    pub match_date: String,
    pub match_number: String,
    pub match_time: String,
    pub season: String,
    pub sport: String,
    pub tournament_name: String,
    pub venue: Venue,
    pub teams: Vec<TeamOdds>,
    #[serde(default)]
    pub top_defenders: Vec<DefenderOdds>,
    #[serde(default)]
    pub top_raiders: Vec<RaiderOdds>,
}

/// Teams collected for one match code, in sheet order.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedMatch {
    pub match_code: i64,
    pub teams: Vec<TeamOdds>,
}
