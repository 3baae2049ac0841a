//! Row filtering, grouping by match code, and merging with the static catalog.
//! Everything here is pure: no I/O, and "today" is passed in.

use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::warn;

use crate::catalog::FixtureCatalog;
use crate::config::{placeholder, MergePolicy};
use crate::error::{AppError, Result};
use crate::types::{Fixture, GroupedMatch, SheetRow, TeamOdds, Venue};

/// Drop rows missing any of match code, team name or odds. Order is preserved.
pub fn filter_complete(rows: Vec<SheetRow>) -> Vec<SheetRow> {
    rows.into_iter().filter(SheetRow::is_complete).collect()
}

/// Integer match code. Accepts `6464` and the float rendering `6464.0`.
pub fn parse_match_code(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(code) = raw.parse::<i64>() {
        return Some(code);
    }
    let f = raw.parse::<f64>().ok()?;
    if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

/// Numeric odds. An empty cell counts as 0.0.
pub fn parse_odds(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Some(0.0);
    }
    raw.parse::<f64>().ok().filter(|f| f.is_finite())
}

/// Bucket rows by match code. Key order follows first appearance; team order
/// within a key follows sheet order. Incomplete rows are skipped.
pub fn group_rows(rows: &[SheetRow]) -> Result<Vec<GroupedMatch>> {
    let mut groups: Vec<GroupedMatch> = Vec::new();
    let mut index: HashMap<i64, usize> = HashMap::new();

    for row in rows {
        let (Some(code), Some(team), Some(odds)) = (
            row.match_code.as_deref(),
            row.team_name.as_deref(),
            row.updated_odds.as_deref(),
        ) else {
            continue;
        };

        let match_code = parse_match_code(code)
            .ok_or_else(|| AppError::InvalidRow(format!("match_code {code:?} is not an integer")))?;
        let pre_match_win_odds = parse_odds(odds).ok_or_else(|| {
            AppError::InvalidRow(format!("updated_odds {odds:?} for {team} is not a number"))
        })?;

        let slot = *index.entry(match_code).or_insert_with(|| {
            groups.push(GroupedMatch {
                match_code,
                teams: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].teams.push(TeamOdds {
            team_name: team.to_string(),
            pre_match_win_odds,
        });
    }

    Ok(groups)
}

/// Fixture for a match code with no catalog entry: teams from the sheet,
/// everything else placeholder.
pub fn placeholder_fixture(match_code: i64, teams: Vec<TeamOdds>, today: NaiveDate) -> Fixture {
    Fixture {
        match_code,
        match_date: today.format("%Y-%m-%d").to_string(),
        match_number: format!("Match {match_code}"),
        match_time: placeholder::MATCH_TIME.to_string(),
        season: placeholder::SEASON.to_string(),
        sport: placeholder::SPORT.to_string(),
        tournament_name: placeholder::TOURNAMENT_NAME.to_string(),
        venue: Venue {
            city: placeholder::VENUE_CITY.to_string(),
            stadium: placeholder::VENUE_STADIUM.to_string(),
        },
        teams,
        top_defenders: Vec::new(),
        top_raiders: Vec::new(),
    }
}

/// Copy of `template` with each team's odds replaced by the fetched value
/// for that team, if any. Later sheet rows for the same team win.
pub fn enrich_fixture(template: &Fixture, fetched: &[TeamOdds]) -> Fixture {
    let mut fixture = template.clone();
    for team in &mut fixture.teams {
        if let Some(latest) = fetched.iter().rev().find(|t| t.team_name == team.team_name) {
            team.pre_match_win_odds = latest.pre_match_win_odds;
        }
    }
    for unknown in fetched
        .iter()
        .filter(|t| !template.teams.iter().any(|c| c.team_name == t.team_name))
    {
        warn!(
            match_code = template.match_code,
            team = %unknown.team_name,
            "Sheet team not in catalog fixture {}: {:?} ignored",
            template.match_code,
            unknown.team_name,
        );
    }
    fixture
}

/// Turn grouped rows into fixtures under `policy`. Output order follows
/// `groups`.
pub fn merge_fixtures(
    groups: Vec<GroupedMatch>,
    catalog: &FixtureCatalog,
    policy: MergePolicy,
    today: NaiveDate,
) -> Vec<Fixture> {
    groups
        .into_iter()
        .filter_map(|group| {
            let template = match policy {
                MergePolicy::FeedOnly => None,
                MergePolicy::Enrich | MergePolicy::CatalogOnly => catalog.get(group.match_code),
            };
            match (template, policy) {
                (Some(template), _) => Some(enrich_fixture(template, &group.teams)),
                (None, MergePolicy::CatalogOnly) => None,
                (None, _) => Some(placeholder_fixture(group.match_code, group.teams, today)),
            }
        })
        .collect()
}

/// Full transform from sheet rows to fixtures.
pub fn build_fixtures(
    rows: &[SheetRow],
    catalog: &FixtureCatalog,
    policy: MergePolicy,
    today: NaiveDate,
) -> Result<Vec<Fixture>> {
    let groups = group_rows(rows)?;
    Ok(merge_fixtures(groups, catalog, policy, today))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(code: &str, team: &str, odds: &str) -> SheetRow {
        let cell = |s: &str| (!s.is_empty()).then(|| s.to_string());
        SheetRow {
            match_code: cell(code),
            team_name: cell(team),
            updated_odds: cell(odds),
            ..Default::default()
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, 1).unwrap()
    }

    fn catalog() -> FixtureCatalog {
        FixtureCatalog::embedded().unwrap()
    }

    #[test]
    fn incomplete_rows_are_dropped_in_order() {
        let rows = vec![
            row("1", "A", "1.5"),
            row("", "B", "1.5"),
            row("2", "", "1.5"),
            row("3", "C", ""),
            row("4", "D", "2.5"),
        ];
        let kept = filter_complete(rows);
        let teams: Vec<_> = kept.iter().filter_map(|r| r.team_name.as_deref()).collect();
        assert_eq!(teams, vec!["A", "D"]);
    }

    #[test]
    fn match_code_accepts_float_rendering() {
        assert_eq!(parse_match_code("6464"), Some(6464));
        assert_eq!(parse_match_code(" 6464.0 "), Some(6464));
        assert_eq!(parse_match_code("6464.5"), None);
        assert_eq!(parse_match_code("TBD"), None);
    }

    #[test]
    fn odds_parse_with_zero_for_empty() {
        assert_eq!(parse_odds("2.05"), Some(2.05));
        assert_eq!(parse_odds(""), Some(0.0));
        assert_eq!(parse_odds("evens"), None);
        assert_eq!(parse_odds("NaN"), None);
    }

    #[test]
    fn grouping_preserves_key_and_team_order() {
        let rows = vec![
            row("20", "Bengal Warriorz", "1.8"),
            row("10", "Puneri Paltan", "1.6"),
            row("20", "Dabang Delhi", "2.1"),
            row("10.0", "U Mumba", "2.4"),
        ];
        let groups = group_rows(&rows).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].match_code, 20);
        assert_eq!(groups[1].match_code, 10);
        let names: Vec<_> = groups[1].teams.iter().map(|t| t.team_name.as_str()).collect();
        assert_eq!(names, vec!["Puneri Paltan", "U Mumba"]);
        assert_eq!(groups[0].teams[1].pre_match_win_odds, 2.1);
    }

    #[test]
    fn grouping_skips_incomplete_rows() {
        let rows = vec![row("20", "", "1.8"), row("20", "Dabang Delhi", "2.1")];
        let groups = group_rows(&rows).unwrap();
        assert_eq!(groups[0].teams.len(), 1);
    }

    #[test]
    fn non_integer_match_code_fails_the_whole_batch() {
        let rows = vec![row("20", "Dabang Delhi", "2.1"), row("abc", "U Mumba", "1.1")];
        assert!(matches!(group_rows(&rows), Err(AppError::InvalidRow(_))));
    }

    #[test]
    fn non_numeric_odds_fail_the_whole_batch() {
        let rows = vec![row("20", "Dabang Delhi", "two")];
        let err = group_rows(&rows).unwrap_err();
        assert!(err.to_string().contains("Dabang Delhi"));
    }

    #[test]
    fn fetched_odds_override_catalog_template() {
        let catalog = catalog();
        let template = catalog.get(6464).unwrap().clone();
        let rows = vec![
            row("6464", "Tamil Thalaivas", "1.9"),
            row("6464", "Telugu Titans", "2.0"),
        ];

        let fixtures = build_fixtures(&rows, &catalog, MergePolicy::Enrich, today()).unwrap();

        assert_eq!(fixtures.len(), 1);
        let f = &fixtures[0];
        assert_eq!(f.teams[0].team_name, "Tamil Thalaivas");
        assert_eq!(f.teams[0].pre_match_win_odds, 1.9);
        assert_eq!(f.teams[1].team_name, "Telugu Titans");
        assert_eq!(f.teams[1].pre_match_win_odds, 2.0);
        assert_eq!(f.top_defenders, template.top_defenders);
        assert_eq!(f.top_raiders, template.top_raiders);
        assert_eq!(f.venue, template.venue);
        assert_eq!(f.match_date, template.match_date);
        assert_eq!(f.match_time, template.match_time);
    }

    #[test]
    fn only_matching_team_is_refreshed() {
        let catalog = catalog();
        let template = catalog.get(6464).unwrap().clone();
        let rows = vec![row("6464", "Telugu Titans", "2.5")];

        let fixtures = build_fixtures(&rows, &catalog, MergePolicy::Enrich, today()).unwrap();

        let mut expected = template.clone();
        expected.teams[1].pre_match_win_odds = 2.5;
        assert_eq!(fixtures[0], expected);
    }

    #[test]
    fn last_duplicate_row_wins_on_enrich() {
        let catalog = catalog();
        let rows = vec![
            row("6464", "Telugu Titans", "2.5"),
            row("6464", "Telugu Titans", "2.2"),
        ];
        let fixtures = build_fixtures(&rows, &catalog, MergePolicy::Enrich, today()).unwrap();
        assert_eq!(fixtures[0].teams.len(), 2);
        assert_eq!(fixtures[0].teams[1].pre_match_win_odds, 2.2);
    }

    #[test]
    fn unknown_sheet_team_is_not_added_to_catalog_fixture() {
        let catalog = catalog();
        let rows = vec![row("6464", "Haryana Steelers", "3.0")];
        let fixtures = build_fixtures(&rows, &catalog, MergePolicy::Enrich, today()).unwrap();
        assert!(fixtures[0]
            .teams
            .iter()
            .all(|t| t.team_name != "Haryana Steelers"));
    }

    #[test]
    fn uncatalogued_code_falls_back_to_placeholder() {
        let catalog = catalog();
        let rows = vec![
            row("9001", "Patna Pirates", "1.4"),
            row("9001", "Gujarat Giants", "2.9"),
        ];

        let fixtures = build_fixtures(&rows, &catalog, MergePolicy::Enrich, today()).unwrap();

        assert_eq!(fixtures.len(), 1);
        let f = &fixtures[0];
        assert_eq!(f.match_code, 9001);
        assert_eq!(f.match_date, "2025-09-01");
        assert_eq!(f.match_number, "Match 9001");
        assert_eq!(f.match_time, "TBD");
        assert_eq!(f.venue.city, "TBD");
        assert_eq!(f.venue.stadium, "TBD");
        assert_eq!(f.tournament_name, "Pro Kabaddi League");
        assert!(f.top_defenders.is_empty() && f.top_raiders.is_empty());
        assert_eq!(
            f.teams,
            vec![
                TeamOdds { team_name: "Patna Pirates".to_string(), pre_match_win_odds: 1.4 },
                TeamOdds { team_name: "Gujarat Giants".to_string(), pre_match_win_odds: 2.9 },
            ]
        );
    }

    #[test]
    fn catalog_only_drops_unknown_codes() {
        let catalog = catalog();
        let rows = vec![
            row("9001", "Patna Pirates", "1.4"),
            row("6464", "Tamil Thalaivas", "1.7"),
        ];
        let fixtures = build_fixtures(&rows, &catalog, MergePolicy::CatalogOnly, today()).unwrap();
        assert_eq!(fixtures.len(), 1);
        assert_eq!(fixtures[0].match_code, 6464);
    }

    #[test]
    fn feed_only_ignores_catalog() {
        let catalog = catalog();
        let rows = vec![row("6464", "Tamil Thalaivas", "1.7")];
        let fixtures = build_fixtures(&rows, &catalog, MergePolicy::FeedOnly, today()).unwrap();
        assert_eq!(fixtures[0].venue.city, "TBD");
        assert_eq!(fixtures[0].teams.len(), 1);
    }

    #[test]
    fn mixed_batch_keeps_sheet_order() {
        let catalog = catalog();
        let rows = vec![
            row("9001", "Patna Pirates", "1.4"),
            row("6464", "Tamil Thalaivas", "1.7"),
            row("9002", "U Mumba", "2.0"),
        ];
        let first = build_fixtures(&rows, &catalog, MergePolicy::Enrich, today()).unwrap();
        let second = build_fixtures(&rows, &catalog, MergePolicy::Enrich, today()).unwrap();
        let codes: Vec<_> = first.iter().map(|f| f.match_code).collect();
        assert_eq!(codes, vec![9001, 6464, 9002]);
        assert_eq!(first, second);
    }

    #[test]
    fn no_rows_means_no_fixtures() {
        let fixtures = build_fixtures(&[], &catalog(), MergePolicy::Enrich, today()).unwrap();
        assert!(fixtures.is_empty());
    }
}
