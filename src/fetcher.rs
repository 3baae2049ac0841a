use std::collections::BTreeMap;
use std::time::Duration;

use tracing::{debug, info};

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::fixtures::filter_complete;
use crate::types::SheetRow;

pub const COL_MATCH_CODE: &str = "match_code";
pub const COL_TEAM_NAME: &str = "team_name";
pub const COL_UPDATED_ODDS: &str = "updated_odds";

/// HTTP client used for every sheet export request.
pub fn build_client(cfg: &Config) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();
    if cfg.fetch_timeout_secs > 0 {
        builder = builder.timeout(Duration::from_secs(cfg.fetch_timeout_secs));
    }
    Ok(builder.build()?)
}

/// Download the sheet as CSV and return its complete rows, in sheet order.
///
/// Every call is a fresh round trip. Errors are returned rather than
/// swallowed; the caller decides whether to degrade to an empty dataset.
pub async fn fetch_sheet_rows(client: &reqwest::Client, cfg: &Config) -> Result<Vec<SheetRow>> {
    let url = cfg.sheet_export_url();
    let body = client
        .get(&url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;

    let rows = parse_sheet_csv(&body)?;
    let total = rows.len();
    let rows = filter_complete(rows);
    info!(
        url = %url,
        rows = rows.len(),
        dropped = total - rows.len(),
        "Fetched odds sheet: {} complete rows ({} incomplete dropped)",
        rows.len(),
        total - rows.len(),
    );
    for (i, row) in rows.iter().enumerate() {
        debug!(
            "Row {}: match_code={} team={} odds={}",
            i + 1,
            row.match_code.as_deref().unwrap_or(""),
            row.team_name.as_deref().unwrap_or(""),
            row.updated_odds.as_deref().unwrap_or(""),
        );
    }
    Ok(rows)
}

/// Parse CSV text with a header row into sheet rows. Incomplete rows are kept;
/// filtering happens in [`fetch_sheet_rows`].
pub fn parse_sheet_csv(text: &str) -> Result<Vec<SheetRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
    let column = |name: &str| -> Result<usize> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| AppError::Sheet(format!("missing required column {name:?}")))
    };
    let code_idx = column(COL_MATCH_CODE)?;
    let team_idx = column(COL_TEAM_NAME)?;
    let odds_idx = column(COL_UPDATED_ODDS)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let cell = |idx: usize| -> Option<String> {
            record
                .get(idx)
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string())
        };

        let mut extra = BTreeMap::new();
        for (idx, name) in headers.iter().enumerate() {
            if name.is_empty() || idx == code_idx || idx == team_idx || idx == odds_idx {
                continue;
            }
            if let Some(value) = cell(idx) {
                extra.insert(name.clone(), value);
            }
        }

        rows.push(SheetRow {
            match_code: cell(code_idx),
            team_name: cell(team_idx),
            updated_odds: cell(odds_idx),
            extra,
        });
    }
    Ok(rows)
}
