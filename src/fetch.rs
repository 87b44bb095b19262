//! Startup data acquisition and the failure boundary.
//!
//! Every failure class (transport, non-2xx status, missing table) is caught
//! here, downgraded to the dashboard's placeholder table, and reported as a
//! warn-level diagnostic. Nothing past this module ever sees an error: the
//! dashboards render with zero rows rather than an error page.

use reqwest::blocking::Client;
use thiserror::Error;
use tracing::{info, warn};

use crate::extract::{extract, ExtractError, ExtractOptions};
use crate::sources::DashboardConfig;
use crate::table::{merge, TypedTable, RANK_COLUMN, TEAM_COLUMN};

/// Browser User-Agent sent with every scrape to avoid basic bot filtering.
pub const SCRAPE_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error(transparent)]
    Extract(#[from] ExtractError),
}

pub fn scrape_client() -> reqwest::Result<Client> {
    Client::builder().user_agent(SCRAPE_USER_AGENT).build()
}

/// One GET + extract. No retry, no cache; callers decide what a failure
/// means.
pub fn fetch_table(
    client: &Client,
    url: &str,
    options: &ExtractOptions<'_>,
) -> Result<TypedTable, FetchError> {
    let body = client.get(url).send()?.error_for_status()?.text()?;
    Ok(extract(&body, options)?)
}

/// Load one dashboard's table, swallowing failures into the placeholder.
pub fn load_table(client: &Client, config: &DashboardConfig) -> TypedTable {
    let mut table = match fetch_table(client, &config.url, &config.extract_options()) {
        Ok(table) => {
            info!(
                component = "fetch",
                event = "source.fetched",
                slug = config.slug,
                url = %config.url,
                rows = table.rows.len()
            );
            table
        }
        Err(err) => {
            warn!(
                component = "fetch",
                event = "source.failed",
                slug = config.slug,
                url = %config.url,
                error = %err
            );
            TypedTable::empty(config.placeholder_columns)
        }
    };

    if let Some(rankings_url) = &config.rankings_url {
        // Only the key and Rank travel into the join; the rankings page's
        // other columns (its own Conference, Overall record) must not leak
        // into the stats table or shadow the Conference sentinel.
        let rankings = match fetch_table(client, rankings_url, &ExtractOptions::default()) {
            Ok(rankings) => rankings.project(&[TEAM_COLUMN, RANK_COLUMN]),
            Err(err) => {
                warn!(
                    component = "fetch",
                    event = "rankings.failed",
                    slug = config.slug,
                    url = %rankings_url,
                    error = %err
                );
                TypedTable::empty(&[])
            }
        };
        table = merge(table, &rankings, TEAM_COLUMN);
    }

    table
}
