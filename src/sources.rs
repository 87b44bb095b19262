//! Built-in dashboard definitions: one configuration record per source page.

use crate::extract::ExtractOptions;

pub const NET_RANKINGS_URL: &str =
    "https://www.ncaa.com/rankings/basketball-men/d1/ncaa-mens-basketball-net-rankings";
pub const TEAM_STATS_URL: &str = "https://www.ncaa.com/stats/basketball-men/d1/current/team/148";
pub const SHOOTING_PCT_URL: &str = "https://www.teamrankings.com/ncaa-basketball/stat/shooting-pct";
pub const POINTS_PER_GAME_URL: &str =
    "https://www.teamrankings.com/ncaa-basketball/stat/points-per-game";
pub const THREE_POINT_PCT_URL: &str =
    "https://www.teamrankings.com/ncaa-basketball/stat/three-point-pct";

/// Which row-filter control a dashboard exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowFilter {
    /// Stat selection only, no row filtering.
    None,
    /// Multi-select over distinct team names.
    Team,
    /// Single-select over conferences with an "All" sentinel.
    Conference,
}

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub slug: &'static str,
    pub title: &'static str,
    pub url: String,
    pub table_class: Option<&'static str>,
    pub school_link_column: Option<usize>,
    /// When set, a rankings table is fetched from here and left-joined on
    /// "Team" to attach its Rank column.
    pub rankings_url: Option<String>,
    pub row_filter: RowFilter,
    /// Minimal column set for the empty fallback table when the source
    /// fails; keeps the dashboard rendering with zero rows.
    pub placeholder_columns: &'static [&'static str],
}

impl DashboardConfig {
    pub fn extract_options(&self) -> ExtractOptions<'_> {
        ExtractOptions {
            table_class: self.table_class,
            school_link_column: self.school_link_column,
        }
    }
}

fn teamrankings_dashboard(
    slug: &'static str,
    title: &'static str,
    url: &str,
) -> DashboardConfig {
    DashboardConfig {
        slug,
        title,
        url: url.to_string(),
        table_class: Some("tr-table"),
        school_link_column: None,
        rankings_url: None,
        row_filter: RowFilter::Team,
        placeholder_columns: &["Rank", "Team"],
    }
}

/// The five production dashboards.
pub fn builtin_dashboards() -> Vec<DashboardConfig> {
    vec![
        DashboardConfig {
            slug: "net-rankings",
            title: "NCAA NET Rankings",
            url: NET_RANKINGS_URL.to_string(),
            table_class: None,
            school_link_column: None,
            rankings_url: None,
            row_filter: RowFilter::None,
            placeholder_columns: &["Rank", "Team", "Conference", "Overall"],
        },
        DashboardConfig {
            slug: "team-stats",
            title: "NCAA Team Stats",
            url: TEAM_STATS_URL.to_string(),
            table_class: None,
            school_link_column: Some(1),
            rankings_url: Some(NET_RANKINGS_URL.to_string()),
            row_filter: RowFilter::Conference,
            placeholder_columns: &["Team", "Conference", "Rank"],
        },
        teamrankings_dashboard("shooting-pct", "Shooting Percentage", SHOOTING_PCT_URL),
        teamrankings_dashboard(
            "avg-points-per-game",
            "Average Points Per Game",
            POINTS_PER_GAME_URL,
        ),
        teamrankings_dashboard("three-point-pct", "3-Point Percentage", THREE_POINT_PCT_URL),
    ]
}
