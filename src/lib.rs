//! NCAA basketball stats dashboards.
//!
//! Each configured source page is fetched once at process start, its HTML
//! table extracted into an immutable typed table (the team-stats source is
//! additionally merged with the NET rankings), and the resulting snapshot is
//! served as interactive filter/chart/grid dashboards over HTTP.

mod dashboard;
mod extract;
mod fetch;
mod observability;
mod sources;
mod table;

pub use dashboard::{
    apply_filters, build_chart, build_view, dashboard_router, render_dashboard_html,
    render_index_html, AppSnapshot, ChartSeries, ChartSpec, Dashboard, DashboardView,
    FilterSelection, ALL_CONFERENCES,
};
pub use extract::{extract, ExtractError, ExtractOptions, UNKNOWN_TEAM};
pub use fetch::{fetch_table, load_table, scrape_client, FetchError, SCRAPE_USER_AGENT};
pub use observability::{
    init_logging, log_app_bind, log_app_start, log_source_loaded, logging_config_from_env,
    LogFormat, LoggingConfig, LoggingInitError,
};
pub use sources::{
    builtin_dashboards, DashboardConfig, RowFilter, NET_RANKINGS_URL, POINTS_PER_GAME_URL,
    SHOOTING_PCT_URL, TEAM_STATS_URL, THREE_POINT_PCT_URL,
};
pub use table::{
    is_identifier_column, merge, parse_number, Cell, RawTable, TypedTable, CONFERENCE_COLUMN,
    IDENTIFIER_COLUMNS, RANK_COLUMN, TEAM_COLUMN, UNKNOWN_CONFERENCE,
};
