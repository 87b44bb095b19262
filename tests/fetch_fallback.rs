//! The fetch boundary against a mock HTTP server: every failure class must
//! downgrade to the placeholder table, and the happy path must produce a
//! coerced (and, for team-stats, merged) table.

use courtside::{load_table, scrape_client, Cell, DashboardConfig, RowFilter, CONFERENCE_COLUMN};
use httpmock::prelude::*;

const STATS_HTML: &str = r#"
    <html><body><table>
        <tr><th>Rank</th><th>Team</th><th>PPG</th></tr>
        <tr><td>1</td><td><a class="school" href="/a">A</a></td><td>80.5</td></tr>
        <tr><td>2</td><td><a class="school" href="/b">B</a></td><td>n/a</td></tr>
    </table></body></html>
"#;

// Shaped like the real NET-rankings page: extra columns that must not leak
// into the merged table, and whitespace around the team key.
const RANKINGS_HTML: &str = r#"
    <html><body><table>
        <tr><th>Rank</th><th>Team</th><th>Conference</th><th>Overall</th></tr>
        <tr><td>7</td><td> A </td><td>ACC</td><td>18-3</td></tr>
    </table></body></html>
"#;

fn config(server: &MockServer, rankings: bool) -> DashboardConfig {
    DashboardConfig {
        slug: "team-stats",
        title: "NCAA Team Stats",
        url: server.url("/stats"),
        table_class: None,
        school_link_column: Some(1),
        rankings_url: rankings.then(|| server.url("/rankings")),
        row_filter: RowFilter::Conference,
        placeholder_columns: &["Team", "Conference", "Rank"],
    }
}

#[test]
fn http_500_downgrades_to_empty_placeholder() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/stats");
        then.status(500);
    });

    let client = scrape_client().unwrap();
    let table = load_table(&client, &config(&server, false));

    assert_eq!(table.columns, vec!["Team", "Conference", "Rank"]);
    assert!(table.rows.is_empty());
}

#[test]
fn page_without_a_table_downgrades_to_empty_placeholder() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/stats");
        then.status(200)
            .header("content-type", "text/html")
            .body("<html><body><p>redesigned page</p></body></html>");
    });

    let client = scrape_client().unwrap();
    let table = load_table(&client, &config(&server, false));

    assert_eq!(table.columns, vec!["Team", "Conference", "Rank"]);
    assert!(table.rows.is_empty());
}

#[test]
fn successful_fetch_extracts_and_coerces() {
    let server = MockServer::start();
    let stats = server.mock(|when, then| {
        when.method(GET).path("/stats");
        then.status(200)
            .header("content-type", "text/html")
            .body(STATS_HTML);
    });

    let client = scrape_client().unwrap();
    let table = load_table(&client, &config(&server, false));

    stats.assert();
    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.rows[0][1], Cell::Text("A".to_string()));
    assert_eq!(table.rows[0][2], Cell::Number(80.5));
    assert_eq!(table.rows[1][2], Cell::Null);
}

#[test]
fn rankings_merge_attaches_rank_and_conference() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/stats");
        then.status(200).body(STATS_HTML);
    });
    server.mock(|when, then| {
        when.method(GET).path("/rankings");
        then.status(200).body(RANKINGS_HTML);
    });

    let client = scrape_client().unwrap();
    let table = load_table(&client, &config(&server, true));

    // Only the rankings' Rank column is attached; its Conference and
    // Overall columns never reach the stats table.
    assert_eq!(
        table.columns,
        vec!["Rank", "Team", "PPG", "Rank", "Conference"]
    );
    assert_eq!(table.rows.len(), 2);

    let rank_idx = 3;
    assert_eq!(table.rows[0][rank_idx], Cell::Text("7".to_string()));
    assert_eq!(table.rows[1][rank_idx], Cell::Null);

    // The sentinel covers matched and unmatched rows alike, so unmatched
    // teams stay reachable through the conference filter.
    let conf_idx = table.column_index(CONFERENCE_COLUMN).unwrap();
    assert_eq!(
        table.rows[0][conf_idx],
        Cell::Text("Unknown Conference".to_string())
    );
    assert_eq!(
        table.rows[1][conf_idx],
        Cell::Text("Unknown Conference".to_string())
    );
}

#[test]
fn failed_rankings_fetch_keeps_stats_and_conference_guarantee() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/stats");
        then.status(200).body(STATS_HTML);
    });
    server.mock(|when, then| {
        when.method(GET).path("/rankings");
        then.status(503);
    });

    let client = scrape_client().unwrap();
    let table = load_table(&client, &config(&server, true));

    assert_eq!(table.rows.len(), 2);
    assert!(table.column_index(CONFERENCE_COLUMN).is_some());
}

#[test]
fn scrape_client_sends_browser_user_agent() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/stats")
            .header_exists("user-agent")
            .header_matches("user-agent", "^Mozilla/5\\.0.*Chrome.*");
        then.status(200).body(STATS_HTML);
    });

    let client = scrape_client().unwrap();
    let table = load_table(&client, &config(&server, false));

    mock.assert();
    assert_eq!(table.rows.len(), 2);
}
