//! Dashboard composer: the pure filter-to-view function, page rendering,
//! and HTTP routes.
//!
//! The hosting layer is thin wiring: the served pages carry a small client
//! script that re-fetches `/{slug}/view` on every filter change and redraws
//! chart and grid from the response. All recomputation happens in
//! [`build_view`], a pure function of the immutable source table and the
//! current filter selection.

use std::sync::Arc;

use axum::{
    extract::{Path, RawQuery, State},
    http::StatusCode,
    response::Html,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;

use crate::sources::{DashboardConfig, RowFilter};
use crate::table::{is_identifier_column, Cell, TypedTable, CONFERENCE_COLUMN, TEAM_COLUMN};

/// Conference dropdown sentinel meaning "no filter".
pub const ALL_CONFERENCES: &str = "All";

const CHART_PLACEHOLDER_TITLE: &str = "Select Stats to Display";

/// Transient per-request filter state, parsed fresh from the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    pub teams: Vec<String>,
    pub conference: Option<String>,
    pub stats: Vec<String>,
}

impl FilterSelection {
    /// Repeated keys accumulate, so multi-selects arrive as `stat=A&stat=B`.
    pub fn from_query(raw: &str) -> Self {
        let mut selection = Self::default();
        for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
            match key.as_ref() {
                "team" => selection.teams.push(value.into_owned()),
                "conference" => selection.conference = Some(value.into_owned()),
                "stat" => selection.stats.push(value.into_owned()),
                _ => {}
            }
        }
        selection
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub name: String,
    /// One value per filtered row; `None` renders as a gap, not zero.
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub title: String,
    pub x_title: String,
    pub y_title: String,
    pub categories: Vec<String>,
    pub series: Vec<ChartSeries>,
}

/// Output of one view recomputation: the chart gets only the selected
/// columns, the grid gets all columns of exactly the filtered rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub chart: ChartSpec,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

/// One dashboard instance: its configuration and the immutable table
/// snapshot fetched at startup.
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub config: DashboardConfig,
    pub table: TypedTable,
}

/// Everything the router serves. Read-only after construction, so requests
/// share it behind an `Arc` with no locking.
#[derive(Debug)]
pub struct AppSnapshot {
    pub dashboards: Vec<Dashboard>,
}

impl AppSnapshot {
    pub fn find(&self, slug: &str) -> Option<&Dashboard> {
        self.dashboards.iter().find(|d| d.config.slug == slug)
    }
}

/// Row filter. An empty selection (or the conference "All" sentinel) means
/// "no filter" and returns the full set, never an empty one.
pub fn apply_filters(
    table: &TypedTable,
    selection: &FilterSelection,
    row_filter: RowFilter,
) -> TypedTable {
    let (column, wanted): (&str, Vec<&str>) = match row_filter {
        RowFilter::None => return table.clone(),
        RowFilter::Team => {
            if selection.teams.is_empty() {
                return table.clone();
            }
            (
                TEAM_COLUMN,
                selection.teams.iter().map(String::as_str).collect(),
            )
        }
        RowFilter::Conference => match selection.conference.as_deref() {
            None | Some(ALL_CONFERENCES) => return table.clone(),
            Some(conference) => (CONFERENCE_COLUMN, vec![conference]),
        },
    };

    let Some(idx) = table.column_index(column) else {
        return table.clone();
    };

    let rows = table
        .rows
        .iter()
        .filter(|row| {
            row.get(idx)
                .and_then(Cell::as_text)
                .is_some_and(|value| wanted.contains(&value))
        })
        .cloned()
        .collect();

    TypedTable {
        columns: table.columns.clone(),
        rows,
    }
}

/// One grouped-bar series per selected stat; categories are the team values
/// of the filtered rows, values aligned positionally by row order.
pub fn build_chart(
    filtered: &TypedTable,
    selection: &FilterSelection,
    conference_label: Option<&str>,
) -> ChartSpec {
    let selected: Vec<(&str, usize)> = selection
        .stats
        .iter()
        .filter(|stat| !is_identifier_column(stat))
        .filter_map(|stat| filtered.column_index(stat).map(|idx| (stat.as_str(), idx)))
        .collect();

    if selected.is_empty() {
        return ChartSpec {
            title: CHART_PLACEHOLDER_TITLE.to_string(),
            x_title: "Team".to_string(),
            y_title: "Value".to_string(),
            categories: Vec::new(),
            series: Vec::new(),
        };
    }

    let categories = match filtered.column_index(TEAM_COLUMN) {
        Some(team_idx) => filtered
            .rows
            .iter()
            .map(|row| row[team_idx].label())
            .collect(),
        None => vec![String::new(); filtered.rows.len()],
    };

    let series = selected
        .iter()
        .map(|(name, idx)| ChartSeries {
            name: (*name).to_string(),
            values: filtered
                .rows
                .iter()
                .map(|row| row[*idx].as_number())
                .collect(),
        })
        .collect();

    let title = match conference_label {
        Some(conference) => format!("Comparison of Selected Stats in {conference}"),
        None => "Comparison of Selected Stats".to_string(),
    };

    ChartSpec {
        title,
        x_title: "Team".to_string(),
        y_title: "Value".to_string(),
        categories,
        series,
    }
}

/// The update function: pure in (selection, table), recomputed per filter
/// change. Safe to invoke repeatedly; last invocation wins the render.
pub fn build_view(
    table: &TypedTable,
    selection: &FilterSelection,
    config: &DashboardConfig,
) -> DashboardView {
    let filtered = apply_filters(table, selection, config.row_filter);

    let conference_label = match config.row_filter {
        RowFilter::Conference => Some(
            selection
                .conference
                .as_deref()
                .filter(|value| *value != ALL_CONFERENCES)
                .unwrap_or("All Conferences"),
        ),
        _ => None,
    };

    let chart = build_chart(&filtered, selection, conference_label);
    DashboardView {
        chart,
        columns: filtered.columns,
        rows: filtered.rows,
    }
}

pub fn dashboard_router(snapshot: Arc<AppSnapshot>) -> Router {
    Router::new()
        .route("/", get(get_index))
        .route("/{slug}", get(get_dashboard_page))
        .route("/{slug}/view", get(get_dashboard_view))
        .with_state(snapshot)
}

async fn get_index(State(snapshot): State<Arc<AppSnapshot>>) -> Html<String> {
    Html(render_index_html(&snapshot.dashboards))
}

async fn get_dashboard_page(
    State(snapshot): State<Arc<AppSnapshot>>,
    Path(slug): Path<String>,
) -> Result<Html<String>, StatusCode> {
    let dashboard = snapshot.find(&slug).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Html(render_dashboard_html(dashboard)))
}

async fn get_dashboard_view(
    State(snapshot): State<Arc<AppSnapshot>>,
    Path(slug): Path<String>,
    RawQuery(raw): RawQuery,
) -> Result<Json<DashboardView>, StatusCode> {
    let dashboard = snapshot.find(&slug).ok_or(StatusCode::NOT_FOUND)?;
    let selection = FilterSelection::from_query(raw.as_deref().unwrap_or(""));
    Ok(Json(build_view(
        &dashboard.table,
        &selection,
        &dashboard.config,
    )))
}

const PAGE_STYLE: &str = "body{font-family:Arial,sans-serif;background:#f9f9f9;margin:0;padding:20px}h1{text-align:center}.filters{display:flex;gap:16px;justify-content:center;padding:10px}.filters select{min-width:260px;padding:4px}#chart{max-width:1100px;margin:0 auto}#chart .plot{display:flex;align-items:flex-end;gap:14px;overflow-x:auto;padding:10px;min-height:160px}#chart .group{text-align:center}#chart .bars{display:flex;align-items:flex-end;gap:2px;min-height:140px}#chart .bar{width:14px}#chart .cat{font-size:.7rem;max-width:60px;overflow:hidden;text-overflow:ellipsis;white-space:nowrap}#chart .legend{padding:6px;text-align:center}#chart .legend .key{margin-right:12px;font-size:.8rem}#chart .legend i{display:inline-block;width:10px;height:10px;margin-right:4px}#grid{width:90%;margin:20px auto}#grid table{width:100%;border-collapse:collapse;background:#fff}#grid th{background:#333;color:#fff;font-weight:bold;padding:10px;cursor:pointer}#grid th input{width:90%;font-weight:normal}#grid td{text-align:center;padding:10px;border-bottom:1px solid #ddd}.pager{text-align:center;padding:10px}.pager button{margin:0 8px}.meta{text-align:center;color:#777;font-size:.8rem}";

// Client-side grid behavior (sort, per-column filter, pagination) and the
// grouped-bar renderer. Server round-trips happen only on dropdown changes.
const DASHBOARD_SCRIPT: &str = r#"
const PAGE_SIZE = 50;
let view = {chart:{title:'',x_title:'',y_title:'',categories:[],series:[]},columns:[],rows:[]};
let sortCol = -1, sortAsc = true, page = 0;
const colFilters = {};
const PALETTE = ['#1f77b4','#ff7f0e','#2ca02c','#d62728','#9467bd','#8c564b'];

function selectedValues(id){
  const el = document.getElementById(id);
  if(!el) return [];
  return Array.from(el.selectedOptions).map(o => o.value);
}

function queryString(){
  const params = new URLSearchParams();
  selectedValues('team-filter').forEach(v => params.append('team', v));
  selectedValues('conference-filter').forEach(v => params.append('conference', v));
  selectedValues('stat-filter').forEach(v => params.append('stat', v));
  return params.toString();
}

function refresh(){
  fetch(VIEW_URL + '?' + queryString())
    .then(resp => resp.json())
    .then(data => { view = data; page = 0; renderChart(); renderGrid(); });
}

function cellText(cell){ return cell === null ? '' : String(cell); }

function matchesFilter(cell, filter){
  if(!filter) return true;
  const m = filter.match(/^(>=|<=|>|<)\s*(-?[0-9.]+)$/);
  if(m && typeof cell === 'number'){
    const bound = parseFloat(m[2]);
    if(m[1] === '>') return cell > bound;
    if(m[1] === '<') return cell < bound;
    if(m[1] === '>=') return cell >= bound;
    return cell <= bound;
  }
  return cellText(cell).toLowerCase().includes(filter.toLowerCase());
}

function visibleRows(){
  let rows = view.rows.filter(row =>
    view.columns.every((name, i) => matchesFilter(row[i], colFilters[i] || '')));
  if(sortCol >= 0){
    rows = rows.slice().sort((a, b) => {
      const x = a[sortCol], y = b[sortCol];
      let cmp;
      if(typeof x === 'number' && typeof y === 'number') cmp = x - y;
      else cmp = cellText(x).localeCompare(cellText(y));
      return sortAsc ? cmp : -cmp;
    });
  }
  return rows;
}

function renderChart(){
  const chart = view.chart;
  const root = document.getElementById('chart');
  root.textContent = '';
  const title = document.createElement('h2');
  title.textContent = chart.title;
  title.style.textAlign = 'center';
  root.appendChild(title);
  if(chart.series.length){
    let max = 0;
    chart.series.forEach(s => s.values.forEach(v => { if(v !== null && v > max) max = v; }));
    const plot = document.createElement('div');
    plot.className = 'plot';
    chart.categories.forEach((cat, i) => {
      const group = document.createElement('div');
      group.className = 'group';
      const bars = document.createElement('div');
      bars.className = 'bars';
      chart.series.forEach((s, si) => {
        const bar = document.createElement('div');
        bar.className = 'bar';
        bar.style.background = PALETTE[si % PALETTE.length];
        const v = s.values[i];
        if(v === null){
          bar.style.visibility = 'hidden';
          bar.style.height = '1px';
        } else {
          bar.style.height = Math.max(1, Math.round(140 * v / (max || 1))) + 'px';
          bar.title = s.name + ': ' + v;
        }
        bars.appendChild(bar);
      });
      const label = document.createElement('div');
      label.className = 'cat';
      label.textContent = cat;
      label.title = cat;
      group.appendChild(bars);
      group.appendChild(label);
      plot.appendChild(group);
    });
    root.appendChild(plot);
    const legend = document.createElement('div');
    legend.className = 'legend';
    chart.series.forEach((s, si) => {
      const item = document.createElement('span');
      item.className = 'key';
      const swatch = document.createElement('i');
      swatch.style.background = PALETTE[si % PALETTE.length];
      item.appendChild(swatch);
      item.appendChild(document.createTextNode(s.name));
      legend.appendChild(item);
    });
    root.appendChild(legend);
  }
  const axes = document.createElement('p');
  axes.className = 'meta';
  axes.textContent = chart.x_title + ' / ' + chart.y_title;
  root.appendChild(axes);
}

function renderGrid(){
  const root = document.getElementById('grid');
  root.textContent = '';
  const rows = visibleRows();
  const pages = Math.max(1, Math.ceil(rows.length / PAGE_SIZE));
  if(page >= pages) page = pages - 1;

  const table = document.createElement('table');
  const thead = document.createElement('thead');
  const headRow = document.createElement('tr');
  view.columns.forEach((name, i) => {
    const th = document.createElement('th');
    th.textContent = name + (sortCol === i ? (sortAsc ? ' ▲' : ' ▼') : '');
    th.addEventListener('click', () => {
      if(sortCol === i) sortAsc = !sortAsc; else { sortCol = i; sortAsc = true; }
      renderGrid();
    });
    headRow.appendChild(th);
  });
  thead.appendChild(headRow);
  const filterRow = document.createElement('tr');
  view.columns.forEach((name, i) => {
    const th = document.createElement('th');
    const input = document.createElement('input');
    input.type = 'text';
    input.placeholder = 'filter';
    input.value = colFilters[i] || '';
    input.addEventListener('input', () => { colFilters[i] = input.value; page = 0; renderGrid(); });
    th.appendChild(input);
    filterRow.appendChild(th);
  });
  thead.appendChild(filterRow);
  table.appendChild(thead);

  const tbody = document.createElement('tbody');
  const start = page * PAGE_SIZE;
  rows.slice(start, start + PAGE_SIZE).forEach(row => {
    const tr = document.createElement('tr');
    row.forEach(cell => {
      const td = document.createElement('td');
      td.textContent = cellText(cell);
      tr.appendChild(td);
    });
    tbody.appendChild(tr);
  });
  table.appendChild(tbody);
  root.appendChild(table);

  const pager = document.createElement('div');
  pager.className = 'pager';
  const prev = document.createElement('button');
  prev.textContent = 'Prev';
  prev.disabled = page === 0;
  prev.addEventListener('click', () => { page -= 1; renderGrid(); });
  const label = document.createElement('span');
  label.textContent = 'Page ' + (page + 1) + ' of ' + pages;
  const next = document.createElement('button');
  next.textContent = 'Next';
  next.disabled = page >= pages - 1;
  next.addEventListener('click', () => { page += 1; renderGrid(); });
  pager.appendChild(prev);
  pager.appendChild(label);
  pager.appendChild(next);
  root.appendChild(pager);
}

['team-filter','conference-filter','stat-filter'].forEach(id => {
  const el = document.getElementById(id);
  if(el) el.addEventListener('change', refresh);
});
refresh();
"#;

pub fn render_dashboard_html(dashboard: &Dashboard) -> String {
    let config = &dashboard.config;
    let table = &dashboard.table;

    let mut out = String::new();
    out.push_str("<!DOCTYPE html><html><head><meta charset=\"utf-8\">\n");
    out.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    out.push_str(&format!("<title>{}</title>\n", escape_html(config.title)));
    out.push_str(&format!("<style>{PAGE_STYLE}</style>\n"));
    out.push_str("</head><body>\n");
    out.push_str(&format!("<h1>{}</h1>\n", escape_html(config.title)));

    out.push_str("<div class=\"filters\">\n");
    match config.row_filter {
        RowFilter::None => {}
        RowFilter::Team => {
            out.push_str("<select id=\"team-filter\" multiple size=\"6\" title=\"Select Teams\">\n");
            for team in table.distinct_text_values(TEAM_COLUMN) {
                push_option(&mut out, &team, &team, false);
            }
            out.push_str("</select>\n");
        }
        RowFilter::Conference => {
            out.push_str("<select id=\"conference-filter\" title=\"Select a Conference\">\n");
            for conference in table.distinct_text_values(CONFERENCE_COLUMN) {
                push_option(&mut out, &conference, &conference, false);
            }
            push_option(&mut out, ALL_CONFERENCES, "All Conferences", true);
            out.push_str("</select>\n");
        }
    }
    out.push_str(
        "<select id=\"stat-filter\" multiple size=\"6\" title=\"Select Stats to Compare\">\n",
    );
    for column in &table.columns {
        if !is_identifier_column(column) {
            push_option(&mut out, column, column, false);
        }
    }
    out.push_str("</select>\n</div>\n");

    out.push_str("<div id=\"chart\"></div>\n<div id=\"grid\"></div>\n");
    out.push_str(&format!(
        "<p class=\"meta\">Scraped {}</p>\n",
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    ));
    out.push_str(&format!(
        "<script>\nconst VIEW_URL = '/{}/view';\n",
        config.slug
    ));
    out.push_str(DASHBOARD_SCRIPT);
    out.push_str("</script>\n</body></html>\n");
    out
}

pub fn render_index_html(dashboards: &[Dashboard]) -> String {
    let mut out = String::new();
    out.push_str("<!DOCTYPE html><html><head><meta charset=\"utf-8\">\n");
    out.push_str("<title>NCAA Basketball Dashboard</title>\n");
    out.push_str(&format!("<style>{PAGE_STYLE}</style>\n"));
    out.push_str("</head><body>\n");
    out.push_str("<h1>Welcome to the NCAA Basketball Dashboard</h1>\n");
    out.push_str("<p style=\"text-align:center\">Select a dashboard to view and compare statistics:</p>\n");
    out.push_str("<ul style=\"max-width:420px;margin:0 auto\">\n");
    for dashboard in dashboards {
        out.push_str(&format!(
            "<li><a href=\"/{}\">{}</a> ({} rows)</li>\n",
            dashboard.config.slug,
            escape_html(dashboard.config.title),
            dashboard.table.rows.len()
        ));
    }
    out.push_str("</ul>\n");
    out.push_str(&format!(
        "<p class=\"meta\">Generated {}</p>\n",
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    ));
    out.push_str("</body></html>\n");
    out
}

fn push_option(out: &mut String, value: &str, label: &str, selected: bool) {
    out.push_str(&format!(
        "<option value=\"{}\"{}>{}</option>\n",
        escape_html(value),
        if selected { " selected" } else { "" },
        escape_html(label)
    ));
}

fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
