//! HTML table extraction.
//!
//! Each source page hosts exactly one relevant `<table>`; TeamRankings pages
//! need a class selector because they carry several.

use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

use crate::table::{RawTable, TypedTable};

/// Substituted when a stats row's team cell carries no `a.school` anchor.
pub const UNKNOWN_TEAM: &str = "Unknown Team";

#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractOptions<'a> {
    /// Narrow to `table.<class>` instead of the document's first table.
    pub table_class: Option<&'a str>,
    /// Column whose text is replaced by a nested `a.school` anchor's text.
    pub school_link_column: Option<usize>,
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("no table element matched selector {selector:?}")]
    NoTableFound { selector: String },
    #[error("invalid table selector {selector:?}: {message}")]
    BadSelector { selector: String, message: String },
}

fn static_selector(css: &str) -> Selector {
    Selector::parse(css).expect("static CSS selector")
}

fn cell_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Extract the target table into a coerced [`TypedTable`].
///
/// Headers are the text of every `<th>` in document order, kept verbatim
/// (duplicates and empties included). Data rows are every `<tr>` after the
/// first; rows with no `<td>` are dropped. Cell-count mismatches against the
/// header are tolerated positionally, see [`TypedTable::from_raw`].
pub fn extract(html: &str, options: &ExtractOptions<'_>) -> Result<TypedTable, ExtractError> {
    let document = Html::parse_document(html);

    let selector_text = match options.table_class {
        Some(class) => format!("table.{class}"),
        None => "table".to_string(),
    };
    let table_selector =
        Selector::parse(&selector_text).map_err(|err| ExtractError::BadSelector {
            selector: selector_text.clone(),
            message: err.to_string(),
        })?;
    let table = document
        .select(&table_selector)
        .next()
        .ok_or(ExtractError::NoTableFound {
            selector: selector_text,
        })?;

    let th = static_selector("th");
    let tr = static_selector("tr");
    let td = static_selector("td");
    let school_link = static_selector("a.school");

    let columns: Vec<String> = table.select(&th).map(cell_text).collect();

    let mut rows = Vec::new();
    for row in table.select(&tr).skip(1) {
        let data_cells: Vec<ElementRef<'_>> = row.select(&td).collect();
        if data_cells.is_empty() {
            continue;
        }

        let mut cells: Vec<String> = data_cells.iter().copied().map(cell_text).collect();
        if let Some(idx) = options.school_link_column {
            if idx < data_cells.len() {
                cells[idx] = data_cells[idx]
                    .select(&school_link)
                    .next()
                    .map(cell_text)
                    .unwrap_or_else(|| UNKNOWN_TEAM.to_string());
            }
        }
        rows.push(cells);
    }

    Ok(TypedTable::from_raw(RawTable { columns, rows }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Cell;

    const SIMPLE: &str = r#"
        <html><body><table>
            <tr><th>Rank</th><th>Team</th><th>PPG</th></tr>
            <tr><td>1</td><td>Duke</td><td>80.5</td></tr>
            <tr><td>2</td><td>Kansas</td><td>bad</td></tr>
        </table></body></html>
    "#;

    #[test]
    fn extracts_headers_and_rows_in_document_order() {
        let table = extract(SIMPLE, &ExtractOptions::default()).unwrap();
        assert_eq!(table.columns, vec!["Rank", "Team", "PPG"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0][1], Cell::Text("Duke".to_string()));
        assert_eq!(table.rows[0][2], Cell::Number(80.5));
        assert_eq!(table.rows[1][2], Cell::Null);
    }

    #[test]
    fn missing_table_is_reported() {
        let err = extract("<html><body><p>nope</p></body></html>", &ExtractOptions::default())
            .unwrap_err();
        assert!(matches!(err, ExtractError::NoTableFound { .. }));
    }

    #[test]
    fn class_selector_skips_unrelated_tables() {
        let html = r#"
            <table><tr><th>Noise</th></tr><tr><td>x</td></tr></table>
            <table class="tr-table">
                <thead><tr><th>Rank</th><th>Team</th></tr></thead>
                <tbody><tr><td>1</td><td>Duke</td></tr></tbody>
            </table>
        "#;

        let options = ExtractOptions {
            table_class: Some("tr-table"),
            ..ExtractOptions::default()
        };
        let table = extract(html, &options).unwrap();
        assert_eq!(table.columns, vec!["Rank", "Team"]);
        assert_eq!(table.rows.len(), 1);
    }

    #[test]
    fn class_selector_with_no_match_is_no_table_found() {
        let err = extract(
            "<table><tr><th>A</th></tr><tr><td>1</td></tr></table>",
            &ExtractOptions {
                table_class: Some("tr-table"),
                ..ExtractOptions::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, ExtractError::NoTableFound { .. }));
    }

    #[test]
    fn school_anchor_text_replaces_team_cell() {
        let html = r#"
            <table>
                <tr><th>Rank</th><th>Team</th><th>FG%</th></tr>
                <tr><td>1</td><td><a class="school" href="/x">Duke</a> Blue Devils</td><td>49.1</td></tr>
                <tr><td>2</td><td>plain text</td><td>48.0</td></tr>
            </table>
        "#;

        let options = ExtractOptions {
            school_link_column: Some(1),
            ..ExtractOptions::default()
        };
        let table = extract(html, &options).unwrap();
        assert_eq!(table.rows[0][1], Cell::Text("Duke".to_string()));
        assert_eq!(table.rows[1][1], Cell::Text(UNKNOWN_TEAM.to_string()));
    }

    #[test]
    fn rows_without_data_cells_are_dropped() {
        let html = r#"
            <table>
                <tr><th>Team</th><th>PPG</th></tr>
                <tr><th>Mid-table header</th><th>ignored</th></tr>
                <tr><td>Duke</td><td>80.5</td></tr>
            </table>
        "#;

        let table = extract(html, &ExtractOptions::default()).unwrap();
        assert_eq!(table.rows.len(), 1);
    }

    #[test]
    fn nested_markup_inside_cells_is_flattened_and_trimmed() {
        let html = r#"
            <table>
                <tr><th> Team </th><th>W-L</th></tr>
                <tr><td><span>Duke</span></td><td> 20-3 </td></tr>
            </table>
        "#;

        let table = extract(html, &ExtractOptions::default()).unwrap();
        assert_eq!(table.columns, vec!["Team", "W-L"]);
        assert_eq!(table.rows[0][0], Cell::Text("Duke".to_string()));
        // "20-3" is not numeric, so the non-identifier column goes null.
        assert_eq!(table.rows[0][1], Cell::Null);
    }
}
