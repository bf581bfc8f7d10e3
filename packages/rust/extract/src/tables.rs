//! Data-table sections: columns, primary key, indexes and view query.
//!
//! Cell parsing is positional and gated on cell counts (≥6 for table columns,
//! exactly 2 for the primary key, ≥4 for indexes). Rows that do not fit the
//! expected layout are skipped without error.

use hcmdoc_shared::{IndexRecord, PrimaryKey, TableColumn, ViewColumn};
use scraper::Html;

use crate::sections::{P, Section, TD, TR, compact_text, data_rows, plain_text, split_columns};

/// Columns of a TABLE page, one per data row with at least 6 cells.
pub(crate) fn table_columns(doc: &Html) -> Vec<TableColumn> {
    let Some(table) = Section::Columns.table(doc) else {
        return Vec::new();
    };

    data_rows(table)
        .filter(|cells| cells.len() >= 6)
        .map(|cells| TableColumn {
            column_name: plain_text(cells[0]),
            data_type: plain_text(cells[1]),
            length: plain_text(cells[2]),
            precision: plain_text(cells[3]),
            not_null: plain_text(cells[4]).to_lowercase() == "yes",
            description: plain_text(cells[5]),
        })
        .collect()
}

/// Columns of a VIEW page: the non-empty paragraphs of the table's first cell.
pub(crate) fn view_columns(doc: &Html) -> Vec<ViewColumn> {
    let Some(cell) = Section::Columns
        .table(doc)
        .and_then(|table| table.select(&TD).next())
    else {
        return Vec::new();
    };

    cell.select(&P)
        .map(compact_text)
        .filter(|name| !name.is_empty())
        .map(|column_name| ViewColumn { column_name })
        .collect()
}

/// The view's SQL: every paragraph of the "Query" table, newline-joined.
pub(crate) fn view_query(doc: &Html) -> String {
    Section::Query
        .table(doc)
        .map(|table| {
            table
                .select(&P)
                .map(compact_text)
                .collect::<Vec<_>>()
                .join("\n")
        })
        .unwrap_or_default()
}

/// The primary key from the second row of the "Primary Key" table.
pub(crate) fn primary_key(doc: &Html) -> Option<PrimaryKey> {
    let table = Section::PrimaryKey.table(doc)?;
    let row = table.select(&TR).nth(1)?;
    let cells: Vec<_> = row.select(&TD).collect();

    match cells.as_slice() {
        [name, columns] => Some(PrimaryKey {
            name: plain_text(*name),
            columns: split_columns(&plain_text(*columns)),
        }),
        _ => None,
    }
}

/// Indexes, one per data row with at least 4 cells. The third cell is unused.
pub(crate) fn indexes(doc: &Html) -> Vec<IndexRecord> {
    let Some(table) = Section::Indexes.table(doc) else {
        return Vec::new();
    };

    data_rows(table)
        .filter(|cells| cells.len() >= 4)
        .map(|cells| IndexRecord {
            name: plain_text(cells[0]),
            uniqueness: plain_text(cells[1]),
            columns: split_columns(&plain_text(cells[3])),
        })
        .collect()
}
