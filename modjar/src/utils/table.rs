//! Table formatting utilities

use prettytable::{Cell, Row, Table};

/// Create a table with bold headers
pub fn create_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.set_format(*prettytable::format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
    table.set_titles(Row::new(
        headers.iter().map(|h| Cell::new(h).style_spec("b")).collect(),
    ));
    table
}

/// Add a row of plain cells
pub fn add_table_row(table: &mut Table, cells: &[String]) {
    table.add_row(Row::new(cells.iter().map(|s| Cell::new(s)).collect()));
}
