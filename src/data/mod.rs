pub(crate) mod http;
pub mod table;

pub use table::{
    parse_csv, CellValue, CsvTableSource, HttpTableSource, InMemoryTableSource, TableQuery,
    TableRow, TableSource,
};
