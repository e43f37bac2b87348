//! CSV adapters used by the command-line front end.

pub mod account_reader;
pub mod account_writer;
pub mod transfer_reader;

use std::io::Read;

/// Header-driven reader that tolerates padding around fields and short rows.
fn reader_builder<R: Read>(source: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(source)
}
