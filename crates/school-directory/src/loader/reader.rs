use super::LoaderError;
use std::io::Read;

/// Positional cells of one CSV line, aligned to the header row.
pub type RawCsvRow = Vec<String>;

/// Reads every row, header included. Quoted fields may carry commas, line breaks,
/// and doubled quotes; rows may be ragged.
pub(crate) fn read_rows<R: Read>(reader: R) -> Result<Vec<RawCsvRow>, LoaderError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);
    let mut rows = Vec::new();

    for record in csv_reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    if rows.is_empty() {
        return Err(LoaderError::EmptyCsv);
    }

    Ok(rows)
}
