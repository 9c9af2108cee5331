// src/orgs/source.rs
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::orgs::OrganizationRow;
use crate::utils::error::InputError;

const REQUIRED_COLUMNS: [&str; 2] = ["Organization", "Category"];

/// Reads organization rows from CSV with a header row. Columns other than
/// `Organization` and `Category` are ignored; empty cells read as absent.
pub fn read_rows<R: Read>(reader: R) -> Result<Vec<OrganizationRow>, InputError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(InputError::MissingColumn(column.to_string()));
        }
    }

    let mut rows = Vec::new();
    for result in csv_reader.deserialize::<OrganizationRow>() {
        rows.push(result?);
    }
    Ok(rows)
}

/// Loads and concatenates several organization lists, in the order given.
pub fn load_organization_lists<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<OrganizationRow>, InputError> {
    let mut all_rows = Vec::new();
    for path in paths {
        let path = path.as_ref();
        let file = File::open(path)?;
        let rows = read_rows(file)?;
        tracing::info!("Loaded {} organization rows from {}", rows.len(), path.display());
        all_rows.extend(rows);
    }
    Ok(all_rows)
}
