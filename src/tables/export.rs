//! CSV serialization of the table views
//!
//! Writes one `<table>.csv` per selected view into the output directory:
//! header row first, then data rows in table order. Quoting and escaping
//! belong to the csv writer, not to the row values.

use crate::error::ExportError;
use crate::tables::{TableKind, Tables};
use std::path::{Path, PathBuf};
use tracing::info;

/// Write the selected tables (all when `selection` is None) as CSV files.
/// Returns the paths written, in table order.
pub fn export_tables(
    tables: &Tables,
    output_dir: &Path,
    selection: Option<&[TableKind]>,
) -> Result<Vec<PathBuf>, ExportError> {
    std::fs::create_dir_all(output_dir)?;

    let mut written = Vec::new();
    for view in tables.export_views() {
        if let Some(wanted) = selection {
            if !wanted.contains(&view.kind) {
                continue;
            }
        }

        let path = output_dir.join(format!("{}.csv", view.kind.name()));
        let mut writer = csv::Writer::from_path(&path)?;

        writer.write_record(view.header)?;
        for row in &view.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;

        info!(table = view.kind.name(), rows = view.rows.len(), "Table written");
        written.push(path);
    }

    Ok(written)
}
