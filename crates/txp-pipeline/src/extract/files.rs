//! Flat-file extraction
//!
//! Reads every `.csv` file in the raw-data drop directory and stacks the
//! rows. A failure on any single file fails the whole call: a half-read
//! drop directory is worse than none.

use std::path::Path;

use tracing::debug;

use txp_common::table::Table;
use txp_common::Result;

/// Read and stack every CSV file in `dir`. Files are visited in name
/// order so repeated runs produce the same row order.
pub fn read_dir(dir: impl AsRef<Path>) -> Result<Table> {
    let dir = dir.as_ref();
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_csv = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if path.is_file() && is_csv {
            paths.push(path);
        }
    }
    paths.sort();

    let mut tables = Vec::with_capacity(paths.len());
    for path in &paths {
        let table = Table::read_csv(path)?;
        debug!(file = %path.display(), rows = table.len(), "read raw csv");
        tables.push(table);
    }

    Ok(Table::concat_outer(tables))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use txp_common::table::Field;

    #[test]
    fn test_reads_all_csv_files_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("b_drop.csv"),
            "transaction_id,quantity\nT2,5\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("a_drop.csv"),
            "transaction_id,quantity\nT1,3\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignore me").unwrap();

        let table = read_dir(dir.path()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(0, "transaction_id"), Some(&Field::Text("T1".into())));
        assert_eq!(table.get(1, "transaction_id"), Some(&Field::Text("T2".into())));
    }

    #[test]
    fn test_empty_directory_yields_empty_table() {
        let dir = tempfile::tempdir().unwrap();
        let table = read_dir(dir.path()).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        assert!(read_dir("/definitely/not/here").is_err());
    }

    #[test]
    fn test_malformed_file_fails_the_whole_call() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("good.csv"), "a,b\n1,2\n").unwrap();
        std::fs::write(dir.path().join("ragged.csv"), "a,b\n1,2,3,4\n").unwrap();

        assert!(read_dir(dir.path()).is_err());
    }
}
