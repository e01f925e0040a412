// CSV table sources for the vocabulary and the roster
use csv::ReaderBuilder;
use skillmatch_core::{Error, RawTable, Result, TableSource};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvOptions {
    pub delimiter: u8,
    /// Lines before the header row to ignore, e.g. report banners.
    pub skip_rows: usize,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            skip_rows: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CsvTable {
    path: PathBuf,
    options: CsvOptions,
}

impl CsvTable {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            options: CsvOptions::default(),
        }
    }

    pub fn with_options(mut self, options: CsvOptions) -> Self {
        self.options = options;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse CSV from any reader. Blank lines are skipped, short rows padded.
    pub fn read_from<R: Read>(reader: R, options: &CsvOptions) -> Result<RawTable> {
        let mut csv = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(options.delimiter)
            .from_reader(reader);

        let mut records = csv.records();
        for _ in 0..options.skip_rows {
            if records.next().transpose().map_err(csv_error)?.is_none() {
                return Err(Error::Load("file ended before the header row".to_string()));
            }
        }

        let mut headers: Option<Vec<String>> = None;
        let mut rows = Vec::new();
        for record in records {
            let record = record.map_err(csv_error)?;
            if record.iter().all(|cell| cell.trim().is_empty()) {
                continue;
            }
            let cells = record.iter().map(str::to_string);
            if headers.is_none() {
                headers = Some(cells.map(|h| h.trim().to_string()).collect());
            } else {
                rows.push(cells.collect());
            }
        }

        let headers = headers.ok_or_else(|| Error::Load("no header row".to_string()))?;
        Ok(RawTable::new(headers, rows))
    }
}

fn csv_error(e: csv::Error) -> Error {
    Error::Load(format!("csv: {}", e))
}

impl TableSource for CsvTable {
    fn read_table(&self) -> Result<RawTable> {
        let file = File::open(&self.path)
            .map_err(|e| Error::Load(format!("{}: {}", self.path.display(), e)))?;
        Self::read_from(file, &self.options)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_skip_banner_rows() {
        let data = "Skills and Certificates report\n,,\nEmployee ID,Skills,Certification\n1,Python,\n\n2,\"Welding, MIG\",AWS\n";
        let options = CsvOptions {
            skip_rows: 2,
            ..CsvOptions::default()
        };
        let table = CsvTable::read_from(data.as_bytes(), &options).unwrap();
        assert_eq!(table.headers, vec!["Employee ID", "Skills", "Certification"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0], vec!["1", "Python", ""]);
        assert_eq!(table.rows[1][1], "Welding, MIG");
    }

    #[test]
    fn test_short_rows_padded() {
        let table = CsvTable::read_from("a,b,c\n1\n".as_bytes(), &CsvOptions::default()).unwrap();
        assert_eq!(table.rows[0], vec!["1", "", ""]);
    }

    #[test]
    fn test_semicolon_delimiter() {
        let options = CsvOptions {
            delimiter: b';',
            ..CsvOptions::default()
        };
        let table = CsvTable::read_from("Skill;Area\nRust;Systems\n".as_bytes(), &options).unwrap();
        assert_eq!(table.rows[0], vec!["Rust", "Systems"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(
            CsvTable::read_from("".as_bytes(), &CsvOptions::default()),
            Err(Error::Load(_))
        ));
        let options = CsvOptions {
            skip_rows: 3,
            ..CsvOptions::default()
        };
        assert!(matches!(
            CsvTable::read_from("x\n".as_bytes(), &options),
            Err(Error::Load(_))
        ));
    }

    #[test]
    fn test_missing_file_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = CsvTable::new(dir.path().join("missing.csv"));
        assert!(matches!(source.read_table(), Err(Error::Load(_))));
    }

    #[test]
    fn test_read_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Skill\nPython Programming\nWelding").unwrap();
        let table = CsvTable::new(file.path()).read_table().unwrap();
        assert_eq!(table.len(), 2);
    }
}
