use csv::ReaderBuilder;
use std::fs::{self, File};
use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::SystemTime;
use tabulon_common::{Error, Result, SchemaTableName, TableData};
use tracing::debug;

const CSV_EXTENSION: &str = "csv";

/// What a table file looked like when it was read. A change in either field
/// means the file has to be read again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRevision {
    pub modified: Option<SystemTime>,
    pub len: u64,
}

/// A single CSV file whose first record names the columns.
pub struct CsvTable {
    path: PathBuf,
}

impl CsvTable {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn revision(&self) -> Result<FileRevision> {
        let metadata = fs::metadata(&self.path)?;
        Ok(FileRevision { modified: metadata.modified().ok(), len: metadata.len() })
    }

    /// Reads the header and every data row.
    pub fn load(&self) -> Result<TableData> {
        let file = File::open(&self.path)?;
        let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(file);

        let column_names: Vec<String> = rdr
            .headers()
            .map_err(|e| Error::Csv(e.to_string()))?
            .iter()
            .map(str::to_string)
            .collect();

        let mut rows = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| Error::Csv(e.to_string()))?;
            rows.push(record.iter().map(str::to_string).collect());
        }
        debug!(path = %self.path.display(), rows = rows.len(), "loaded csv table");
        Ok(TableData::new(column_names, rows))
    }
}

/// Serves `<root>/<schema>/<table>.csv` files.
#[derive(Debug, Clone)]
pub struct CsvDirectory {
    root: PathBuf,
}

impl CsvDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Sub-directories of the root, sorted by name.
    pub fn list_schemas(&self) -> Result<Vec<String>> {
        let mut schemas = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                if let Some(name) = entry.file_name().to_str() {
                    schemas.push(name.to_string());
                }
            }
        }
        schemas.sort();
        Ok(schemas)
    }

    /// CSV files of a schema, sorted by table name.
    pub fn list_tables(&self, schema: &str) -> Result<Vec<SchemaTableName>> {
        let dir = self.schema_dir(schema)?;
        let entries = fs::read_dir(&dir).map_err(|e| match e.kind() {
            ErrorKind::NotFound => Error::schema_not_found(schema),
            _ => Error::Io(e),
        })?;

        let mut tables = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(CSV_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                tables.push(SchemaTableName::new(schema, stem));
            }
        }
        tables.sort();
        Ok(tables)
    }

    pub fn table(&self, schema: &str, table: &str) -> Result<CsvTable> {
        let path = self.schema_dir(schema)?.join(format!("{}.{}", checked_name(table, schema, table)?, CSV_EXTENSION));
        if !path.is_file() {
            return Err(Error::table_not_found(schema, table));
        }
        Ok(CsvTable::new(path))
    }

    fn schema_dir(&self, schema: &str) -> Result<PathBuf> {
        let name = checked_name(schema, schema, "")?;
        let dir = self.root.join(name);
        if !dir.is_dir() {
            return Err(Error::schema_not_found(schema));
        }
        Ok(dir)
    }
}

// Names come from request paths; anything that could leave the root is treated as absent.
fn checked_name<'a>(name: &'a str, schema: &str, table: &str) -> Result<&'a str> {
    let escapes = name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']);
    if escapes {
        return Err(if table.is_empty() {
            Error::schema_not_found(schema)
        } else {
            Error::table_not_found(schema, table)
        });
    }
    Ok(name)
}
