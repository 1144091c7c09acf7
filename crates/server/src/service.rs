use crate::config::Settings;
use async_trait::async_trait;
use std::sync::Arc;
use tabulon_cache::SnapshotCache;
use tabulon_client::{ClientError, PageService};
use tabulon_common::wire::{PageRequest, PageResult, Splits, SplitsRequest};
use tabulon_common::{Error, Result, SchemaTableName, TableData, TableMetadata};
use tabulon_connector_filesystem::{CsvDirectory, FileRevision};
use tabulon_connector_functions::{VirtualFunction, VirtualSchema};
use tabulon_engine::page::{encode_rows, resolve_split};
use tabulon_engine::{advance, max_splits, plan, plan_capped, PagePolicy, SplitPolicy};
use tracing::{debug, info};

/// Virtual tables are planned over a single logical row; its page carries
/// every row the function produces.
const VIRTUAL_ROW_COUNT: usize = 1;

type TableCache = SnapshotCache<SchemaTableName, TableData, FileRevision>;

/// The connector operations, independent of transport.
///
/// All methods block on file I/O; async callers run them on the blocking pool.
pub struct ConnectorService {
    csv: CsvDirectory,
    virtual_schema: Option<VirtualSchema>,
    cache: Option<TableCache>,
    page_policy: PagePolicy,
    default_split_policy: SplitPolicy,
}

impl ConnectorService {
    pub fn new(settings: &Settings) -> Self {
        info!(
            data_dir = %settings.data_dir.display(),
            virtual_schema = settings.virtual_schema().unwrap_or("<disabled>"),
            snapshot_cache = settings.snapshot_cache,
            "connector service configured"
        );
        Self {
            csv: CsvDirectory::new(&settings.data_dir),
            virtual_schema: settings.virtual_schema().map(VirtualSchema::new),
            cache: settings.snapshot_cache.then(TableCache::new),
            page_policy: settings.page_policy(),
            default_split_policy: settings.default_split_policy(),
        }
    }

    /// CSV schemas in name order, then the virtual schema.
    pub fn list_schemas(&self) -> Result<Vec<String>> {
        let mut schemas = self.csv.list_schemas()?;
        if let Some(virtual_schema) = &self.virtual_schema {
            schemas.retain(|s| s != virtual_schema.name());
            schemas.push(virtual_schema.name().to_string());
        }
        Ok(schemas)
    }

    pub fn list_tables(&self, schema: &str) -> Result<Vec<SchemaTableName>> {
        match self.virtual_schema(schema) {
            Some(virtual_schema) => Ok(virtual_schema.list_tables()),
            None => self.csv.list_tables(schema),
        }
    }

    pub fn table_metadata(&self, schema: &str, table: &str) -> Result<TableMetadata> {
        let name = SchemaTableName::new(schema, table);
        let column_names = match self.virtual_schema(schema) {
            Some(virtual_schema) => virtual_schema.function(table)?.column_names(),
            None => self.snapshot(schema, table)?.column_names.clone(),
        };
        Ok(TableMetadata::from_column_names(name, &column_names))
    }

    pub fn plan_splits(&self, schema: &str, table: &str, request: &SplitsRequest) -> Result<Splits> {
        let policy = SplitPolicy::from_request(request, self.default_split_policy)?;
        let cap = max_splits(request)?;
        let ranges = match self.virtual_schema(schema) {
            Some(virtual_schema) => {
                virtual_schema.function(table)?;
                plan(VIRTUAL_ROW_COUNT, SplitPolicy::Single)?
            }
            None => plan_capped(self.snapshot(schema, table)?.row_count(), policy, cap)?,
        };
        let splits: Vec<String> = ranges.iter().map(|r| r.to_token()).collect();
        debug!(schema, table, ?policy, splits = splits.len(), "splits planned");
        Ok(Splits { splits })
    }

    pub fn read_page(&self, schema: &str, table: &str, split: &str, request: &PageRequest) -> Result<PageResult> {
        let desired_columns = request.desired_columns.as_deref();
        let continuation = request.next_token.as_deref();
        match self.virtual_schema(schema) {
            Some(virtual_schema) => {
                let function = virtual_schema.function(table)?;
                self.read_virtual_page(function, split, continuation, desired_columns, request)
            }
            None => {
                let snapshot = self.snapshot(schema, table)?;
                tabulon_engine::read_page(&snapshot, split, continuation, desired_columns, self.page_policy)
            }
        }
    }

    /// The current contents of a CSV table, reusing the cached snapshot while
    /// the file is unchanged. A table whose file is gone drops its snapshot.
    pub fn snapshot(&self, schema: &str, table: &str) -> Result<Arc<TableData>> {
        let key = SchemaTableName::new(schema, table);
        let source = match self.csv.table(schema, table) {
            Ok(source) => source,
            Err(e) => {
                if let (Some(cache), Error::NotFound(_)) = (&self.cache, &e) {
                    cache.invalidate(&key);
                }
                return Err(e);
            }
        };
        let Some(cache) = &self.cache else {
            return Ok(Arc::new(source.load()?));
        };
        let revision = source.revision()?;
        cache.get_or_load(&key, revision, || source.load())
    }

    /// Number of table snapshots currently held.
    pub fn cached_tables(&self) -> usize {
        self.cache.as_ref().map_or(0, |cache| cache.len())
    }

    fn virtual_schema(&self, schema: &str) -> Option<&VirtualSchema> {
        self.virtual_schema.as_ref().filter(|v| v.name() == schema)
    }

    // The split covers one logical row, so every page policy returns the whole
    // function output in the first page.
    fn read_virtual_page(
        &self,
        function: VirtualFunction,
        split: &str,
        continuation: Option<&str>,
        desired_columns: Option<&[String]>,
        request: &PageRequest,
    ) -> Result<PageResult> {
        let split_range = resolve_split(split, VIRTUAL_ROW_COUNT)?;
        let step = advance(split_range, continuation, self.page_policy)?;
        let data = if step.rows.is_empty() {
            TableData::new(function.column_names(), Vec::new())
        } else {
            function.table(&request.parameters)?
        };
        let column_blocks = encode_rows(&data.column_names, &data.rows, desired_columns)?;
        debug!(function = function.table_name(), split, rows = data.row_count(), "virtual page assembled");
        Ok(PageResult { column_blocks, row_count: data.row_count(), next_token: step.next_token })
    }
}

/// [`PageService`] over an in-process [`ConnectorService`].
#[derive(Clone)]
pub struct InProcessClient {
    service: Arc<ConnectorService>,
}

impl InProcessClient {
    pub fn new(service: Arc<ConnectorService>) -> Self {
        Self { service }
    }

    async fn call<T, F>(&self, f: F) -> std::result::Result<T, ClientError>
    where
        T: Send + 'static,
        F: FnOnce(&ConnectorService) -> Result<T> + Send + 'static,
    {
        let service = Arc::clone(&self.service);
        tokio::task::spawn_blocking(move || f(&service))
            .await
            .map_err(|e| Error::Io(std::io::Error::other(e)))?
            .map_err(ClientError::from)
    }
}

#[async_trait]
impl PageService for InProcessClient {
    async fn table_metadata(&self, schema: &str, table: &str) -> tabulon_client::Result<TableMetadata> {
        let (schema, table) = (schema.to_string(), table.to_string());
        self.call(move |s| s.table_metadata(&schema, &table)).await
    }

    async fn plan_splits(
        &self,
        schema: &str,
        table: &str,
        request: &SplitsRequest,
    ) -> tabulon_client::Result<Splits> {
        let (schema, table, request) = (schema.to_string(), table.to_string(), request.clone());
        self.call(move |s| s.plan_splits(&schema, &table, &request)).await
    }

    async fn read_page(
        &self,
        schema: &str,
        table: &str,
        split: &str,
        request: &PageRequest,
    ) -> tabulon_client::Result<PageResult> {
        let (schema, table, split, request) =
            (schema.to_string(), table.to_string(), split.to_string(), request.clone());
        self.call(move |s| s.read_page(&schema, &table, &split, &request)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::TempDir;

    fn service_over(dir: &TempDir, settings: Settings) -> ConnectorService {
        ConnectorService::new(&Settings { data_dir: dir.path().to_path_buf(), ..settings })
    }

    fn sample_dir() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("sales")).unwrap();
        fs::write(dir.path().join("sales/orders.csv"), "id,item\n1,a\n2,b\n3,c\n4,d\n5,e\n").unwrap();
        dir
    }

    #[test]
    fn test_list_schemas_appends_virtual() {
        let dir = sample_dir();
        let service = service_over(&dir, Settings::default());
        assert_eq!(service.list_schemas().unwrap(), vec!["sales", "virtual"]);

        let no_virtual = service_over(&dir, Settings { virtual_schema: String::new(), ..Settings::default() });
        assert_eq!(no_virtual.list_schemas().unwrap(), vec!["sales"]);
    }

    #[test]
    fn test_default_split_size_applies_to_empty_request() {
        let dir = sample_dir();
        let service = service_over(&dir, Settings { default_split_size: Some(2), ..Settings::default() });

        let splits = service.plan_splits("sales", "orders", &SplitsRequest::default()).unwrap();

        assert_eq!(splits.splits, vec!["0-2", "2-4", "4-5"]);
    }

    #[test]
    fn test_max_split_count_caps_default_policy() {
        let dir = sample_dir();
        let mut contents = String::from("id,item\n");
        for i in 0..30 {
            contents.push_str(&format!("{},item{}\n", i, i));
        }
        fs::write(dir.path().join("sales/orders.csv"), contents).unwrap();
        let service = service_over(&dir, Settings { default_split_size: Some(5), ..Settings::default() });

        let request = SplitsRequest { max_split_count: Some(50), ..SplitsRequest::default() };
        let splits = service.plan_splits("sales", "orders", &request).unwrap();
        assert_eq!(splits.splits, vec!["0-5", "5-10", "10-15", "15-20", "20-25", "25-30"]);

        let request = SplitsRequest { max_split_count: Some(2), ..SplitsRequest::default() };
        let splits = service.plan_splits("sales", "orders", &request).unwrap();
        assert_eq!(splits.splits, vec!["0-15", "15-30"]);

        let request = SplitsRequest { max_split_count: Some(0), ..SplitsRequest::default() };
        let err = service.plan_splits("sales", "orders", &request).unwrap_err();
        assert!(matches!(err, Error::InvalidSplitPolicy(_)));
    }

    #[test]
    fn test_virtual_page_ignores_bounded_policy() {
        let dir = sample_dir();
        let settings = Settings {
            page_policy: crate::config::PagePolicyKind::Bounded,
            page_max_rows: 10,
            ..Settings::default()
        };
        let service = service_over(&dir, settings);
        let request = PageRequest {
            parameters: HashMap::from([("word".to_string(), "rocket".to_string())]),
            ..PageRequest::default()
        };

        let page = service.read_page("virtual", "permutations", "0-1", &request).unwrap();

        assert_eq!(page.row_count, 720);
        assert_eq!(page.next_token, None);
    }

    #[test]
    fn test_virtual_table_plans_one_split() {
        let dir = sample_dir();
        let service = service_over(&dir, Settings::default());
        let request = SplitsRequest { split_count: Some(4), ..SplitsRequest::default() };

        let splits = service.plan_splits("virtual", "permutations", &request).unwrap();

        assert_eq!(splits.splits, vec!["0-1"]);
    }

    #[test]
    fn test_virtual_page_carries_all_rows() {
        let dir = sample_dir();
        let service = service_over(&dir, Settings::default());
        let request = PageRequest {
            parameters: HashMap::from([("word".to_string(), "abc".to_string())]),
            ..PageRequest::default()
        };

        let page = service.read_page("virtual", "permutations", "0-1", &request).unwrap();

        assert_eq!(page.row_count, 6);
        assert_eq!(page.column_blocks.len(), 2);
        assert_eq!(page.next_token, None);
    }

    #[test]
    fn test_virtual_page_requires_word() {
        let dir = sample_dir();
        let service = service_over(&dir, Settings::default());
        let err = service
            .read_page("virtual", "permutations", "0-1", &PageRequest::default())
            .unwrap_err();
        assert!(matches!(err, Error::MissingParameter(_)));
    }

    #[test]
    fn test_snapshot_is_shared_until_file_changes() {
        let dir = sample_dir();
        let service = service_over(&dir, Settings::default());

        let first = service.snapshot("sales", "orders").unwrap();
        let second = service.snapshot("sales", "orders").unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        fs::write(dir.path().join("sales/orders.csv"), "id,item\n1,a\n").unwrap();
        let third = service.snapshot("sales", "orders").unwrap();
        assert_eq!(third.row_count(), 1);
        assert_eq!(first.row_count(), 5);
    }

    #[test]
    fn test_deleted_table_drops_snapshot() {
        let dir = sample_dir();
        let service = service_over(&dir, Settings::default());
        service.snapshot("sales", "orders").unwrap();
        assert_eq!(service.cached_tables(), 1);

        fs::remove_file(dir.path().join("sales/orders.csv")).unwrap();

        assert!(matches!(service.snapshot("sales", "orders"), Err(Error::NotFound(_))));
        assert_eq!(service.cached_tables(), 0);
    }

    #[test]
    fn test_snapshot_cache_disabled_rereads() {
        let dir = sample_dir();
        let service = service_over(&dir, Settings { snapshot_cache: false, ..Settings::default() });

        let first = service.snapshot("sales", "orders").unwrap();
        let second = service.snapshot("sales", "orders").unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(first, second);
    }
}
