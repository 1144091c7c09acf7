use crate::batch::page_to_record_batch;
use crate::error::{ClientError, Result};
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use std::collections::HashMap;
use std::sync::Arc;
use tabulon_common::wire::{PageRequest, PageResult, Splits, SplitsRequest};
use tabulon_common::TableMetadata;
use tracing::debug;

/// The connector operations a reader needs, whatever carries them.
#[async_trait]
pub trait PageService: Send + Sync {
    async fn table_metadata(&self, schema: &str, table: &str) -> Result<TableMetadata>;

    async fn plan_splits(&self, schema: &str, table: &str, request: &SplitsRequest) -> Result<Splits>;

    async fn read_page(&self, schema: &str, table: &str, split: &str, request: &PageRequest) -> Result<PageResult>;
}

/// Reads one table split by split, following continuation tokens.
pub struct SplitReader {
    fetcher: Arc<PageFetcher>,
}

struct PageFetcher {
    service: Arc<dyn PageService>,
    schema: String,
    table: String,
    column_names: Vec<String>,
    desired_columns: Option<Vec<String>>,
    parameters: HashMap<String, String>,
}

impl PageFetcher {
    async fn fetch(&self, split: &str, next_token: Option<String>) -> Result<(RecordBatch, Option<String>)> {
        let request = PageRequest {
            desired_columns: self.desired_columns.clone(),
            next_token,
            parameters: self.parameters.clone(),
        };
        let page = self.service.read_page(&self.schema, &self.table, split, &request).await?;
        debug!(
            schema = %self.schema,
            table = %self.table,
            split,
            rows = page.row_count,
            "page received"
        );
        let batch = page_to_record_batch(&page, &self.column_names)?;
        Ok((batch, page.next_token))
    }
}

impl SplitReader {
    /// Looks up the table and prepares a reader for `desired_columns`, or every
    /// column when `None`.
    pub async fn connect(
        service: Arc<dyn PageService>,
        schema: &str,
        table: &str,
        desired_columns: Option<Vec<String>>,
        parameters: HashMap<String, String>,
    ) -> Result<Self> {
        let metadata = service.table_metadata(schema, table).await?;
        let column_names = desired_columns.clone().unwrap_or_else(|| metadata.column_names());
        Ok(Self {
            fetcher: Arc::new(PageFetcher {
                service,
                schema: schema.to_string(),
                table: table.to_string(),
                column_names,
                desired_columns,
                parameters,
            }),
        })
    }

    /// Names of the columns every batch carries, in order.
    pub fn column_names(&self) -> &[String] {
        &self.fetcher.column_names
    }

    pub async fn splits(&self, request: &SplitsRequest) -> Result<Vec<String>> {
        let f = &self.fetcher;
        Ok(f.service.plan_splits(&f.schema, &f.table, request).await?.splits)
    }

    /// One batch per page of `split`; the stream ends after the page without a
    /// continuation token.
    pub fn read_split(&self, split: &str) -> BoxStream<'static, Result<RecordBatch>> {
        let fetcher = Arc::clone(&self.fetcher);
        let split = split.to_string();
        // `None` once the split is exhausted, `Some(token)` while pages remain.
        let start: Option<Option<String>> = Some(None);
        stream::try_unfold(start, move |state| {
            let fetcher = Arc::clone(&fetcher);
            let split = split.clone();
            async move {
                let Some(token) = state else {
                    return Ok::<_, ClientError>(None);
                };
                let (batch, next_token) = fetcher.fetch(&split, token.clone()).await?;
                if next_token.is_some() && next_token == token {
                    return Err(ClientError::Stalled { split, token: next_token.unwrap_or_default() });
                }
                Ok(Some((batch, next_token.map(Some))))
            }
        })
        .boxed()
    }

    /// Plans the table with `request` and reads every split in order.
    pub async fn read_table(&self, request: &SplitsRequest) -> Result<Vec<RecordBatch>> {
        let mut batches = Vec::new();
        for split in self.splits(request).await? {
            let mut pages: Vec<RecordBatch> = self.read_split(&split).try_collect().await?;
            batches.append(&mut pages);
        }
        Ok(batches)
    }
}
