use std::sync::Arc;

use crate::errors::{AppError, ResultExt};
use crate::models::{ListWorkersParams, WorkerDraft, WorkerPage, WorkerPatch, WorkerRecord};
use crate::query::WorkerQuery;
use crate::store::WorkerStore;
use crate::validation::{validate_draft, validate_patch};

/// Read/write interface over the worker collection used by the HTTP layer.
#[derive(Clone)]
pub struct WorkerService {
    store: Arc<dyn WorkerStore>,
    max_page_limit: u32,
}

impl WorkerService {
    /// Creates a new `WorkerService`.
    ///
    /// # Arguments
    ///
    /// * `store` - The record store to read from and write to.
    /// * `max_page_limit` - Largest `limit` a listing may request.
    pub fn new(store: Arc<dyn WorkerStore>, max_page_limit: u32) -> Self {
        Self {
            store,
            max_page_limit,
        }
    }

    /// Lists workers matching the search/role filters, sorted and paginated.
    ///
    /// `total` counts every match before pagination, so a page past the end
    /// comes back empty with the same total.
    pub async fn list(&self, params: &ListWorkersParams) -> Result<WorkerPage, AppError> {
        let query = WorkerQuery::from_params(params, self.max_page_limit)?;

        let data = self.store.find(&query).await.context("listing workers")?;
        let total = self
            .store
            .count(&query.filter)
            .await
            .context("counting workers")?;

        tracing::debug!(
            "Listed {} of {} workers (page {}, limit {})",
            data.len(),
            total,
            query.page,
            query.limit
        );

        Ok(WorkerPage::new(data, total, query.page, query.limit))
    }

    /// Validates and persists a new worker.
    pub async fn create(&self, draft: WorkerDraft) -> Result<WorkerRecord, AppError> {
        let worker = validate_draft(draft)?;
        let record = self
            .store
            .insert(worker)
            .await
            .context("creating worker")?;
        tracing::info!("Registered worker {} as {}", record.id, record.role);
        Ok(record)
    }

    pub async fn get(&self, id: &str) -> Result<WorkerRecord, AppError> {
        self.store
            .get(id)
            .await
            .with_context(|| format!("loading worker {}", id))?
            .ok_or_else(|| AppError::NotFound("Worker not found".to_string()))
    }

    /// Applies a patch. Validation runs before the lookup, so an invalid patch
    /// is rejected even when the id is unknown.
    pub async fn update(&self, id: &str, patch: WorkerPatch) -> Result<WorkerRecord, AppError> {
        let changes = validate_patch(patch)?;
        let record = self
            .store
            .update(id, changes)
            .await
            .with_context(|| format!("updating worker {}", id))?
            .ok_or_else(|| AppError::NotFound("Worker not found".to_string()))?;
        tracing::info!("Updated worker {}", record.id);
        Ok(record)
    }
}
