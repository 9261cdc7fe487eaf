//! Persistence seam for worker records.

use async_trait::async_trait;
use chrono::Utc;
use std::fmt;
use std::sync::RwLock;
use uuid::Uuid;

use crate::models::WorkerRecord;
use crate::query::{WorkerFilter, WorkerQuery};
use crate::validation::{NewWorker, WorkerChanges};

/// Failures reported by a [`WorkerStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A unique field already holds this value.
    DuplicateKey { field: String, value: String },
    /// The backend cannot be reached right now.
    Unavailable(String),
    /// Any other backend failure.
    Backend(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::DuplicateKey { field, value } => {
                write!(f, "duplicate {}: {}", field, value)
            }
            StoreError::Unavailable(msg) => write!(f, "store unavailable: {}", msg),
            StoreError::Backend(msg) => write!(f, "store error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

/// The worker collection. Implementations enforce email uniqueness and keep
/// every single-record write atomic.
#[async_trait]
pub trait WorkerStore: Send + Sync {
    /// Records matching the query's filter, sorted and paginated.
    async fn find(&self, query: &WorkerQuery) -> Result<Vec<WorkerRecord>, StoreError>;

    /// Count of records matching the filter, ignoring pagination.
    async fn count(&self, filter: &WorkerFilter) -> Result<u64, StoreError>;

    /// Persists a validated worker, assigning identity and timestamps.
    async fn insert(&self, worker: NewWorker) -> Result<WorkerRecord, StoreError>;

    async fn get(&self, id: &str) -> Result<Option<WorkerRecord>, StoreError>;

    /// Applies changes to an existing record. `Ok(None)` when the id is unknown.
    async fn update(
        &self,
        id: &str,
        changes: WorkerChanges,
    ) -> Result<Option<WorkerRecord>, StoreError>;
}

/// Process-local store backed by a vector in insertion order.
#[derive(Default)]
pub struct InMemoryWorkerStore {
    records: RwLock<Vec<WorkerRecord>>,
}

impl InMemoryWorkerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|records| records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Unavailable("in-memory store lock poisoned".to_string())
}

fn duplicate_email(email: &str) -> StoreError {
    StoreError::DuplicateKey {
        field: "email".to_string(),
        value: email.to_string(),
    }
}

#[async_trait]
impl WorkerStore for InMemoryWorkerStore {
    async fn find(&self, query: &WorkerQuery) -> Result<Vec<WorkerRecord>, StoreError> {
        let records = self.records.read().map_err(poisoned)?;
        let mut matching: Vec<&WorkerRecord> = records
            .iter()
            .filter(|record| query.filter.matches(record))
            .collect();
        // Stable sort: ties keep insertion order.
        matching.sort_by(|a, b| query.compare(a, b));

        let offset = usize::try_from(query.offset()).unwrap_or(usize::MAX);
        Ok(matching
            .into_iter()
            .skip(offset)
            .take(query.limit as usize)
            .cloned()
            .collect())
    }

    async fn count(&self, filter: &WorkerFilter) -> Result<u64, StoreError> {
        let records = self.records.read().map_err(poisoned)?;
        Ok(records.iter().filter(|record| filter.matches(record)).count() as u64)
    }

    async fn insert(&self, worker: NewWorker) -> Result<WorkerRecord, StoreError> {
        let mut records = self.records.write().map_err(poisoned)?;
        if records.iter().any(|record| record.email == worker.email) {
            return Err(duplicate_email(&worker.email));
        }
        let record = worker.into_record(Uuid::new_v4().to_string(), Utc::now());
        records.push(record.clone());
        Ok(record)
    }

    async fn get(&self, id: &str) -> Result<Option<WorkerRecord>, StoreError> {
        let records = self.records.read().map_err(poisoned)?;
        Ok(records.iter().find(|record| record.id == id).cloned())
    }

    async fn update(
        &self,
        id: &str,
        changes: WorkerChanges,
    ) -> Result<Option<WorkerRecord>, StoreError> {
        let mut records = self.records.write().map_err(poisoned)?;
        let Some(index) = records.iter().position(|record| record.id == id) else {
            return Ok(None);
        };
        if let Some(email) = changes.email.as_deref() {
            if records
                .iter()
                .any(|record| record.id != id && record.email == email)
            {
                return Err(duplicate_email(email));
            }
        }
        let record = &mut records[index];
        changes.apply(record, Utc::now());
        Ok(Some(record.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Role, SalaryType};
    use crate::models::{Documents, Location, Salary};
    use crate::query::SortOrder;

    fn worker(name: &str, role: Role, email: &str) -> NewWorker {
        NewWorker {
            name: name.to_string(),
            phone: "9800000000".to_string(),
            email: email.to_string(),
            role,
            experience: 2,
            location: Location {
                city: Some("Chennai".to_string()),
                ..Location::default()
            },
            languages: vec![],
            skills: vec![],
            salary: Salary {
                amount: 500.0,
                kind: SalaryType::Daily,
            },
            availability: None,
            documents: Documents::default(),
            rating: 0.0,
            verified: false,
        }
    }

    async fn seeded() -> InMemoryWorkerStore {
        let store = InMemoryWorkerStore::new();
        store
            .insert(worker("Raju", Role::Driver, "raju@example.com"))
            .await
            .unwrap();
        store
            .insert(worker("Asha", Role::Maid, "asha@example.com"))
            .await
            .unwrap();
        store
            .insert(worker("Meena", Role::Cook, "meena@example.com"))
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_insert_assigns_identity_and_rejects_duplicate_email() {
        let store = seeded().await;
        let err = store
            .insert(worker("Other", Role::Nanny, "asha@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey { ref field, .. } if field == "email"));
        assert_eq!(store.len(), 3);
    }

    #[tokio::test]
    async fn test_find_sorts_and_paginates() {
        let store = seeded().await;
        let query = WorkerQuery {
            limit: 2,
            ..WorkerQuery::default()
        };
        let names: Vec<String> = store
            .find(&query)
            .await
            .unwrap()
            .into_iter()
            .map(|w| w.name)
            .collect();
        assert_eq!(names, vec!["Asha", "Meena"]);

        let second = WorkerQuery {
            page: 2,
            limit: 2,
            order: SortOrder::Asc,
            ..WorkerQuery::default()
        };
        let page = store.find(&second).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].name, "Raju");
    }

    #[tokio::test]
    async fn test_count_ignores_pagination() {
        let store = seeded().await;
        let filter = WorkerFilter {
            search: Some("A".to_string()),
            role: None,
        };
        // Every seeded name contains an "a".
        assert_eq!(store.count(&filter).await.unwrap(), 3);
        assert_eq!(store.count(&WorkerFilter::default()).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_update_unknown_id_returns_none() {
        let store = seeded().await;
        let mut any = store.find(&WorkerQuery::default()).await.unwrap();
        let record = any.remove(0);
        let changes = WorkerChanges {
            name: record.name.clone(),
            role: record.role,
            location: record.location.clone(),
            salary: record.salary,
            phone: None,
            email: None,
            experience: Some(9),
            languages: None,
            skills: None,
            availability: None,
            documents: None,
            rating: None,
            verified: Some(true),
        };
        assert!(store.update("missing", changes.clone()).await.unwrap().is_none());

        let updated = store.update(&record.id, changes).await.unwrap().unwrap();
        assert_eq!(updated.experience, 9);
        assert!(updated.verified);
        assert_eq!(updated.created_at, record.created_at);
        assert!(updated.updated_at >= record.updated_at);
    }

    #[tokio::test]
    async fn test_update_cannot_steal_another_email() {
        let store = seeded().await;
        let records = store.find(&WorkerQuery::default()).await.unwrap();
        let asha = &records[0];
        let changes = WorkerChanges {
            name: asha.name.clone(),
            role: asha.role,
            location: asha.location.clone(),
            salary: asha.salary,
            phone: None,
            email: Some("raju@example.com".to_string()),
            experience: None,
            languages: None,
            skills: None,
            availability: None,
            documents: None,
            rating: None,
            verified: None,
        };
        // An unknown id is reported as missing before any email collision.
        assert_eq!(store.update("missing", changes.clone()).await, Ok(None));
        assert!(matches!(
            store.update(&asha.id, changes).await,
            Err(StoreError::DuplicateKey { .. })
        ));
        let unchanged = store.get(&asha.id).await.unwrap().unwrap();
        assert_eq!(unchanged.email, "asha@example.com");
    }
}
