use async_trait::async_trait;
use chrono::{DateTime, Utc};
use failsafe::futures::CircuitBreaker;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use std::future::Future;
use uuid::Uuid;

use crate::catalog::{Availability, Language, Role};
use crate::circuit_breaker::{create_store_circuit_breaker, is_outage, StoreCircuitBreaker};
use crate::models::{Documents, Location, Salary, WorkerRecord};
use crate::query::{WorkerFilter, WorkerQuery};
use crate::store::{StoreError, WorkerStore};
use crate::validation::{NewWorker, WorkerChanges};

/// Row shape of the `workers` table.
#[derive(Debug, FromRow)]
struct WorkerRow {
    id: Uuid,
    name: String,
    phone: String,
    email: String,
    role: String,
    experience: i32,
    location: Json<Location>,
    languages: Json<Vec<Language>>,
    skills: Json<Vec<String>>,
    salary: Json<Salary>,
    availability: Option<String>,
    documents: Json<Documents>,
    rating: f64,
    verified: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<WorkerRow> for WorkerRecord {
    type Error = StoreError;

    fn try_from(row: WorkerRow) -> Result<Self, Self::Error> {
        let corrupt = |err: crate::catalog::UnknownOption| {
            StoreError::Backend(format!("worker {} holds {}", row.id, err))
        };
        let role = row.role.parse::<Role>().map_err(corrupt)?;
        let availability = row
            .availability
            .as_deref()
            .map(str::parse::<Availability>)
            .transpose()
            .map_err(corrupt)?;
        let experience = u32::try_from(row.experience).map_err(|_| {
            StoreError::Backend(format!("worker {} has negative experience", row.id))
        })?;

        Ok(WorkerRecord {
            id: row.id.to_string(),
            name: row.name,
            phone: row.phone,
            email: row.email,
            role,
            experience,
            location: row.location.0,
            languages: row.languages.0,
            skills: row.skills.0,
            salary: row.salary.0,
            availability,
            documents: row.documents.0,
            rating: row.rating,
            verified: row.verified,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// PostgreSQL-backed worker store.
///
/// Every round-trip passes through a circuit breaker so a dead database
/// turns into fast `Unavailable` errors instead of piling up pool waits.
pub struct PgWorkerStore {
    pool: PgPool,
    breaker: StoreCircuitBreaker,
}

impl PgWorkerStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            breaker: create_store_circuit_breaker(),
        }
    }

    async fn guarded<T, F>(&self, operation: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        match self.breaker.call_with(is_outage, operation).await {
            Ok(value) => Ok(value),
            Err(failsafe::Error::Rejected) => Err(StoreError::Unavailable(
                "circuit open after repeated database failures".to_string(),
            )),
            Err(failsafe::Error::Inner(err)) => Err(map_sqlx_error(err)),
        }
    }
}

/// Translates driver errors into store errors.
fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            tracing::debug!("Unique violation on {:?}", db_err.constraint());
            return StoreError::DuplicateKey {
                field: "email".to_string(),
                value: String::new(),
            };
        }
    }
    if is_outage(&err) {
        StoreError::Unavailable(err.to_string())
    } else {
        StoreError::Backend(err.to_string())
    }
}

/// Appends the WHERE clause for a filter.
fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &WorkerFilter) {
    builder.push(" WHERE TRUE");
    if let Some(search) = &filter.search {
        builder
            .push(" AND (strpos(lower(name), lower(")
            .push_bind(search.clone())
            .push(")) > 0 OR strpos(lower(role), lower(")
            .push_bind(search.clone())
            .push(")) > 0)");
    }
    if let Some(role) = filter.role {
        builder.push(" AND role = ").push_bind(role.as_str());
    }
}

#[async_trait]
impl WorkerStore for PgWorkerStore {
    async fn find(&self, query: &WorkerQuery) -> Result<Vec<WorkerRecord>, StoreError> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT * FROM workers");
        push_filter(&mut builder, &query.filter);
        // No tie-break: equal sort keys come back in whatever order Postgres picks.
        builder
            .push(" ORDER BY ")
            .push(query.sort.sql_expr())
            .push(" ")
            .push(query.order.as_sql());
        builder
            .push(" LIMIT ")
            .push_bind(i64::from(query.limit))
            .push(" OFFSET ")
            .push_bind(i64::try_from(query.offset()).unwrap_or(i64::MAX));

        let rows: Vec<WorkerRow> = self
            .guarded(builder.build_query_as::<WorkerRow>().fetch_all(&self.pool))
            .await?;
        rows.into_iter().map(WorkerRecord::try_from).collect()
    }

    async fn count(&self, filter: &WorkerFilter) -> Result<u64, StoreError> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM workers");
        push_filter(&mut builder, filter);

        let total: i64 = self
            .guarded(builder.build_query_scalar::<i64>().fetch_one(&self.pool))
            .await?;
        Ok(u64::try_from(total).unwrap_or(0))
    }

    async fn insert(&self, worker: NewWorker) -> Result<WorkerRecord, StoreError> {
        let now = Utc::now();
        let email = worker.email.clone();
        let experience = i32::try_from(worker.experience)
            .map_err(|_| StoreError::Backend("experience out of range".to_string()))?;

        let row: WorkerRow = self
            .guarded(
                sqlx::query_as::<_, WorkerRow>(
                    r#"
                    INSERT INTO workers (
                        id, name, phone, email, role, experience, location, languages,
                        skills, salary, availability, documents, rating, verified,
                        created_at, updated_at
                    )
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $15)
                    RETURNING *
                    "#,
                )
                .bind(Uuid::new_v4())
                .bind(&worker.name)
                .bind(&worker.phone)
                .bind(&worker.email)
                .bind(worker.role.as_str())
                .bind(experience)
                .bind(Json(&worker.location))
                .bind(Json(&worker.languages))
                .bind(Json(&worker.skills))
                .bind(Json(&worker.salary))
                .bind(worker.availability.map(|value| value.as_str()))
                .bind(Json(&worker.documents))
                .bind(worker.rating)
                .bind(worker.verified)
                .bind(now)
                .fetch_one(&self.pool),
            )
            .await
            .map_err(|err| with_email(err, &email))?;

        let record = WorkerRecord::try_from(row)?;
        tracing::info!("Stored worker {} ({})", record.id, record.role);
        Ok(record)
    }

    async fn get(&self, id: &str) -> Result<Option<WorkerRecord>, StoreError> {
        // Identities are UUIDs; anything else cannot exist.
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(None);
        };

        let row: Option<WorkerRow> = self
            .guarded(
                sqlx::query_as::<_, WorkerRow>("SELECT * FROM workers WHERE id = $1")
                    .bind(id)
                    .fetch_optional(&self.pool),
            )
            .await?;
        row.map(WorkerRecord::try_from).transpose()
    }

    async fn update(
        &self,
        id: &str,
        changes: WorkerChanges,
    ) -> Result<Option<WorkerRecord>, StoreError> {
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(None);
        };
        let email = changes.email.clone().unwrap_or_default();

        let mut builder = QueryBuilder::<Postgres>::new("UPDATE workers SET ");
        {
            let mut set = builder.separated(", ");
            set.push("name = ").push_bind_unseparated(changes.name);
            set.push("role = ")
                .push_bind_unseparated(changes.role.as_str());
            set.push("location = ")
                .push_bind_unseparated(Json(changes.location));
            set.push("salary = ").push_bind_unseparated(Json(changes.salary));
            if let Some(phone) = changes.phone {
                set.push("phone = ").push_bind_unseparated(phone);
            }
            if let Some(email) = changes.email {
                set.push("email = ").push_bind_unseparated(email);
            }
            if let Some(experience) = changes.experience {
                let experience = i32::try_from(experience)
                    .map_err(|_| StoreError::Backend("experience out of range".to_string()))?;
                set.push("experience = ").push_bind_unseparated(experience);
            }
            if let Some(languages) = changes.languages {
                set.push("languages = ").push_bind_unseparated(Json(languages));
            }
            if let Some(skills) = changes.skills {
                set.push("skills = ").push_bind_unseparated(Json(skills));
            }
            if let Some(availability) = changes.availability {
                set.push("availability = ")
                    .push_bind_unseparated(availability.as_str());
            }
            if let Some(documents) = changes.documents {
                set.push("documents = ").push_bind_unseparated(Json(documents));
            }
            if let Some(rating) = changes.rating {
                set.push("rating = ").push_bind_unseparated(rating);
            }
            if let Some(verified) = changes.verified {
                set.push("verified = ").push_bind_unseparated(verified);
            }
            set.push("updated_at = ").push_bind_unseparated(Utc::now());
        }
        builder.push(" WHERE id = ").push_bind(id).push(" RETURNING *");

        let row: Option<WorkerRow> = self
            .guarded(builder.build_query_as::<WorkerRow>().fetch_optional(&self.pool))
            .await
            .map_err(|err| with_email(err, &email))?;
        row.map(WorkerRecord::try_from).transpose()
    }
}

/// Fills in the colliding address on duplicate-key errors.
fn with_email(err: StoreError, email: &str) -> StoreError {
    match err {
        StoreError::DuplicateKey { field, .. } => StoreError::DuplicateKey {
            field,
            value: email.to_string(),
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_sql_binds_search_twice() {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM workers");
        push_filter(
            &mut builder,
            &WorkerFilter {
                search: Some("ash".to_string()),
                role: Some(crate::catalog::Role::Maid),
            },
        );
        assert_eq!(
            builder.sql(),
            "SELECT COUNT(*) FROM workers WHERE TRUE AND (strpos(lower(name), lower($1)) > 0 \
             OR strpos(lower(role), lower($2)) > 0) AND role = $3"
        );
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM workers");
        push_filter(&mut builder, &WorkerFilter::default());
        assert_eq!(builder.sql(), "SELECT COUNT(*) FROM workers WHERE TRUE");
    }

    #[test]
    fn test_pool_errors_are_outages() {
        assert!(matches!(
            map_sqlx_error(sqlx::Error::PoolTimedOut),
            StoreError::Unavailable(_)
        ));
        assert!(matches!(
            map_sqlx_error(sqlx::Error::RowNotFound),
            StoreError::Backend(_)
        ));
    }
}
