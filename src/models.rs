use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::catalog::{Availability, Language, Role, SalaryType};

// ============ Stored Models ============

/// A registered domestic-service worker as persisted by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkerRecord {
    /// Store-assigned identifier.
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub phone: String,
    /// Unique across all records.
    pub email: String,
    pub role: Role,
    /// Years of experience.
    pub experience: u32,
    pub location: Location,
    pub languages: Vec<Language>,
    pub skills: Vec<String>,
    pub salary: Salary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability: Option<Availability>,
    #[serde(default)]
    pub documents: Documents,
    pub rating: f64,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Where a worker is based. Every part is optional free text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Location {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pincode: Option<String>,
}

impl Location {
    /// True when no part carries any non-whitespace text.
    pub fn is_blank(&self) -> bool {
        [&self.city, &self.state, &self.pincode]
            .iter()
            .all(|part| part.as_deref().map_or(true, |text| text.trim().is_empty()))
    }

    /// "City, State" with missing parts skipped.
    pub fn summary(&self) -> String {
        [&self.city, &self.state]
            .iter()
            .filter_map(|part| part.as_deref())
            .filter(|text| !text.trim().is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Quoted pay for a worker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Salary {
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: SalaryType,
}

/// References to uploaded verification artifacts. Opaque to this service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Documents {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aadhar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub police_verification: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

// ============ API Request/Response Models ============

/// Worker payload submitted by a client before the store assigns an identity.
///
/// Enumerated fields arrive as raw text so that bad labels are reported by the
/// validator with a readable message rather than rejected by the decoder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkerDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub languages: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skills: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary: Option<SalaryInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documents: Option<Documents>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
}

/// A partial update carries the same shape as a draft. Absent optional fields
/// leave the stored value untouched.
pub type WorkerPatch = WorkerDraft;

/// Unvalidated salary as submitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SalaryInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// Raw query string of `GET /api/workers`.
///
/// Kept as text so malformed numbers surface as validation errors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListWorkersParams {
    /// Case-insensitive substring matched against name or role.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    /// Exact role filter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// 1-based page number (default 1).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,
    /// Page size (default 10).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<String>,
    /// Sort field (default "name").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    /// "asc" or "desc" (default "asc").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<String>,
}

/// One page of the worker listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkerPage {
    pub data: Vec<WorkerRecord>,
    /// Matching records before pagination.
    pub total: u64,
    pub page: u32,
    pub total_pages: u64,
}

impl WorkerPage {
    pub fn new(data: Vec<WorkerRecord>, total: u64, page: u32, limit: u32) -> Self {
        Self {
            data,
            total,
            page,
            total_pages: total_pages(total, limit),
        }
    }
}

/// `ceil(total / limit)`; zero when nothing matches.
pub fn total_pages(total: u64, limit: u32) -> u64 {
    if limit == 0 {
        return 0;
    }
    total.div_ceil(u64::from(limit))
}

/// Uniform error body returned by every route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub message: String,
}
