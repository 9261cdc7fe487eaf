//! Listing query: parameter parsing, the shared match predicate and sort keys.

use std::cmp::Ordering;

use crate::catalog::Role;
use crate::models::{ListWorkersParams, WorkerRecord};
use crate::validation::ValidationError;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;

/// Search and role conditions of a listing, ANDed together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerFilter {
    /// Case-insensitive substring matched against name or role label.
    pub search: Option<String>,
    pub role: Option<Role>,
}

impl WorkerFilter {
    /// Whitespace-only search text means no search. Any other text is matched
    /// as given, surrounding spaces included.
    pub fn new(search: Option<&str>, role: Option<Role>) -> Self {
        Self {
            search: search
                .filter(|text| !text.trim().is_empty())
                .map(str::to_string),
            role,
        }
    }

    /// The one match rule used by the in-memory store and the client view.
    pub fn matches(&self, worker: &WorkerRecord) -> bool {
        let search_ok = match self.search.as_deref() {
            None => true,
            Some(needle) => {
                let needle = needle.to_lowercase();
                worker.name.to_lowercase().contains(&needle)
                    || worker.role.as_str().to_lowercase().contains(&needle)
            }
        };
        let role_ok = self.role.map_or(true, |role| worker.role == role);
        search_ok && role_ok
    }

    pub fn is_empty(&self) -> bool {
        self.search.is_none() && self.role.is_none()
    }
}

/// Fields a listing can be ordered by, named as on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    Name,
    Email,
    Phone,
    Role,
    Experience,
    Rating,
    Verified,
    Availability,
    SalaryAmount,
    City,
    State,
    Pincode,
    CreatedAt,
    UpdatedAt,
}

impl SortField {
    const ALL: &'static [SortField] = &[
        SortField::Name,
        SortField::Email,
        SortField::Phone,
        SortField::Role,
        SortField::Experience,
        SortField::Rating,
        SortField::Verified,
        SortField::Availability,
        SortField::SalaryAmount,
        SortField::City,
        SortField::State,
        SortField::Pincode,
        SortField::CreatedAt,
        SortField::UpdatedAt,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Name => "name",
            SortField::Email => "email",
            SortField::Phone => "phone",
            SortField::Role => "role",
            SortField::Experience => "experience",
            SortField::Rating => "rating",
            SortField::Verified => "verified",
            SortField::Availability => "availability",
            SortField::SalaryAmount => "salary.amount",
            SortField::City => "location.city",
            SortField::State => "location.state",
            SortField::Pincode => "location.pincode",
            SortField::CreatedAt => "createdAt",
            SortField::UpdatedAt => "updatedAt",
        }
    }

    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        SortField::ALL
            .iter()
            .copied()
            .find(|field| field.as_str() == value)
            .ok_or_else(|| {
                let names: Vec<&str> = SortField::ALL.iter().map(SortField::as_str).collect();
                ValidationError::new(format!(
                    "Invalid sortBy '{}'. Expected one of: {}",
                    value,
                    names.join(", ")
                ))
            })
    }

    /// SQL expression producing the sort key for this field.
    ///
    /// Text keys use the "C" collation so the database orders them bytewise,
    /// matching [`SortField::compare`].
    pub fn sql_expr(&self) -> &'static str {
        match self {
            SortField::Name => "name COLLATE \"C\"",
            SortField::Email => "email COLLATE \"C\"",
            SortField::Phone => "phone COLLATE \"C\"",
            SortField::Role => "role COLLATE \"C\"",
            SortField::Experience => "experience",
            SortField::Rating => "rating",
            SortField::Verified => "verified",
            SortField::Availability => "availability COLLATE \"C\"",
            SortField::SalaryAmount => "(salary->>'amount')::double precision",
            SortField::City => "(location->>'city') COLLATE \"C\"",
            SortField::State => "(location->>'state') COLLATE \"C\"",
            SortField::Pincode => "(location->>'pincode') COLLATE \"C\"",
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
        }
    }

    /// Ascending comparison of two records on this field. Missing values
    /// sort before present ones.
    pub fn compare(&self, a: &WorkerRecord, b: &WorkerRecord) -> Ordering {
        match self {
            SortField::Name => a.name.cmp(&b.name),
            SortField::Email => a.email.cmp(&b.email),
            SortField::Phone => a.phone.cmp(&b.phone),
            SortField::Role => a.role.as_str().cmp(b.role.as_str()),
            SortField::Experience => a.experience.cmp(&b.experience),
            SortField::Rating => a.rating.total_cmp(&b.rating),
            SortField::Verified => a.verified.cmp(&b.verified),
            SortField::Availability => a
                .availability
                .map(|value| value.as_str())
                .cmp(&b.availability.map(|value| value.as_str())),
            SortField::SalaryAmount => a.salary.amount.total_cmp(&b.salary.amount),
            SortField::City => a.location.city.cmp(&b.location.city),
            SortField::State => a.location.state.cmp(&b.location.state),
            SortField::Pincode => a.location.pincode.cmp(&b.location.pincode),
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        match value.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(ValidationError::new(format!(
                "Invalid order '{value}'. Expected 'asc' or 'desc'"
            ))),
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC NULLS FIRST",
            SortOrder::Desc => "DESC NULLS LAST",
        }
    }
}

/// A parsed, validated listing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerQuery {
    pub filter: WorkerFilter,
    pub page: u32,
    pub limit: u32,
    pub sort: SortField,
    pub order: SortOrder,
}

impl Default for WorkerQuery {
    fn default() -> Self {
        Self {
            filter: WorkerFilter::default(),
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            sort: SortField::default(),
            order: SortOrder::default(),
        }
    }
}

impl WorkerQuery {
    /// Parses raw query parameters. Blank values fall back to defaults.
    pub fn from_params(params: &ListWorkersParams, max_limit: u32) -> Result<Self, ValidationError> {
        let role = non_blank(&params.role)
            .map(|label| label.parse::<Role>())
            .transpose()?;
        let page = match non_blank(&params.page) {
            Some(raw) => parse_positive(raw, "page")?,
            None => DEFAULT_PAGE,
        };
        let limit = match non_blank(&params.limit) {
            Some(raw) => parse_positive(raw, "limit")?,
            None => DEFAULT_LIMIT,
        };
        if limit > max_limit {
            return Err(ValidationError::new(format!(
                "limit must not exceed {max_limit}"
            )));
        }
        let sort = match non_blank(&params.sort_by) {
            Some(raw) => SortField::parse(raw)?,
            None => SortField::default(),
        };
        let order = match non_blank(&params.order) {
            Some(raw) => SortOrder::parse(raw)?,
            None => SortOrder::default(),
        };

        Ok(Self {
            filter: WorkerFilter::new(params.search.as_deref(), role),
            page,
            limit,
            sort,
            order,
        })
    }

    /// Number of records skipped before this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }

    /// Full ordering for this query, direction included.
    pub fn compare(&self, a: &WorkerRecord, b: &WorkerRecord) -> Ordering {
        let ordering = self.sort.compare(a, b);
        match self.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|text| !text.is_empty())
}

fn parse_positive(raw: &str, field: &str) -> Result<u32, ValidationError> {
    match raw.parse::<u32>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(ValidationError::new(format!(
            "{field} must be a positive integer, got '{raw}'"
        ))),
    }
}
