//! Input checks applied to drafts and patches before anything reaches the store.

use regex::Regex;
use std::collections::HashSet;
use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};

use crate::catalog::{Availability, Language, Role, SalaryType};
use crate::models::{Documents, Location, Salary, SalaryInput, WorkerDraft, WorkerPatch, WorkerRecord};

/// Message returned whenever one of the four required fields is absent.
pub const REQUIRED_FIELDS_MESSAGE: &str = "Please provide all required fields.";

/// Rejected input, carrying a message safe to show to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError(pub String);

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ValidationError {}

impl From<crate::catalog::UnknownOption> for ValidationError {
    fn from(err: crate::catalog::UnknownOption) -> Self {
        ValidationError(err.to_string())
    }
}

/// A draft that passed validation and is ready to be persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewWorker {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub role: Role,
    pub experience: u32,
    pub location: Location,
    pub languages: Vec<Language>,
    pub skills: Vec<String>,
    pub salary: Salary,
    pub availability: Option<Availability>,
    pub documents: Documents,
    pub rating: f64,
    pub verified: bool,
}

impl NewWorker {
    pub fn into_record(self, id: String, now: DateTime<Utc>) -> WorkerRecord {
        WorkerRecord {
            id,
            name: self.name,
            phone: self.phone,
            email: self.email,
            role: self.role,
            experience: self.experience,
            location: self.location,
            languages: self.languages,
            skills: self.skills,
            salary: self.salary,
            availability: self.availability,
            documents: self.documents,
            rating: self.rating,
            verified: self.verified,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A validated patch. The four required fields are always present; the rest
/// are applied only when supplied.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerChanges {
    pub name: String,
    pub role: Role,
    pub location: Location,
    pub salary: Salary,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub experience: Option<u32>,
    pub languages: Option<Vec<Language>>,
    pub skills: Option<Vec<String>>,
    pub availability: Option<Availability>,
    pub documents: Option<Documents>,
    pub rating: Option<f64>,
    pub verified: Option<bool>,
}

impl WorkerChanges {
    pub fn apply(self, record: &mut WorkerRecord, now: DateTime<Utc>) {
        record.name = self.name;
        record.role = self.role;
        record.location = self.location;
        record.salary = self.salary;
        if let Some(phone) = self.phone {
            record.phone = phone;
        }
        if let Some(email) = self.email {
            record.email = email;
        }
        if let Some(experience) = self.experience {
            record.experience = experience;
        }
        if let Some(languages) = self.languages {
            record.languages = languages;
        }
        if let Some(skills) = self.skills {
            record.skills = skills;
        }
        if let Some(availability) = self.availability {
            record.availability = Some(availability);
        }
        if let Some(documents) = self.documents {
            record.documents = documents;
        }
        if let Some(rating) = self.rating {
            record.rating = rating;
        }
        if let Some(verified) = self.verified {
            record.verified = verified;
        }
        record.updated_at = now;
    }
}

/// Checks that name, role, location and salary are all present and non-empty.
///
/// Shared by create, update and the client-side apply form.
pub fn check_required(draft: &WorkerDraft) -> Result<(), ValidationError> {
    let name_ok = draft.name.as_deref().is_some_and(|name| !name.trim().is_empty());
    let role_ok = draft.role.as_deref().is_some_and(|role| !role.trim().is_empty());
    let location_ok = draft.location.as_ref().is_some_and(|location| !location.is_blank());
    let salary_ok = draft.salary.is_some();

    if name_ok && role_ok && location_ok && salary_ok {
        Ok(())
    } else {
        Err(ValidationError::new(REQUIRED_FIELDS_MESSAGE))
    }
}

/// Validates a full draft for creation.
pub fn validate_draft(draft: WorkerDraft) -> Result<NewWorker, ValidationError> {
    check_required(&draft)?;
    let required = validate_required_fields(&draft)?;

    let phone = required_text(draft.phone, "phone")?;
    let email = required_text(draft.email, "email")?;
    validate_email(&email)?;
    let experience = match draft.experience {
        Some(years) => validate_experience(years)?,
        None => return Err(ValidationError::new("experience is required")),
    };

    Ok(NewWorker {
        name: required.name,
        phone,
        email,
        role: required.role,
        experience,
        location: required.location,
        languages: parse_languages(draft.languages.unwrap_or_default())?,
        skills: draft.skills.unwrap_or_default(),
        salary: required.salary,
        availability: parse_availability(draft.availability)?,
        documents: draft.documents.unwrap_or_default(),
        rating: validate_rating(draft.rating.unwrap_or(0.0))?,
        verified: draft.verified.unwrap_or(false),
    })
}

/// Validates a patch. The required-field rule of creation applies here too,
/// so a patch has to restate name, role, location and salary.
pub fn validate_patch(patch: WorkerPatch) -> Result<WorkerChanges, ValidationError> {
    check_required(&patch)?;
    let required = validate_required_fields(&patch)?;

    let phone = patch
        .phone
        .map(|phone| required_text(Some(phone), "phone"))
        .transpose()?;
    let email = patch
        .email
        .map(|email| {
            let email = required_text(Some(email), "email")?;
            validate_email(&email)?;
            Ok::<_, ValidationError>(email)
        })
        .transpose()?;

    Ok(WorkerChanges {
        name: required.name,
        role: required.role,
        location: required.location,
        salary: required.salary,
        phone,
        email,
        experience: patch.experience.map(validate_experience).transpose()?,
        languages: patch.languages.map(parse_languages).transpose()?,
        skills: patch.skills,
        availability: parse_availability(patch.availability)?,
        documents: patch.documents,
        rating: patch.rating.map(validate_rating).transpose()?,
        verified: patch.verified,
    })
}

/// Loose address shape check: something@domain.tld without whitespace.
pub fn is_valid_email(email: &str) -> bool {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok())
        .as_ref()
        .is_some_and(|regex| regex.is_match(email))
}

struct RequiredFields {
    name: String,
    role: Role,
    location: Location,
    salary: Salary,
}

fn validate_required_fields(draft: &WorkerDraft) -> Result<RequiredFields, ValidationError> {
    let (Some(name), Some(role), Some(location), Some(salary)) = (
        draft.name.as_ref(),
        draft.role.as_deref(),
        draft.location.as_ref(),
        draft.salary.as_ref(),
    ) else {
        return Err(ValidationError::new(REQUIRED_FIELDS_MESSAGE));
    };

    Ok(RequiredFields {
        name: name.clone(),
        role: role.parse()?,
        location: location.clone(),
        salary: validate_salary(salary)?,
    })
}

fn validate_salary(salary: &SalaryInput) -> Result<Salary, ValidationError> {
    let amount = salary
        .amount
        .ok_or_else(|| ValidationError::new("salary.amount is required"))?;
    if !amount.is_finite() || amount < 0.0 {
        return Err(ValidationError::new(
            "salary.amount must be a non-negative number",
        ));
    }
    let kind = salary
        .kind
        .as_deref()
        .ok_or_else(|| ValidationError::new("salary.type is required"))?
        .parse::<SalaryType>()?;

    Ok(Salary { amount, kind })
}

fn required_text(value: Option<String>, field: &str) -> Result<String, ValidationError> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(ValidationError::new(format!("{field} is required"))),
    }
}

fn validate_email(email: &str) -> Result<(), ValidationError> {
    if is_valid_email(email) {
        Ok(())
    } else {
        Err(ValidationError::new(format!("'{email}' is not a valid email address")))
    }
}

/// Largest experience the `workers.experience` INTEGER column can hold.
pub const MAX_EXPERIENCE_YEARS: u32 = i32::MAX as u32;

fn validate_experience(years: i64) -> Result<u32, ValidationError> {
    u32::try_from(years)
        .ok()
        .filter(|years| *years <= MAX_EXPERIENCE_YEARS)
        .ok_or_else(|| {
            ValidationError::new(format!(
                "experience must be an integer between 0 and {MAX_EXPERIENCE_YEARS}"
            ))
        })
}

fn validate_rating(rating: f64) -> Result<f64, ValidationError> {
    if rating.is_finite() {
        Ok(rating)
    } else {
        Err(ValidationError::new("rating must be a finite number"))
    }
}

/// Parses language labels, collapsing duplicates while keeping first-seen order.
fn parse_languages(labels: Vec<String>) -> Result<Vec<Language>, ValidationError> {
    let mut seen = HashSet::new();
    let mut languages = Vec::with_capacity(labels.len());
    for label in labels {
        let language: Language = label.parse()?;
        if seen.insert(language) {
            languages.push(language);
        }
    }
    Ok(languages)
}

fn parse_availability(value: Option<String>) -> Result<Option<Availability>, ValidationError> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(label) => Ok(Some(label.parse()?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> WorkerDraft {
        WorkerDraft {
            name: Some("Asha".to_string()),
            phone: Some("9800000001".to_string()),
            email: Some("asha@example.com".to_string()),
            role: Some("Maid".to_string()),
            experience: Some(4),
            location: Some(Location {
                city: Some("Pune".to_string()),
                state: Some("Maharashtra".to_string()),
                pincode: None,
            }),
            languages: Some(vec!["Hindi".to_string(), "Marathi".to_string()]),
            skills: Some(vec!["cleaning".to_string()]),
            salary: Some(SalaryInput {
                amount: Some(12000.0),
                kind: Some("Monthly".to_string()),
            }),
            availability: Some("Part-time".to_string()),
            ..WorkerDraft::default()
        }
    }

    #[test]
    fn test_valid_draft_defaults_rating_and_verified() {
        let worker = validate_draft(draft()).unwrap();
        assert_eq!(worker.role, Role::Maid);
        assert_eq!(worker.rating, 0.0);
        assert!(!worker.verified);
        assert_eq!(worker.availability, Some(Availability::PartTime));
    }

    #[test]
    fn test_missing_required_fields_use_shared_message() {
        let strips: [fn(&mut WorkerDraft); 4] = [
            |d| d.name = None,
            |d| d.role = Some("  ".to_string()),
            |d| d.location = None,
            |d| d.salary = None,
        ];
        for strip in strips {
            let mut candidate = draft();
            strip(&mut candidate);
            let err = validate_draft(candidate).unwrap_err();
            assert_eq!(err.message(), REQUIRED_FIELDS_MESSAGE);
        }
    }

    #[test]
    fn test_blank_location_counts_as_missing() {
        let mut candidate = draft();
        candidate.location = Some(Location::default());
        assert_eq!(
            validate_draft(candidate).unwrap_err().message(),
            REQUIRED_FIELDS_MESSAGE
        );
    }

    #[test]
    fn test_invalid_enum_values_are_rejected() {
        let mut candidate = draft();
        candidate.role = Some("Chef".to_string());
        assert!(validate_draft(candidate).unwrap_err().message().contains("Invalid role 'Chef'"));

        let mut candidate = draft();
        candidate.languages = Some(vec!["Klingon".to_string()]);
        assert!(validate_draft(candidate).unwrap_err().message().contains("language"));

        let mut candidate = draft();
        candidate.salary = Some(SalaryInput {
            amount: Some(10.0),
            kind: Some("Weekly".to_string()),
        });
        assert!(validate_draft(candidate).unwrap_err().message().contains("salary type"));
    }

    #[test]
    fn test_negative_experience_and_salary_rejected() {
        let mut candidate = draft();
        candidate.experience = Some(-1);
        assert!(validate_draft(candidate).is_err());

        let mut candidate = draft();
        candidate.experience = Some(i64::from(MAX_EXPERIENCE_YEARS) + 1);
        assert!(validate_draft(candidate).is_err());

        let mut candidate = draft();
        candidate.experience = Some(i64::from(MAX_EXPERIENCE_YEARS));
        assert!(validate_draft(candidate.clone()).is_ok());
        candidate.experience = Some(i64::from(u32::MAX));
        assert!(validate_patch(candidate).is_err());

        let mut candidate = draft();
        candidate.salary = Some(SalaryInput {
            amount: Some(-5.0),
            kind: Some("Daily".to_string()),
        });
        assert!(validate_draft(candidate).is_err());
    }

    #[test]
    fn test_skills_are_kept_as_submitted() {
        let submitted = vec![" Cooking ".to_string(), String::new(), "Ironing".to_string()];
        let mut candidate = draft();
        candidate.skills = Some(submitted.clone());
        assert_eq!(validate_draft(candidate.clone()).unwrap().skills, submitted);
        assert_eq!(validate_patch(candidate).unwrap().skills, Some(submitted));
    }

    #[test]
    fn test_languages_collapse_duplicates() {
        let mut candidate = draft();
        candidate.languages = Some(vec![
            "Tamil".to_string(),
            "Hindi".to_string(),
            "Tamil".to_string(),
        ]);
        let worker = validate_draft(candidate).unwrap();
        assert_eq!(worker.languages, vec![Language::Tamil, Language::Hindi]);
    }

    #[test]
    fn test_email_shape() {
        assert!(is_valid_email("a@b.co"));
        assert!(!is_valid_email("asha"));
        assert!(!is_valid_email("asha @example.com"));

        let mut candidate = draft();
        candidate.email = Some("not-an-email".to_string());
        assert!(validate_draft(candidate).is_err());
    }

    #[test]
    fn test_patch_requires_the_same_four_fields() {
        let patch = WorkerPatch {
            verified: Some(true),
            ..WorkerPatch::default()
        };
        assert_eq!(
            validate_patch(patch).unwrap_err().message(),
            REQUIRED_FIELDS_MESSAGE
        );
    }

    #[test]
    fn test_patch_leaves_unsupplied_fields_alone() {
        let mut patch = draft();
        patch.phone = None;
        patch.email = None;
        patch.experience = None;
        patch.languages = None;

        let changes = validate_patch(patch).unwrap();
        assert!(changes.phone.is_none());
        assert!(changes.languages.is_none());
        assert_eq!(changes.salary.kind, SalaryType::Monthly);
    }
}
