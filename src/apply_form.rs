//! Worker registration form.

use crate::catalog::{Availability, Language, Role, SalaryType, STATES};
use crate::client::WorkerRegistrar;
use crate::models::{Location, SalaryInput, WorkerDraft};
use crate::validation::{check_required, ValidationError};

pub const REGISTERED_MESSAGE: &str = "Registration successful! We will be in touch soon.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// User-visible outcome of a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }
}

/// Field values as typed into the form.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplyForm {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub role: String,
    pub experience: String,
    pub languages: Vec<Language>,
    /// Comma-separated.
    pub skills: String,
    pub salary_amount: String,
    pub salary_type: SalaryType,
    pub availability: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
}

impl Default for ApplyForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            phone: String::new(),
            email: String::new(),
            role: String::new(),
            experience: String::new(),
            languages: Vec::new(),
            skills: String::new(),
            salary_amount: String::new(),
            salary_type: SalaryType::Monthly,
            availability: String::new(),
            city: String::new(),
            state: String::new(),
            pincode: String::new(),
        }
    }
}

impl ApplyForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn role_options() -> &'static [&'static str] {
        Role::LABELS
    }

    pub fn language_options() -> &'static [&'static str] {
        Language::LABELS
    }

    pub fn salary_type_options() -> &'static [&'static str] {
        SalaryType::LABELS
    }

    pub fn availability_options() -> &'static [&'static str] {
        Availability::LABELS
    }

    pub fn state_options() -> &'static [&'static str] {
        STATES
    }

    pub fn set_name(&mut self, value: impl Into<String>) {
        self.name = value.into();
    }

    pub fn set_phone(&mut self, value: impl Into<String>) {
        self.phone = value.into();
    }

    pub fn set_email(&mut self, value: impl Into<String>) {
        self.email = value.into();
    }

    pub fn set_role(&mut self, value: impl Into<String>) {
        self.role = value.into();
    }

    pub fn set_experience(&mut self, value: impl Into<String>) {
        self.experience = value.into();
    }

    pub fn set_skills(&mut self, value: impl Into<String>) {
        self.skills = value.into();
    }

    pub fn set_salary(&mut self, amount: impl Into<String>, kind: SalaryType) {
        self.salary_amount = amount.into();
        self.salary_type = kind;
    }

    pub fn set_availability(&mut self, value: impl Into<String>) {
        self.availability = value.into();
    }

    pub fn set_location(
        &mut self,
        city: impl Into<String>,
        state: impl Into<String>,
        pincode: impl Into<String>,
    ) {
        self.city = city.into();
        self.state = state.into();
        self.pincode = pincode.into();
    }

    /// Adds the language if absent, removes it if present.
    pub fn toggle_language(&mut self, language: Language) {
        if let Some(pos) = self.languages.iter().position(|l| *l == language) {
            self.languages.remove(pos);
        } else {
            self.languages.push(language);
        }
    }

    /// Converts the typed values into a request body.
    ///
    /// Blank inputs become absent fields. Numbers that do not parse are
    /// reported here rather than sent.
    pub fn to_draft(&self) -> Result<WorkerDraft, ValidationError> {
        let experience = match self.experience.trim() {
            "" => None,
            raw => Some(raw.parse::<i64>().map_err(|_| {
                ValidationError::new("Experience must be a whole number of years")
            })?),
        };
        let salary = match self.salary_amount.trim() {
            "" => None,
            raw => Some(SalaryInput {
                amount: Some(
                    raw.parse::<f64>()
                        .map_err(|_| ValidationError::new("Salary amount must be a number"))?,
                ),
                kind: Some(self.salary_type.to_string()),
            }),
        };
        let location = Location {
            city: non_blank(&self.city),
            state: non_blank(&self.state),
            pincode: non_blank(&self.pincode),
        };
        let skills: Vec<String> = self
            .skills
            .split(',')
            .map(str::trim)
            .filter(|skill| !skill.is_empty())
            .map(str::to_string)
            .collect();

        Ok(WorkerDraft {
            name: non_blank(&self.name),
            phone: non_blank(&self.phone),
            email: non_blank(&self.email),
            role: non_blank(&self.role),
            experience,
            location: (!location.is_blank()).then_some(location),
            languages: Some(self.languages.iter().map(|l| l.to_string()).collect()),
            skills: Some(skills),
            salary,
            availability: non_blank(&self.availability),
            ..WorkerDraft::default()
        })
    }

    /// Prechecks, submits and reports. The form is cleared only on success.
    pub async fn submit(&mut self, registrar: &dyn WorkerRegistrar) -> Notice {
        let draft = match self.to_draft().and_then(|draft| {
            check_required(&draft)?;
            Ok(draft)
        }) {
            Ok(draft) => draft,
            Err(e) => return Notice::error(e.message()),
        };

        match registrar.register_worker(&draft).await {
            Ok(record) => {
                tracing::info!("Worker registered: {}", record.id);
                *self = Self::default();
                Notice::success(REGISTERED_MESSAGE)
            }
            Err(e) => {
                tracing::error!("Registration error: {}", e);
                Notice::error(e.user_message())
            }
        }
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
