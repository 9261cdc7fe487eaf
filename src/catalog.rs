//! Fixed option sets shared by validation, storage and presentation.
//!
//! Every enumeration a worker record can carry is declared here exactly once.
//! The server validates against these lists, the store persists their labels,
//! and the apply form and `/api/catalog/options` render them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Raised when a label is not a member of its option set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownOption {
    /// Human-readable name of the option set (e.g. "role").
    pub kind: &'static str,
    /// The rejected value.
    pub value: String,
    /// Accepted labels.
    pub expected: &'static [&'static str],
}

impl fmt::Display for UnknownOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid {} '{}'. Expected one of: {}",
            self.kind,
            self.value,
            self.expected.join(", ")
        )
    }
}

impl std::error::Error for UnknownOption {}

macro_rules! option_set {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $($variant:ident => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            /// Every member, in presentation order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Every label, in presentation order.
            pub const LABELS: &'static [&'static str] = &[$($label),+];

            /// The label used on the wire and in storage.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownOption;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value {
                    $($label => Ok($name::$variant),)+
                    _ => Err(UnknownOption {
                        kind: $kind,
                        value: value.to_string(),
                        expected: $name::LABELS,
                    }),
                }
            }
        }
    };
}

option_set! {
    /// Kind of domestic service a worker offers.
    Role, "role" {
        Cook => "Cook",
        Maid => "Maid",
        Driver => "Driver",
        Nanny => "Nanny",
        Gardener => "Gardener",
        ElderCare => "Elder Care",
    }
}

option_set! {
    /// Languages a worker can list.
    Language, "language" {
        Hindi => "Hindi",
        English => "English",
        Tamil => "Tamil",
        Telugu => "Telugu",
        Bengali => "Bengali",
        Marathi => "Marathi",
        Gujarati => "Gujarati",
        Kannada => "Kannada",
        Malayalam => "Malayalam",
    }
}

option_set! {
    /// Billing period of the quoted salary.
    SalaryType, "salary type" {
        Monthly => "Monthly",
        Daily => "Daily",
        Hourly => "Hourly",
    }
}

option_set! {
    Availability, "availability" {
        FullTime => "Full-time",
        PartTime => "Part-time",
        LiveIn => "Live-in",
    }
}

/// States offered by the apply form. Stored locations are free text, so this
/// list only drives presentation.
pub const STATES: &[&str] = &["Maharashtra", "Delhi", "Karnataka", "Tamil Nadu"];

/// All option sets in one payload, served to presentation layers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CatalogOptions {
    pub roles: Vec<String>,
    pub languages: Vec<String>,
    pub salary_types: Vec<String>,
    pub availability: Vec<String>,
    pub states: Vec<String>,
}

impl CatalogOptions {
    pub fn current() -> Self {
        fn owned(labels: &[&str]) -> Vec<String> {
            labels.iter().map(|label| label.to_string()).collect()
        }

        Self {
            roles: owned(Role::LABELS),
            languages: owned(Language::LABELS),
            salary_types: owned(SalaryType::LABELS),
            availability: owned(Availability::LABELS),
            states: owned(STATES),
        }
    }
}
