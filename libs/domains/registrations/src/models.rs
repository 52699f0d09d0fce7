use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use strum::Display;
use thiserror::Error;
use uuid::Uuid;
use validator::Validate;

/// Accepts any address containing both '@' and '.'
fn validate_email_shape(email: &str) -> Result<(), validator::ValidationError> {
    if !email.contains('@') || !email.contains('.') {
        return Err(validator::ValidationError::new("invalid_email")
            .with_message("email must contain '@' and '.'".into()));
    }
    Ok(())
}

/// Client tier, derived from the freeform type label of a [`Client`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ClientTier {
    #[strum(to_string = "VeryImportantClient")]
    VeryImportant,
    #[strum(to_string = "ImportantClient")]
    Important,
    /// Every label that is not one of the named tiers
    #[strum(to_string = "OrdinaryClient")]
    Ordinary,
}

impl From<&str> for ClientTier {
    fn from(label: &str) -> Self {
        match label {
            "VeryImportantClient" => ClientTier::VeryImportant,
            "ImportantClient" => ClientTier::Important,
            _ => ClientTier::Ordinary,
        }
    }
}

/// How a user's credit limit is derived for a given tier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreditPolicy {
    /// No credit limit applies
    Unlimited,
    /// Provider base limit scaled by `multiplier`
    Limited { multiplier: i32 },
}

impl ClientTier {
    pub fn credit_policy(self) -> CreditPolicy {
        match self {
            ClientTier::VeryImportant => CreditPolicy::Unlimited,
            ClientTier::Important => CreditPolicy::Limited { multiplier: 2 },
            ClientTier::Ordinary => CreditPolicy::Limited { multiplier: 1 },
        }
    }
}

/// Client record owned by the client lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: i32,
    pub name: String,
    /// Tier label as stored, e.g. "ImportantClient"
    pub client_type: String,
}

impl Client {
    pub fn new(id: i32, name: impl Into<String>, client_type: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            client_type: client_type.into(),
        }
    }

    pub fn tier(&self) -> ClientTier {
        ClientTier::from(self.client_type.as_str())
    }
}

/// Raw registration request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegistrationInput {
    #[validate(length(min = 1, message = "first name must not be empty"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "last name must not be empty"))]
    pub last_name: String,
    #[validate(custom(function = "validate_email_shape"))]
    pub email: String,
    pub date_of_birth: NaiveDate,
    pub client_id: i32,
}

impl RegistrationInput {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        date_of_birth: NaiveDate,
        client_id: i32,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            date_of_birth,
            client_id,
        }
    }
}

/// Registered user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub date_of_birth: NaiveDate,
    /// Shared with the lookup and other users of the same client
    pub client: Arc<Client>,
    pub has_credit_limit: bool,
    /// Only meaningful when `has_credit_limit` is set
    pub credit_limit: i32,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Build a candidate user. No credit limit is set until one is determined.
    pub fn new(input: RegistrationInput, client: Arc<Client>) -> Self {
        Self {
            id: Uuid::now_v7(),
            first_name: input.first_name,
            last_name: input.last_name,
            email: input.email,
            date_of_birth: input.date_of_birth,
            client,
            has_credit_limit: false,
            credit_limit: 0,
            created_at: Utc::now(),
        }
    }

    pub fn set_credit_limit(&mut self, credit_limit: i32) {
        self.has_credit_limit = true;
        self.credit_limit = credit_limit;
    }

    pub fn clear_credit_limit(&mut self) {
        self.has_credit_limit = false;
        self.credit_limit = 0;
    }

    /// The credit limit, or `None` for users without one
    pub fn effective_credit_limit(&self) -> Option<i32> {
        self.has_credit_limit.then_some(self.credit_limit)
    }

    /// Users without a credit limit are never below the floor
    pub fn is_below_floor(&self, floor: i32) -> bool {
        self.effective_credit_limit()
            .is_some_and(|limit| limit < floor)
    }
}

/// Why a registration was turned down
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectionReason {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Applicant is {age} years old, minimum is {minimum}")]
    Underage { age: i32, minimum: u32 },

    #[error("Credit limit {credit_limit} is below the floor of {floor}")]
    CreditTooLow { credit_limit: i32, floor: i32 },
}

/// Result of a registration attempt that reached a decision
#[derive(Debug, Clone)]
pub enum RegistrationOutcome {
    Accepted(User),
    Rejected(RejectionReason),
}

impl RegistrationOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, RegistrationOutcome::Accepted(_))
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            RegistrationOutcome::Accepted(user) => Some(user),
            RegistrationOutcome::Rejected(_) => None,
        }
    }

    pub fn rejection(&self) -> Option<&RejectionReason> {
        match self {
            RegistrationOutcome::Accepted(_) => None,
            RegistrationOutcome::Rejected(reason) => Some(reason),
        }
    }
}
