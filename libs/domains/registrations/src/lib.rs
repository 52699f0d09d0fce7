//! Registrations Domain
//!
//! Validates and registers new users, applying age and email rules and a
//! tier-dependent credit limit before handing the user to persistence.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────┐
//! │ UserRegistrationService  │  ← Orchestration, minimum-limit policy
//! └──────┬─────────┬─────────┘
//!        │         │
//! ┌──────▼──────┐ ┌▼──────────────────┐
//! │ Validation  │ │ Credit (tier →    │  ← Pure rules / provider query
//! └─────────────┘ │ limit)            │
//!                 └───────────────────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Client lookup + user sink (traits + in-memory impls)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Client, ClientTier, User, outcomes
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use chrono::NaiveDate;
//! use domain_registrations::{
//!     Client, InMemoryClientRepository, InMemoryCreditLimitProvider, InMemoryUserRepository,
//!     UserRegistrationService,
//! };
//!
//! # async fn demo() -> domain_registrations::RegistrationResult<()> {
//! let clients = InMemoryClientRepository::with_clients([
//!     Client::new(1, "Acme", "ImportantClient"),
//! ]);
//! let service = UserRegistrationService::new(
//!     clients,
//!     InMemoryCreditLimitProvider::new(300),
//!     InMemoryUserRepository::new(),
//! );
//!
//! let dob = NaiveDate::from_ymd_opt(1990, 4, 1).unwrap();
//! let accepted = service.add_user("John", "Doe", "john@doe.com", dob, 1).await?;
//! # Ok(())
//! # }
//! ```

pub mod clock;
pub mod credit;
pub mod error;
pub mod models;
pub mod repository;
pub mod service;
pub mod validation;

// Re-export commonly used types
pub use clock::{Clock, FixedClock, SystemClock};
pub use core_config::RegistrationPolicy;
pub use credit::{CreditLimitProvider, InMemoryCreditLimitProvider, determine_credit_limit};
pub use error::{RegistrationError, RegistrationResult};
pub use models::{
    Client, ClientTier, CreditPolicy, RegistrationInput, RegistrationOutcome, RejectionReason,
    User,
};
pub use repository::{
    ClientRepository, InMemoryClientRepository, InMemoryUserRepository, UserRepository,
};
pub use service::UserRegistrationService;
pub use validation::{age_on, validate_input};
