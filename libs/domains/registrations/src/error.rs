use thiserror::Error;

/// Failures raised by collaborators during a registration attempt.
///
/// Business rejections (invalid input, credit below the floor) are not
/// errors; they are reported through [`crate::models::RegistrationOutcome`].
#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("Client not found: {0}")]
    ClientNotFound(i32),

    #[error("Credit limit provider error: {0}")]
    CreditProvider(String),

    #[error("Persistence error: {0}")]
    Persistence(String),
}

pub type RegistrationResult<T> = Result<T, RegistrationError>;
