use chrono::{Datelike, NaiveDate};
use core_config::RegistrationPolicy;
use validator::Validate;

use crate::models::{RegistrationInput, RejectionReason};

/// Whole years elapsed between `date_of_birth` and `today`.
///
/// The birthday counts as reached on the day itself. Someone born on
/// 29 February has not had their birthday on 28 February of a common year.
pub fn age_on(date_of_birth: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - date_of_birth.year();
    if (today.month(), today.day()) < (date_of_birth.month(), date_of_birth.day()) {
        age -= 1;
    }
    age
}

/// Check the field rules and the minimum age. Pure; consults nothing but its arguments.
pub fn validate_input(
    input: &RegistrationInput,
    today: NaiveDate,
    policy: &RegistrationPolicy,
) -> Result<(), RejectionReason> {
    input
        .validate()
        .map_err(|e| RejectionReason::InvalidInput(e.to_string()))?;

    let age = age_on(input.date_of_birth, today);
    if i64::from(age) < i64::from(policy.minimum_age) {
        return Err(RejectionReason::Underage {
            age,
            minimum: policy.minimum_age,
        });
    }

    Ok(())
}
