use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{RegistrationError, RegistrationResult};
use crate::models::{CreditPolicy, User};

/// External scoring service returning a base credit limit for a person
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CreditLimitProvider: Send + Sync {
    async fn get_credit_limit(
        &self,
        last_name: &str,
        date_of_birth: NaiveDate,
    ) -> RegistrationResult<i32>;
}

/// Table-backed provider (for development/testing).
///
/// People without an entry get `default_limit`. Every query is counted.
#[derive(Debug, Default, Clone)]
pub struct InMemoryCreditLimitProvider {
    limits: Arc<RwLock<HashMap<(String, NaiveDate), i32>>>,
    default_limit: i32,
    queries: Arc<AtomicUsize>,
}

impl InMemoryCreditLimitProvider {
    pub fn new(default_limit: i32) -> Self {
        Self {
            default_limit,
            ..Self::default()
        }
    }

    pub async fn set_limit(&self, last_name: impl Into<String>, date_of_birth: NaiveDate, limit: i32) {
        self.limits
            .write()
            .await
            .insert((last_name.into(), date_of_birth), limit);
    }

    /// Number of `get_credit_limit` calls served so far
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl CreditLimitProvider for InMemoryCreditLimitProvider {
    async fn get_credit_limit(
        &self,
        last_name: &str,
        date_of_birth: NaiveDate,
    ) -> RegistrationResult<i32> {
        self.queries.fetch_add(1, Ordering::Relaxed);

        let limits = self.limits.read().await;
        Ok(limits
            .get(&(last_name.to_string(), date_of_birth))
            .copied()
            .unwrap_or(self.default_limit))
    }
}

/// Apply the tier's credit policy to `user`.
///
/// Unlimited tiers never reach the provider. Limited tiers query it exactly
/// once and scale the base limit by the tier multiplier.
pub async fn determine_credit_limit<P>(provider: &P, user: &mut User) -> RegistrationResult<()>
where
    P: CreditLimitProvider + ?Sized,
{
    let tier = user.client.tier();

    match tier.credit_policy() {
        CreditPolicy::Unlimited => {
            user.clear_credit_limit();
            debug!(%tier, "No credit limit for tier");
        }
        CreditPolicy::Limited { multiplier } => {
            let base = provider
                .get_credit_limit(&user.last_name, user.date_of_birth)
                .await?;

            let credit_limit = base.checked_mul(multiplier).ok_or_else(|| {
                RegistrationError::CreditProvider(format!(
                    "base limit {} overflows with multiplier {}",
                    base, multiplier
                ))
            })?;

            user.set_credit_limit(credit_limit);
            debug!(%tier, base, multiplier, credit_limit, "Credit limit determined");
        }
    }

    Ok(())
}
