use chrono::NaiveDate;
use core_config::{ConfigError, FromEnv, RegistrationPolicy};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::clock::{Clock, SystemClock};
use crate::credit::{CreditLimitProvider, InMemoryCreditLimitProvider, determine_credit_limit};
use crate::error::{RegistrationError, RegistrationResult};
use crate::models::{RegistrationInput, RegistrationOutcome, RejectionReason, User};
use crate::repository::{
    ClientRepository, InMemoryClientRepository, InMemoryUserRepository, UserRepository,
};
use crate::validation::validate_input;

/// Registers users after checking eligibility and credit.
///
/// Holds no per-registration state; clones share the same collaborators.
#[derive(Clone)]
pub struct UserRegistrationService<C, P, U>
where
    C: ClientRepository,
    P: CreditLimitProvider,
    U: UserRepository,
{
    clients: Arc<C>,
    credit_provider: Arc<P>,
    users: Arc<U>,
    policy: RegistrationPolicy,
    clock: Arc<dyn Clock>,
}

impl<C, P, U> UserRegistrationService<C, P, U>
where
    C: ClientRepository,
    P: CreditLimitProvider,
    U: UserRepository,
{
    pub fn new(clients: C, credit_provider: P, users: U) -> Self {
        Self {
            clients: Arc::new(clients),
            credit_provider: Arc::new(credit_provider),
            users: Arc::new(users),
            policy: RegistrationPolicy::default(),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_policy(mut self, policy: RegistrationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn policy(&self) -> &RegistrationPolicy {
        &self.policy
    }

    pub fn clients(&self) -> &C {
        &self.clients
    }

    pub fn credit_provider(&self) -> &P {
        &self.credit_provider
    }

    pub fn users(&self) -> &U {
        &self.users
    }

    /// Register a user, reporting only whether it was accepted.
    ///
    /// Rejections yield `Ok(false)`; collaborator failures are returned as errors.
    #[instrument(skip_all, fields(client_id = client_id))]
    pub async fn add_user(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
        date_of_birth: NaiveDate,
        client_id: i32,
    ) -> RegistrationResult<bool> {
        let input = RegistrationInput::new(first_name, last_name, email, date_of_birth, client_id);
        let outcome = self.register(input).await?;
        Ok(outcome.is_accepted())
    }

    /// Register a user and report the decision with its reason
    #[instrument(skip(self, input), fields(client_id = input.client_id))]
    pub async fn register(&self, input: RegistrationInput) -> RegistrationResult<RegistrationOutcome> {
        let today = self.clock.today();

        if let Err(reason) = validate_input(&input, today, &self.policy) {
            debug!(%reason, "Registration rejected");
            return Ok(RegistrationOutcome::Rejected(reason));
        }

        let client_id = input.client_id;
        let client = self
            .clients
            .get_by_id(client_id)
            .await?
            .ok_or(RegistrationError::ClientNotFound(client_id))?;

        let mut user = User::new(input, Arc::new(client));
        determine_credit_limit(self.credit_provider.as_ref(), &mut user).await?;

        let floor = self.policy.credit_limit_floor;
        if user.is_below_floor(floor) {
            let reason = RejectionReason::CreditTooLow {
                credit_limit: user.credit_limit,
                floor,
            };
            warn!(%reason, "Registration rejected");
            return Ok(RegistrationOutcome::Rejected(reason));
        }

        self.users.create(user.clone()).await?;

        info!(
            user_id = %user.id,
            tier = %user.client.tier(),
            credit_limit = ?user.effective_credit_limit(),
            "User registered"
        );
        Ok(RegistrationOutcome::Accepted(user))
    }
}

impl UserRegistrationService<InMemoryClientRepository, InMemoryCreditLimitProvider, InMemoryUserRepository> {
    /// Service backed by the in-memory collaborators with the default policy
    pub fn with_defaults() -> Self {
        Self::new(
            InMemoryClientRepository::new(),
            InMemoryCreditLimitProvider::default(),
            InMemoryUserRepository::new(),
        )
    }

    /// In-memory service with the policy read from the environment
    pub fn from_env() -> Result<Self, ConfigError> {
        let policy = RegistrationPolicy::from_env()?;
        Ok(Self::with_defaults().with_policy(policy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::credit::MockCreditLimitProvider;
    use crate::models::Client;
    use crate::repository::{MockClientRepository, MockUserRepository};
    use mockall::predicate::eq;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    fn adult_dob() -> NaiveDate {
        NaiveDate::from_ymd_opt(2000, 6, 15).unwrap()
    }

    fn client_repo(client_type: &'static str) -> MockClientRepository {
        let mut repo = MockClientRepository::new();
        repo.expect_get_by_id()
            .with(eq(1))
            .times(1)
            .returning(move |id| Ok(Some(Client::new(id, "Acme", client_type))));
        repo
    }

    fn provider_returning(base: i32) -> MockCreditLimitProvider {
        let mut provider = MockCreditLimitProvider::new();
        provider
            .expect_get_credit_limit()
            .times(1)
            .returning(move |_, _| Ok(base));
        provider
    }

    fn service(
        clients: MockClientRepository,
        provider: MockCreditLimitProvider,
        users: MockUserRepository,
    ) -> UserRegistrationService<MockClientRepository, MockCreditLimitProvider, MockUserRepository>
    {
        UserRegistrationService::new(clients, provider, users).with_clock(FixedClock(today()))
    }

    fn sink_expecting(times: usize) -> MockUserRepository {
        let mut users = MockUserRepository::new();
        users.expect_create().times(times).returning(Ok);
        users
    }

    #[tokio::test]
    async fn test_invalid_input_touches_no_collaborator() {
        let mut clients = MockClientRepository::new();
        clients.expect_get_by_id().never();
        let mut provider = MockCreditLimitProvider::new();
        provider.expect_get_credit_limit().never();

        let service = service(clients, provider, sink_expecting(0));

        let accepted = service
            .add_user("", "Doe", "john@doe.com", adult_dob(), 1)
            .await
            .unwrap();
        assert!(!accepted);
    }

    #[tokio::test]
    async fn test_underage_rejected_with_reason() {
        let mut clients = MockClientRepository::new();
        clients.expect_get_by_id().never();

        let service = service(clients, MockCreditLimitProvider::new(), sink_expecting(0));
        let dob = NaiveDate::from_ymd_opt(2004, 6, 16).unwrap();

        let outcome = service
            .register(RegistrationInput::new("John", "Doe", "john@doe.com", dob, 1))
            .await
            .unwrap();

        assert_eq!(
            outcome.rejection(),
            Some(&RejectionReason::Underage {
                age: 20,
                minimum: 21
            })
        );
    }

    #[tokio::test]
    async fn test_very_important_client_persisted_without_limit() {
        let mut provider = MockCreditLimitProvider::new();
        provider.expect_get_credit_limit().never();

        let mut users = MockUserRepository::new();
        users
            .expect_create()
            .withf(|user| !user.has_credit_limit && user.client.id == 1)
            .times(1)
            .returning(Ok);

        let service = service(client_repo("VeryImportantClient"), provider, users);

        let accepted = service
            .add_user("John", "Doe", "john@doe.com", adult_dob(), 1)
            .await
            .unwrap();
        assert!(accepted);
    }

    #[tokio::test]
    async fn test_important_client_above_floor_accepted() {
        let service = service(
            client_repo("ImportantClient"),
            provider_returning(300),
            sink_expecting(1),
        );

        let outcome = service
            .register(RegistrationInput::new("John", "Doe", "john@doe.com", adult_dob(), 1))
            .await
            .unwrap();

        let user = outcome.user().unwrap();
        assert!(user.has_credit_limit);
        assert_eq!(user.credit_limit, 600);
    }

    #[tokio::test]
    async fn test_important_client_below_floor_rejected() {
        let service = service(
            client_repo("ImportantClient"),
            provider_returning(200),
            sink_expecting(0),
        );

        let outcome = service
            .register(RegistrationInput::new("John", "Doe", "john@doe.com", adult_dob(), 1))
            .await
            .unwrap();

        assert_eq!(
            outcome.rejection(),
            Some(&RejectionReason::CreditTooLow {
                credit_limit: 400,
                floor: 500
            })
        );
    }

    #[tokio::test]
    async fn test_important_client_doubled_to_floor_accepted() {
        let service = service(
            client_repo("ImportantClient"),
            provider_returning(250),
            sink_expecting(1),
        );

        let outcome = service
            .register(RegistrationInput::new("John", "Doe", "john@doe.com", adult_dob(), 1))
            .await
            .unwrap();

        assert_eq!(outcome.user().unwrap().effective_credit_limit(), Some(500));
    }

    #[tokio::test]
    async fn test_important_client_doubled_just_below_floor_rejected() {
        let service = service(
            client_repo("ImportantClient"),
            provider_returning(249),
            sink_expecting(0),
        );

        let outcome = service
            .register(RegistrationInput::new("John", "Doe", "john@doe.com", adult_dob(), 1))
            .await
            .unwrap();

        assert_eq!(
            outcome.rejection(),
            Some(&RejectionReason::CreditTooLow {
                credit_limit: 498,
                floor: 500
            })
        );
    }

    #[tokio::test]
    async fn test_ordinary_client_at_floor_accepted() {
        let service = service(
            client_repo("NormalClient"),
            provider_returning(500),
            sink_expecting(1),
        );

        let accepted = service
            .add_user("John", "Doe", "john@doe.com", adult_dob(), 1)
            .await
            .unwrap();
        assert!(accepted);
    }

    #[tokio::test]
    async fn test_ordinary_client_just_below_floor_rejected() {
        let service = service(
            client_repo("NormalClient"),
            provider_returning(499),
            sink_expecting(0),
        );

        let accepted = service
            .add_user("John", "Doe", "john@doe.com", adult_dob(), 1)
            .await
            .unwrap();
        assert!(!accepted);
    }

    #[tokio::test]
    async fn test_custom_floor_applies() {
        let service = service(
            client_repo("ImportantClient"),
            provider_returning(300),
            sink_expecting(0),
        )
        .with_policy(RegistrationPolicy::new(21, 1000));

        let accepted = service
            .add_user("John", "Doe", "john@doe.com", adult_dob(), 1)
            .await
            .unwrap();
        assert!(!accepted);
    }

    #[tokio::test]
    async fn test_unknown_client_fails_loudly() {
        let mut clients = MockClientRepository::new();
        clients.expect_get_by_id().returning(|_| Ok(None));
        let mut provider = MockCreditLimitProvider::new();
        provider.expect_get_credit_limit().never();

        let service = service(clients, provider, sink_expecting(0));

        let result = service
            .add_user("John", "Doe", "john@doe.com", adult_dob(), 42)
            .await;
        assert!(matches!(result, Err(RegistrationError::ClientNotFound(42))));
    }

    #[tokio::test]
    async fn test_persistence_failure_propagates() {
        let mut users = MockUserRepository::new();
        users
            .expect_create()
            .times(1)
            .returning(|_| Err(RegistrationError::Persistence("disk full".to_string())));

        let service = service(client_repo("ImportantClient"), provider_returning(300), users);

        let result = service
            .add_user("John", "Doe", "john@doe.com", adult_dob(), 1)
            .await;
        assert!(matches!(result, Err(RegistrationError::Persistence(_))));
    }

    #[tokio::test]
    async fn test_with_defaults_uses_default_policy() {
        let service = UserRegistrationService::with_defaults();
        assert_eq!(service.policy(), &RegistrationPolicy::default());
        assert_eq!(service.users().count().await.unwrap(), 0);
    }

    #[test]
    fn test_from_env_reads_policy() {
        temp_env::with_vars(
            [
                ("REGISTRATION_MINIMUM_AGE", Some("18")),
                ("REGISTRATION_CREDIT_LIMIT_FLOOR", Some("250")),
            ],
            || {
                let service = UserRegistrationService::from_env().unwrap();
                assert_eq!(service.policy(), &RegistrationPolicy::new(18, 250));
            },
        );
    }

    #[test]
    fn test_from_env_rejects_malformed_floor() {
        temp_env::with_var("REGISTRATION_CREDIT_LIMIT_FLOOR", Some("lots"), || {
            let result = UserRegistrationService::from_env();
            assert!(matches!(result, Err(ConfigError::ParseError { .. })));
        });
    }
}
