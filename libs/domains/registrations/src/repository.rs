use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::RegistrationResult;
use crate::models::{Client, User};

/// Resolves client ids to client records
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClientRepository: Send + Sync {
    /// Get a client by ID
    async fn get_by_id(&self, client_id: i32) -> RegistrationResult<Option<Client>>;
}

/// Persistence sink for accepted users
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Store a fully-built user
    async fn create(&self, user: User) -> RegistrationResult<User>;

    /// Get a user by ID
    async fn get_by_id(&self, id: Uuid) -> RegistrationResult<Option<User>>;

    /// All stored users, oldest first
    async fn list(&self) -> RegistrationResult<Vec<User>>;

    /// Count stored users
    async fn count(&self) -> RegistrationResult<usize>;
}

/// In-memory implementation of ClientRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryClientRepository {
    clients: Arc<RwLock<HashMap<i32, Client>>>,
}

impl InMemoryClientRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clients(clients: impl IntoIterator<Item = Client>) -> Self {
        let clients = clients.into_iter().map(|c| (c.id, c)).collect();
        Self {
            clients: Arc::new(RwLock::new(clients)),
        }
    }

    /// Insert or replace a client
    pub async fn insert(&self, client: Client) {
        self.clients.write().await.insert(client.id, client);
    }
}

#[async_trait]
impl ClientRepository for InMemoryClientRepository {
    async fn get_by_id(&self, client_id: i32) -> RegistrationResult<Option<Client>> {
        let clients = self.clients.read().await;
        Ok(clients.get(&client_id).cloned())
    }
}

/// In-memory implementation of UserRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> RegistrationResult<User> {
        let mut users = self.users.write().await;
        users.insert(user.id, user.clone());

        tracing::info!(user_id = %user.id, client_id = user.client.id, "Stored user");
        Ok(user)
    }

    async fn get_by_id(&self, id: Uuid) -> RegistrationResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn list(&self) -> RegistrationResult<Vec<User>> {
        let users = self.users.read().await;

        let mut result: Vec<User> = users.values().cloned().collect();
        // v7 ids sort by creation time
        result.sort_by_key(|u| u.id);

        Ok(result)
    }

    async fn count(&self) -> RegistrationResult<usize> {
        Ok(self.users.read().await.len())
    }
}
