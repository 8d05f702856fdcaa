use crate::model::{User, UserCreate, UserId, UserUpdate};
use crate::user_actor::UserError;
use actor_framework::{ActorClient, FrameworkError, ResourceClient};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Client for interacting with the User actor.
#[derive(Clone)]
pub struct UserClient {
    inner: ResourceClient<User>,
}

impl UserClient {
    pub fn new(inner: ResourceClient<User>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ActorClient<User> for UserClient {
    type Error = UserError;

    fn inner(&self) -> &ResourceClient<User> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        if let Some(err) = e.entity_error::<UserError>() {
            return err.clone();
        }
        match e {
            FrameworkError::NotFound(id) => UserError::NotFound(id),
            other => UserError::ActorCommunicationError(other.to_string()),
        }
    }
}

impl UserClient {
    #[instrument(skip(self))]
    pub async fn create_user(&self, params: UserCreate) -> Result<UserId, UserError> {
        debug!("Sending request");
        self.inner.create(params).await.map_err(Self::map_error)
    }

    #[instrument(skip(self))]
    pub async fn update_user(&self, id: UserId, update: UserUpdate) -> Result<User, UserError> {
        debug!("Sending request");
        self.inner.update(id, update).await.map_err(Self::map_error)
    }

    /// Fetches a user, treating absence as [`UserError::NotFound`].
    #[instrument(skip(self))]
    pub async fn require(&self, id: UserId) -> Result<User, UserError> {
        self.get(id)
            .await?
            .ok_or_else(|| UserError::NotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Role;
    use actor_framework::mock::MockClient;

    fn courier(id: UserId) -> User {
        User {
            id,
            name: "Dilshod".to_string(),
            phone: "+998935554433".to_string(),
            role: Role::Courier,
        }
    }

    #[tokio::test]
    async fn test_create_returns_minted_id() {
        let id = UserId::new();
        let mut mock = MockClient::<User>::new();
        mock.expect_create().return_ok(id);

        let users = UserClient::new(mock.client());
        let created = users
            .create_user(UserCreate {
                name: "Dilshod".to_string(),
                phone: "+998935554433".to_string(),
                role: Role::Courier,
            })
            .await
            .unwrap();
        assert_eq!(created, id);
        mock.verify();
    }

    #[tokio::test]
    async fn test_require_distinguishes_found_and_missing() {
        let known = UserId::new();
        let unknown = UserId::new();
        let mut mock = MockClient::<User>::new();
        mock.expect_get(known).return_ok(Some(courier(known)));
        mock.expect_get(unknown).return_ok(None);

        let users = UserClient::new(mock.client());
        assert_eq!(users.require(known).await.unwrap().role, Role::Courier);
        assert_eq!(
            users.require(unknown).await,
            Err(UserError::NotFound(unknown.to_string()))
        );
        mock.verify();
    }

    #[tokio::test]
    async fn test_update_errors_keep_their_type() {
        let id = UserId::new();
        let mut mock = MockClient::<User>::new();
        mock.expect_update(id)
            .return_err(FrameworkError::EntityError(Box::new(
                UserError::ValidationError("phone must not be empty".to_string()),
            )));

        let users = UserClient::new(mock.client());
        let err = users
            .update_user(
                id,
                UserUpdate {
                    phone: Some(String::new()),
                    ..UserUpdate::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::ValidationError(_)));
        mock.verify();
    }
}
