//! [`ActorEntity`] implementation for [`User`].
//!
//! Users have no custom actions; the directory is read by the fulfillment service to resolve
//! a courier's role and phone.

use super::error::UserError;
use crate::model::{User, UserCreate, UserId, UserUpdate};
use actor_framework::ActorEntity;
use async_trait::async_trait;

fn require_non_empty(field: &str, value: &str) -> Result<(), UserError> {
    if value.trim().is_empty() {
        return Err(UserError::ValidationError(format!("{field} must not be empty")));
    }
    Ok(())
}

#[async_trait]
impl ActorEntity for User {
    type Id = UserId;
    type Create = UserCreate;
    type Update = UserUpdate;
    type Action = ();
    type ActionResult = ();
    type Context = ();
    type Error = UserError;

    fn mint_id() -> UserId {
        UserId::new()
    }

    fn from_create_params(id: UserId, params: UserCreate) -> Result<Self, Self::Error> {
        require_non_empty("name", &params.name)?;
        require_non_empty("phone", &params.phone)?;
        Ok(Self {
            id,
            name: params.name,
            phone: params.phone,
            role: params.role,
        })
    }

    async fn on_update(
        &mut self,
        update: UserUpdate,
        _ctx: &Self::Context,
    ) -> Result<(), Self::Error> {
        if let Some(name) = update.name {
            require_non_empty("name", &name)?;
            self.name = name;
        }
        if let Some(phone) = update.phone {
            require_non_empty("phone", &phone)?;
            self.phone = phone;
        }
        Ok(())
    }

    async fn handle_action(
        &mut self,
        _action: (),
        _ctx: &Self::Context,
    ) -> Result<(), Self::Error> {
        Ok(())
    }
}
