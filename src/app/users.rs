use std::sync::Arc;

use anyhow::Result;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::user::User;
use crate::store::Store;

#[derive(Debug, Clone)]
pub struct NewUser {
    pub handle: String,
    pub display_name: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn Store>,
}

impl UserService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// `None` when the handle is already taken.
    pub async fn create(&self, new: NewUser) -> Result<Option<User>> {
        if self.store.find_user_by_handle(&new.handle).await?.is_some() {
            return Ok(None);
        }
        let user = User {
            id: Uuid::new_v4(),
            handle: new.handle,
            display_name: new.display_name,
            bio: new.bio,
            avatar_url: new.avatar_url,
            is_admin: false,
            created_at: OffsetDateTime::now_utc(),
        };
        self.store.insert_user(&user).await?;
        Ok(Some(user))
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<User>> {
        self.store.find_user(id).await
    }

    pub async fn get_by_handle(&self, handle: &str) -> Result<Option<User>> {
        self.store.find_user_by_handle(handle).await
    }
}
