//! User entity endpoints.

use std::sync::Arc;

use serde_json::Value;

use crate::{error::Result, http::Http};
use roster_types::{User, UserId};

const ENDPOINT: &str = "user/";

/// CRUD operations for directory users.
pub struct UserService {
    http: Arc<Http>,
}

impl UserService {
    pub(crate) fn new(http: Arc<Http>) -> Self {
        Self { http }
    }

    /// Fetches the full user list.
    pub async fn fetch_all(&self) -> Result<Vec<User>> {
        Ok(self.http.get(ENDPOINT).await?.content)
    }

    /// Fetches a single user by id.
    pub async fn fetch_one(&self, id: &UserId) -> Result<User> {
        Ok(self.http.get(&item_path(id)).await?.content)
    }

    /// Creates a user record under its id.
    pub async fn create(&self, user: &User) -> Result<User> {
        Ok(self.http.put(&item_path(&user.id), user).await?.content)
    }

    /// Applies a partial update to a user and returns the patched entity.
    pub async fn update(&self, id: &UserId, patch: &Value) -> Result<User> {
        Ok(self.http.patch(&item_path(id), patch).await?.content)
    }

    /// Deletes a user record.
    pub async fn remove(&self, id: &UserId) -> Result<()> {
        self.http.delete(&item_path(id)).await?;
        Ok(())
    }
}

fn item_path(id: &UserId) -> String {
    format!("{ENDPOINT}{}", id.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_path() {
        assert_eq!(item_path(&UserId::new("u1")), "user/u1");
    }
}
