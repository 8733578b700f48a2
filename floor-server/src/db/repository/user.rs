//! User Repository

use super::{BaseRepository, RepoError, RepoResult, new_record_id};
use crate::db::models::{NewUser, User};
use shared::models::{Role, UserUpdate};
use shared::util::now_millis;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const TABLE: &str = "user";

#[derive(Clone)]
pub struct UserRepository {
    base: BaseRepository,
}

impl UserRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find all users, newest first
    pub async fn find_all(&self) -> RepoResult<Vec<User>> {
        let users: Vec<User> = self
            .base
            .db()
            .query("SELECT * FROM user ORDER BY created_at DESC")
            .await?
            .take(0)?;
        Ok(users)
    }

    /// Find user by id
    pub async fn find_by_id(&self, id: &RecordId) -> RepoResult<Option<User>> {
        let user: Option<User> = self.base.db().select(id.clone()).await?;
        Ok(user)
    }

    /// Find user by email (case-insensitive)
    pub async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM user WHERE email = $email LIMIT 1")
            .bind(("email", email.trim().to_lowercase()))
            .await?;
        let users: Vec<User> = result.take(0)?;
        Ok(users.into_iter().next())
    }

    /// Find user by username
    pub async fn find_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM user WHERE username = $username LIMIT 1")
            .bind(("username", username.to_string()))
            .await?;
        let users: Vec<User> = result.take(0)?;
        Ok(users.into_iter().next())
    }

    /// Create a new user
    pub async fn create(&self, data: NewUser) -> RepoResult<User> {
        let email = data.email.trim().to_lowercase();

        if self.find_by_email(&email).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Email '{}' already exists",
                email
            )));
        }
        if self.find_by_username(&data.username).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Username '{}' already exists",
                data.username
            )));
        }

        let now = now_millis();
        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE $id SET
                    username = $username,
                    email = $email,
                    hash_pass = $hash_pass,
                    first_name = $first_name,
                    last_name = $last_name,
                    phone = $phone,
                    role = $role,
                    is_active = true,
                    two_factor_enabled = false,
                    created_at = $now,
                    updated_at = $now
                RETURN AFTER"#,
            )
            .bind(("id", new_record_id(TABLE)))
            .bind(("username", data.username))
            .bind(("email", email))
            .bind(("hash_pass", data.hash_pass))
            .bind(("first_name", data.first_name))
            .bind(("last_name", data.last_name))
            .bind(("phone", data.phone))
            .bind(("role", data.role.as_str()))
            .bind(("now", now))
            .await?;

        let created: Option<User> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create user".to_string()))
    }

    /// Update profile fields
    ///
    /// `is_active` 只在调用方允许时传入 (由 handler 决定)。
    pub async fn update(&self, id: &RecordId, data: UserUpdate) -> RepoResult<User> {
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("User {} not found", id)))?;

        let email = data
            .email
            .map(|e| e.trim().to_lowercase())
            .unwrap_or(existing.email.clone());
        if email != existing.email
            && let Some(found) = self.find_by_email(&email).await?
            && found.id != existing.id
        {
            return Err(RepoError::Duplicate(format!(
                "Email '{}' already exists",
                email
            )));
        }

        let username = data.username.unwrap_or(existing.username.clone());
        if username != existing.username
            && let Some(found) = self.find_by_username(&username).await?
            && found.id != existing.id
        {
            return Err(RepoError::Duplicate(format!(
                "Username '{}' already exists",
                username
            )));
        }

        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE $thing SET
                    username = $username,
                    email = $email,
                    first_name = $first_name,
                    last_name = $last_name,
                    phone = $phone,
                    is_active = $is_active,
                    updated_at = $now
                RETURN AFTER"#,
            )
            .bind(("thing", id.clone()))
            .bind(("username", username))
            .bind(("email", email))
            .bind(("first_name", data.first_name.or(existing.first_name)))
            .bind(("last_name", data.last_name.or(existing.last_name)))
            .bind(("phone", data.phone.or(existing.phone)))
            .bind(("is_active", data.is_active.unwrap_or(existing.is_active)))
            .bind(("now", now_millis()))
            .await?;

        result
            .take::<Option<User>>(0)?
            .ok_or_else(|| RepoError::NotFound(format!("User {} not found", id)))
    }

    /// Change role
    pub async fn update_role(&self, id: &RecordId, role: Role) -> RepoResult<User> {
        let mut result = self
            .base
            .db()
            .query("UPDATE $thing SET role = $role, updated_at = $now RETURN AFTER")
            .bind(("thing", id.clone()))
            .bind(("role", role.as_str()))
            .bind(("now", now_millis()))
            .await?;

        result
            .take::<Option<User>>(0)?
            .ok_or_else(|| RepoError::NotFound(format!("User {} not found", id)))
    }

    /// Replace password hash
    pub async fn update_password(&self, id: &RecordId, hash_pass: String) -> RepoResult<()> {
        let mut result = self
            .base
            .db()
            .query("UPDATE $thing SET hash_pass = $hash_pass, updated_at = $now RETURN AFTER")
            .bind(("thing", id.clone()))
            .bind(("hash_pass", hash_pass))
            .bind(("now", now_millis()))
            .await?;

        result
            .take::<Option<User>>(0)?
            .map(|_| ())
            .ok_or_else(|| RepoError::NotFound(format!("User {} not found", id)))
    }

    /// Hard delete a user
    pub async fn delete(&self, id: &RecordId) -> RepoResult<bool> {
        let deleted: Option<User> = self.base.db().delete(id.clone()).await?;
        Ok(deleted.is_some())
    }
}
