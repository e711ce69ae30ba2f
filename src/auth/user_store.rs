//! User Storage
//! Mission: Register accounts and check credentials with bcrypt-hashed passwords

use crate::auth::models::{User, UserProfile};
use crate::store::{Database, StoreError};
use anyhow::{Context, Result};
use bcrypt::{hash, verify};
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

/// Outcome of a registration attempt
#[derive(Debug)]
pub enum Registration {
    Created(User),
    EmailTaken,
}

/// Outcome of a credential check
#[derive(Debug)]
pub enum Authentication {
    Verified(User),
    UnknownEmail,
    WrongPassword,
}

/// Credential store on top of the document store
pub struct UserStore {
    db: Database,
    bcrypt_cost: u32,
}

impl UserStore {
    pub fn new(db: Database, bcrypt_cost: u32) -> Self {
        Self { db, bcrypt_cost }
    }

    /// Create a new account. An existing email is never overwritten and its
    /// stored hash is left alone.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<Registration> {
        if self
            .db
            .find_user_by_email(email)
            .await
            .context("Failed to look up email")?
            .is_some()
        {
            return Ok(Registration::EmailTaken);
        }

        let password = password.to_string();
        let cost = self.bcrypt_cost;
        let password_hash = tokio::task::spawn_blocking(move || hash(password, cost))
            .await
            .context("Password hashing task failed")?
            .context("Failed to hash password")?;

        let user = User {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash,
            created_at: Utc::now(),
        };

        match self.db.insert_user(&user).await {
            Ok(()) => {}
            // Lost a race with a concurrent registration for the same email.
            Err(StoreError::UniqueViolation(_)) => return Ok(Registration::EmailTaken),
            Err(e) => return Err(e).context("Failed to insert user"),
        }

        info!(user_id = %user.id, email = %user.email, "account registered");
        Ok(Registration::Created(user))
    }

    /// Check an email/password pair
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Authentication> {
        let Some(user) = self
            .db
            .find_user_by_email(email)
            .await
            .context("Failed to look up email")?
        else {
            warn!(email, "login for unknown email");
            return Ok(Authentication::UnknownEmail);
        };

        let candidate = password.to_string();
        let stored = user.password_hash.clone();
        let valid = tokio::task::spawn_blocking(move || verify(candidate, &stored))
            .await
            .context("Password verification task failed")?
            .context("Failed to verify password")?;

        if !valid {
            warn!(user_id = %user.id, "login with wrong password");
            return Ok(Authentication::WrongPassword);
        }
        Ok(Authentication::Verified(user))
    }

    /// Profile for a user id, without the password
    pub async fn profile(&self, user_id: &str) -> Result<Option<UserProfile>> {
        self.db
            .find_profile(user_id)
            .await
            .context("Failed to load profile")
    }
}
