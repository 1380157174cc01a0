use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::config::DatabaseSettings;
use crate::core::terms::prepare_terms;
use crate::models::{NewProfile, ProfileUpdate, UserProfile};

/// Errors that can occur when interacting with the profile store
#[derive(Debug, Error)]
pub enum ProfileStoreError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Stored term list is corrupt: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("User not found: {0}")]
    NotFound(String),

    #[error("A user with this {0} already exists")]
    Duplicate(&'static str),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// SQLite-backed store of user health profiles
pub struct ProfileStore {
    pool: SqlitePool,
}

const PROFILE_COLUMNS: &str =
    "id, username, name, mobile, age, allergies, health_conditions, created_at, updated_at";

impl ProfileStore {
    /// Open the database and apply migrations
    ///
    /// An in-memory URL (`sqlite::memory:`) is pinned to a single connection
    /// that is never recycled, otherwise each pooled connection would see
    /// its own empty database.
    pub async fn connect(settings: &DatabaseSettings) -> Result<Self, ProfileStoreError> {
        let options = SqliteConnectOptions::from_str(&settings.url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let in_memory = settings.url.contains(":memory:");

        let mut pool_options = SqlitePoolOptions::new()
            .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs.unwrap_or(5)))
            .test_before_acquire(true);

        pool_options = if in_memory {
            pool_options
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            pool_options
                .max_connections(settings.max_connections.unwrap_or(5))
                .min_connections(settings.min_connections.unwrap_or(1))
                .idle_timeout(Duration::from_secs(settings.idle_timeout_secs.unwrap_or(600)))
        };

        tracing::info!(url = %settings.url, "Connecting to profile store");

        let pool = pool_options.connect_with(options).await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a fresh in-memory store
    pub async fn in_memory() -> Result<Self, ProfileStoreError> {
        Self::connect(&DatabaseSettings {
            url: "sqlite::memory:".to_string(),
            max_connections: Some(1),
            min_connections: Some(1),
            acquire_timeout_secs: None,
            idle_timeout_secs: None,
        })
        .await
    }

    /// Register a new profile
    ///
    /// Mobile numbers and usernames are unique; a clash is reported as
    /// [`ProfileStoreError::Duplicate`] naming the offending field.
    pub async fn create(&self, profile: NewProfile) -> Result<UserProfile, ProfileStoreError> {
        let username = profile.username.trim();
        let name = profile.name.trim();
        let mobile = normalize_mobile(&profile.mobile)?;

        if username.is_empty() || name.is_empty() {
            return Err(ProfileStoreError::InvalidInput(
                "Username, name, and mobile number are required".to_string(),
            ));
        }
        validate_age(profile.age)?;

        if self.find_by_mobile(&mobile).await?.is_some() {
            return Err(ProfileStoreError::Duplicate("mobile number"));
        }

        let allergies = serde_json::to_string(&prepare_terms(&profile.allergies))?;
        let conditions = serde_json::to_string(&prepare_terms(&profile.health_conditions))?;
        let now = Utc::now();

        let query = r#"
            INSERT INTO users (username, name, mobile, age, allergies, health_conditions, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
        "#;

        let result = sqlx::query(query)
            .bind(username)
            .bind(name)
            .bind(&mobile)
            .bind(profile.age as i64)
            .bind(allergies)
            .bind(conditions)
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(map_unique_violation)?;

        let id = result.last_insert_rowid();
        tracing::info!(user_id = id, "Registered new profile");

        self.get(id).await
    }

    /// Fetch a profile by id
    pub async fn get(&self, id: i64) -> Result<UserProfile, ProfileStoreError> {
        let query = format!("SELECT {PROFILE_COLUMNS} FROM users WHERE id = ?1");

        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ProfileStoreError::NotFound(id.to_string()))?;

        profile_from_row(&row)
    }

    /// Look up the profile registered with a mobile number
    ///
    /// The number is canonicalized first, so any spelling accepted at
    /// registration finds the same profile.
    pub async fn find_by_mobile(&self, mobile: &str) -> Result<Option<UserProfile>, ProfileStoreError> {
        let query = format!("SELECT {PROFILE_COLUMNS} FROM users WHERE mobile = ?1");

        let mobile = normalize_mobile(mobile)?;

        let row = sqlx::query(&query)
            .bind(&mobile)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(profile_from_row).transpose()
    }

    /// Apply a profile edit
    ///
    /// A list that is present replaces the stored one wholesale; an absent
    /// list leaves the stored one untouched.
    pub async fn update(&self, id: i64, update: ProfileUpdate) -> Result<UserProfile, ProfileStoreError> {
        let current = self.get(id).await?;

        let name = match update.name.as_deref().map(str::trim) {
            Some("") => {
                return Err(ProfileStoreError::InvalidInput("Name cannot be empty".to_string()));
            }
            Some(name) => name.to_string(),
            None => current.name,
        };
        let age = update.age.unwrap_or(current.age);
        validate_age(age)?;

        let allergies = update.allergies.unwrap_or(current.allergies);
        let conditions = update.health_conditions.unwrap_or(current.health_conditions);
        let allergies = serde_json::to_string(&prepare_terms(&allergies))?;
        let conditions = serde_json::to_string(&prepare_terms(&conditions))?;

        let query = r#"
            UPDATE users
            SET name = ?1, age = ?2, allergies = ?3, health_conditions = ?4, updated_at = ?5
            WHERE id = ?6
        "#;

        sqlx::query(query)
            .bind(name)
            .bind(age as i64)
            .bind(allergies)
            .bind(conditions)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;

        tracing::debug!(user_id = id, "Updated profile");

        self.get(id).await
    }

    /// Remove a profile
    pub async fn delete(&self, id: i64) -> Result<(), ProfileStoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ProfileStoreError::NotFound(id.to_string()));
        }

        tracing::info!(user_id = id, "Deleted profile");
        Ok(())
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, ProfileStoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

fn profile_from_row(row: &SqliteRow) -> Result<UserProfile, ProfileStoreError> {
    let age: i64 = row.try_get("age")?;
    let allergies: String = row.try_get("allergies")?;
    let conditions: String = row.try_get("health_conditions")?;

    Ok(UserProfile {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        name: row.try_get("name")?,
        mobile: row.try_get("mobile")?,
        age: u8::try_from(age).map_err(|_| ProfileStoreError::InvalidInput(format!("stored age {age}")))?,
        allergies: serde_json::from_str(&allergies)?,
        health_conditions: serde_json::from_str(&conditions)?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Canonicalize a mobile number to an optional leading `+` followed by digits
///
/// Spaces and hyphens are accepted as separators and dropped.
pub fn normalize_mobile(mobile: &str) -> Result<String, ProfileStoreError> {
    let mobile = mobile.trim();
    let (prefix, rest) = match mobile.strip_prefix('+') {
        Some(rest) => ("+", rest),
        None => ("", mobile),
    };

    if !rest.chars().all(|c| c.is_ascii_digit() || c == ' ' || c == '-') {
        return Err(ProfileStoreError::InvalidInput(format!(
            "Invalid mobile number: {mobile:?}"
        )));
    }

    let digits: String = rest.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return Err(ProfileStoreError::InvalidInput(format!(
            "Invalid mobile number: {mobile:?}"
        )));
    }

    Ok(format!("{prefix}{digits}"))
}

fn validate_age(age: u8) -> Result<(), ProfileStoreError> {
    if !(1..=120).contains(&age) {
        return Err(ProfileStoreError::InvalidInput(format!(
            "Age must be between 1 and 120, got {age}"
        )));
    }
    Ok(())
}

fn map_unique_violation(err: sqlx::Error) -> ProfileStoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            let field = if db_err.message().contains("users.mobile") {
                "mobile number"
            } else {
                "username"
            };
            return ProfileStoreError::Duplicate(field);
        }
    }
    err.into()
}
