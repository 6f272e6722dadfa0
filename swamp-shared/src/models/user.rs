/// User profile model and database operations
///
/// Credentials live in the hosted auth service. This table holds the
/// application profile linked to an auth account through `auth_id`, and is
/// what every other table references.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     auth_id UUID NOT NULL UNIQUE,
///     email TEXT NOT NULL UNIQUE,
///     username VARCHAR(50) NOT NULL UNIQUE,
///     first_name VARCHAR(100),
///     last_name VARCHAR(100),
///     major VARCHAR(100),
///     year VARCHAR(50),
///     email_verified BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     last_login_at TIMESTAMPTZ
/// );
///
/// CREATE UNIQUE INDEX users_email_lower_key ON users (LOWER(email));
/// ```
///
/// # Example
///
/// ```no_run
/// use swamp_shared::models::user::{User, NewProfile};
/// use swamp_shared::db::pool::{create_pool, DatabaseConfig};
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let user = User::get_or_create(&pool, NewProfile {
///     auth_id: Uuid::new_v4(),
///     email: "albert@ufl.edu".to_string(),
///     username: None,
///     first_name: None,
///     last_name: None,
///     major: None,
///     year: None,
///     email_verified: true,
/// }).await?;
///
/// assert_eq!(user.username, "albert");
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

const USER_COLUMNS: &str = "id, auth_id, email, username, first_name, last_name, major, year, \
                            email_verified, created_at, updated_at, last_login_at";

/// Longest username the schema accepts
pub const MAX_USERNAME_LEN: usize = 50;

/// How many numbered variants of a username to try before giving up
const USERNAME_ATTEMPTS: u32 = 20;

/// Error type for profile provisioning
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    /// The email already belongs to a profile of another auth account
    #[error("Email is linked to a different account")]
    EmailTaken,

    /// Every numbered variant of the username is taken
    #[error("No free username derived from {0}")]
    NoFreeUsername(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// User profile
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Internal user ID referenced by every other table
    pub id: Uuid,

    /// Subject of the hosted auth account
    pub auth_id: Uuid,

    pub email: String,

    /// Unique handle used for board invites and assignments
    pub username: String,

    pub first_name: Option<String>,

    pub last_name: Option<String>,

    pub major: Option<String>,

    /// Class standing, free text ("Freshman", "2027", ...)
    pub year: Option<String>,

    pub email_verified: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,

    pub last_login_at: Option<DateTime<Utc>>,
}

/// Input for creating a profile for an auth account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProfile {
    pub auth_id: Uuid,
    pub email: String,

    /// Requested username; derived from the email when absent
    pub username: Option<String>,

    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub major: Option<String>,
    pub year: Option<String>,
    pub email_verified: bool,
}

/// Input for updating a profile
///
/// All fields are optional. Only non-None fields will be updated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfile {
    pub username: Option<String>,

    /// New first name (use Some(None) to clear)
    pub first_name: Option<Option<String>>,

    /// New last name (use Some(None) to clear)
    pub last_name: Option<Option<String>>,

    /// New major (use Some(None) to clear)
    pub major: Option<Option<String>>,

    /// New year (use Some(None) to clear)
    pub year: Option<Option<String>>,
}

/// Derives a username from the local part of an email address
///
/// Keeps ASCII letters, digits, `_` and `.`, lowercased. Falls back to
/// `gator` when nothing usable remains.
pub fn username_from_email(email: &str) -> String {
    let local = email.split('@').next().unwrap_or_default();

    let mut username: String = local
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '.')
        .map(|c| c.to_ascii_lowercase())
        .collect();

    // Leave room for a numeric suffix
    username.truncate(MAX_USERNAME_LEN - 4);

    if username.is_empty() {
        "gator".to_string()
    } else {
        username
    }
}

/// `base`, then `base2`, `base3`, ...
fn username_candidate(base: &str, attempt: u32) -> String {
    if attempt == 0 {
        base.to_string()
    } else {
        format!("{}{}", base, attempt + 1)
    }
}

impl User {
    /// Creates a profile with exactly the requested (or derived) username
    ///
    /// # Errors
    ///
    /// Returns a unique-violation database error if the auth account, email
    /// or username is already taken.
    pub async fn create(pool: &PgPool, data: NewProfile) -> Result<Self, sqlx::Error> {
        let username = data
            .username
            .unwrap_or_else(|| username_from_email(&data.email));

        let query = format!(
            r#"
            INSERT INTO users (auth_id, email, username, first_name, last_name, major, year, email_verified)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            USER_COLUMNS
        );

        let user = sqlx::query_as::<_, User>(&query)
            .bind(data.auth_id)
            .bind(data.email)
            .bind(username)
            .bind(data.first_name)
            .bind(data.last_name)
            .bind(data.major)
            .bind(data.year)
            .bind(data.email_verified)
            .fetch_one(pool)
            .await?;

        info!(user_id = %user.id, username = %user.username, "User profile created");
        Ok(user)
    }

    /// Returns the profile for an auth account, creating it on first sight
    ///
    /// Without a requested username, the email's local part is used and
    /// suffixed with a number until it is free. A concurrent request creating
    /// the same profile is tolerated: the insert is skipped and the winner's
    /// row is returned.
    ///
    /// # Errors
    ///
    /// - [`ProfileError::EmailTaken`]: another auth account owns the email
    ///   (compared case-insensitively)
    /// - [`ProfileError::NoFreeUsername`]: all numbered variants are taken
    pub async fn get_or_create(pool: &PgPool, data: NewProfile) -> Result<Self, ProfileError> {
        if let Some(user) = Self::find_by_auth_id(pool, data.auth_id).await? {
            return Ok(user);
        }

        let base = data
            .username
            .clone()
            .unwrap_or_else(|| username_from_email(&data.email));

        let query = format!(
            r#"
            INSERT INTO users (auth_id, email, username, first_name, last_name, major, year, email_verified)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT DO NOTHING
            RETURNING {}
            "#,
            USER_COLUMNS
        );

        for attempt in 0..USERNAME_ATTEMPTS {
            let username = username_candidate(&base, attempt);

            let created = sqlx::query_as::<_, User>(&query)
                .bind(data.auth_id)
                .bind(&data.email)
                .bind(&username)
                .bind(&data.first_name)
                .bind(&data.last_name)
                .bind(&data.major)
                .bind(&data.year)
                .bind(data.email_verified)
                .fetch_optional(pool)
                .await?;

            if let Some(user) = created {
                info!(user_id = %user.id, username = %user.username, "User profile created");
                return Ok(user);
            }

            // The conflict may have been on auth_id or email rather than username
            if let Some(user) = Self::find_by_auth_id(pool, data.auth_id).await? {
                return Ok(user);
            }
            if Self::find_by_email(pool, &data.email).await?.is_some() {
                return Err(ProfileError::EmailTaken);
            }

            debug!(username = %username, "Username taken, trying next candidate");
        }

        Err(ProfileError::NoFreeUsername(base))
    }

    /// Finds a profile by internal ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);

        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(user)
    }

    /// Finds the profile linked to an auth account
    pub async fn find_by_auth_id(pool: &PgPool, auth_id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM users WHERE auth_id = $1", USER_COLUMNS);

        let user = sqlx::query_as::<_, User>(&query)
            .bind(auth_id)
            .fetch_optional(pool)
            .await?;

        Ok(user)
    }

    /// Finds a profile by email (case-insensitive)
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM users WHERE LOWER(email) = LOWER($1)", USER_COLUMNS);

        let user = sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await?;

        Ok(user)
    }

    /// Finds a profile by username
    pub async fn find_by_username(pool: &PgPool, username: &str) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS);

        let user = sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_optional(pool)
            .await?;

        Ok(user)
    }

    /// Whether a username is already taken
    pub async fn username_exists(pool: &PgPool, username: &str) -> Result<bool, sqlx::Error> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE username = $1)")
            .bind(username)
            .fetch_one(pool)
            .await?;

        Ok(exists)
    }

    /// Updates profile fields
    ///
    /// Only non-None fields in `data` will be updated. The `updated_at`
    /// timestamp is automatically set to the current time.
    ///
    /// # Errors
    ///
    /// Returns a unique-violation database error if the new username is taken.
    pub async fn update_profile(
        pool: &PgPool,
        id: Uuid,
        data: UpdateProfile,
    ) -> Result<Option<Self>, sqlx::Error> {
        // Build dynamic update query based on which fields are present
        let mut query = String::from("UPDATE users SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.username.is_some() {
            bind_count += 1;
            query.push_str(&format!(", username = ${}", bind_count));
        }
        if data.first_name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", first_name = ${}", bind_count));
        }
        if data.last_name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", last_name = ${}", bind_count));
        }
        if data.major.is_some() {
            bind_count += 1;
            query.push_str(&format!(", major = ${}", bind_count));
        }
        if data.year.is_some() {
            bind_count += 1;
            query.push_str(&format!(", year = ${}", bind_count));
        }

        query.push_str(" WHERE id = $1 RETURNING ");
        query.push_str(USER_COLUMNS);

        let mut q = sqlx::query_as::<_, User>(&query).bind(id);

        if let Some(username) = data.username {
            q = q.bind(username);
        }
        if let Some(first_name) = data.first_name {
            q = q.bind(first_name);
        }
        if let Some(last_name) = data.last_name {
            q = q.bind(last_name);
        }
        if let Some(major) = data.major {
            q = q.bind(major);
        }
        if let Some(year) = data.year {
            q = q.bind(year);
        }

        let user = q.fetch_optional(pool).await?;

        Ok(user)
    }

    /// Updates the last login timestamp for a user
    ///
    /// Called after a successful password login.
    pub async fn update_last_login(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET last_login_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
