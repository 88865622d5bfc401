//! User repository for database operations.

use crate::entities::{NewUser, UpdateProfile, User, UserRole};
use crate::types::{is_unique_violation, new_public_id, timestamp_now, DatabaseError, DatabaseResult};
use sqlx::{Executor, Sqlite, SqlitePool};

const USER_COLUMNS: &str =
    "id, public_id, email, name, role, is_bootstrap, created_at, updated_at";

/// Repository for user database operations
#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find user by ID
    pub async fn find_by_id(&self, id: i64) -> DatabaseResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// Find user by public ID
    pub async fn find_by_public_id(&self, public_id: &str) -> DatabaseResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE public_id = ?"
        ))
        .bind(public_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// Find user by email
    pub async fn find_by_email(&self, email: &str) -> DatabaseResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ?"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// Look up a user together with the stored password hash.
    pub async fn find_credentials(&self, email: &str) -> DatabaseResult<Option<(User, String)>> {
        let Some(user) = self.find_by_email(email).await? else {
            return Ok(None);
        };
        let (hash,): (String,) = sqlx::query_as("SELECT password_hash FROM users WHERE id = ?")
            .bind(user.id)
            .fetch_one(&self.pool)
            .await?;
        Ok(Some((user, hash)))
    }

    /// Create new user
    pub async fn create(&self, request: &NewUser) -> DatabaseResult<User> {
        insert_user(&self.pool, request, false).await
    }

    /// Create the one bootstrap administrator.
    pub async fn create_bootstrap(&self, request: &NewUser) -> DatabaseResult<User> {
        insert_user(&self.pool, request, true).await
    }

    pub async fn find_bootstrap(&self) -> DatabaseResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE is_bootstrap = 1"
        ))
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// Update name and/or email; `None` fields keep their value.
    pub async fn update_profile(&self, id: i64, update: &UpdateProfile) -> DatabaseResult<User> {
        let result = sqlx::query(
            "UPDATE users SET name = COALESCE(?, name), email = COALESCE(?, email), updated_at = ? WHERE id = ?",
        )
        .bind(update.name.as_deref())
        .bind(update.email.as_deref())
        .bind(timestamp_now())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                DatabaseError::duplicate("email already registered")
            } else {
                DatabaseError::from(err)
            }
        })?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found(format!("user {id}")));
        }
        self.require(id).await
    }

    /// Change a user's role. The bootstrap administrator cannot be changed.
    pub async fn update_role(&self, id: i64, role: UserRole) -> DatabaseResult<User> {
        let result = sqlx::query(
            "UPDATE users SET role = ?, updated_at = ? WHERE id = ? AND is_bootstrap = 0",
        )
        .bind(role.as_str())
        .bind(timestamp_now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(self.missing_or_protected(id).await);
        }
        self.require(id).await
    }

    /// Hard-delete a user. Enrollments, membership rows and payments cascade.
    pub async fn delete(&self, id: i64) -> DatabaseResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = ? AND is_bootstrap = 0")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(self.missing_or_protected(id).await);
        }
        Ok(())
    }

    /// All users, oldest first.
    pub async fn list(&self) -> DatabaseResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at ASC, id ASC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    /// Number of users holding each role; roles with no users report zero.
    pub async fn count_by_role(&self) -> DatabaseResult<Vec<(UserRole, i64)>> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT role, COUNT(*) FROM users GROUP BY role")
                .fetch_all(&self.pool)
                .await?;

        let mut counts = Vec::with_capacity(UserRole::ALL.len());
        for role in UserRole::ALL {
            let count = rows
                .iter()
                .find(|(stored, _)| stored == role.as_str())
                .map(|(_, count)| *count)
                .unwrap_or(0);
            counts.push((role, count));
        }
        Ok(counts)
    }

    async fn require(&self, id: i64) -> DatabaseResult<User> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| DatabaseError::not_found(format!("user {id}")))
    }

    async fn missing_or_protected(&self, id: i64) -> DatabaseError {
        match self.find_by_id(id).await {
            Ok(Some(_)) => DatabaseError::Constraint("bootstrap administrator is immutable".into()),
            Ok(None) => DatabaseError::not_found(format!("user {id}")),
            Err(err) => err,
        }
    }
}

async fn insert_user<'e, E>(executor: E, request: &NewUser, bootstrap: bool) -> DatabaseResult<User>
where
    E: Executor<'e, Database = Sqlite>,
{
    let now = timestamp_now();
    sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (public_id, email, password_hash, name, role, is_bootstrap, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING {USER_COLUMNS}"
    ))
    .bind(new_public_id())
    .bind(&request.email)
    .bind(&request.password_hash)
    .bind(&request.name)
    .bind(request.role.as_str())
    .bind(bootstrap)
    .bind(&now)
    .bind(&now)
    .fetch_one(executor)
    .await
    .map_err(|err| {
        if is_unique_violation(&err) {
            DatabaseError::duplicate("email already registered")
        } else {
            DatabaseError::from(err)
        }
    })
}
