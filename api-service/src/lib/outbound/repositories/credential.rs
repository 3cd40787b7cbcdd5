use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::PgPool;
use sqlx::Row;

use crate::credential::errors::StoreError;
use crate::credential::models::Credential;
use crate::credential::models::CredentialId;
use crate::credential::models::EmailAddress;
use crate::credential::models::NewCredential;
use crate::credential::models::Role;
use crate::credential::models::Username;
use crate::credential::ports::CredentialStore;

/// Credential store backed by PostgreSQL.
///
/// The `credentials_username_key` unique index is the authoritative guard
/// against duplicate registrations; this type just maps its violation to
/// `DuplicateUsername`.
pub struct PostgresCredentialStore {
    pool: PgPool,
}

impl PostgresCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn hydrate(row: PgRow) -> Result<Credential, StoreError> {
        let id: i64 = row.try_get("id").map_err(db_error)?;
        let username: String = row.try_get("username").map_err(db_error)?;
        let password_hash: String = row.try_get("password_hash").map_err(db_error)?;
        let roles: Vec<String> = row.try_get("roles").map_err(db_error)?;
        let firstname: String = row.try_get("firstname").map_err(db_error)?;
        let lastname: String = row.try_get("lastname").map_err(db_error)?;
        let email: String = row.try_get("email").map_err(db_error)?;
        let created_at: DateTime<Utc> = row.try_get("created_at").map_err(db_error)?;

        // A stored row that no longer passes domain validation is corrupt data
        let username = Username::new(username)
            .map_err(|e| StoreError::Database(format!("corrupt username column: {}", e)))?;
        let email = EmailAddress::new(email)
            .map_err(|e| StoreError::Database(format!("corrupt email column: {}", e)))?;
        let roles = roles
            .iter()
            .map(|role| role.parse::<Role>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StoreError::Database(format!("corrupt roles column: {}", e)))?;

        Ok(Credential {
            id: CredentialId(id),
            username,
            password_hash,
            roles,
            profile: crate::credential::models::Profile {
                firstname,
                lastname,
                email,
            },
            created_at,
        })
    }
}

#[async_trait]
impl CredentialStore for PostgresCredentialStore {
    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<Credential>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, username, password_hash, roles, firstname, lastname, email, created_at
            FROM credentials
            WHERE username = $1
            "#,
        )
        .bind(username.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        row.map(Self::hydrate).transpose()
    }

    async fn create(&self, credential: NewCredential) -> Result<Credential, StoreError> {
        let roles: Vec<String> = credential
            .roles
            .iter()
            .map(|role| role.as_str().to_string())
            .collect();

        let row = sqlx::query(
            r#"
            INSERT INTO credentials (username, password_hash, roles, firstname, lastname, email, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(credential.username.as_str())
        .bind(&credential.password_hash)
        .bind(&roles)
        .bind(&credential.profile.firstname)
        .bind(&credential.profile.lastname)
        .bind(credential.profile.email.as_str())
        .bind(credential.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return StoreError::DuplicateUsername(credential.username.to_string());
                }
            }
            StoreError::Database(e.to_string())
        })?;

        let id: i64 = row.try_get("id").map_err(db_error)?;

        Ok(Credential {
            id: CredentialId(id),
            username: credential.username,
            password_hash: credential.password_hash,
            roles: credential.roles,
            profile: credential.profile,
            created_at: credential.created_at,
        })
    }
}

fn db_error(e: sqlx::Error) -> StoreError {
    StoreError::Database(e.to_string())
}
