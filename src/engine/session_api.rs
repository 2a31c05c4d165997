use super::Engine;

use async_trait::async_trait;
use sqlx::{Acquire, Executor, Row};
use uuid::Uuid;

use crate::{
    api::SessionAPI,
    auth::User,
    entities::Session,
    error::{unauthenticated_error, validation_error, Error},
};

#[async_trait]
impl SessionAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn create_session(&self, email: String, name: Option<String>) -> Result<Session, Error> {
        let email = email.trim().to_lowercase();
        if email.is_empty() {
            return Err(validation_error("Missing email"));
        }
        let name = name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());

        let candidate = User::new(email, name);

        let mut conn = self.pool.acquire().await?;
        let mut tx = conn.begin().await?;

        let row = tx
            .fetch_one(
                sqlx::query(
                    "INSERT INTO users (id, email, name) VALUES ($1, $2, $3)
                     ON CONFLICT (email) DO UPDATE SET name = COALESCE(EXCLUDED.name, users.name)
                     RETURNING id, email, name",
                )
                .bind(&candidate.id)
                .bind(&candidate.email)
                .bind(&candidate.name),
            )
            .await?;

        let user = User {
            id: row.try_get("id")?,
            email: row.try_get("email")?,
            name: row.try_get("name")?,
        };

        let session = Session::new(user);

        tx.execute(
            sqlx::query("INSERT INTO sessions (token, user_id, expires_at) VALUES ($1, $2, $3)")
                .bind(&session.token)
                .bind(&session.user.id)
                .bind(session.expires_at),
        )
        .await?;

        tx.commit().await?;

        tracing::info!(user_id = %session.user.id, "session created");

        Ok(session)
    }

    #[tracing::instrument(skip_all)]
    async fn find_session_user(&self, token: Uuid) -> Result<User, Error> {
        let mut conn = self.pool.acquire().await?;

        let row = conn
            .fetch_optional(
                sqlx::query(
                    "SELECT u.id, u.email, u.name
                     FROM sessions s JOIN users u ON u.id = s.user_id
                     WHERE s.token = $1 AND s.expires_at > now()",
                )
                .bind(&token),
            )
            .await?
            .ok_or_else(unauthenticated_error)?;

        Ok(User {
            id: row.try_get("id")?,
            email: row.try_get("email")?,
            name: row.try_get("name")?,
        })
    }

    #[tracing::instrument(skip_all)]
    async fn delete_session(&self, token: Uuid) -> Result<(), Error> {
        let mut conn = self.pool.acquire().await?;

        conn.execute(sqlx::query("DELETE FROM sessions WHERE token = $1").bind(&token))
            .await?;

        Ok(())
    }
}
