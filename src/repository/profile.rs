use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::user::Profile;
use crate::repository::{ProfileRepository, RepoResult};

#[derive(Clone)]
pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileRepository for PgProfileStore {
    async fn insert(&self, profile: &Profile) -> RepoResult<()> {
        sqlx::query("INSERT INTO profiles (id, name, role) VALUES ($1, $2, $3)")
            .bind(profile.id)
            .bind(&profile.name)
            .bind(profile.role)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find(&self, id: Uuid) -> RepoResult<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>("SELECT id, name, role FROM profiles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(profile)
    }

    async fn delete(&self, id: Uuid) -> RepoResult<()> {
        sqlx::query("DELETE FROM profiles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
