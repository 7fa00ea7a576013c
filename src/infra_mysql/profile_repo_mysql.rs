use super::util::downcast;
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use sqlx::{MySqlPool, Row};
use std::collections::HashMap;

pub struct MySqlProfileRepo {
    pool: MySqlPool,
}

impl MySqlProfileRepo {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlProfileRepo { pool }
    }
}

#[async_trait::async_trait]
impl ProfileRepo for MySqlProfileRepo {
    async fn get_id_by_username_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        username: &str,
    ) -> Result<ProfileId, ProfileError> {
        let tx = downcast(tx);

        if let Some(row) =
            sqlx::query("SELECT profile_id FROM profile WHERE username = ? AND is_active = 1")
                .bind(username)
                .fetch_optional(tx.conn())
                .await
                .map_err(|e| ProfileError::Store(format!("query profile_id: {e}")))?
        {
            return Ok(row.get::<ProfileId, _>("profile_id"));
        }

        Err(ProfileError::NotFound)
    }

    async fn get_summaries(
        &self,
        ids: &[ProfileId],
    ) -> Result<Vec<ProfileSummary>, ProfileError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            "SELECT profile_id, username FROM profile \
             WHERE profile_id IN ({placeholders}) AND is_active = 1"
        );

        let mut query = sqlx::query(&sql);
        for id in ids {
            query = query.bind(*id);
        }
        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ProfileError::Store(format!("query profile summaries: {e}")))?;

        let mut by_id: HashMap<ProfileId, ProfileSummary> = HashMap::with_capacity(rows.len());
        for row in rows {
            let summary = ProfileSummary {
                profile_id: row
                    .try_get::<ProfileId, _>("profile_id")
                    .map_err(|e| ProfileError::Store(format!("decode profile_id: {e}")))?,
                username: row
                    .try_get::<String, _>("username")
                    .map_err(|e| ProfileError::Store(format!("decode username: {e}")))?,
            };
            by_id.insert(summary.profile_id, summary);
        }

        // hand results back in the caller's order
        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }
}
