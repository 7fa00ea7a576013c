use super::util::{downcast, is_dup_key};
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlExecutor, MySqlPool, Row};

const RELATIONSHIP_COLUMNS: &str =
    "relationship_id, from_profile, to_profile, status, created_at";
const REQUEST_COLUMNS: &str = "request_id, from_profile, to_profile, status, created_at";

pub struct MySqlRelationshipRepo {
    pool: MySqlPool,
}

impl MySqlRelationshipRepo {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlRelationshipRepo { pool }
    }

    async fn query_relationship<'e, E: MySqlExecutor<'e>>(
        executor: E,
        from: ProfileId,
        to: ProfileId,
        status: RelationStatus,
    ) -> Result<Option<Relationship>, RelationError> {
        let row = sqlx::query(&format!(
            "SELECT {RELATIONSHIP_COLUMNS} FROM relationship \
             WHERE from_profile = ? AND to_profile = ? AND status = ?"
        ))
        .bind(from)
        .bind(to)
        .bind(status)
        .fetch_optional(executor)
        .await
        .map_err(|e| RelationError::Store(format!("select relationship: {e}")))?;

        row.map(|r| relationship_from_row(&r)).transpose()
    }

    async fn query_pending_request<'e, E: MySqlExecutor<'e>>(
        executor: E,
        from: ProfileId,
        to: ProfileId,
    ) -> Result<Option<FriendRequest>, RelationError> {
        let row = sqlx::query(&format!(
            "SELECT {REQUEST_COLUMNS} FROM friend_request \
             WHERE from_profile = ? AND to_profile = ? AND status = 'pending'"
        ))
        .bind(from)
        .bind(to)
        .fetch_optional(executor)
        .await
        .map_err(|e| RelationError::Store(format!("select pending request: {e}")))?;

        row.map(|r| request_from_row(&r)).transpose()
    }
}

fn relationship_from_row(row: &MySqlRow) -> Result<Relationship, RelationError> {
    Ok(Relationship {
        id: row
            .try_get::<RelationshipId, _>("relationship_id")
            .map_err(|e| RelationError::Store(format!("decode relationship_id: {e}")))?,
        created_at: row
            .try_get::<DateTime<Utc>, _>("created_at")
            .map_err(|e| RelationError::Store(format!("decode created_at: {e}")))?,
        from_profile: row
            .try_get::<ProfileId, _>("from_profile")
            .map_err(|e| RelationError::Store(format!("decode from_profile: {e}")))?,
        to_profile: row
            .try_get::<ProfileId, _>("to_profile")
            .map_err(|e| RelationError::Store(format!("decode to_profile: {e}")))?,
        status: row
            .try_get::<RelationStatus, _>("status")
            .map_err(|e| RelationError::Store(format!("decode status: {e}")))?,
    })
}

fn request_from_row(row: &MySqlRow) -> Result<FriendRequest, RelationError> {
    Ok(FriendRequest {
        id: row
            .try_get::<RequestId, _>("request_id")
            .map_err(|e| RelationError::Store(format!("decode request_id: {e}")))?,
        created_at: row
            .try_get::<DateTime<Utc>, _>("created_at")
            .map_err(|e| RelationError::Store(format!("decode created_at: {e}")))?,
        from_profile: row
            .try_get::<ProfileId, _>("from_profile")
            .map_err(|e| RelationError::Store(format!("decode from_profile: {e}")))?,
        to_profile: row
            .try_get::<ProfileId, _>("to_profile")
            .map_err(|e| RelationError::Store(format!("decode to_profile: {e}")))?,
        status: row
            .try_get::<RequestStatus, _>("status")
            .map_err(|e| RelationError::Store(format!("decode status: {e}")))?,
    })
}

#[async_trait::async_trait]
impl RelationshipRepo for MySqlRelationshipRepo {
    async fn find_relationship(
        &self,
        from: ProfileId,
        to: ProfileId,
        status: RelationStatus,
    ) -> Result<Option<Relationship>, RelationError> {
        Self::query_relationship(&self.pool, from, to, status).await
    }

    async fn find_relationship_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        from: ProfileId,
        to: ProfileId,
        status: RelationStatus,
    ) -> Result<Option<Relationship>, RelationError> {
        let tx = downcast(tx);
        Self::query_relationship(tx.conn(), from, to, status).await
    }

    async fn create_relationship_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        from: ProfileId,
        to: ProfileId,
        status: RelationStatus,
    ) -> Result<Relationship, RelationError> {
        let tx = downcast(tx);

        let relationship = Relationship {
            id: RelationshipId(uuid::Uuid::new_v4()),
            created_at: Utc::now(),
            from_profile: from,
            to_profile: to,
            status,
        };

        let res = sqlx::query(
            r#"
INSERT INTO relationship (relationship_id, from_profile, to_profile, status, created_at)
VALUES (?, ?, ?, ?, ?)
"#,
        )
        .bind(relationship.id)
        .bind(relationship.from_profile)
        .bind(relationship.to_profile)
        .bind(relationship.status)
        .bind(relationship.created_at)
        .execute(tx.conn())
        .await;

        match res {
            Ok(_) => Ok(relationship),
            Err(e) if is_dup_key(&e) => Err(RelationError::Conflict),
            Err(e) => Err(RelationError::Store(format!("insert relationship: {e}"))),
        }
    }

    async fn delete_relationship_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        from: ProfileId,
        to: ProfileId,
        status: RelationStatus,
    ) -> Result<(), RelationError> {
        let tx = downcast(tx);

        sqlx::query(
            "DELETE FROM relationship WHERE from_profile = ? AND to_profile = ? AND status = ?",
        )
        .bind(from)
        .bind(to)
        .bind(status)
        .execute(tx.conn())
        .await
        .map_err(|e| RelationError::Store(format!("delete relationship: {e}")))?;

        Ok(())
    }

    async fn list_relationships(
        &self,
        profile: ProfileId,
        direction: Direction,
        status: RelationStatus,
    ) -> Result<Vec<Relationship>, RelationError> {
        let anchor = match direction {
            Direction::Outgoing => "from_profile",
            Direction::Incoming => "to_profile",
        };
        let rows = sqlx::query(&format!(
            "SELECT {RELATIONSHIP_COLUMNS} FROM relationship \
             WHERE {anchor} = ? AND status = ? \
             ORDER BY created_at DESC"
        ))
        .bind(profile)
        .bind(status)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RelationError::Store(format!("list relationships: {e}")))?;

        rows.iter().map(relationship_from_row).collect()
    }

    async fn find_pending_request(
        &self,
        from: ProfileId,
        to: ProfileId,
    ) -> Result<Option<FriendRequest>, RelationError> {
        Self::query_pending_request(&self.pool, from, to).await
    }

    async fn find_pending_request_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        from: ProfileId,
        to: ProfileId,
    ) -> Result<Option<FriendRequest>, RelationError> {
        let tx = downcast(tx);
        Self::query_pending_request(tx.conn(), from, to).await
    }

    async fn create_request_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        from: ProfileId,
        to: ProfileId,
    ) -> Result<FriendRequest, RelationError> {
        let tx = downcast(tx);

        let request = FriendRequest {
            id: RequestId(uuid::Uuid::new_v4()),
            created_at: Utc::now(),
            from_profile: from,
            to_profile: to,
            status: RequestStatus::Pending,
        };

        // the pending_guard generated column turns a second pending row for
        // the pair into ER_DUP_ENTRY
        let res = sqlx::query(
            r#"
INSERT INTO friend_request (request_id, from_profile, to_profile, status, created_at)
VALUES (?, ?, ?, 'pending', ?)
"#,
        )
        .bind(request.id)
        .bind(request.from_profile)
        .bind(request.to_profile)
        .bind(request.created_at)
        .execute(tx.conn())
        .await;

        match res {
            Ok(_) => Ok(request),
            Err(e) if is_dup_key(&e) => Err(RelationError::Conflict),
            Err(e) => Err(RelationError::Store(format!("insert friend request: {e}"))),
        }
    }

    async fn set_request_status_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        request_id: RequestId,
        status: RequestStatus,
    ) -> Result<(), RelationError> {
        let tx = downcast(tx);

        let res = sqlx::query(
            "UPDATE friend_request SET status = ? WHERE request_id = ? AND status = 'pending'",
        )
        .bind(status)
        .bind(request_id)
        .execute(tx.conn())
        .await
        .map_err(|e| RelationError::Store(format!("update request status: {e}")))?;

        if res.rows_affected() > 0 {
            return Ok(());
        }

        // nothing matched: the row is either gone or already resolved
        let row = sqlx::query("SELECT status FROM friend_request WHERE request_id = ?")
            .bind(request_id)
            .fetch_optional(tx.conn())
            .await
            .map_err(|e| RelationError::Store(format!("select request status: {e}")))?;

        match row {
            None => Err(RelationError::NotFound),
            Some(_) => Err(RelationError::InvalidTransition),
        }
    }

    async fn list_requests(
        &self,
        profile: ProfileId,
        direction: Direction,
        status: RequestStatus,
    ) -> Result<Vec<FriendRequest>, RelationError> {
        let anchor = match direction {
            Direction::Outgoing => "from_profile",
            Direction::Incoming => "to_profile",
        };
        let rows = sqlx::query(&format!(
            "SELECT {REQUEST_COLUMNS} FROM friend_request \
             WHERE {anchor} = ? AND status = ? \
             ORDER BY created_at DESC"
        ))
        .bind(profile)
        .bind(status)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RelationError::Store(format!("list friend requests: {e}")))?;

        rows.iter().map(request_from_row).collect()
    }
}
