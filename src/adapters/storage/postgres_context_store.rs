//! PostgreSQL primary tier for learner contexts.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use sqlx::{PgPool, Row};

use crate::domain::foundation::LearnerId;
use crate::domain::learner::UserContext;
use crate::ports::{ContextTier, StoreOutcome, TierError, TierKind};

/// Column values of one `learner_contexts` row.
#[derive(Debug, Clone, PartialEq)]
struct ContextRow {
    learner_id: String,
    preferences: Value,
    skill_level: String,
    last_activity: String,
    recent_questions: Value,
    conversation_history: Value,
    session_data: Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ContextRow {
    fn from_context(context: &UserContext) -> Result<Self, TierError> {
        let mut doc =
            serde_json::to_value(context).map_err(|e| TierError::Serialization(e.to_string()))?;

        Ok(Self {
            learner_id: context.learner_id().to_string(),
            preferences: doc["preferences"].take(),
            skill_level: context.skill_level().as_str().to_string(),
            last_activity: context.last_activity_description().to_string(),
            recent_questions: doc["recentQuestions"].take(),
            conversation_history: doc["conversationHistory"].take(),
            session_data: doc["sessionData"].take(),
            created_at: *context.created_at().as_datetime(),
            updated_at: *context.last_updated().as_datetime(),
        })
    }

    fn from_pg_row(row: &sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            learner_id: row.try_get("learner_id")?,
            preferences: row.try_get("preferences")?,
            skill_level: row.try_get("skill_level")?,
            last_activity: row.try_get("last_activity")?,
            recent_questions: row.try_get("recent_questions")?,
            conversation_history: row.try_get("conversation_history")?,
            session_data: row.try_get("session_data")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_context(self, learner_id: &LearnerId) -> Result<UserContext, TierError> {
        let doc = json!({
            "learnerId": self.learner_id,
            "preferences": self.preferences,
            "skillLevel": self.skill_level,
            "lastActivityDescription": self.last_activity,
            "recentQuestions": self.recent_questions,
            "conversationHistory": self.conversation_history,
            "sessionData": self.session_data,
            "createdAt": self.created_at,
            "lastUpdated": self.updated_at,
        });
        serde_json::from_value(doc).map_err(|e| TierError::Corrupt {
            learner_id: learner_id.clone(),
            reason: e.to_string(),
        })
    }
}

/// PostgreSQL implementation of the primary context tier
///
/// Writes are conditional: a row is only replaced by a context whose
/// `lastUpdated` is not older than the stored `updated_at`.
pub struct PgContextStore {
    pool: PgPool,
}

impl PgContextStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply the bundled schema migrations.
    pub async fn migrate(&self) -> Result<(), TierError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| TierError::unavailable(TierKind::Primary, e))
    }
}

fn db_error(e: sqlx::Error) -> TierError {
    TierError::unavailable(TierKind::Primary, e)
}

#[async_trait]
impl ContextTier for PgContextStore {
    fn kind(&self) -> TierKind {
        TierKind::Primary
    }

    async fn load(&self, learner_id: &LearnerId) -> Result<Option<UserContext>, TierError> {
        let row = sqlx::query(
            r#"
            SELECT learner_id, preferences, skill_level, last_activity,
                   recent_questions, conversation_history, session_data,
                   created_at, updated_at
            FROM learner_contexts
            WHERE learner_id = $1
            "#,
        )
        .bind(learner_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        match row {
            Some(row) => {
                let row = ContextRow::from_pg_row(&row).map_err(|e| TierError::Corrupt {
                    learner_id: learner_id.clone(),
                    reason: e.to_string(),
                })?;
                row.into_context(learner_id).map(Some)
            }
            None => Ok(None),
        }
    }

    async fn store(&self, context: &UserContext) -> Result<StoreOutcome, TierError> {
        let row = ContextRow::from_context(context)?;

        let result = sqlx::query(
            r#"
            INSERT INTO learner_contexts (
                learner_id, preferences, skill_level, last_activity,
                recent_questions, conversation_history, session_data,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (learner_id) DO UPDATE SET
                preferences = EXCLUDED.preferences,
                skill_level = EXCLUDED.skill_level,
                last_activity = EXCLUDED.last_activity,
                recent_questions = EXCLUDED.recent_questions,
                conversation_history = EXCLUDED.conversation_history,
                session_data = EXCLUDED.session_data,
                updated_at = EXCLUDED.updated_at
            WHERE learner_contexts.updated_at <= EXCLUDED.updated_at
            "#,
        )
        .bind(&row.learner_id)
        .bind(&row.preferences)
        .bind(&row.skill_level)
        .bind(&row.last_activity)
        .bind(&row.recent_questions)
        .bind(&row.conversation_history)
        .bind(&row.session_data)
        .bind(row.created_at)
        .bind(row.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        if result.rows_affected() == 0 {
            Ok(StoreOutcome::KeptNewer)
        } else {
            Ok(StoreOutcome::Applied)
        }
    }

    async fn remove(&self, learner_id: &LearnerId) -> Result<(), TierError> {
        sqlx::query("DELETE FROM learner_contexts WHERE learner_id = $1")
            .bind(learner_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<LearnerId>, TierError> {
        let rows = sqlx::query("SELECT learner_id FROM learner_contexts ORDER BY learner_id")
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(rows
            .iter()
            .filter_map(|row| row.try_get::<String, _>("learner_id").ok())
            .filter_map(|id| LearnerId::new(id).ok())
            .collect())
    }
}
