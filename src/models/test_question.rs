use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TestQuestion {
    pub id: Uuid,
    pub test_id: Uuid,
    pub question: String,
    pub created_at: Option<DateTime<Utc>>,
}
