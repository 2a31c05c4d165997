use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::User;

const SESSION_TTL_DAYS: i64 = 30;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: Uuid,
    pub expires_at: DateTime<Utc>,
    pub user: User,
}

impl Session {
    pub fn new(user: User) -> Self {
        Self {
            token: Uuid::new_v4(),
            expires_at: Utc::now() + Duration::days(SESSION_TTL_DAYS),
            user,
        }
    }
}
