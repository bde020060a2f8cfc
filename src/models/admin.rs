use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// The single administrator row. The hash is a PHC string (argon2id).
#[derive(Debug, Clone)]
pub struct AdminAccount {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub created_at: NaiveDateTime,
}

/// What a verified login or session token proves about the caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdminIdentity {
    pub id: i64,
    pub username: String,
}

impl From<&AdminAccount> for AdminIdentity {
    fn from(account: &AdminAccount) -> Self {
        Self {
            id: account.id,
            username: account.username.clone(),
        }
    }
}
