//! メーリングリスト

use chrono::{DateTime, Utc};

define_uuid_id! {
    /// メーリングリスト ID
    pub struct MailingListId;
}

/// メーリングリスト
///
/// バッチ起動時に名前（例: `polarssl`）で解決し、以降のキュー操作はこの ID で絞り込む。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailingList {
    id: MailingListId,
    name: String,
    created_at: DateTime<Utc>,
}

impl MailingList {
    pub fn from_db(id: MailingListId, name: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name,
            created_at,
        }
    }

    pub fn id(&self) -> &MailingListId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
