//! 購読者（メーリングリストの宛先）

use super::MailingListId;

define_uuid_id! {
    /// 購読者 ID
    pub struct ListEntryId;
}

/// 購読者
///
/// このバッチからは読み取り専用。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    id: ListEntryId,
    list_id: MailingListId,
    email: String,
    name: Option<String>,
}

impl ListEntry {
    pub fn new(
        id: ListEntryId,
        list_id: MailingListId,
        email: impl Into<String>,
        name: Option<String>,
    ) -> Self {
        Self {
            id,
            list_id,
            email: email.into(),
            name,
        }
    }

    pub fn id(&self) -> &ListEntryId {
        &self.id
    }

    pub fn list_id(&self) -> &MailingListId {
        &self.list_id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}
