//! フォーラムユーザー

define_uuid_id! {
    /// ユーザー ID
    pub struct ForumUserId;
}

/// フォーラムユーザー
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForumUser {
    id: ForumUserId,
    username: String,
    email: String,
}

impl ForumUser {
    pub fn new(id: ForumUserId, username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            email: email.into(),
        }
    }

    pub fn id(&self) -> &ForumUserId {
        &self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}
