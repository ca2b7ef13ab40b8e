//! フォーラムトピック

define_uuid_id! {
    /// トピック ID
    pub struct ForumTopicId;
}

/// フォーラムトピック
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForumTopic {
    id: ForumTopicId,
    title: String,
    full_link_name: String,
}

impl ForumTopic {
    pub fn new(id: ForumTopicId, title: impl Into<String>, full_link_name: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            full_link_name: full_link_name.into(),
        }
    }

    pub fn id(&self) -> &ForumTopicId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn full_link_name(&self) -> &str {
        &self.full_link_name
    }

    /// トピックの公開 URL（`{base_url}/discussions/{full_link_name}`）
    pub fn url(&self, base_url: &str) -> String {
        format!(
            "{}/discussions/{}",
            base_url.trim_end_matches('/'),
            self.full_link_name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urlはbase_urlとfull_link_nameから組み立てられる() {
        let topic = ForumTopic::new(ForumTopicId::new(), "TLS 1.3 の対応状況", "tls-13-status");

        assert_eq!(
            topic.url("https://tls.example.org"),
            "https://tls.example.org/discussions/tls-13-status"
        );
        assert_eq!(
            topic.url("https://tls.example.org/"),
            "https://tls.example.org/discussions/tls-13-status"
        );
    }
}
