//! # ビジネスイベントログの構造化ヘルパー
//!
//! `jq` で調査しやすいよう、ログフィールドの命名規約とヘルパーマクロを提供する。
//!
//! [`log_business_event!`] マクロで出力すると `event.kind = "business_event"` が
//! 自動付与され、`jq 'select(.["event.kind"] == "business_event")'` でフィルタできる。
//!
//! フィールドはドット記法（`event.category`、`event.action`）。JSON 出力でフラットなキーになる。

/// ビジネスイベントを構造化ログとして出力する。
///
/// `event.kind = "business_event"` マーカーを自動付与し、
/// `tracing::info!` レベルで出力する。
///
/// ## 必須フィールド（慣例）
///
/// - `event.category`: [`event::category`] の定数
/// - `event.action`: [`event::action`] の定数
/// - `event.result`: [`event::result`] の定数
///
/// ## 推奨フィールド
///
/// - `event.entity_type`: [`event::entity_type`] の定数
/// - `event.entity_id`: エンティティ ID
#[macro_export]
macro_rules! log_business_event {
    ($($args:tt)*) => {
        ::tracing::info!(
            event.kind = "business_event",
            $($args)*
        )
    };
}

/// イベントフィールドの定数
pub mod event {
    /// イベントカテゴリ
    pub mod category {
        pub const MAILING_LIST: &str = "mailing_list";
        pub const FORUM: &str = "forum";
    }

    /// イベントアクション
    pub mod action {
        // メーリングリスト
        pub const CAMPAIGN_MAIL_SENT: &str = "campaign_mail.sent";
        pub const CAMPAIGN_MAIL_FAILED: &str = "campaign_mail.failed";
        pub const QUEUE_DRAINED: &str = "queue.drained";
        pub const QUEUE_REQUEUED: &str = "queue.requeued";
        pub const CAMPAIGNS_REFRESHED: &str = "campaigns.refreshed";

        // フォーラム
        pub const POST_AUTO_APPROVED: &str = "post.auto_approved";
        pub const MODERATION_MAIL_SENT: &str = "moderation_mail.sent";
        pub const MODERATION_MAIL_FAILED: &str = "moderation_mail.failed";
        pub const ACTIVITY_MAIL_SENT: &str = "activity_mail.sent";
        pub const ACTIVITY_MAIL_FAILED: &str = "activity_mail.failed";
    }

    /// エンティティ種別
    pub mod entity_type {
        pub const QUEUE_ENTRY: &str = "queue_entry";
        pub const CAMPAIGN: &str = "campaign";
        pub const MAILING_LIST: &str = "mailing_list";
        pub const FORUM_POST: &str = "forum_post";
    }

    /// イベント結果
    pub mod result {
        pub const SUCCESS: &str = "success";
        pub const FAILURE: &str = "failure";
    }
}

/// エラーコンテキストフィールドの定数
pub mod error {
    /// エラーカテゴリ
    pub mod category {
        /// インフラストラクチャ（DB）
        pub const INFRASTRUCTURE: &str = "infrastructure";
        /// 外部サービス呼び出し（SMTP、SES）
        pub const EXTERNAL_SERVICE: &str = "external_service";
    }

    /// エラー種別
    pub mod kind {
        pub const DATABASE: &str = "database";
        pub const TEMPLATE: &str = "template";
        pub const MAIL_TRANSPORT: &str = "mail_transport";
        pub const NOT_FOUND: &str = "not_found";
    }
}
