//! # フォーラムのユーザー設定
//!
//! ユーザー単位の設定値（モジュール `forum`）のうち、通知に関わるもの。
//! 値は文字列で保存され、`"1"` のときのみ有効とみなす（未設定は `"0"`）。

use strum::IntoStaticStr;

/// フォーラム設定値のモジュール名
pub const FORUM_CONFIG_MODULE: &str = "forum";

/// 通知に関わるユーザー設定
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ForumPreference {
    /// 投稿者: モデレーションを経ずにアクティビティ送信へ回す
    AutomaticSend,
    /// モデレーター: 新規投稿の通知を受け取る
    NotifyNewPosts,
    /// 購読者: 新しいアクティビティのメールを受け取る
    ReceiveActivity,
}

impl ForumPreference {
    /// 設定値のキー名
    pub fn key(self) -> &'static str {
        self.into()
    }

    /// 保存値が有効（`"1"`）かどうか
    pub fn is_enabled(value: Option<&str>) -> bool {
        value.unwrap_or("0") == "1"
    }
}
