//! # ドメイン層エラー定義
//!
//! ビジネスルール違反やドメイン固有の例外状態を表現するエラー型。
//!
//! ## 設計方針
//!
//! - **型による分類**: エラーの種類を列挙型で明示し、パターンマッチで処理可能に
//! - **thiserror 活用**: `#[error(...)]` マクロでエラーメッセージを自動生成
//!
//! ## 使用例
//!
//! ```rust
//! use sitemail_domain::DomainError;
//!
//! fn find_campaign(id: &str) -> Result<(), DomainError> {
//!     Err(DomainError::NotFound {
//!         entity_type: "Campaign",
//!         id:          id.to_string(),
//!     })
//! }
//!
//! assert!(find_campaign("c-1").is_err());
//! ```

use thiserror::Error;

/// ドメイン層で発生するエラー
#[derive(Debug, Error)]
pub enum DomainError {
    /// バリデーションエラー
    ///
    /// 不正な値の復元や、許可されていない状態遷移で使用する。
    #[error("バリデーションエラー: {0}")]
    Validation(String),

    /// エンティティが見つからない
    ///
    /// キューエントリが参照するキャンペーンや購読者が存在しない場合など。
    #[error("{entity_type} が見つかりません: {id}")]
    NotFound {
        /// エンティティの種類（"Campaign", "ListEntry" など）
        entity_type: &'static str,
        /// 検索に使用した識別子
        id:          String,
    },

    /// 競合エラー
    ///
    /// 条件付き更新で、期待した状態と DB 上の状態が一致しなかった場合に使用する。
    #[error("競合が発生しました: {0}")]
    Conflict(String),
}
