//! # メーリングリスト
//!
//! メーリングリストのキャンペーン配信に関するドメインモデルを定義する。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 | 説明 |
//! |---|------------|------|
//! | [`MailingList`] | メーリングリスト | 名前で識別される配信先の集合 |
//! | [`Campaign`] | キャンペーン | 多数の購読者に送る件名 + 本文テンプレート |
//! | [`ListEntry`] | 購読者 | メーリングリストの宛先（メールアドレス） |
//! | [`QueueEntry`] | 送信キューエントリ | 「このキャンペーンをこの購読者に送る」1 件の作業 |
//!
//! ## 送信キューの状態遷移
//!
//! ```text
//! pending ──claim──→ sending ──→ sent
//!    ↑                  │
//!    └────requeue───────┤
//!                       └──────→ failed
//! ```
//!
//! キューエントリの作成はキャンペーンのスケジューリング側が行い、
//! このクレートを使うバッチは削除しない。

mod campaign;
mod entry;
mod list;
mod queue;

pub use campaign::{
    Campaign,
    CampaignId,
    CampaignRecord,
    CampaignStatus,
    NewCampaign,
    QueueStats,
};
pub use entry::{ListEntry, ListEntryId};
pub use list::{MailingList, MailingListId};
pub use queue::{NewQueueEntry, QueueEntry, QueueEntryId, QueueEntryRecord, QueueStatus};
