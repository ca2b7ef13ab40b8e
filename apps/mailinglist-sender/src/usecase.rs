//! # ユースケース層
//!
//! - [`QueueDrainer`]: 送信キューを空になるまで処理する
//! - [`CampaignRenderer`]: キャンペーン本文を購読者ごとにパーソナライズする
//! - [`DeliveryPolicy`]: 送信失敗時の振る舞い（中断 / 失敗にして続行）
//! - [`requeue_stuck`]: 送信中のまま残ったエントリを運用者が再投入する

mod campaign_renderer;
mod delivery_policy;
mod drain;
mod requeue;

pub use campaign_renderer::CampaignRenderer;
pub use delivery_policy::{DeliveryPolicy, FailureAction};
pub use drain::{DrainSummary, QueueDrainer};
pub use requeue::requeue_stuck;
