//! # ユースケース層
//!
//! - [`ForumActivityUseCase`]: 通知・キュー確認・アクティビティ送信の 3 フェーズ
//! - [`ForumTemplateRenderer`]: 通知メールの生成

mod activity;
mod template_renderer;

pub use activity::{ActivitySummary, ForumActivityUseCase};
pub use template_renderer::{ForumMail, ForumTemplateRenderer};
