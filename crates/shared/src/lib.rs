//! # Sitemail 共有ユーティリティ
//!
//! 2 つのバッチ（メーリングリスト送信 / フォーラム通知）で共通に使う
//! ユーティリティを提供する。
//!
//! ## 設計方針
//!
//! - domain / infra / 各アプリから依存される
//! - ビジネスロジックを含まない純粋なユーティリティのみを配置
//! - 外部クレートへの依存は最小限に抑える

pub mod console;
pub mod event_log;
pub mod observability;

pub use console::{ConsoleReporter, StdoutReporter};
