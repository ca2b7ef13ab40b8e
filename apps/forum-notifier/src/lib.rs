//! # フォーラム通知バッチ
//!
//! フォーラム投稿の通知状態を進めながらメールを送る。
//!
//! 1. 新規投稿をモデレーターに通知する（自動送信ユーザーの投稿は承認済みにする）
//! 2. モデレーション待ちの投稿を一覧表示する
//! 3. 承認済みの投稿をアクティビティとして購読者に送る
//!
//! ## モジュール構成
//!
//! - [`config`] - 環境変数からの設定読み込み
//! - [`error`] - バッチのエラー定義
//! - [`usecase`] - 3 フェーズの実行（[`usecase::ForumActivityUseCase`]）

pub mod config;
pub mod error;
pub mod usecase;

pub use error::NotifierError;
