//! # メーリングリスト送信バッチ
//!
//! 送信キューを空になるまで 1 件ずつ処理し、購読者ごとにパーソナライズした
//! キャンペーンメールを送信する。キューが空になったらキャンペーンの件数を集計し直す。
//!
//! ## モジュール構成
//!
//! - [`config`] - 環境変数からの設定読み込み
//! - [`error`] - バッチのエラー定義
//! - [`usecase`] - キュー処理（[`usecase::QueueDrainer`]）と再投入

pub mod config;
pub mod error;
pub mod usecase;

pub use error::SenderError;
