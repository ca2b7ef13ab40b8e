//! # フォーラム通知バッチ
//!
//! cron などから定期実行され、フォーラム投稿の確認依頼とアクティビティメールを送る。
//! 進捗は stdout に 1 行ずつ出力する。
//!
//! 環境変数は [`config`](sitemail_forum_notifier::config) を参照。
//!
//! ## 起動方法
//!
//! ```bash
//! DATABASE_URL=postgres://... SITE_BASE_URL=https://polarssl.example.org \
//!   cargo run -p sitemail-forum-notifier
//! ```

use std::sync::Arc;

use anyhow::Context as _;
use clap::Parser;
use sitemail_domain::clock::SystemClock;
use sitemail_forum_notifier::{
    config::NotifierConfig,
    usecase::{ForumActivityUseCase, ForumTemplateRenderer},
};
use sitemail_infra::{
    db,
    mail::create_mail_sender,
    repository::{
        PostgresForumPostRepository,
        PostgresForumUserRepository,
        PostgresUserConfigRepository,
    },
};
use sitemail_shared::{
    StdoutReporter,
    observability::{TracingConfig, init_tracing},
};
use tracing::Instrument as _;

#[derive(Parser)]
#[command(name = "forum-notifier")]
#[command(about = "フォーラム投稿の通知メールを送る")]
#[command(version)]
struct Cli {}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // .env ファイルを読み込む（存在する場合）
    dotenvy::dotenv().ok();

    let tracing_config = TracingConfig::from_env("forum-notifier");
    init_tracing(&tracing_config);

    let _cli = Cli::parse();
    let span = tracing::info_span!("batch", job = %tracing_config.job_name);

    run().instrument(span).await
}

async fn run() -> anyhow::Result<()> {
    let config = NotifierConfig::from_env().context("設定の読み込みに失敗しました")?;

    let pool = db::create_pool(&config.database_url)
        .await
        .context("データベース接続に失敗しました")?;
    tracing::info!("データベースに接続しました");

    let renderer =
        ForumTemplateRenderer::new().context("通知テンプレートの読み込みに失敗しました")?;

    let usecase = ForumActivityUseCase::new(
        Arc::new(PostgresForumPostRepository::new(pool.clone())),
        Arc::new(PostgresForumUserRepository::new(pool.clone())),
        Arc::new(PostgresUserConfigRepository::new(pool)),
        create_mail_sender(&config.mail).await,
        renderer,
        Arc::new(StdoutReporter),
        Arc::new(SystemClock),
        config.base_url,
    );

    usecase
        .run()
        .await
        .context("フォーラム通知の実行を中断しました")?;

    Ok(())
}
