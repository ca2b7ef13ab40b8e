//! # メーリングリスト送信バッチ
//!
//! cron などから定期実行され、指定したメーリングリストの送信キューを空になるまで処理する。
//!
//! ## サブコマンド
//!
//! | コマンド | 説明 |
//! |----------|------|
//! | `drain`（デフォルト） | 送信キューを処理し、キャンペーンの件数を集計し直す |
//! | `requeue-stuck --older-than-secs N` | 取得から N 秒以上経過した送信中エントリを送信待ちに戻す |
//!
//! 環境変数は [`config`](sitemail_mailinglist_sender::config) を参照。
//!
//! ## 起動方法
//!
//! ```bash
//! DATABASE_URL=postgres://... MAILING_LIST_NAME=polarssl \
//!   cargo run -p sitemail-mailinglist-sender
//! ```
//!
//! 配信に失敗して中断した場合は終了コード 1 で終了する。

use std::sync::Arc;

use anyhow::Context as _;
use chrono::TimeDelta;
use clap::{Parser, Subcommand};
use sitemail_domain::clock::SystemClock;
use sitemail_infra::{
    db,
    mail::create_mail_sender,
    repository::{
        MailingListRepository,
        PostgresCampaignRepository,
        PostgresListEntryRepository,
        PostgresMailingListRepository,
        PostgresSendQueueRepository,
    },
};
use sitemail_mailinglist_sender::{
    SenderError,
    config::SenderConfig,
    usecase::{CampaignRenderer, QueueDrainer, requeue_stuck},
};
use sitemail_shared::{
    StdoutReporter,
    observability::{TracingConfig, init_tracing},
};
use tracing::Instrument as _;

#[derive(Parser)]
#[command(name = "mailinglist-sender")]
#[command(about = "メーリングリストの送信キューを処理する")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// 送信キューを空になるまで処理する
    Drain,

    /// 送信中のまま残ったエントリを送信待ちに戻す
    RequeueStuck {
        /// 取得からの経過秒数がこれ以上のエントリを対象にする
        #[arg(long)]
        older_than_secs: u32,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // .env ファイルを読み込む（存在する場合）
    dotenvy::dotenv().ok();

    let tracing_config = TracingConfig::from_env("mailinglist-sender");
    init_tracing(&tracing_config);

    let cli = Cli::parse();
    let span = tracing::info_span!("batch", job = %tracing_config.job_name);

    run(cli.command.unwrap_or(Command::Drain)).instrument(span).await
}

async fn run(command: Command) -> anyhow::Result<()> {
    let config = SenderConfig::from_env().context("設定の読み込みに失敗しました")?;

    let pool = db::create_pool(&config.database_url)
        .await
        .context("データベース接続に失敗しました")?;
    tracing::info!("データベースに接続しました");

    let list = PostgresMailingListRepository::new(pool.clone())
        .find_by_name(&config.list_name)
        .await?
        .ok_or_else(|| SenderError::ListNotFound(config.list_name.clone()))?;

    let queue = Arc::new(PostgresSendQueueRepository::new(pool.clone()));
    let clock = Arc::new(SystemClock);

    match command {
        Command::Drain => {
            let drainer = QueueDrainer::new(
                queue,
                Arc::new(PostgresCampaignRepository::new(pool.clone())),
                Arc::new(PostgresListEntryRepository::new(pool)),
                create_mail_sender(&config.mail).await,
                CampaignRenderer::new(config.base_url.clone()),
                Arc::new(StdoutReporter),
                clock,
                config.policy,
            );

            let summary = drainer
                .drain(&list)
                .await
                .context("送信キューの処理を中断しました")?;
            tracing::info!(
                sent = summary.sent,
                failed = summary.failed,
                completed = summary.completed,
                "送信キューの処理が完了しました"
            );
        }
        Command::RequeueStuck { older_than_secs } => {
            let older_than = TimeDelta::seconds(i64::from(older_than_secs));
            let count = requeue_stuck(queue.as_ref(), clock.as_ref(), &list, older_than).await?;
            tracing::info!(count, "送信中のエントリを再投入しました");
        }
    }

    Ok(())
}
