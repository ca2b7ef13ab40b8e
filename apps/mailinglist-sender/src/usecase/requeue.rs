//! # 送信中エントリの再投入
//!
//! プロセスが送信途中で終了すると、エントリは送信中のまま残る。
//! 自動では回収せず、運用者が `requeue-stuck` サブコマンドで明示的に送信待ちへ戻す。

use chrono::TimeDelta;
use sitemail_domain::{clock::Clock, mailing_list::MailingList};
use sitemail_infra::repository::SendQueueRepository;
use sitemail_shared::{event_log::event, log_business_event};

use crate::error::SenderError;

/// 取得から `older_than` 以上経過した送信中エントリを送信待ちに戻す
///
/// 戻した件数を返す。
#[tracing::instrument(skip_all, fields(list = %list.name(), older_than_secs = older_than.num_seconds()))]
pub async fn requeue_stuck(
    queue: &dyn SendQueueRepository,
    clock: &dyn Clock,
    list: &MailingList,
    older_than: TimeDelta,
) -> Result<u64, SenderError> {
    let now = clock.now();
    let count = queue
        .requeue_stuck(list.id(), now - older_than, now)
        .await?;

    log_business_event!(
        event.category = event::category::MAILING_LIST,
        event.action = event::action::QUEUE_REQUEUED,
        event.entity_type = event::entity_type::MAILING_LIST,
        event.entity_id = %list.id(),
        event.result = event::result::SUCCESS,
        requeued = count,
        "送信中のまま残ったエントリを再投入しました"
    );

    Ok(count)
}
