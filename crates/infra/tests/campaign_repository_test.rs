//! CampaignRepository 統合テスト
//!
//! 実行方法:
//! ```bash
//! DATABASE_URL=postgres://localhost/sitemail \
//!   cargo test -p sitemail-infra --test campaign_repository_test
//! ```

mod common;

use common::{insert_campaign, insert_entry, insert_list, insert_queue_entry, test_now};
use pretty_assertions::assert_eq;
use sitemail_domain::mailing_list::CampaignStatus;
use sitemail_infra::repository::{CampaignRefresh, CampaignRepository, PostgresCampaignRepository};
use sqlx::PgPool;

#[sqlx::test(migrations = "../../migrations")]
async fn test_未処理が残っていないキャンペーンは完了になる(pool: PgPool) {
    let list_id = insert_list(&pool, "news").await;
    let campaign_id = insert_campaign(&pool, &list_id, "October", "sending").await;
    let alice = insert_entry(&pool, &list_id, "alice@example.com", None).await;
    let bob = insert_entry(&pool, &list_id, "bob@example.com", None).await;
    insert_queue_entry(&pool, &list_id, &campaign_id, &alice, "sent", 1).await;
    insert_queue_entry(&pool, &list_id, &campaign_id, &bob, "failed", 2).await;
    let sut = PostgresCampaignRepository::new(pool);
    let now = test_now();

    let result = sut.refresh_bookkeeping(&list_id, now).await.unwrap();

    assert_eq!(result, CampaignRefresh { refreshed: 1, completed: 1 });
    let campaign = sut.find_by_id(&campaign_id).await.unwrap().unwrap();
    assert_eq!(campaign.status(), CampaignStatus::Completed);
    assert_eq!(campaign.sent_count(), 1);
    assert_eq!(campaign.failed_count(), 1);
    assert_eq!(campaign.completed_at(), Some(now));
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_未処理が残っているキャンペーンは送信中のまま件数だけ更新される(pool: PgPool) {
    let list_id = insert_list(&pool, "news").await;
    let campaign_id = insert_campaign(&pool, &list_id, "October", "sending").await;
    let alice = insert_entry(&pool, &list_id, "alice@example.com", None).await;
    let bob = insert_entry(&pool, &list_id, "bob@example.com", None).await;
    insert_queue_entry(&pool, &list_id, &campaign_id, &alice, "sent", 1).await;
    insert_queue_entry(&pool, &list_id, &campaign_id, &bob, "pending", 2).await;
    let sut = PostgresCampaignRepository::new(pool);

    let result = sut.refresh_bookkeeping(&list_id, test_now()).await.unwrap();

    assert_eq!(result, CampaignRefresh { refreshed: 1, completed: 0 });
    let campaign = sut.find_by_id(&campaign_id).await.unwrap().unwrap();
    assert_eq!(campaign.status(), CampaignStatus::Sending);
    assert_eq!(campaign.sent_count(), 1);
    assert_eq!(campaign.completed_at(), None);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_下書きと完了済みのキャンペーンは集計対象外(pool: PgPool) {
    let list_id = insert_list(&pool, "news").await;
    insert_campaign(&pool, &list_id, "Draft", "draft").await;
    insert_campaign(&pool, &list_id, "Done", "completed").await;
    let sut = PostgresCampaignRepository::new(pool);

    let result = sut.refresh_bookkeeping(&list_id, test_now()).await.unwrap();

    assert_eq!(result, CampaignRefresh::default());
}
