use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Notify;

use exam_client::{ApiError, InMemoryBackend, QuestionBank, fixture_question};
use exam_core::model::{
    BankOption, BankQuestion, ExportQuestion, OptionId, Page, QuestionFilter, QuestionId,
};
use exam_core::time::fixed_now;
use services::{
    BankError, QuestionBankService, apply_score_to_question, apply_score_update,
};

fn bank_with(count: u64) -> Arc<InMemoryBackend> {
    let bank = (1..=count)
        .map(|id| fixture_question(id, if id % 2 == 0 { "TEKNIS" } else { "MANAJERIAL" }))
        .collect();
    Arc::new(InMemoryBackend::new(fixed_now(), bank))
}

#[tokio::test]
async fn page_two_of_twenty_five_items() {
    let service = QuestionBankService::new(bank_with(25));
    let filter = QuestionFilter::new().with_limit(10).with_page(2);

    let page = service.questions(&filter).await.unwrap().expect("latest");
    assert_eq!(page.items.len(), 10);
    assert_eq!(page.items[0].id, QuestionId::new(11));
    assert_eq!(page.items[9].id, QuestionId::new(20));
    assert_eq!(page.meta.total_pages, 3);
}

#[tokio::test]
async fn score_update_reflects_in_list_detail_and_refetch() {
    let backend = bank_with(5);
    let service = QuestionBankService::new(backend.clone());

    let filter = QuestionFilter::new();
    let mut list = service
        .questions(&filter)
        .await
        .unwrap()
        .expect("latest")
        .items;
    let mut detail = list[1].clone();
    let target = detail.options[0].clone();

    let confirmed = service
        .update_option_score(detail.id, target.id, 7)
        .await
        .unwrap();
    apply_score_update(&mut list, &confirmed);
    apply_score_to_question(&mut detail, &confirmed);

    assert_eq!(list[1].options[0].score, 7);
    assert_eq!(detail.options[0].score, 7);

    // A later fetch agrees with the applied value.
    let refetched = service
        .questions(&filter)
        .await
        .unwrap()
        .expect("latest")
        .items;
    assert_eq!(refetched[1].options[0].score, 7);
}

#[tokio::test]
async fn out_of_range_score_never_reaches_the_backend() {
    let service = QuestionBankService::new(bank_with(1));
    let err = service
        .update_option_score(QuestionId::new(1), OptionId::new(11), 42)
        .await
        .unwrap_err();
    assert!(matches!(err, BankError::Score(_)));
}

#[tokio::test]
async fn export_serializes_the_filtered_bank() {
    let service = QuestionBankService::new(bank_with(3));
    let json = service.export_json(Some("MANAJERIAL"), None).await.unwrap();
    let parsed: Vec<ExportQuestion> = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.len(), 2);
    assert_eq!(parsed[0].id, "1");
    assert!(parsed.iter().all(|q| q.category == "MANAJERIAL"));
}

/// Wrapper that parks queries whose search term is "slow" until released,
/// so a newer query can overtake an older one.
struct StallingBank {
    inner: Arc<InMemoryBackend>,
    started: Notify,
    release: Notify,
}

#[async_trait]
impl QuestionBank for StallingBank {
    async fn questions(&self, filter: &QuestionFilter) -> Result<Page<BankQuestion>, ApiError> {
        if filter.search.as_deref() == Some("slow") {
            self.started.notify_one();
            self.release.notified().await;
        }
        self.inner.questions(filter).await
    }

    async fn categories(&self) -> Result<Vec<String>, ApiError> {
        self.inner.categories().await
    }

    async fn update_option_score(
        &self,
        question: QuestionId,
        option: OptionId,
        score: u32,
    ) -> Result<BankOption, ApiError> {
        self.inner.update_option_score(question, option, score).await
    }

    async fn export_questions(
        &self,
        category: Option<&str>,
        search: Option<&str>,
    ) -> Result<Vec<ExportQuestion>, ApiError> {
        self.inner.export_questions(category, search).await
    }
}

#[tokio::test]
async fn stale_response_is_discarded_when_a_newer_query_overtakes_it() {
    let stalling = Arc::new(StallingBank {
        inner: bank_with(8),
        started: Notify::new(),
        release: Notify::new(),
    });
    let service = Arc::new(QuestionBankService::new(stalling.clone()));

    let slow_filter = QuestionFilter::new().with_search(Some("slow".to_string()));
    let slow = tokio::spawn({
        let service = service.clone();
        async move { service.questions(&slow_filter).await }
    });

    // Wait until the slow query has taken its ticket, then overtake it.
    stalling.started.notified().await;
    let fresh = service
        .questions(&QuestionFilter::new())
        .await
        .unwrap()
        .expect("newest query applies");
    assert_eq!(fresh.meta.total_items, 8);

    stalling.release.notify_one();
    let stale = slow.await.unwrap().unwrap();
    assert!(stale.is_none(), "stale response must be discarded");
}
