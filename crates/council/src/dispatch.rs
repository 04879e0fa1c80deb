//! Fan-out of one conversation to every council member.

use crate::model::{BatchResult, DetailedBatchResult, Message, QueryError, QueryResult};
use crate::providers::ModelBackend;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Queries a set of models concurrently through one backend.
pub struct Council<B> {
    backend: Arc<B>,
}

impl<B: ModelBackend + 'static> Council<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    /// Share a backend that is also used elsewhere.
    pub fn from_shared(backend: Arc<B>) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Ask every model the same conversation.
    ///
    /// Returns one entry per distinct model identifier; `None` marks a model
    /// whose query failed. Failures are logged and never affect other models.
    pub async fn query_all<S: AsRef<str>>(
        &self,
        models: &[S],
        messages: &[Message],
    ) -> BatchResult {
        self.query_all_detailed(models, messages)
            .await
            .into_iter()
            .map(|(model, outcome)| (model, outcome.ok()))
            .collect()
    }

    /// Like [`query_all`](Self::query_all), keeping the failure cause per model.
    ///
    /// One task is spawned per identifier, duplicates included, and all of
    /// them are joined before returning. When an identifier repeats, the
    /// outcome of its last occurrence in `models` is kept.
    pub async fn query_all_detailed<S: AsRef<str>>(
        &self,
        models: &[S],
        messages: &[Message],
    ) -> DetailedBatchResult {
        let messages: Arc<[Message]> = Arc::from(messages);
        info!(models = models.len(), messages = messages.len(), "querying council");

        let mut tasks = JoinSet::new();
        for (index, model) in models.iter().enumerate() {
            let backend = Arc::clone(&self.backend);
            let messages = Arc::clone(&messages);
            let model = model.as_ref().to_string();
            tasks.spawn(async move {
                let outcome = backend.call(&model, &messages).await;
                (index, outcome)
            });
        }

        let mut outcomes: Vec<Option<Result<QueryResult, QueryError>>> = vec![None; models.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, outcome)) => outcomes[index] = Some(outcome),
                Err(e) => warn!(error = %e, "council task did not complete"),
            }
        }

        let mut batch = DetailedBatchResult::with_capacity(models.len());
        for (model, outcome) in models.iter().zip(outcomes) {
            let model = model.as_ref();
            let outcome = outcome
                .unwrap_or_else(|| Err(QueryError::Task("panicked or cancelled".into())));
            match &outcome {
                Ok(_) => debug!(model, "model answered"),
                Err(e) => warn!(model, error = %e, "error querying model"),
            }
            batch.insert(model.to_string(), outcome);
        }

        let answered = batch.values().filter(|outcome| outcome.is_ok()).count();
        info!(answered, failed = batch.len() - answered, "council finished");
        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{Duration, Instant};

    type Reply = (Duration, Result<QueryResult, QueryError>);

    /// Backend with a fixed reply (after a delay) per model.
    #[derive(Default)]
    struct Scripted {
        replies: HashMap<String, Reply>,
        calls: AtomicUsize,
    }

    impl Scripted {
        fn reply(
            mut self,
            model: &str,
            delay_ms: u64,
            outcome: Result<QueryResult, QueryError>,
        ) -> Self {
            self.replies.insert(
                model.to_string(),
                (Duration::from_millis(delay_ms), outcome),
            );
            self
        }
    }

    impl ModelBackend for Scripted {
        async fn call(
            &self,
            model: &str,
            messages: &[Message],
        ) -> Result<QueryResult, QueryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if model == "panics" {
                panic!("backend bug");
            }
            let (delay, outcome) = self.replies.get(model).cloned().unwrap_or_else(|| {
                let echo = format!("{model} saw {}", messages.len());
                (Duration::ZERO, Ok(QueryResult::text(echo)))
            });
            tokio::time::sleep(delay).await;
            outcome
        }
    }

    /// First call answers slowly; every later call fails at once.
    #[derive(Default)]
    struct SlowFirst {
        calls: AtomicUsize,
    }

    impl ModelBackend for SlowFirst {
        async fn call(
            &self,
            _model: &str,
            _messages: &[Message],
        ) -> Result<QueryResult, QueryError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                tokio::time::sleep(Duration::from_millis(200)).await;
                Ok(QueryResult::text("first"))
            } else {
                Err(QueryError::NoOutputText)
            }
        }
    }

    fn hi() -> Vec<Message> {
        vec![Message::user("hi")]
    }

    #[tokio::test]
    async fn every_model_gets_an_entry() {
        let council = Council::new(
            Scripted::default()
                .reply("a", 0, Ok(QueryResult::text("A")))
                .reply("b", 0, Err(QueryError::NoOutputText)),
        );

        let batch = council.query_all(&["a", "b", "c"], &hi()).await;

        assert_eq!(batch.len(), 3);
        assert_eq!(batch["a"], Some(QueryResult::text("A")));
        assert_eq!(batch["b"], None);
        assert_eq!(batch["c"], Some(QueryResult::text("c saw 1")));
    }

    #[tokio::test]
    async fn duplicates_collapse_to_one_entry() {
        let council = Council::new(Scripted::default());

        let batch = council.query_all(&["a", "b", "a", "a"], &hi()).await;

        assert_eq!(batch.len(), 2);
        // Duplicates are not deduplicated before dispatch.
        assert_eq!(council.backend().calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn last_occurrence_wins_even_when_it_finishes_first() {
        let backend = Arc::new(SlowFirst::default());
        let council = Council::from_shared(Arc::clone(&backend));

        let batch = council.query_all_detailed(&["x", "x"], &hi()).await;

        assert_eq!(batch.len(), 1);
        assert_eq!(batch["x"], Err(QueryError::NoOutputText));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn empty_council_is_empty_batch() {
        let council = Council::new(Scripted::default());
        let batch = council.query_all::<&str>(&[], &hi()).await;
        assert!(batch.is_empty());
    }

    #[tokio::test]
    async fn detailed_keeps_failure_cause() {
        let council = Council::new(Scripted::default().reply(
            "slow",
            0,
            Err(QueryError::Timeout(Duration::from_secs(120))),
        ));

        let batch = council.query_all_detailed(&["slow", "fast"], &hi()).await;

        assert_eq!(batch["slow"], Err(QueryError::Timeout(Duration::from_secs(120))));
        assert!(batch["fast"].is_ok());
    }

    #[tokio::test]
    async fn panicking_task_is_isolated() {
        let council = Council::new(Scripted::default());

        let batch = council.query_all_detailed(&["panics", "ok"], &hi()).await;

        assert!(matches!(batch["panics"], Err(QueryError::Task(_))));
        assert_eq!(batch["ok"], Ok(QueryResult::text("ok saw 1")));
    }

    #[tokio::test]
    async fn latency_is_bounded_by_slowest_call() {
        let council = Council::new(
            Scripted::default()
                .reply("a", 300, Err(QueryError::Timeout(Duration::from_millis(300))))
                .reply("b", 300, Ok(QueryResult::text("B"))),
        );

        let started = Instant::now();
        let batch = council.query_all(&["a", "b"], &hi()).await;
        let elapsed = started.elapsed();

        assert_eq!(batch["a"], None);
        assert_eq!(batch["b"], Some(QueryResult::text("B")));
        assert!(elapsed < Duration::from_millis(550), "took {elapsed:?}");
    }
}
