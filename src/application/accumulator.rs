use std::sync::Arc;

use tracing::debug;

use crate::core::{
    config::AccumulationPolicy,
    domain::{NameSet, Prompt, normalize_candidate},
    error::{Error, Result},
    ports::{CompletionClient, CompletionRequest},
};

/// Names collected by a finished accumulation run.
#[derive(Debug, Clone, PartialEq)]
pub struct Accumulation {
    pub names: Vec<String>,
    pub attempts: usize,
}

/// Calls the completion provider until enough distinct names are collected.
///
/// Calls are sequential: each batch asks only for the remaining deficit, so
/// its size depends on everything merged before it. Only calls that add no new
/// name count toward `max_attempts`; a productive call resets the count. Any
/// provider error aborts the run and discards the partial set.
pub struct UniqueNameAccumulator {
    client: Arc<dyn CompletionClient>,
    policy: AccumulationPolicy,
}

impl UniqueNameAccumulator {
    pub fn new(client: Arc<dyn CompletionClient>, policy: AccumulationPolicy) -> Self {
        Self { client, policy }
    }

    pub async fn accumulate(&self, prompt: &Prompt, target: usize) -> Result<Accumulation> {
        let mut names = NameSet::new();
        let mut attempts = 0;
        let mut stalled = 0;

        while names.len() < target {
            if stalled >= self.policy.max_attempts {
                return Err(Error::Exhausted {
                    collected: names.len(),
                    target,
                    attempts,
                });
            }

            let samples = self.policy.batch_size(target - names.len());
            attempts += 1;
            let request = CompletionRequest {
                prompt: prompt.as_str().to_string(),
                samples,
                temperature: self.policy.temperature,
            };
            let candidates = self.client.complete(&request).await?;

            let before = names.len();
            for candidate in &candidates {
                if names.len() == target {
                    break;
                }
                if let Some(name) = normalize_candidate(candidate) {
                    names.insert(name);
                }
            }

            let added = names.len() - before;
            if added == 0 {
                stalled += 1;
            } else {
                stalled = 0;
            }

            debug!(
                provider = self.client.provider(),
                attempt = attempts,
                requested = samples,
                received = candidates.len(),
                added,
                stalled,
                collected = names.len(),
                target,
                "merged completion batch"
            );
        }

        Ok(Accumulation {
            names: names.into_vec(),
            attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::{collections::VecDeque, sync::Mutex};

    /// Replays scripted batches and records requested sample counts.
    struct ScriptedClient {
        batches: Mutex<VecDeque<Result<Vec<String>>>>,
        requested: Mutex<Vec<usize>>,
        fallback: Option<Vec<String>>,
    }

    impl ScriptedClient {
        fn new(batches: Vec<Result<Vec<&str>>>) -> Self {
            let batches = batches
                .into_iter()
                .map(|batch| batch.map(|names| names.into_iter().map(String::from).collect()))
                .collect();
            Self {
                batches: Mutex::new(batches),
                requested: Mutex::new(Vec::new()),
                fallback: None,
            }
        }

        fn repeating(names: &[&str]) -> Self {
            Self {
                batches: Mutex::new(VecDeque::new()),
                requested: Mutex::new(Vec::new()),
                fallback: Some(names.iter().map(|n| n.to_string()).collect()),
            }
        }

        fn requested(&self) -> Vec<usize> {
            self.requested.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CompletionClient for ScriptedClient {
        async fn complete(&self, request: &CompletionRequest) -> Result<Vec<String>> {
            self.requested.lock().unwrap().push(request.samples);
            match self.batches.lock().unwrap().pop_front() {
                Some(batch) => batch,
                None => Ok(self.fallback.clone().expect("script exhausted")),
            }
        }

        fn provider(&self) -> &str {
            "scripted"
        }
    }

    fn prompt() -> Prompt {
        Prompt::new("Animal: Dog\nName:")
    }

    #[tokio::test]
    async fn collects_distinct_names_in_first_seen_order() {
        let client = Arc::new(ScriptedClient::new(vec![
            Ok(vec![
                "Ruff the Protector",
                "Wonder Canine",
                " Ruff the Protector ",
                "Sir Barks-a-Lot",
            ]),
            Ok(vec!["Captain Bark", "Wonder Canine"]),
            Ok(vec!["Mighty Mutt"]),
        ]));
        let accumulator = UniqueNameAccumulator::new(client.clone(), AccumulationPolicy::default());

        let result = accumulator.accumulate(&prompt(), 5).await.unwrap();

        assert_eq!(
            result.names,
            vec![
                "Ruff the Protector",
                "Wonder Canine",
                "Sir Barks-a-Lot",
                "Captain Bark",
                "Mighty Mutt"
            ]
        );
        assert_eq!(result.attempts, 3);
        assert_eq!(client.requested(), vec![5, 2, 1]);
    }

    #[tokio::test]
    async fn requests_are_capped_by_batch_limit() {
        let names: Vec<String> = (0..12).map(|i| format!("Hero {i}")).collect();
        let first: Vec<&str> = names[..5].iter().map(String::as_str).collect();
        let second: Vec<&str> = names[5..10].iter().map(String::as_str).collect();
        let third: Vec<&str> = names[10..].iter().map(String::as_str).collect();
        let client = Arc::new(ScriptedClient::new(vec![Ok(first), Ok(second), Ok(third)]));
        let accumulator = UniqueNameAccumulator::new(client.clone(), AccumulationPolicy::default());

        let result = accumulator.accumulate(&prompt(), 12).await.unwrap();

        assert_eq!(result.names.len(), 12);
        assert_eq!(client.requested(), vec![5, 5, 2]);
    }

    #[tokio::test]
    async fn surplus_candidates_do_not_exceed_target() {
        let client = Arc::new(ScriptedClient::new(vec![Ok(vec!["A", "B", "C", "D"])]));
        let accumulator = UniqueNameAccumulator::new(client, AccumulationPolicy::default());

        let result = accumulator.accumulate(&prompt(), 2).await.unwrap();

        assert_eq!(result.names, vec!["A", "B"]);
    }

    #[tokio::test]
    async fn blank_and_multiline_candidates_are_normalized() {
        let client = Arc::new(ScriptedClient::new(vec![
            Ok(vec!["\n Captain Claw\nAnimal: Cat", "   ", "Captain Claw"]),
            Ok(vec!["Agent Whiskers"]),
        ]));
        let accumulator = UniqueNameAccumulator::new(client, AccumulationPolicy::default());

        let result = accumulator.accumulate(&prompt(), 2).await.unwrap();

        assert_eq!(result.names, vec!["Captain Claw", "Agent Whiskers"]);
    }

    #[tokio::test]
    async fn duplicate_only_upstream_is_bounded_by_max_attempts() {
        let client = Arc::new(ScriptedClient::repeating(&["Same Name"]));
        let policy = AccumulationPolicy {
            max_attempts: 4,
            ..AccumulationPolicy::default()
        };
        let accumulator = UniqueNameAccumulator::new(client.clone(), policy);

        let err = accumulator.accumulate(&prompt(), 3).await.unwrap_err();

        // One productive call, then four that add nothing.
        assert!(matches!(
            err,
            Error::Exhausted {
                collected: 1,
                target: 3,
                attempts: 5
            }
        ));
        assert_eq!(client.requested().len(), 5);
    }

    /// Always answers with names never seen before.
    struct FreshNamesClient {
        calls: Mutex<usize>,
    }

    #[async_trait]
    impl CompletionClient for FreshNamesClient {
        async fn complete(&self, request: &CompletionRequest) -> Result<Vec<String>> {
            let mut calls = self.calls.lock().unwrap();
            *calls += 1;
            Ok((0..request.samples)
                .map(|i| format!("Hero {} {i}", *calls))
                .collect())
        }

        fn provider(&self) -> &str {
            "fresh"
        }
    }

    #[tokio::test]
    async fn productive_calls_do_not_count_toward_max_attempts() {
        let client = Arc::new(FreshNamesClient {
            calls: Mutex::new(0),
        });
        let policy = AccumulationPolicy {
            target: 12,
            batch_limit: 1,
            max_attempts: 10,
            ..AccumulationPolicy::default()
        };
        let accumulator = UniqueNameAccumulator::new(client.clone(), policy);

        let result = accumulator.accumulate(&prompt(), 12).await.unwrap();

        assert_eq!(result.names.len(), 12);
        assert_eq!(result.attempts, 12);
        assert_eq!(*client.calls.lock().unwrap(), 12);
    }

    #[tokio::test]
    async fn stall_count_resets_after_a_productive_call() {
        let client = Arc::new(ScriptedClient::new(vec![
            Ok(vec!["A"]),
            Ok(vec!["A"]),
            Ok(vec!["A"]),
            Ok(vec!["B"]),
            Ok(vec!["B"]),
            Ok(vec!["B"]),
            Ok(vec!["C"]),
        ]));
        let policy = AccumulationPolicy {
            batch_limit: 1,
            max_attempts: 3,
            ..AccumulationPolicy::default()
        };
        let accumulator = UniqueNameAccumulator::new(client, policy);

        let result = accumulator.accumulate(&prompt(), 3).await.unwrap();

        assert_eq!(result.names, vec!["A", "B", "C"]);
        assert_eq!(result.attempts, 7);
    }

    #[tokio::test]
    async fn provider_errors_abort_immediately() {
        let client = Arc::new(ScriptedClient::new(vec![
            Ok(vec!["Captain Bark"]),
            Err(Error::Upstream {
                provider: "scripted".into(),
                status: 503,
                body: "{}".into(),
            }),
        ]));
        let accumulator = UniqueNameAccumulator::new(client.clone(), AccumulationPolicy::default());

        let err = accumulator.accumulate(&prompt(), 5).await.unwrap_err();

        assert!(matches!(err, Error::Upstream { status: 503, .. }));
        assert_eq!(client.requested(), vec![5, 4]);
    }
}
