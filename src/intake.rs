//! At-least-once intake of consent identifiers.
//!
//! Stands in for the broker channel dedicated to consent processing:
//! producers publish bare consent id strings, the consumer drains them
//! through the engine one at a time. The consumer never retries a message
//! (redelivery is the producer's concern) and tolerates duplicates by
//! re-validating on every delivery.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;

use crate::engine::{Outcome, TransitionEngine};
use crate::error::EngineError;
use crate::state_machine::ConsentState;

/// How the consumer classified one delivered message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// The record transitioned and the result was persisted.
    Transitioned {
        consent_id: String,
        from: ConsentState,
        to: ConsentState,
    },
    /// Processed successfully with nothing to do.
    Unchanged { consent_id: String },
    /// Tolerated without side effects: unknown id, blank payload, or an
    /// already finalized record (duplicate/late redelivery).
    Dropped { consent_id: String, reason: String },
    /// A defect: gate/table inconsistency or a persistence failure.
    Failed { consent_id: String, reason: String },
}

/// Everything one drain of the intake channel did, in delivery order.
#[derive(Debug, Default)]
pub struct IntakeReport {
    pub deliveries: Vec<Delivery>,
}

impl IntakeReport {
    pub fn transitioned(&self) -> usize {
        self.count(|d| matches!(d, Delivery::Transitioned { .. }))
    }

    pub fn unchanged(&self) -> usize {
        self.count(|d| matches!(d, Delivery::Unchanged { .. }))
    }

    pub fn dropped(&self) -> usize {
        self.count(|d| matches!(d, Delivery::Dropped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|d| matches!(d, Delivery::Failed { .. }))
    }

    fn count(&self, pred: impl Fn(&Delivery) -> bool) -> usize {
        self.deliveries.iter().filter(|d| pred(d)).count()
    }
}

/// Returned by [`IntakeSender::publish`] when the consumer is gone.
#[derive(Debug, Error)]
#[error("intake channel closed: consumer is gone")]
pub struct PublishError;

/// Producer half of the intake channel.
#[derive(Clone)]
pub struct IntakeSender {
    tx: mpsc::Sender<String>,
}

impl IntakeSender {
    /// Publish a consent id for processing.
    pub async fn publish(&self, consent_id: impl Into<String>) -> Result<(), PublishError> {
        self.tx
            .send(consent_id.into())
            .await
            .map_err(|_| PublishError)
    }
}

/// Consumer half of the intake channel.
pub struct ConsentIntake {
    rx: mpsc::Receiver<String>,
    engine: Arc<TransitionEngine>,
}

/// Build a bounded intake channel feeding the given engine.
pub fn channel(engine: Arc<TransitionEngine>, capacity: usize) -> (IntakeSender, ConsentIntake) {
    let (tx, rx) = mpsc::channel(capacity);
    (IntakeSender { tx }, ConsentIntake { rx, engine })
}

impl ConsentIntake {
    /// Consume until every sender is dropped, then report.
    ///
    /// `NotFound`, `InvalidState` and blank payloads are recorded as dropped
    /// deliveries, the normal fate of duplicate or late messages, while
    /// `TransitionFailed` and persistence errors are recorded as failures.
    /// Neither stops the drain.
    pub async fn run(mut self) -> IntakeReport {
        let mut report = IntakeReport::default();

        while let Some(consent_id) = self.rx.recv().await {
            let delivery = match self.engine.process_consent(&consent_id).await {
                Ok(Outcome::Transitioned { from, to }) => Delivery::Transitioned {
                    consent_id,
                    from,
                    to,
                },
                Ok(Outcome::Unchanged) => Delivery::Unchanged { consent_id },
                Err(
                    err @ (EngineError::BlankConsentId
                    | EngineError::NotFound(_)
                    | EngineError::InvalidState { .. }),
                ) => Delivery::Dropped {
                    consent_id,
                    reason: err.to_string(),
                },
                Err(err) => Delivery::Failed {
                    consent_id,
                    reason: err.to_string(),
                },
            };
            report.deliveries.push(delivery);
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state_machine::ConsentRecord;
    use crate::store::{ConsentStore, MemoryStore};
    use chrono::{Duration, Utc};

    fn expired_authorised(consent_id: &str) -> ConsentRecord {
        let mut record =
            ConsentRecord::new(consent_id, ConsentState::Authorised, Duration::minutes(1));
        record.expires_at = Utc::now() - Duration::hours(1);
        record
    }

    async fn intake_over(
        store: Arc<MemoryStore>,
        capacity: usize,
    ) -> (IntakeSender, ConsentIntake) {
        let engine = Arc::new(TransitionEngine::new(store));
        channel(engine, capacity)
    }

    #[tokio::test]
    async fn drains_published_ids_in_order() {
        let store = Arc::new(MemoryStore::new());
        store.insert(expired_authorised("c-1")).await.unwrap();
        store
            .insert(ConsentRecord::new(
                "c-2",
                ConsentState::Authorised,
                Duration::hours(1),
            ))
            .await
            .unwrap();
        let (sender, intake) = intake_over(store.clone(), 8).await;

        let consumer = tokio::spawn(intake.run());
        sender.publish("c-1").await.unwrap();
        sender.publish("c-2").await.unwrap();
        drop(sender);
        let report = consumer.await.unwrap();

        assert_eq!(report.deliveries.len(), 2);
        assert_eq!(
            report.deliveries[0],
            Delivery::Transitioned {
                consent_id: "c-1".into(),
                from: ConsentState::Authorised,
                to: ConsentState::Expired,
            }
        );
        assert_eq!(
            report.deliveries[1],
            Delivery::Unchanged {
                consent_id: "c-2".into()
            }
        );
        assert_eq!(report.transitioned(), 1);
        assert_eq!(report.unchanged(), 1);
    }

    #[tokio::test]
    async fn duplicate_delivery_is_tolerated() {
        // At-least-once semantics: the broker may deliver the same id twice.
        // The first delivery transitions, the second is dropped, the store
        // ends up written exactly once.
        let store = Arc::new(MemoryStore::new());
        store.insert(expired_authorised("c-dup")).await.unwrap();
        let (sender, intake) = intake_over(store.clone(), 8).await;

        let consumer = tokio::spawn(intake.run());
        sender.publish("c-dup").await.unwrap();
        sender.publish("c-dup").await.unwrap();
        drop(sender);
        let report = consumer.await.unwrap();

        assert_eq!(report.transitioned(), 1);
        assert_eq!(report.dropped(), 1);
        assert_eq!(report.failed(), 0);
        assert_eq!(
            store.get("c-dup").await.unwrap().unwrap().state,
            ConsentState::Expired
        );
    }

    #[tokio::test]
    async fn unknown_and_blank_ids_are_dropped_not_fatal() {
        let store = Arc::new(MemoryStore::new());
        store.insert(expired_authorised("c-ok")).await.unwrap();
        let (sender, intake) = intake_over(store, 8).await;

        let consumer = tokio::spawn(intake.run());
        sender.publish("ghost").await.unwrap();
        sender.publish("").await.unwrap();
        sender.publish("c-ok").await.unwrap();
        drop(sender);
        let report = consumer.await.unwrap();

        assert_eq!(report.dropped(), 2);
        assert_eq!(report.transitioned(), 1);
    }

    #[tokio::test]
    async fn publish_fails_once_the_consumer_is_gone() {
        let store = Arc::new(MemoryStore::new());
        let (sender, intake) = intake_over(store, 8).await;
        drop(intake);

        let err = sender.publish("c-1").await.unwrap_err();
        assert_eq!(err.to_string(), "intake channel closed: consumer is gone");
    }
}
