use anyhow::Result;
use crates::domain::{
    entities::email_queue::QueueMessageEntity, repositories::email_queue::QueueClient,
};
use std::{future::Future, sync::Arc, time::Duration};
use tokio::{sync::Semaphore, task::JoinSet};
use tracing::{Instrument, error, info, info_span, warn};

use crate::usecases::email_delivery::EmailDelivery;

#[derive(Debug, Clone)]
pub struct EmailQueueWorkerConfig {
    pub poll_interval: Duration,
    pub max_concurrency: usize,
    /// A failing message is dropped once it has been read this many times.
    pub max_attempts: i32,
}

/// Polls the email queue until `shutdown` resolves, running at most
/// `max_concurrency` deliveries at once. In-flight jobs are drained before
/// returning; anything not deleted reappears after its visibility timeout.
pub async fn run<Q, D, F>(
    queue: Arc<Q>,
    delivery: Arc<D>,
    config: EmailQueueWorkerConfig,
    shutdown: F,
) -> Result<()>
where
    Q: QueueClient + 'static,
    D: EmailDelivery + 'static,
    F: Future<Output = ()>,
{
    info!(
        poll_interval_secs = config.poll_interval.as_secs(),
        max_concurrency = config.max_concurrency,
        "email_notification: starting worker loop"
    );

    let limiter = Arc::new(Semaphore::new(config.max_concurrency.max(1)));
    let mut in_flight = JoinSet::new();
    tokio::pin!(shutdown);

    loop {
        while let Some(joined) = in_flight.try_join_next() {
            log_join_error(joined);
        }

        let available = limiter.available_permits();
        if available == 0 {
            tokio::select! {
                _ = &mut shutdown => break,
                joined = in_flight.join_next() => {
                    if let Some(joined) = joined {
                        log_join_error(joined);
                    }
                }
            }
            continue;
        }

        let received = tokio::select! {
            _ = &mut shutdown => break,
            received = queue.receive(available as i64) => received,
        };

        let batch_was_full = match received {
            Ok(messages) => {
                let batch_len = messages.len();
                for message in messages {
                    let permit = Arc::clone(&limiter).acquire_owned().await?;
                    let queue = Arc::clone(&queue);
                    let delivery = Arc::clone(&delivery);
                    let max_attempts = config.max_attempts;
                    let span = info_span!("email_job", msg_id = message.msg_id, read_ct = message.read_ct);

                    in_flight.spawn(
                        async move {
                            let _permit = permit;
                            process_message(queue.as_ref(), delivery.as_ref(), message, max_attempts)
                                .await;
                        }
                        .instrument(span),
                    );
                }
                batch_len == available
            }
            Err(err) => {
                error!(error = ?err, "email_notification: failed to receive from queue");
                false
            }
        };

        if !batch_was_full {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = tokio::time::sleep(config.poll_interval) => {}
            }
        }
    }

    info!(
        in_flight = in_flight.len(),
        "email_notification: shutting down; draining in-flight jobs"
    );
    while let Some(joined) = in_flight.join_next().await {
        log_join_error(joined);
    }

    Ok(())
}

/// Deletes the message only after the email has been sent.
pub async fn process_message<Q, D>(
    queue: &Q,
    delivery: &D,
    message: QueueMessageEntity,
    max_attempts: i32,
) where
    Q: QueueClient + ?Sized,
    D: EmailDelivery + ?Sized,
{
    let msg_id = message.msg_id;

    match delivery.deliver(&message.message).await {
        Ok(email_job_id) => match queue.delete(msg_id).await {
            Ok(true) => info!(msg_id, email_job_id, "email_notification: job completed"),
            Ok(false) => warn!(
                msg_id,
                email_job_id,
                "email_notification: message already gone after delivery"
            ),
            Err(err) => error!(
                msg_id,
                email_job_id,
                error = ?err,
                "email_notification: failed to delete delivered message; email may be resent"
            ),
        },
        Err(err) if message.read_ct >= max_attempts => {
            error!(
                msg_id,
                read_ct = message.read_ct,
                error = %err,
                "email_notification: giving up on message after max attempts"
            );
            if let Err(delete_err) = queue.delete(msg_id).await {
                error!(
                    msg_id,
                    error = ?delete_err,
                    "email_notification: failed to drop exhausted message"
                );
            }
        }
        Err(err) => {
            error!(
                msg_id,
                read_ct = message.read_ct,
                error = %err,
                "email_notification: delivery failed; message left for redelivery"
            );
        }
    }
}

fn log_join_error(joined: std::result::Result<(), tokio::task::JoinError>) {
    if let Err(err) = joined {
        error!(error = %err, "email_notification: job task panicked or was cancelled");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::email_delivery::{EmailDeliveryError, MockEmailDelivery};
    use chrono::Utc;
    use crates::domain::repositories::email_queue::MockQueueClient;
    use mockall::predicate::eq;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn message(msg_id: i64, read_ct: i32) -> QueueMessageEntity {
        let now = Utc::now();
        QueueMessageEntity {
            msg_id,
            read_ct,
            enqueued_at: now,
            vt: now,
            message: json!({ "email_job_id": msg_id }),
        }
    }

    #[tokio::test]
    async fn delivered_message_is_deleted() {
        let mut queue = MockQueueClient::new();
        let mut delivery = MockEmailDelivery::new();
        delivery.expect_deliver().times(1).returning(|_| Ok(3));
        queue.expect_delete().with(eq(3)).times(1).returning(|_| Ok(true));

        process_message(&queue, &delivery, message(3, 1), 5).await;
    }

    #[tokio::test]
    async fn failed_delivery_leaves_message_in_queue() {
        let mut queue = MockQueueClient::new();
        let mut delivery = MockEmailDelivery::new();
        delivery
            .expect_deliver()
            .returning(|_| Err(EmailDeliveryError::UnknownTemplate("newsletter".to_string())));
        queue.expect_delete().never();

        process_message(&queue, &delivery, message(3, 1), 5).await;
    }

    #[tokio::test]
    async fn exhausted_message_is_dropped() {
        let mut queue = MockQueueClient::new();
        let mut delivery = MockEmailDelivery::new();
        delivery
            .expect_deliver()
            .returning(|_| Err(EmailDeliveryError::EmailJobNotFound(3)));
        queue.expect_delete().with(eq(3)).times(1).returning(|_| Ok(true));

        process_message(&queue, &delivery, message(3, 5), 5).await;
    }

    #[tokio::test]
    async fn loop_processes_received_messages_and_stops_on_shutdown() {
        let receives = Arc::new(AtomicUsize::new(0));
        let deleted = Arc::new(AtomicUsize::new(0));

        let mut queue = MockQueueClient::new();
        let receive_count = Arc::clone(&receives);
        queue.expect_receive().returning(move |limit| {
            assert!(limit >= 1 && limit <= 2);
            if receive_count.fetch_add(1, Ordering::SeqCst) == 0 {
                Ok(vec![message(1, 1), message(2, 1)])
            } else {
                Ok(vec![])
            }
        });
        let delete_count = Arc::clone(&deleted);
        queue.expect_delete().returning(move |_| {
            delete_count.fetch_add(1, Ordering::SeqCst);
            Ok(true)
        });
        let mut delivery = MockEmailDelivery::new();
        delivery.expect_deliver().returning(|payload| {
            Ok(payload["email_job_id"].as_i64().unwrap_or_default())
        });

        let config = EmailQueueWorkerConfig {
            poll_interval: Duration::from_millis(10),
            max_concurrency: 2,
            max_attempts: 5,
        };

        run(
            Arc::new(queue),
            Arc::new(delivery),
            config,
            tokio::time::sleep(Duration::from_millis(100)),
        )
        .await
        .unwrap();

        assert_eq!(deleted.load(Ordering::SeqCst), 2);
        assert!(receives.load(Ordering::SeqCst) >= 2);
    }
}
