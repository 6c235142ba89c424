use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
};

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::Utc;
use crates::{
    domain::{
        entities::{
            checkout_payments::CheckoutPaymentEntity,
            email_jobs::{EmailJobEntity, InsertEmailJobEntity},
            email_queue::QueueMessageEntity,
            orders::{ConfirmOrderPaymentEntity, OrderEntity},
        },
        repositories::{
            email_jobs::EmailJobRepository, email_queue::QueueClient,
            payment_confirmation::PaymentConfirmationRepository,
        },
        value_objects::{
            enums::{
                checkout_payment_statuses::CheckoutPaymentStatus,
                checkout_statuses::CheckoutStatus, order_statuses::OrderStatus,
            },
            paymongo_webhook::WebhookEventType,
            payment_confirmation::{ConfirmPaymentOutcome, ConfirmedOrder},
        },
    },
    payments::{paymongo_client::PaymongoClient, webhook_signature::compute_signature},
};
use serde_json::{Value, json};

use super::{
    email_notification::EmailNotificationQueue,
    payment_confirmation::{OrderPaidHandler, PaymentConfirmationError, PaymentConfirmationUseCase},
    paymongo_webhook::PaymongoWebhookUseCase,
};

const WEBHOOK_SECRET: &str = "whsk_e2e";

#[derive(Default)]
struct Tables {
    checkout_payments: HashMap<String, CheckoutPaymentEntity>,
    checkout_statuses: HashMap<i64, String>,
    orders: HashMap<i64, OrderEntity>,
    email_jobs: HashMap<i64, InsertEmailJobEntity>,
    queue: Vec<(i64, Value)>,
    next_msg_id: i64,
    confirm_calls: usize,
    /// Orders the confirmation's order update cannot see, so it touches zero rows.
    unwritable_orders: HashSet<i64>,
}

/// One store behind every port, so a confirmation is all-or-nothing.
#[derive(Default)]
struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl InMemoryStore {
    fn seeded() -> Self {
        let now = Utc::now();
        let store = Self::default();
        {
            let mut tables = store.tables.lock().unwrap();
            tables.checkout_statuses.insert(9, CheckoutStatus::Open.to_string());
            tables.checkout_payments.insert(
                "cs_123".to_string(),
                CheckoutPaymentEntity {
                    id: "cs_123".to_string(),
                    checkout_id: 9,
                    reference_number: "REF1".to_string(),
                    status: CheckoutPaymentStatus::Pending.to_string(),
                    amount_minor: 150_000,
                    currency: "PHP".to_string(),
                    payment_method_used: None,
                    gateway_metadata: json!({}),
                    created_at: now,
                    updated_at: now,
                },
            );
            tables.orders.insert(
                42,
                OrderEntity {
                    id: 42,
                    order_number: "1001".to_string(),
                    checkout_id: 9,
                    checkout_payment_id: "cs_123".to_string(),
                    status: OrderStatus::Pending.to_string(),
                    customer_email: "buyer@example.com".to_string(),
                    customer_name: "Juan Dela Cruz".to_string(),
                    address_line1: "1 Rizal Ave".to_string(),
                    address_line2: None,
                    city: "Makati".to_string(),
                    province: "Metro Manila".to_string(),
                    postal_code: "1200".to_string(),
                    country: "PH".to_string(),
                    subtotal_minor: 140_000,
                    shipping_fee_minor: 10_000,
                    total_minor: 150_000,
                    currency: "PHP".to_string(),
                    paid_at: None,
                    created_at: now,
                    updated_at: now,
                },
            );
        }
        store
    }
}

#[async_trait]
impl PaymentConfirmationRepository for InMemoryStore {
    async fn find_checkout_payment_by_reference(
        &self,
        reference_number: &str,
    ) -> Result<Option<CheckoutPaymentEntity>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .checkout_payments
            .values()
            .find(|cp| cp.reference_number == reference_number)
            .cloned())
    }

    async fn find_order_by_checkout_payment_id(
        &self,
        checkout_payment_id: &str,
    ) -> Result<Option<OrderEntity>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .orders
            .values()
            .find(|order| order.checkout_payment_id == checkout_payment_id)
            .cloned())
    }

    async fn confirm_order_payment(
        &self,
        confirm: ConfirmOrderPaymentEntity,
    ) -> Result<ConfirmPaymentOutcome> {
        let mut tables = self.tables.lock().unwrap();
        tables.confirm_calls += 1;

        // Each step writes to staged copies; they replace the tables only on commit.
        let mut checkout_payments = tables.checkout_payments.clone();
        let mut checkout_statuses = tables.checkout_statuses.clone();
        let mut orders = tables.orders.clone();

        let paid = CheckoutPaymentStatus::Paid.to_string();
        let checkout_payment = checkout_payments
            .get_mut(&confirm.checkout_payment_id)
            .ok_or_else(|| anyhow!("checkout_payments row not updated"))?;
        if checkout_payment.status == paid {
            return Ok(ConfirmPaymentOutcome::AlreadyPaid);
        }
        checkout_payment.status = paid;
        checkout_payment.updated_at = confirm.paid_at;

        let checkout_status = checkout_statuses
            .get_mut(&confirm.checkout_id)
            .ok_or_else(|| anyhow!("checkouts row {} was not updated", confirm.checkout_id))?;
        *checkout_status = CheckoutStatus::Completed.to_string();

        let order = orders
            .get_mut(&confirm.order_id)
            .filter(|order| !tables.unwritable_orders.contains(&order.id))
            .ok_or_else(|| anyhow!("orders row {} was not updated", confirm.order_id))?;
        order.status = OrderStatus::Confirmed.to_string();
        order.paid_at = Some(confirm.paid_at);
        order.updated_at = confirm.paid_at;

        tables.checkout_payments = checkout_payments;
        tables.checkout_statuses = checkout_statuses;
        tables.orders = orders;
        Ok(ConfirmPaymentOutcome::Confirmed)
    }
}

#[async_trait]
impl EmailJobRepository for InMemoryStore {
    async fn insert_email_job(&self, email_job: InsertEmailJobEntity) -> Result<i64> {
        let mut tables = self.tables.lock().unwrap();
        let queue_id = email_job.queue_id;
        if tables.email_jobs.insert(queue_id, email_job).is_some() {
            return Err(anyhow!("duplicate email job {queue_id}"));
        }
        Ok(queue_id)
    }

    async fn find_email_job_by_id(&self, queue_id: i64) -> Result<Option<EmailJobEntity>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.email_jobs.get(&queue_id).map(|job| EmailJobEntity {
            queue_id: job.queue_id,
            recipient: job.recipient.clone(),
            cc: job.cc.clone(),
            subject: job.subject.clone(),
            template_name: job.template_name.clone(),
            order_id: job.order_id,
            checkout_payment_id: job.checkout_payment_id.clone(),
            created_at: job.created_at,
        }))
    }
}

#[async_trait]
impl QueueClient for InMemoryStore {
    async fn send(&self, message: Value) -> Result<i64> {
        let mut tables = self.tables.lock().unwrap();
        tables.next_msg_id += 1;
        let msg_id = tables.next_msg_id;
        tables.queue.push((msg_id, message));
        Ok(msg_id)
    }

    async fn receive(&self, limit: i64) -> Result<Vec<QueueMessageEntity>> {
        let tables = self.tables.lock().unwrap();
        let now = Utc::now();
        Ok(tables
            .queue
            .iter()
            .take(limit as usize)
            .map(|(msg_id, message)| QueueMessageEntity {
                msg_id: *msg_id,
                read_ct: 1,
                enqueued_at: now,
                vt: now,
                message: message.clone(),
            })
            .collect())
    }

    async fn delete(&self, msg_id: i64) -> Result<bool> {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.queue.len();
        tables.queue.retain(|(id, _)| *id != msg_id);
        Ok(tables.queue.len() != before)
    }
}

type Coordinator =
    PaymentConfirmationUseCase<InMemoryStore, EmailNotificationQueue<InMemoryStore, InMemoryStore>>;

fn coordinator(store: &Arc<InMemoryStore>) -> Coordinator {
    let email_queue = EmailNotificationQueue::new(Arc::clone(store), Arc::clone(store));
    PaymentConfirmationUseCase::new(
        Arc::clone(store),
        Arc::new(email_queue),
        vec!["ops@example.com".to_string()],
    )
}

fn expected_identity() -> ConfirmedOrder {
    ConfirmedOrder {
        order_number: "1001".to_string(),
        order_id: 42,
        customer_email: "buyer@example.com".to_string(),
    }
}

#[tokio::test]
async fn order_paid_confirms_everything_and_records_one_email_job() {
    let store = Arc::new(InMemoryStore::seeded());

    let confirmed = coordinator(&store).on_order_paid("REF1").await.unwrap();

    assert_eq!(confirmed, expected_identity());
    let tables = store.tables.lock().unwrap();
    let order = &tables.orders[&42];
    assert_eq!(order.status, "confirmed");
    assert!(order.paid_at.is_some());
    assert_eq!(tables.checkout_statuses[&9], "completed");
    assert_eq!(tables.checkout_payments["cs_123"].status, "paid");

    assert_eq!(tables.email_jobs.len(), 1);
    let (queue_id, job) = tables.email_jobs.iter().next().unwrap();
    assert_eq!(job.template_name, "order-confirmation");
    assert_eq!(job.order_id, Some(42));
    assert_eq!(job.cc, vec!["ops@example.com".to_string()]);

    // Only the pointer message is left; the allocation placeholder is gone.
    assert_eq!(tables.queue.len(), 1);
    assert_eq!(tables.queue[0].1, json!({ "email_job_id": queue_id }));
}

#[tokio::test]
async fn repeated_delivery_is_idempotent() {
    let store = Arc::new(InMemoryStore::seeded());
    let coordinator = coordinator(&store);

    let first = coordinator.on_order_paid("REF1").await.unwrap();
    let paid_at = store.tables.lock().unwrap().orders[&42].paid_at;
    let second = coordinator.on_order_paid("REF1").await.unwrap();

    assert_eq!(first, second);
    let tables = store.tables.lock().unwrap();
    assert_eq!(tables.orders[&42].paid_at, paid_at);
    assert_eq!(tables.confirm_calls, 1);
    assert_eq!(tables.email_jobs.len(), 1);
}

#[tokio::test]
async fn unknown_reference_mutates_nothing() {
    let store = Arc::new(InMemoryStore::seeded());

    let err = coordinator(&store).on_order_paid("UNKNOWN").await.unwrap_err();

    assert!(matches!(err, PaymentConfirmationError::CheckoutPaymentNotFound(_)));
    let tables = store.tables.lock().unwrap();
    assert_eq!(tables.checkout_payments["cs_123"].status, "pending");
    assert_eq!(tables.orders[&42].status, "pending");
    assert_eq!(tables.checkout_statuses[&9], "open");
    assert!(tables.email_jobs.is_empty());
    assert!(tables.queue.is_empty());
}

#[tokio::test]
async fn failed_checkout_update_leaves_payment_pending() {
    let store = Arc::new(InMemoryStore::seeded());
    store.tables.lock().unwrap().checkout_statuses.clear();

    let err = coordinator(&store).on_order_paid("REF1").await.unwrap_err();

    assert!(matches!(err, PaymentConfirmationError::Internal(_)));
    let tables = store.tables.lock().unwrap();
    assert_eq!(tables.checkout_payments["cs_123"].status, "pending");
    assert_eq!(tables.orders[&42].status, "pending");
    assert!(tables.email_jobs.is_empty());
}

#[tokio::test]
async fn failed_order_update_rolls_back_payment_and_checkout() {
    let store = Arc::new(InMemoryStore::seeded());
    store.tables.lock().unwrap().unwritable_orders.insert(42);

    let err = coordinator(&store).on_order_paid("REF1").await.unwrap_err();

    assert!(matches!(err, PaymentConfirmationError::Internal(_)));
    let tables = store.tables.lock().unwrap();
    assert_eq!(tables.confirm_calls, 1);
    assert_eq!(tables.checkout_payments["cs_123"].status, "pending");
    assert_eq!(tables.checkout_statuses[&9], "open");
    assert_eq!(tables.orders[&42].status, "pending");
    assert!(tables.orders[&42].paid_at.is_none());
    assert!(tables.email_jobs.is_empty());
    assert!(tables.queue.is_empty());
}

#[tokio::test]
async fn signed_webhook_drives_the_whole_pipeline() {
    let store = Arc::new(InMemoryStore::seeded());
    let gateway = PaymongoClient::new("sk_test_abc".to_string(), WEBHOOK_SECRET.to_string(), 300);
    let webhook = PaymongoWebhookUseCase::new(Arc::new(gateway), Arc::new(coordinator(&store)));

    let payload = serde_json::to_vec(&json!({
        "id": "evt_1",
        "type": "checkout_session.payment.paid",
        "livemode": false,
        "data": { "id": "cs_123", "attributes": { "reference_number": "REF1" } }
    }))
    .unwrap();
    let ts = Utc::now().timestamp();
    let header = format!(
        "t={ts},te={}",
        compute_signature(&payload, ts, WEBHOOK_SECRET).unwrap()
    );

    let dispatched = webhook.handle_webhook(&payload, Some(&header)).await.unwrap();

    assert_eq!(dispatched, WebhookEventType::CheckoutSessionPaymentPaid);
    let tables = store.tables.lock().unwrap();
    assert_eq!(tables.orders[&42].status, "confirmed");
    assert_eq!(tables.email_jobs.len(), 1);
}

#[tokio::test]
async fn tampered_webhook_is_rejected_before_any_state_change() {
    let store = Arc::new(InMemoryStore::seeded());
    let gateway = PaymongoClient::new("sk_test_abc".to_string(), WEBHOOK_SECRET.to_string(), 300);
    let webhook = PaymongoWebhookUseCase::new(Arc::new(gateway), Arc::new(coordinator(&store)));

    let signed = br#"{"id":"evt_1","type":"checkout_session.payment.paid","data":{"attributes":{"reference_number":"REF1"}}}"#;
    let tampered = br#"{"id":"evt_1","type":"checkout_session.payment.paid","data":{"attributes":{"reference_number":"REF2"}}}"#;
    let ts = Utc::now().timestamp();
    let header = format!(
        "t={ts},te={}",
        compute_signature(signed, ts, WEBHOOK_SECRET).unwrap()
    );

    assert!(webhook.handle_webhook(tampered, Some(&header)).await.is_err());
    assert_eq!(store.tables.lock().unwrap().orders[&42].status, "pending");
}
