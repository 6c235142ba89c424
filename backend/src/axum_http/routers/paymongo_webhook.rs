use crate::{
    config::config_model::DotEnvyConfig,
    usecases::{
        email_notification::EmailNotificationQueue,
        payment_confirmation::{OrderPaidHandler, PaymentConfirmationUseCase},
        paymongo_webhook::{PaymentGateway, PaymongoWebhookUseCase},
    },
};
use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
};
use chrono::Duration;
use crates::{
    infra::{
        db::{
            postgres::postgres_connection::PgPoolSquad,
            repositories::{
                email_jobs::EmailJobPostgres, payment_confirmation::PaymentConfirmationPostgres,
            },
        },
        queue::postgres_queue::{DEFAULT_VISIBILITY_TIMEOUT_SECS, PostgresEmailQueue},
    },
    payments::paymongo_client::PaymongoClient,
};
use serde_json::json;
use std::sync::Arc;

pub const SIGNATURE_HEADER: &str = "Paymongo-Signature";

pub fn routes(db_pool: Arc<PgPoolSquad>, config: Arc<DotEnvyConfig>) -> Router {
    let email_queue = EmailNotificationQueue::new(
        Arc::new(EmailJobPostgres::new(Arc::clone(&db_pool))),
        Arc::new(PostgresEmailQueue::new(
            Arc::clone(&db_pool),
            Duration::seconds(DEFAULT_VISIBILITY_TIMEOUT_SECS),
        )),
    );
    let payment_confirmation_usecase = PaymentConfirmationUseCase::new(
        Arc::new(PaymentConfirmationPostgres::new(Arc::clone(&db_pool))),
        Arc::new(email_queue),
        config.order_email.cc.clone(),
    );
    let paymongo_client = PaymongoClient::new(
        config.paymongo.secret_key.clone(),
        config.paymongo.webhook_secret.clone(),
        config.paymongo.webhook_max_age_secs,
    );
    let webhook_usecase = PaymongoWebhookUseCase::new(
        Arc::new(paymongo_client),
        Arc::new(payment_confirmation_usecase),
    );

    Router::new()
        .route("/paymongo", post(paymongo_webhook))
        .with_state(Arc::new(webhook_usecase))
}

pub async fn paymongo_webhook<G, H>(
    State(webhook_usecase): State<Arc<PaymongoWebhookUseCase<G, H>>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response
where
    G: PaymentGateway + 'static,
    H: OrderPaidHandler + 'static,
{
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());

    match webhook_usecase.handle_webhook(&body, signature).await {
        Ok(_) => (StatusCode::OK, Json(success_body())).into_response(),
        Err(err) => (err.status_code(), err.to_string()).into_response(),
    }
}

fn success_body() -> serde_json::Value {
    json!({ "statusCode": 200, "body": { "message": "SUCCESS" } })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::{
        payment_confirmation::MockOrderPaidHandler, paymongo_webhook::MockPaymentGateway,
    };
    use axum::{body::to_bytes, http::HeaderValue};
    use crates::payments::webhook_signature::{SignatureError, WebhookSignature};

    fn usecase(verified: bool) -> Arc<PaymongoWebhookUseCase<MockPaymentGateway, MockOrderPaidHandler>> {
        let mut gateway = MockPaymentGateway::new();
        gateway.expect_verify_webhook_signature().returning(move |_, _| {
            if verified {
                Ok(WebhookSignature {
                    timestamp: 1_700_000_000,
                    test_signature: "ab".to_string(),
                    live_signature: String::new(),
                })
            } else {
                Err(SignatureError::SignatureInvalid("signature mismatch"))
            }
        });
        gateway.expect_is_live_mode().return_const(false);
        let mut handler = MockOrderPaidHandler::new();
        handler.expect_on_order_paid().never();
        Arc::new(PaymongoWebhookUseCase::new(Arc::new(gateway), Arc::new(handler)))
    }

    fn signed_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(SIGNATURE_HEADER, HeaderValue::from_static("t=1700000000,te=ab"));
        headers
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn verified_event_gets_fixed_success_body() {
        let body = Bytes::from_static(br#"{"id":"evt_1","type":"payment.paid","data":{}}"#);

        let response = paymongo_webhook(State(usecase(true)), signed_headers(), body).await;

        assert_eq!(response.status(), StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json, success_body());
    }

    #[tokio::test]
    async fn missing_header_is_plain_text_unauthorized() {
        let body = Bytes::from_static(b"{}");

        let response = paymongo_webhook(State(usecase(true)), HeaderMap::new(), body).await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_text(response).await, "missing Paymongo-Signature header");
    }

    #[tokio::test]
    async fn invalid_signature_is_unauthorized() {
        let body = Bytes::from_static(b"{}");

        let response = paymongo_webhook(State(usecase(false)), signed_headers(), body).await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn verified_garbage_is_bad_request() {
        let body = Bytes::from_static(b"<xml/>");

        let response = paymongo_webhook(State(usecase(true)), signed_headers(), body).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
