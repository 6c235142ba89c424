use anyhow::Result;
use chrono::Duration as ChronoDuration;
use crates::infra::{
    db::{
        postgres::postgres_connection,
        repositories::{email_jobs::EmailJobPostgres, order_notifications::OrderNotificationPostgres},
    },
    mail::http_mail_client::HttpMailClient,
    queue::postgres_queue::PostgresEmailQueue,
};
use std::{sync::Arc, time::Duration};
use tracing::{error, info};
use worker::{
    config,
    email_notification::{self, worker::EmailQueueWorkerConfig},
    usecases::email_delivery::EmailDeliveryUseCase,
};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        error!(error = ?error, "worker exited with error");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    crates::observability::init_observability("worker")?;

    let dotenvy_env = config::config_loader::load()?;
    info!("worker: ENV has been loaded");

    let postgres_pool = postgres_connection::establish_connection(
        &dotenvy_env.database.url,
        dotenvy_env.database.max_pool_size,
    )?;
    info!("worker: Postgres connection has been established");
    let db_pool_arc = Arc::new(postgres_pool);

    let email_queue_config = &dotenvy_env.email_queue;
    let queue = Arc::new(PostgresEmailQueue::new(
        Arc::clone(&db_pool_arc),
        ChronoDuration::seconds(email_queue_config.visibility_timeout_secs),
    ));

    let mail = &dotenvy_env.mail;
    let mailer = Arc::new(HttpMailClient::new(
        mail.api_url.clone(),
        mail.api_key.clone(),
        mail.from.clone(),
    ));

    let email_delivery_usecase = Arc::new(EmailDeliveryUseCase::new(
        Arc::new(EmailJobPostgres::new(Arc::clone(&db_pool_arc))),
        Arc::new(OrderNotificationPostgres::new(Arc::clone(&db_pool_arc))),
        mailer,
    ));

    let worker_config = EmailQueueWorkerConfig {
        poll_interval: Duration::from_secs(email_queue_config.poll_interval_secs),
        max_concurrency: email_queue_config.max_concurrency,
        max_attempts: email_queue_config.max_attempts,
    };

    email_notification::worker::run(queue, email_delivery_usecase, worker_config, shutdown_signal())
        .await?;

    info!("worker: stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "worker: failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "worker: failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("worker: received Ctrl+C signal"),
        _ = terminate => info!("worker: received terminate signal"),
    }
}
