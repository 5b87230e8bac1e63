use std::sync::Arc;

use notes_reminder::{
    config,
    handlers::rest,
    notifier::{DesktopNotifier, LogNotifier, Notifier},
    repository::Repository,
    router::RequestRouter,
    scheduler::ReminderScheduler,
    service::NoteService,
};

#[tokio::main]
async fn main() {
    // Log setup
    tracing_subscriber::fmt::init();

    // Load config
    let cfg = config::load_config().unwrap_or_else(|e| {
        tracing::error!("Failed to load config: {e}");
        panic!("failed to load config: {e}");
    });
    let database_path = cfg.database_path().unwrap_or_else(|e| {
        tracing::error!("Failed to resolve database path: {e}");
        panic!("failed to resolve database path: {e}");
    });

    // Repository creation and migration
    let repo = Repository::open(&database_path).unwrap_or_else(|e| {
        tracing::error!("Failed to open database: {e}");
        panic!("failed to open database: {e}");
    });

    repo.migrate().await.unwrap_or_else(|e| {
        tracing::error!("Failed to migrate database: {e}");
        panic!("failed to migrate database: {e}");
    });

    // Reminder scheduler
    let notifier: Arc<dyn Notifier> = if cfg.desktop_notifications {
        Arc::new(DesktopNotifier)
    } else {
        Arc::new(LogNotifier)
    };
    let scheduler =
        Arc::new(ReminderScheduler::new(notifier).with_title(cfg.notification_title.clone()));

    // Service creation
    let service = NoteService::new(repo, scheduler.clone());

    if cfg.rearm_on_startup {
        if let Err(e) = service.rearm_reminders().await {
            tracing::error!("Failed to re-arm stored reminders: {e}");
        }
    }

    // Request router
    let (handle, router_task) = RequestRouter::spawn(service, cfg.router_buffer);

    let listener = tokio::net::TcpListener::bind(&cfg.http_addr)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Failed to bind {}: {e}", cfg.http_addr);
            panic!("failed to bind {}: {e}", cfg.http_addr);
        });

    match listener.local_addr() {
        Ok(addr) => tracing::info!("Notes service listening on {}", addr),
        Err(e) => tracing::warn!("Notes service listening, address unknown: {e}"),
    }

    if let Err(e) = axum::serve(listener, rest::router(handle))
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!("HTTP server error: {e}");
    }

    // The router stops once the last handle, owned by the HTTP app, is gone.
    if let Err(e) = router_task.await {
        tracing::error!("Request router task failed: {e}");
    }
    scheduler.shutdown();

    tracing::info!("Notes service stopped");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }

    tracing::info!("Shutdown signal received");
}
