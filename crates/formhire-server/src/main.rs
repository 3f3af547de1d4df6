use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::http::{
    Method,
    header::{AUTHORIZATION, CONTENT_TYPE},
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use formhire_api::{AdminAllowList, AppConfig, AppStateInner, MediaHostConfig};
use formhire_db::Database;
use formhire_mailer::{ConsoleEmailSender, EmailSender, Notifier, SmtpConfig, SmtpEmailSender};

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-string",
    "dev-secret-change-me",
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "formhire=debug,formhire_api=debug,formhire_mailer=info,tower_http=debug".into()
            }),
        )
        .init();

    // Config
    let jwt_secret = std::env::var("FORMHIRE_JWT_SECRET").unwrap_or_default();
    if jwt_secret.trim().is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
        eprintln!("FATAL: FORMHIRE_JWT_SECRET is unset or still a placeholder.");
        eprintln!("       It must match the identity provider's signing secret.");
        eprintln!("       Set it in your .env file and restart.");
        std::process::exit(1);
    }

    let host = std::env::var("FORMHIRE_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("FORMHIRE_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;
    let db_path: PathBuf = std::env::var("FORMHIRE_DB_PATH")
        .unwrap_or_else(|_| "formhire.db".into())
        .into();
    let admins = AdminAllowList::parse(&std::env::var("FORMHIRE_ADMIN_EMAILS").unwrap_or_default());
    let public_url =
        std::env::var("FORMHIRE_PUBLIC_URL").unwrap_or_else(|_| "http://localhost:3000".into());
    let expose_errors = std::env::var("FORMHIRE_EXPOSE_ERRORS")
        .map(|v| v.trim().eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    if admins.is_empty() {
        warn!("FORMHIRE_ADMIN_EMAILS is empty, admin routes will refuse everyone");
    }

    let media = MediaHostConfig::from_env();
    if media.cloud_name.is_none() {
        warn!("CLOUDINARY_CLOUD_NAME not set, resume uploads are disabled");
    }

    // Init database
    let db = Database::open(&db_path)?;

    // Email: SMTP when fully configured, console otherwise
    let sender: Arc<dyn EmailSender> = match SmtpConfig::from_env() {
        Some(config) => {
            let relay = config.host.clone();
            match tokio::task::spawn_blocking(move || SmtpEmailSender::new(config)).await? {
                Ok(smtp) => {
                    info!("Sending email through SMTP relay {}", relay);
                    Arc::new(smtp)
                }
                Err(e) => {
                    warn!("SMTP relay {} unusable ({}), logging emails instead", relay, e);
                    Arc::new(ConsoleEmailSender::new())
                }
            }
        }
        None => {
            warn!("SMTP not configured, logging emails instead");
            Arc::new(ConsoleEmailSender::new())
        }
    };
    let (notifier, mail_worker) = Notifier::spawn(sender, public_url.clone());

    let state = Arc::new(AppStateInner {
        db,
        config: AppConfig {
            jwt_secret,
            admins,
            public_url,
            expose_errors,
            media,
        },
        notifier,
        http: reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?,
    });

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    let app = formhire_api::create_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("FormHire server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The router held the last notifier handles; let queued mail drain
    if tokio::time::timeout(Duration::from_secs(10), mail_worker)
        .await
        .is_err()
    {
        warn!("Gave up waiting for queued notifications");
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
                }
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                ctrl_c.await.ok();
                info!("Received Ctrl+C, shutting down...");
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
