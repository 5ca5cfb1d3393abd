use std::process::ExitCode;

use mdtn_client::{MdtnClient, auth::Credentials, config::Config, pagination::Aggregated};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 加载配置
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("API_BASE_URL must be set: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let client = match MdtnClient::from_config(config) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("Failed to initialise client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = ensure_session(&client).await {
        tracing::error!("{}", e);
        return ExitCode::FAILURE;
    }

    // 没有参数时只检查会话
    let Some(city_arg) = std::env::args().nth(1) else {
        tracing::info!("Session ready");
        return ExitCode::SUCCESS;
    };

    let city_id: i64 = match city_arg.parse() {
        Ok(id) => id,
        Err(_) => {
            tracing::error!("City id must be a number, got {:?}", city_arg);
            return ExitCode::FAILURE;
        }
    };

    let venues = client
        .venues()
        .in_city(city_id, |progress| {
            tracing::info!(
                page = progress.page,
                loaded = progress.records.len(),
                total = ?progress.total,
                "Loading venues"
            );
        })
        .await;

    report(city_id, &venues)
}

async fn ensure_session(client: &MdtnClient) -> Result<(), String> {
    match client.auth.restore().await {
        Ok(Some(session)) => {
            tracing::info!(
                user = session.user.as_ref().map(|u| u.name.as_str()).unwrap_or("-"),
                "Restored session"
            );
            return Ok(());
        }
        Ok(None) => {}
        Err(e) => return Err(format!("Failed to read stored session: {}", e)),
    }

    let (Ok(email), Ok(password)) = (std::env::var("ADMIN_EMAIL"), std::env::var("ADMIN_PASSWORD"))
    else {
        return Err("No stored session; set ADMIN_EMAIL and ADMIN_PASSWORD to sign in".into());
    };

    client
        .auth
        .login_admin(&Credentials::new(email, password))
        .await
        .map(|_| ())
        .map_err(|e| format!("Login failed: {}", e))
}

fn report(city_id: i64, venues: &Aggregated<mdtn_client::resources::Venue>) -> ExitCode {
    for venue in &venues.records {
        println!("{}\t{}", venue.id, venue.name);
    }

    if venues.complete {
        tracing::info!(city_id, count = venues.records.len(), "All venues loaded");
        ExitCode::SUCCESS
    } else {
        tracing::warn!(
            city_id,
            count = venues.records.len(),
            reason = venues.failure_reason.as_deref().unwrap_or("unknown"),
            "Venue list may be incomplete"
        );
        ExitCode::FAILURE
    }
}
