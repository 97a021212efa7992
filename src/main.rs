use std::sync::Arc;

use futures::StreamExt;

use cubebot::channels::{Channel, CliChannel, TelegramChannel};
use cubebot::config::BotConfig;
use cubebot::router::ConversationRouter;
use cubebot::store::{self, JsonCredentialTable, JsonDirectoryTable, JsonScheduleSource};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = BotConfig::from_env()?;

    eprintln!("📅 cubebot v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Schedule: {}", config.schedule_path.display());
    eprintln!("   Credentials: {}", config.credentials_path.display());
    eprintln!("   Directory: {}", config.directory_path.display());

    // Seed the writable tables so a fresh deployment starts empty rather
    // than failing. The schedule is externally authored and never seeded.
    store::ensure_table(&config.credentials_path).await?;
    store::ensure_table(&config.directory_path).await?;
    if !tokio::fs::try_exists(&config.schedule_path).await? {
        tracing::warn!(
            path = %config.schedule_path.display(),
            "schedule source is missing; conversations will end until it appears"
        );
    }

    let router = Arc::new(ConversationRouter::new(
        Arc::new(JsonCredentialTable::new(&config.credentials_path)),
        Arc::new(JsonScheduleSource::new(&config.schedule_path)),
        Arc::new(JsonDirectoryTable::new(&config.directory_path)),
        config.page_size,
    ));

    let channel: Arc<dyn Channel> = match config.token {
        Some(token) => {
            eprintln!("   Channel: telegram\n");
            Arc::new(TelegramChannel::new(token))
        }
        None => {
            eprintln!("   Channel: cli (set CUBEBOT_TOKEN for telegram)\n");
            Arc::new(CliChannel::new())
        }
    };

    let mut events = channel.start().await?;

    // Events are handled to completion in arrival order, which also keeps
    // per-identity handling serial.
    while let Some(event) = events.next().await {
        let replies = router.handle(&event).await;
        if let Err(e) = channel.respond(&event, &replies).await {
            tracing::error!(error = %e, identity = %event.identity, "failed to deliver replies");
        }
    }

    channel.shutdown().await?;
    Ok(())
}
