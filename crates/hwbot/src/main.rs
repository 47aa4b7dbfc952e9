use std::sync::Arc;

use anyhow::Context;

use hwbot_core::{bot::HomeworkBot, config::Config};
use hwbot_practicum::PracticumClient;
use hwbot_telegram::TelegramMessenger;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    hwbot_core::logging::init("hwbot")?;

    let cfg = Config::load().context("failed to load configuration")?;
    tracing::debug!(?cfg, "configuration loaded");

    let api = Arc::new(
        PracticumClient::new(
            cfg.endpoint.clone(),
            cfg.credentials.practicum_token.clone(),
            cfg.http_timeout,
        )
        .context("failed to build practicum client")?,
    );
    let messenger = Arc::new(TelegramMessenger::new(
        cfg.credentials.telegram_token.clone(),
    ));

    let mut bot = HomeworkBot::new(&cfg, api, messenger);
    bot.run().await.context("homework bot stopped")?;

    Ok(())
}
