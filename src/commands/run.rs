use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::ArgMatches;
use tokio::sync::mpsc;
use yakabot_channel_adapter::{InteractionLogger, MattermostAdapter, MattermostConfig, Session};
use yakabot_responder::{
    initial_table, BotNames, NoMatchPolicy, Responder, ResponderConfig, Startup,
};

const EVENT_QUEUE_DEPTH: usize = 256;

pub async fn run(matches: &ArgMatches) -> anyhow::Result<()> {
    // Initialize tracing for structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let no_match = match matches.get_one::<String>("no-match-reply") {
        Some(text) => NoMatchPolicy::Reply(text.clone()),
        None => NoMatchPolicy::Silent,
    };
    let log_path = matches.get_one::<PathBuf>("interaction-log").cloned();

    let config = MattermostConfig::from_env().context("invalid configuration")?;
    tracing::info!(bot = %config.full_name, host = %config.host, "Starting");

    let table = initial_table(&BotNames {
        login: config.login.clone(),
        first_name: config.first_name.clone(),
        full_name: config.full_name.clone(),
    });

    let session = Session::establish(&config)
        .await
        .with_context(|| format!("could not set up a session with {}", config.server_url()))?;
    tracing::info!(
        user_id = %session.user.id,
        team = %session.team.name,
        channel = %session.channel.name,
        "Session ready"
    );

    let adapter = Arc::new(MattermostAdapter::new(&session, config.websocket_url()));
    let responder = Responder::new(
        ResponderConfig {
            bot_user_id: session.user.id.clone(),
            team_id: session.team.id.clone(),
            channel_id: session.channel.id.clone(),
            full_name: config.full_name.clone(),
            no_match,
        },
        table,
        adapter,
        Arc::new(InteractionLogger::new(log_path)),
    )?;

    // Poll the Ctrl-C future from the start notice on, so an interrupt during
    // the websocket connect still ends with the farewell.
    let interrupt = interrupted();
    tokio::pin!(interrupt);

    let (tx, rx) = mpsc::channel(EVENT_QUEUE_DEPTH);
    match responder
        .start(tx, interrupt.as_mut())
        .await
        .context("we failed to connect to the web socket")?
    {
        Startup::Interrupted => return Ok(()),
        Startup::Ready => {}
    }

    let reason = responder.run(rx, interrupt).await;
    tracing::info!(reason = ?reason, "Stopped");
    Ok(())
}

/// Resolves on Ctrl-C. Never resolves if the handler cannot be installed.
async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Cannot listen for interrupts");
        std::future::pending::<()>().await;
    }
}
