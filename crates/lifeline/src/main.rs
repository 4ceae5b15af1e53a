//! `lifelined` - emergency response backend relay
//!
//! This binary serves the HTTP API and provides operational commands for
//! checking the deployment and provisioning QoD sessions by hand.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::sync::Arc;

use clap::Parser;

use lifeline::api::{self, AppState};
use lifeline::cli::{CheckCommand, Cli, Command, ConfigCommand, QodCommand, ServeCommand};
use lifeline::network::{NacClient, NetworkAdapter, NotificationTarget, QosTier};
use lifeline::store::{DocumentStore, MongoStore};
use lifeline::{init_logging, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone())?;

    // Execute the command
    match cli.command {
        Command::Serve(serve_cmd) => handle_serve(&config, &serve_cmd).await,
        Command::Check(check_cmd) => handle_check(&config, &check_cmd).await,
        Command::Qod(qod_cmd) => handle_qod(&config, &qod_cmd).await,
        Command::Config(config_cmd) => handle_config(&config, config_cmd),
    }
}

fn build_adapter(config: &Config) -> NetworkAdapter {
    let provider = Arc::new(NacClient::from_config(&config.provider));
    NetworkAdapter::new(provider, NotificationTarget::from(&config.provider))
}

async fn handle_serve(config: &Config, cmd: &ServeCommand) -> anyhow::Result<()> {
    let store = MongoStore::connect(&config.store).await?;

    let state = AppState {
        network: build_adapter(config),
        store: Arc::new(store),
        default_device: config.provider.default_phone_number.clone(),
        database: config.store.database.clone(),
        presence: config.presence(),
    };

    let addr = cmd
        .bind
        .clone()
        .unwrap_or_else(|| config.server.listen_addr());
    api::serve(&addr, state).await?;
    Ok(())
}

async fn handle_check(config: &Config, cmd: &CheckCommand) -> anyhow::Result<()> {
    let presence = config.presence();

    let store_connected = match MongoStore::connect(&config.store).await {
        Ok(store) => store.ping().await,
        Err(err) => {
            eprintln!("store connection failed: {err}");
            false
        }
    };

    if cmd.json {
        let report = serde_json::json!({
            "store_connected": store_connected,
            "database": config.store.database,
            "env_vars_set": presence,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("lifelined check");
        println!("---------------");
        println!("Store reachable:   {store_connected}");
        println!("Database:          {}", config.store.database);
        println!();
        println!("Provider token:    {}", presence.provider_token);
        println!("Store username:    {}", presence.store_username);
        println!("Store password:    {}", presence.store_password);
        println!("Store cluster:     {}", presence.store_cluster);
        println!("Store database:    {}", presence.store_database);
    }
    Ok(())
}

async fn handle_qod(config: &Config, cmd: &QodCommand) -> anyhow::Result<()> {
    let adapter = build_adapter(config);
    let phone_number = cmd
        .phone_number
        .clone()
        .unwrap_or_else(|| config.provider.default_phone_number.clone());

    let batch = adapter
        .create_qod_sessions(&phone_number, &cmd.service_ipv4)
        .await;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&batch)?);
        return Ok(());
    }

    println!("QoD sessions for {phone_number} -> {}", cmd.service_ipv4);
    for tier in QosTier::ALL {
        match batch.get(tier) {
            lifeline::SessionOutcome::Created {
                profile,
                session_id,
            } => {
                let id = session_id.as_deref().unwrap_or("(no id)");
                println!("  {tier:<6} ok      profile={profile} session={id}");
            }
            lifeline::SessionOutcome::Failed { profile, error } => {
                println!("  {tier:<6} failed  profile={profile} {error}");
            }
        }
    }
    println!(
        "{}/3 sessions created",
        batch.created_count()
    );
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            let redacted = config.redacted();
            if json {
                println!("{}", serde_json::to_string_pretty(&redacted)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Server]");
                println!("  Listen address:     {}", redacted.server.listen_addr());
                println!();
                println!("[Provider]");
                println!("  Base URL:           {}", redacted.provider.base_url);
                println!(
                    "  Token:              {}",
                    redacted.provider.token.as_deref().unwrap_or("(not set)")
                );
                println!(
                    "  Default device:     {}",
                    redacted.provider.default_phone_number
                );
                println!(
                    "  Notification URL:   {}",
                    redacted.provider.notification_url
                );
                println!();
                println!("[Store]");
                println!("  Cluster:            {}", redacted.store.cluster);
                println!("  Database:           {}", redacted.store.database);
                println!("  Username:           {}", redacted.store.username);
                println!("  Password:           {}", redacted.store.password);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(loaded) => {
                    println!("Configuration is valid.");
                    if loaded.store.require_credentials().is_err() {
                        println!("Note: store credentials are not set; `serve` will refuse to start.");
                    }
                }
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
