mod cli;
mod config;
mod engine;
mod error;
mod intake;
mod state_machine;
mod store;
mod ui;
mod validator;

use std::sync::Arc;

use anyhow::Result;
use chrono::Duration;
use clap::Parser;

use cli::{Cli, Command, InitialStateArg};
use config::ConsentorConfig;
use engine::TransitionEngine;
use intake::IntakeReport;
use state_machine::{ConsentRecord, ConsentState};
use store::{ConsentStore, FileStore, MemoryStore};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = ConsentorConfig::load()?;
    if let Some(store) = cli.store {
        config.store_path = store;
    }

    match cli.command {
        Command::Save {
            consent_id,
            state,
            ttl_minutes,
        } => save(&config, consent_id, state, ttl_minutes).await,
        Command::Event { consent_ids } => event(&config, consent_ids, cli.verbose).await,
        Command::Status => status(&config).await,
        Command::Demo => demo(&config, cli.verbose).await,
    }
}

/// Creates a consent record in the configured store. Only the two
/// non-terminal states can be assigned here; terminal states are reached
/// exclusively through engine transitions.
async fn save(
    config: &ConsentorConfig,
    consent_id: String,
    state: Option<InitialStateArg>,
    ttl_minutes: Option<i64>,
) -> Result<()> {
    let store = FileStore::new(&config.store_path);
    let initial = state.unwrap_or(InitialStateArg::Authorised);
    let ttl = Duration::minutes(ttl_minutes.unwrap_or(config.default_ttl_minutes));

    let record = store
        .insert(ConsentRecord::new(consent_id, initial.into(), ttl))
        .await?;
    println!(
        "Consent {} saved in state {}, expires at {}",
        record.consent_id,
        record.state,
        record.expires_at.format("%Y-%m-%d %H:%M:%S")
    );
    Ok(())
}

/// Publishes the given consent ids onto the intake channel and drains them
/// against the configured store.
async fn event(config: &ConsentorConfig, consent_ids: Vec<String>, verbose: bool) -> Result<()> {
    let store: Arc<dyn ConsentStore> = Arc::new(FileStore::new(&config.store_path));
    let report = drain(store.clone(), consent_ids, config.queue_capacity).await?;

    if verbose {
        ui::print_records(&store.list().await?);
    }
    if report.failed() > 0 {
        anyhow::bail!("{} deliveries failed", report.failed());
    }
    Ok(())
}

async fn status(config: &ConsentorConfig) -> Result<()> {
    let store = FileStore::new(&config.store_path);
    ui::print_records(&store.list().await?);
    Ok(())
}

/// Demonstração embutida: quatro consentimentos em memória cobrindo
/// expiração, rejeição, redelivery de um registro já finalizado e um
/// registro ainda vigente.
async fn demo(config: &ConsentorConfig, verbose: bool) -> Result<()> {
    let memory = Arc::new(MemoryStore::new());

    // AUTHORISED que expirou há uma hora.
    memory
        .insert(ConsentRecord::new(
            "demo-expiring",
            ConsentState::Authorised,
            Duration::hours(-1),
        ))
        .await?;

    // AWAITING_AUTHORISATION criado agora: rejeitado na primeira entrega.
    memory
        .insert(ConsentRecord::new(
            "demo-awaiting",
            ConsentState::AwaitingAuthorisation,
            Duration::minutes(config.default_ttl_minutes),
        ))
        .await?;

    // Registro já finalizado: a entrega será tolerada, sem nova escrita.
    let mut finalized =
        ConsentRecord::new("demo-finalized", ConsentState::Authorised, Duration::hours(-2));
    finalized.state = ConsentState::Expired;
    memory.insert(finalized).await?;

    // AUTHORISED ainda vigente: nada a fazer.
    memory
        .insert(ConsentRecord::new(
            "demo-active",
            ConsentState::Authorised,
            Duration::hours(1),
        ))
        .await?;

    // "demo-expiring" entra duas vezes para exibir a redelivery tolerada.
    let ids = [
        "demo-expiring",
        "demo-expiring",
        "demo-awaiting",
        "demo-finalized",
        "demo-active",
    ]
    .into_iter()
    .map(String::from)
    .collect();

    let store: Arc<dyn ConsentStore> = memory;
    drain(store.clone(), ids, config.queue_capacity).await?;

    if verbose {
        ui::print_records(&store.list().await?);
    }
    Ok(())
}

/// Runs one intake drain: spawn the consumer, publish every id, close the
/// channel, then render the per-delivery outcomes and the summary.
async fn drain(
    store: Arc<dyn ConsentStore>,
    consent_ids: Vec<String>,
    capacity: usize,
) -> Result<IntakeReport> {
    let engine = Arc::new(TransitionEngine::new(store));
    let (sender, consumer) = intake::channel(engine, capacity);
    let progress = ui::DrainProgress::start(consent_ids.len());

    let handle = tokio::spawn(consumer.run());
    for consent_id in consent_ids {
        sender.publish(consent_id).await?;
    }
    drop(sender);
    let report = handle.await?;

    progress.finish();
    for delivery in &report.deliveries {
        progress.delivery(delivery);
    }
    progress.summary(&report);
    Ok(report)
}
