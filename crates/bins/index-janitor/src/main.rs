use std::sync::Arc;

use chrono::{TimeZone, Utc};
use clap::Parser;
use crash_index::{FileMappingProvider, IndexLifecycleManager, SystemClock};
use index_janitor::{Command, Opts, Settings};
use snafu::{ResultExt, Snafu};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Settings (Configuration or CLI) Error: {}", source))]
    Settings { source: crash_config::ConfigError },

    #[snafu(display("Invalid Elasticsearch Configuration: {}", source))]
    Configuration { source: crash_index::IndexError },

    #[snafu(display("Execution Error: {}", source))]
    Execution { source: crash_index::IndexError },

    #[snafu(display("Serialization Error: {}", source))]
    Serialization { source: serde_json::Error },
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "index_janitor=info,crash_index=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let opts = Opts::parse();
    let settings = Settings::new(&opts).context(SettingsSnafu)?;

    if let Command::Config = opts.cmd {
        let json = serde_json::to_string_pretty(&settings).context(SerializationSnafu)?;
        println!("{json}");
        return Ok(());
    }

    let mappings = FileMappingProvider::new(settings.mappings_dir(&opts));
    let manager = IndexLifecycleManager::new(
        settings.elasticsearch.clone(),
        Arc::new(mappings),
        Arc::new(SystemClock),
    )
    .context(ConfigurationSnafu)?;

    run(&manager, opts.cmd).await.context(ExecutionSnafu)
}

async fn run(
    manager: &IndexLifecycleManager,
    cmd: Command,
) -> Result<(), crash_index::IndexError> {
    match cmd {
        Command::Create { date } => {
            let (name, created) = match date {
                Some(date) => {
                    let date = Utc.from_utc_datetime(&date.and_time(chrono::NaiveTime::MIN));
                    manager.create_index_for_date(date).await?
                }
                None => manager.create_current_index().await?,
            };
            if created {
                info!("index '{}' created", name);
            } else {
                info!("index '{}' already exists", name);
            }
        }
        Command::List => {
            for name in manager.list_managed_indices().await? {
                println!("{name}");
            }
        }
        Command::Delete { name } => manager.delete_index(&name).await?,
        Command::Expire => {
            let sweep = manager.sweep_expired_indices().await?;
            for name in &sweep.deleted {
                println!("{name}");
            }
            for skipped in &sweep.skipped {
                tracing::warn!("left '{}' untouched: {}", skipped.name, skipped.reason);
            }
        }
        Command::Refresh { index } => manager.refresh(index.as_deref()).await?,
        Command::Health => {
            let health = manager.health_check().await?;
            info!("cluster is {}", health);
        }
        Command::Config => {}
    }

    Ok(())
}
