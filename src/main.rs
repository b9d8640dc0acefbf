//! # Actor Driver
//!
//! Boots a driver against an in-process cluster, creates a `Counter` actor and
//! submits increments to it in order.
//!
//! ## Usage
//!
//! ```bash
//! # Increase by 10, then read the counter
//! actor-driver --increase 10
//!
//! # Several increments, with a config file
//! actor-driver --config driver.yaml --increase 5 --increase 3
//! ```
//!
//! Logging is controlled with `RUST_LOG` (default `info`).

use std::{path::PathBuf, sync::Arc};

use actor_invoke::{Runtime, RuntimeConfig, TypeDescriptor, TypeRegistry, domain::constant::driver, runtime::Method};
use anyhow::{Context, Result};
use clap::Parser;
use tracing::{Level, event};
use tracing_subscriber::EnvFilter;

const INCREASE: Method<(i64,), i64> = Method::new("Increase");
const GET: Method<(), i64> = Method::new("Get");

#[derive(Debug, Parser)]
#[command(name = "actor-driver", version, about = "Drive a Counter actor on an in-process cluster")]
struct DriverCli {
    /// Configuration file (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory service address, host:port
    #[arg(long)]
    address: Option<String>,

    /// Directory service password
    #[arg(long)]
    password: Option<String>,

    #[arg(long)]
    driver_name: Option<String>,

    /// Amount to add to the counter; may be repeated
    #[arg(long = "increase", value_name = "N", allow_negative_numbers = true)]
    increments: Vec<i64>
}

#[derive(Debug, Default)]
struct Counter {
    value: i64
}

fn registry() -> Result<Arc<TypeRegistry>> {
    let mut registry = TypeRegistry::new();
    registry.register(
        TypeDescriptor::builder::<Counter>("driver", "Counter")
            .method("Increase", |counter: &mut Counter, (n,): (i64,)| {
                counter.value += n;
                counter.value
            })
            .method("Get", |counter: &mut Counter, (): ()| counter.value)
            .build()
    )?;
    Ok(registry.freeze())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = DriverCli::parse();

    let mut config = RuntimeConfig::load_or_default(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(address) = cli.address {
        config.address = address;
    }
    if let Some(password) = cli.password {
        config.password = password;
    }
    if let Some(driver_name) = cli.driver_name {
        config.driver_name = driver_name;
    }
    config.validate().context("Invalid configuration")?;

    let runtime = Runtime::local(&config, registry()?).await.context("Failed to initialize runtime")?;

    let counter = runtime.actor("driver.Counter")?.remote().await.context("Failed to create counter")?;
    let increase = counter.method(&INCREASE)?;
    for n in &cli.increments {
        let running = increase.remote((*n,)).await?.get().await?;
        event!(Level::INFO, event = driver::INCREASED, by = n, running_total = running);
    }

    let total = counter.method(&GET)?.remote(()).await?.get().await?;
    event!(Level::INFO, event = driver::COMPLETED, actor_id = %counter.id(), increments = cli.increments.len(), total);
    println!("{}", total);

    runtime.shutdown().await;
    Ok(())
}
