#![doc = include_str!("../README.md")]

mod config;
mod telemetry;

use anyhow::bail;
use clap::Parser;
use config::{CliArgs, CliConfig, Command, SchemeConfig};
use periodid::{Components, Generator, GeneratorConfig, PeriodId, Scheme, SystemClock};
use serde::Serialize;
use std::io::{self, BufWriter, Write};
use tokio::signal;

/// One line of output.
#[derive(Serialize)]
struct IdRecord {
    id: u64,
    #[serde(flatten)]
    components: Components,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = CliConfig::try_from(args)?;

    telemetry::init_tracing()?;
    tracing::debug!(?config, "configuration loaded");

    match config.scheme.clone() {
        SchemeConfig::Sequence(scheme) => run(scheme, &config).await,
        SchemeConfig::ShortOrder(scheme) => run(scheme, &config).await,
        SchemeConfig::LongOrder(scheme) => run(scheme, &config).await,
        SchemeConfig::Snowflake(scheme) => run(scheme, &config).await,
        SchemeConfig::SnowflakeDay(scheme) => run(scheme, &config).await,
    }
}

async fn run<S>(scheme: S, config: &CliConfig) -> anyhow::Result<()>
where
    S: Scheme,
    <S::Id as PeriodId>::Ty: TryFrom<u64>,
{
    let mut out = BufWriter::new(io::stdout().lock());
    match &config.command {
        Command::Next { count } => {
            generate(scheme, config.generator_config(), *count, &mut out).await?;
        }
        Command::Decompose { ids } => decompose::<S::Id>(ids, &mut out)?,
    }
    out.flush()?;
    Ok(())
}

async fn generate<S: Scheme>(
    scheme: S,
    generator_config: GeneratorConfig,
    count: u64,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let worker_id = scheme.worker_id();
    let generator = Generator::spawn_with(scheme, SystemClock, generator_config)?;
    tracing::info!(worker_id, count, "generating ids");

    let result = tokio::select! {
        result = write_ids(&generator, count, out) => result,
        () = shutdown_signal() => {
            tracing::info!("Received Ctrl+C signal, stopping early");
            Ok(())
        }
    };

    generator.shutdown();
    result
}

async fn write_ids<S: Scheme>(
    generator: &Generator<S>,
    count: u64,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    for _ in 0..count {
        let id = generator.next_id().await?;
        write_record(out, id.to_raw().into(), generator.decompose(id))?;
    }
    Ok(())
}

fn decompose<ID>(ids: &[u64], out: &mut impl Write) -> anyhow::Result<()>
where
    ID: PeriodId,
    ID::Ty: TryFrom<u64>,
{
    for &raw in ids {
        let Ok(value) = <ID::Ty as TryFrom<u64>>::try_from(raw) else {
            bail!(
                "{raw} does not fit a {}-bit id",
                core::mem::size_of::<ID::Ty>() * 8
            );
        };
        let components = ID::from_raw(value).components();
        if components == Components::default() && raw != 0 {
            tracing::warn!(raw, "malformed id decodes to zero components");
        }
        write_record(out, raw, components)?;
    }
    Ok(())
}

fn write_record(out: &mut impl Write, id: u64, components: Components) -> anyhow::Result<()> {
    serde_json::to_writer(&mut *out, &IdRecord { id, components })?;
    writeln!(out)?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        tracing::error!("failed to install Ctrl+C handler: {:?}", err);
        std::future::pending::<()>().await;
    }
}
