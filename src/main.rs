mod cli;
mod engine;
mod generator;
mod models;
mod sink;
mod types;

use std::io;
use std::io::stderr;
use std::process::{exit, ExitCode};

use anyhow::Result;
use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, Layer};

use crate::cli::{Cli, SinkKind};
use crate::engine::{Escalation, Publisher, Shutdown, Summary};
use crate::generator::{GeneratorConfig, TransactionGenerator};
use crate::sink::{KafkaSink, Sink, WriterSink};
use crate::types::ConfigError;

/// Broker unreachable or any other fatal runtime failure.
const EXIT_SINK_UNREACHABLE: u8 = 1;
const EXIT_CONFIGURATION: u8 = 2;
const EXIT_INTERRUPTED: u8 = 130;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(parse_log_level(&cli.log_level));

    match run(cli).await {
        Ok(summary) => {
            eprintln!("{summary}");
            ExitCode::SUCCESS
        }
        Err(error) => {
            error!("{error:#}");
            ExitCode::from(exit_status(&error))
        }
    }
}

async fn run(cli: Cli) -> Result<Summary> {
    let mode = cli.mode();
    mode.validate()?;

    let config = match &cli.profile {
        Some(path) => {
            info!("Loading generator profile from [{}]", path.display());
            GeneratorConfig::from_file(path)?
        }
        None => GeneratorConfig::default()
    };

    let generator = TransactionGenerator::new(&config, cli.seed)?;

    let (trigger, shutdown) = Shutdown::channel();
    tokio::spawn(async move {
        if trigger.forward(next_signal).await == Escalation::Forced {
            error!("Received a second shutdown signal, exiting without waiting for in-flight messages");
            exit(i32::from(EXIT_INTERRUPTED));
        }
    });

    let summary = match cli.sink {
        SinkKind::Kafka => {
            let sink = KafkaSink::connect(&cli.kafka_settings()).await?;
            publish(sink, generator, &cli, shutdown).await?
        }
        SinkKind::Stdout => publish(WriterSink::stdout(), generator, &cli, shutdown).await?
    };

    Ok(summary)
}

async fn publish<S: Sink + 'static>(sink: S, generator: TransactionGenerator, cli: &Cli, shutdown: Shutdown) -> Result<Summary> {
    let mut publisher = Publisher::new(sink, generator, cli.topic.as_str(), shutdown);

    if let Some(interval) = cli.progress_every {
        publisher = publisher.with_progress_interval(interval);
    }

    Ok(publisher.run(cli.mode()).await?)
}

/// Resolves on the next Ctrl+C or SIGTERM.
#[cfg(unix)]
async fn next_signal() -> io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;

    tokio::select! {
        result = tokio::signal::ctrl_c() => result,
        _ = terminate.recv() => Ok(())
    }
}

#[cfg(not(unix))]
async fn next_signal() -> io::Result<()> {
    tokio::signal::ctrl_c().await
}

fn exit_status(error: &anyhow::Error) -> u8 {
    if error.downcast_ref::<ConfigError>().is_some() {
        EXIT_CONFIGURATION
    } else {
        EXIT_SINK_UNREACHABLE
    }
}

fn parse_log_level(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "warn" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        _ => {
            eprintln!("Invalid log level '{}', defaulting to 'info'", level);
            LevelFilter::INFO
        }
    }
}

fn setup_logging(level: LevelFilter) {
    //NOTE: stdout carries the records in stdout-sink mode, so logging goes to stderr
    let terminal_log = fmt::layer()
        .with_target(false)
        .with_writer(stderr)
        .with_filter(level);

    tracing_subscriber::registry()
        .with(terminal_log)
        .init();
}
