use anyhow::Context;
use bridge::{Bridge, TickSnapshot};
use clap::Parser;
use export::DatasetExtractor;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use workflow::config::SimulationConfig;
use workflow::runner::Runner;

mod bridge;
mod export;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Radar-fusion simulation driver")]
struct Args {
    /// Load a simulation scenario from YAML
    #[arg(long)]
    config: Option<PathBuf>,
    /// Run a fixed number of ticks offline and print a summary
    #[arg(long, default_value_t = false)]
    offline: bool,
    #[arg(long, default_value_t = 50)]
    ticks: u64,
    /// Override the scenario RNG seed
    #[arg(long)]
    seed: Option<u64>,
    /// Keep the tick loop and the HTTP bridge alive until Ctrl+C
    #[arg(long, default_value_t = false)]
    serve: bool,
    #[arg(long, default_value_t = 9000)]
    port: u16,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = match args.config {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    let mut runner = Runner::new(config)?;
    let bridge = Bridge::new();

    if args.offline {
        let mut last = None;
        for _ in 0..args.ticks {
            last = Some(runner.tick()?);
        }

        let status = runner.metrics().snapshot();
        println!(
            "Offline run -> ticks {}, detections {}, active tracks {}, dropped {}",
            status.ticks, status.total_detections, status.active_tracks, status.dropped_detections
        );

        if let Some(report) = last {
            let rows = DatasetExtractor::extract_tabular(&report.detections);
            println!("Tabular rows from the final tick: {}", rows.len());
            bridge.publish(TickSnapshot {
                timestamp: report.timestamp,
                detections: report.detections.as_ref().clone(),
                tracks: report.tracks.as_ref().clone(),
                status,
            });
        }

        let sequences =
            DatasetExtractor::extract_sequences(runner.tracker().tracks().values(), 10, 1);
        println!("Sequence rows extracted: {}", sequences.len());
    }
    if args.serve {
        let addr = SocketAddr::from(([127, 0, 0, 1], args.port));
        bridge.serve(addr);
        println!("HTTP bridge on {addr} (Ctrl+C to stop)...");

        let mut rx = runner.subscribe();
        let bridge_feed = bridge.clone();
        let runtime = TokioBuilder::new_multi_thread()
            .enable_all()
            .build()
            .context("creating runtime for the serve loop")?;
        runtime.block_on(async move {
            tokio::spawn(async move {
                while let Ok(update) = rx.recv().await {
                    bridge_feed.publish(TickSnapshot::from(&update));
                }
            });
            tokio::spawn(async move {
                if let Err(err) = runner.run(None).await {
                    log::error!("simulation loop stopped: {err:#}");
                }
            });
            signal::ctrl_c().await.context("awaiting Ctrl+C to exit")?;
            Ok::<(), anyhow::Error>(())
        })?;
    }

    Ok(())
}
