//! Load planner entry point: CLI wiring, configuration loading, and output.

use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::Parser;
use tracing::info;

use loadplan::config::PlanConfig;
use loadplan::io::export::export_csv;
use loadplan::logging;
use loadplan::plan::SharingMode;
use loadplan::session::Planner;
use loadplan::store::{ConfigStore, FileStore};

/// Commissioning load planner for lineup / PDU / subfeed topologies.
#[derive(Debug, Parser)]
#[command(name = "loadplan", version, about)]
struct Cli {
    /// Configuration file (`.json` or `.toml`).
    #[arg(long, conflicts_with_all = ["preset", "load"])]
    config: Option<PathBuf>,
    /// Built-in preset (baseline, ups_lineups, isolated_loadbanks).
    #[arg(long, conflicts_with = "load")]
    preset: Option<String>,
    /// Named configuration from the store.
    #[arg(long, requires = "store_dir")]
    load: Option<String>,
    /// Directory of the configuration store.
    #[arg(long, env = "LOADPLAN_STORE_DIR")]
    store_dir: Option<PathBuf>,
    /// Save the effective configuration to the store under this name.
    #[arg(long, requires = "store_dir")]
    save: Option<String>,
    /// Override the target load (MW).
    #[arg(long)]
    target_mw: Option<f64>,
    /// Loadbank sharing mode: networked or per-pdu.
    #[arg(long)]
    sharing: Option<SharingMode>,
    /// Write the plan as CSV.
    #[arg(long)]
    csv_out: Option<PathBuf>,
    /// Emit logs as JSON lines.
    #[arg(long)]
    log_json: bool,
    /// Start the REST API server after planning.
    #[cfg(feature = "api")]
    #[arg(long)]
    serve: bool,
    /// API server port.
    #[cfg(feature = "api")]
    #[arg(long, default_value_t = 3000)]
    port: u16,
}

fn load_config(cli: &Cli, store: Option<&FileStore>) -> anyhow::Result<PlanConfig> {
    if let Some(path) = &cli.config {
        return Ok(PlanConfig::from_path(path)?);
    }
    if let Some(name) = &cli.preset {
        return Ok(PlanConfig::from_preset(name)?);
    }
    if let Some(name) = &cli.load {
        let Some(store) = store else {
            bail!("--load requires --store-dir");
        };
        let blob = store.load(name)?;
        return PlanConfig::from_json_value(blob)
            .with_context(|| format!("stored configuration \"{name}\" is malformed"));
    }
    Ok(PlanConfig::baseline())
}

fn print_plan(planner: &Planner) {
    let topology = planner.topology();
    for load in planner.assignment().iter() {
        println!(
            "{:<12} {:<14} {:>9.2} kW  (ceiling {:>8.2} kW)",
            topology.display_name(load.lineup_id.as_str()),
            topology.display_name(load.pdu_id.as_str()),
            load.kw,
            topology.pdu_ceiling_kw(&load.pdu_id)
        );
    }
    if !planner.saturated_lineups().is_empty() {
        let names: Vec<&str> = planner
            .saturated_lineups()
            .iter()
            .map(|l| l.as_str())
            .collect();
        println!("\nSaturated lineups: {}", names.join(", "));
    }

    let warnings = planner.warnings();
    if !warnings.is_empty() {
        println!("\nWarnings:");
        for w in &warnings {
            println!("  {w}");
        }
    }
    let advisories = planner.advisories();
    if !advisories.is_empty() {
        println!("\nAdvisories:");
        for a in &advisories {
            println!(
                "  {}: {} at {:.2} of {:.2} kW ({})",
                a.category.title(),
                a.element_id,
                a.value_kw,
                a.ceiling_kw,
                a.band
            );
        }
    }
    println!("\n{}", planner.summary());
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(cli.log_json);

    let mut store = cli
        .store_dir
        .as_ref()
        .map(|dir| FileStore::open(dir.as_path()))
        .transpose()?;

    let mut config = load_config(&cli, store.as_ref())?;
    if let Some(mw) = cli.target_mw {
        config.target_load_mw = mw;
    }
    if let Some(mode) = cli.sharing {
        config.networked_loadbanks = mode == SharingMode::Networked;
    }

    if let (Some(name), Some(store)) = (&cli.save, store.as_mut()) {
        store.save(name, config.to_json_value()?)?;
        info!(name = %name, "configuration saved");
    }

    let mut planner = Planner::from_config(&config)?;
    if !planner.settings().auto_distribute {
        planner.redistribute();
    }
    info!(
        lineups = planner.topology().lineups().len(),
        target_kw = planner.settings().target_kw,
        "plan computed"
    );
    print_plan(&planner);

    if let Some(path) = &cli.csv_out {
        export_csv(
            planner.topology(),
            planner.assignment(),
            planner.settings().sharing_mode,
            path,
        )
        .with_context(|| format!("failed to write CSV to {}", path.display()))?;
        info!(path = %path.display(), "plan written");
    }

    #[cfg(feature = "api")]
    if cli.serve {
        use std::net::SocketAddr;

        use loadplan::api::{self, AppState};
        use loadplan::store::MemoryStore;

        let state = match store {
            Some(store) => AppState::new(store),
            None => AppState::new(MemoryStore::new()),
        };
        let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
        let rt = tokio::runtime::Runtime::new().context("failed to create tokio runtime")?;
        rt.block_on(api::serve(state, addr))?;
    }

    Ok(())
}
