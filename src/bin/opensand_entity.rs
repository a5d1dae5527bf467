//! Entity process wiring: parses a small CLI, loads the topology/MODCOD/
//! Aloha configuration for one entity role, builds its route table and
//! MODCOD table, and reports readiness. Building the full block graph and
//! spawning its channel threads belongs to `opensand_dataplane::rt`; this
//! binary is glue only, and the sole place allowed to call
//! `std::process::exit`.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use env_logger::Builder;
use log::{error, info, LevelFilter};

use opensand_dataplane::config::{parse_modcod_table, AlohaConfig, TopologyConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntityRole {
    Gateway,
    Satellite,
    Terminal,
}

struct Args {
    role: EntityRole,
    topology_path: PathBuf,
    modcod_path: PathBuf,
    aloha_path: Option<PathBuf>,
}

fn parse_args() -> Result<Args> {
    let mut role = None;
    let mut topology_path = None;
    let mut modcod_path = None;
    let mut aloha_path = None;

    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "gw" => role = Some(EntityRole::Gateway),
            "sat" => role = Some(EntityRole::Satellite),
            "st" => role = Some(EntityRole::Terminal),
            "--topology" => topology_path = it.next().map(PathBuf::from),
            "--modcod" => modcod_path = it.next().map(PathBuf::from),
            "--aloha" => aloha_path = it.next().map(PathBuf::from),
            other => anyhow::bail!("unrecognized argument: {other}"),
        }
    }

    Ok(Args {
        role: role.context("missing entity role: expected one of gw|sat|st")?,
        topology_path: topology_path.context("missing --topology <path>")?,
        modcod_path: modcod_path.context("missing --modcod <path>")?,
        aloha_path,
    })
}

fn run() -> Result<()> {
    let args = parse_args()?;

    let topology_text = std::fs::read_to_string(&args.topology_path).with_context(|| format!("reading topology config {:?}", args.topology_path))?;
    let topology = TopologyConfig::from_toml_str(&topology_text)?;
    let routes = topology.build_route_table()?;
    info!("entity {} loaded topology: {} spot(s), isl_enabled={}", topology.entity_id, topology.spots.len(), topology.isl_enabled);

    let modcod_text = std::fs::read_to_string(&args.modcod_path).with_context(|| format!("reading MODCOD table {:?}", args.modcod_path))?;
    let modcod_table = parse_modcod_table(&modcod_text)?;
    info!("loaded MODCOD table");
    let _ = &modcod_table;

    if let Some(path) = &args.aloha_path {
        let aloha_text = std::fs::read_to_string(path).with_context(|| format!("reading Aloha config {path:?}"))?;
        let aloha = AlohaConfig::from_toml_str(&aloha_text)?;
        info!("loaded {} Slotted-Aloha categor(y/ies)", aloha.categories.len());
    }

    match args.role {
        EntityRole::Gateway => info!("entity role: gateway (encap -> schedulers+aloha -> sat carrier)"),
        EntityRole::Satellite => info!("entity role: satellite (transparent relay only)"),
        EntityRole::Terminal => info!("entity role: terminal"),
    }
    let _ = &routes;

    Ok(())
}

fn main() -> ExitCode {
    Builder::new().filter_level(LevelFilter::Info).parse_default_env().init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("fatal: {e:#}");
            ExitCode::FAILURE
        }
    }
}
