//! Per-spot topology configuration, parsed from TOML: spot membership,
//! the satellite(s) carrying each leg, and this process's own entity id
//! and ISL/mesh flags.

use std::collections::HashMap;

use serde::Deserialize;

use crate::error::InitError;
use crate::packet::TalId;
use crate::relay::{RelayMode, RouteTable, SpotTopology};

#[derive(Debug, Clone, Deserialize)]
pub struct SpotTopologyConfig {
    pub spot_id: u16,
    pub gw_id: TalId,
    pub st_ids: Vec<TalId>,
    pub sat_id_gw: u16,
    pub sat_id_st: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TopologyConfig {
    pub entity_id: u16,
    pub isl_enabled: bool,
    pub mesh_mode: bool,
    pub spots: Vec<SpotTopologyConfig>,
}

impl TopologyConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, InitError> {
        toml::from_str(text).map_err(|e| InitError::Parse(e.to_string()))
    }

    pub fn relay_mode(&self) -> RelayMode {
        if self.mesh_mode {
            RelayMode::Mesh
        } else {
            RelayMode::Star
        }
    }

    pub fn build_route_table(&self) -> Result<RouteTable, InitError> {
        let topologies: Vec<SpotTopology> = self
            .spots
            .iter()
            .map(|s| SpotTopology { spot_id: s.spot_id, gw_id: s.gw_id, sat_id_gw: s.sat_id_gw, sat_id_st: s.sat_id_st })
            .collect();
        let terminals_by_spot: HashMap<u16, Vec<TalId>> = self.spots.iter().map(|s| (s.spot_id, s.st_ids.clone())).collect();
        RouteTable::build(&topologies, &terminals_by_spot, self.entity_id, self.isl_enabled)
    }
}
