//! Route table: `(spot_id, destination-role) -> satellite entity id`,
//! populated once at init and read-only afterwards.

use std::collections::HashMap;

use crate::error::InitError;
use crate::packet::TalId;

/// Which side of a spot a message is headed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DestinationRole {
    Gateway,
    Terminal,
}

/// One spot's topology: which satellite carries its gateway leg and which
/// carries its terminal leg (equal in star/non-ISL deployments).
#[derive(Debug, Clone, Copy)]
pub struct SpotTopology {
    pub spot_id: u16,
    pub gw_id: TalId,
    pub sat_id_gw: u16,
    pub sat_id_st: u16,
}

#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: HashMap<(u16, DestinationRole), u16>,
    spot_by_entity: HashMap<TalId, u16>,
}

impl RouteTable {
    /// Builds the route table from spot topology, validating that ISL is
    /// enabled on any entity that needs to bridge a spot whose gateway and
    /// terminal legs live on different satellites.
    pub fn build(topologies: &[SpotTopology], terminal_ids_by_spot: &HashMap<u16, Vec<TalId>>, this_entity_id: u16, isl_enabled: bool) -> Result<Self, InitError> {
        let mut routes = HashMap::new();
        let mut spot_by_entity = HashMap::new();

        for topo in topologies {
            spot_by_entity.insert(topo.gw_id, topo.spot_id);
            if let Some(terminals) = terminal_ids_by_spot.get(&topo.spot_id) {
                for &tal_id in terminals {
                    spot_by_entity.insert(tal_id, topo.spot_id);
                }
            }

            routes.insert((topo.spot_id, DestinationRole::Gateway), topo.sat_id_gw);
            routes.insert((topo.spot_id, DestinationRole::Terminal), topo.sat_id_st);

            let spans_isl = topo.sat_id_gw != topo.sat_id_st;
            let this_entity_involved = topo.sat_id_gw == this_entity_id || topo.sat_id_st == this_entity_id;
            if spans_isl && this_entity_involved && !isl_enabled {
                return Err(InitError::IslRequired { entity_id: this_entity_id, spot_id: topo.spot_id });
            }
        }

        Ok(RouteTable { routes, spot_by_entity })
    }

    pub fn lookup(&self, spot_id: u16, role: DestinationRole) -> Option<u16> {
        self.routes.get(&(spot_id, role)).copied()
    }

    pub fn spot_of(&self, tal_id: TalId) -> Option<u16> {
        self.spot_by_entity.get(&tal_id).copied()
    }
}
