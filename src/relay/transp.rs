//! Transparent relay (satellite block): computes each message's
//! destination role and decides whether it is delivered on this satellite
//! (crossed to the opposite channel / forwarded with a flipped carrier id)
//! or sent onward over the ISL.

use crate::error::ProtocolError;
use crate::packet::TalId;
use crate::relay::route_table::{DestinationRole, RouteTable};

/// Star vs mesh routing mode, set once at init from the topology config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayMode {
    Star,
    Mesh,
}

/// Entity kind as seen by the relay's routing decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityType {
    Gateway,
    Terminal,
    Satellite,
    Unknown,
}

/// Computes a `NetBurst`'s destination role from its source/destination
/// terminal ids.
///
/// Star mode: the non-satellite endpoint that *sent* the message decides
/// the role of the other end (gateway sends to terminals and vice versa).
/// Mesh mode: broadcast destinations always go to the terminal side;
/// otherwise the destination's own entity type decides, and `unknown` or
/// `satellite` destinations are rejected.
pub fn destination_role_for_burst(mode: RelayMode, src_type: EntityType, dst_id: TalId, dst_type: EntityType) -> Result<DestinationRole, ProtocolError> {
    match mode {
        RelayMode::Mesh => {
            if dst_id == crate::packet::BROADCAST_TAL_ID {
                Ok(DestinationRole::Terminal)
            } else {
                match dst_type {
                    EntityType::Gateway => Ok(DestinationRole::Gateway),
                    EntityType::Terminal => Ok(DestinationRole::Terminal),
                    EntityType::Unknown | EntityType::Satellite => Err(ProtocolError::UnknownTerminal(dst_id)),
                }
            }
        }
        RelayMode::Star => match src_type {
            EntityType::Gateway => Ok(DestinationRole::Terminal),
            EntityType::Terminal => Ok(DestinationRole::Gateway),
            EntityType::Unknown | EntityType::Satellite => Err(ProtocolError::UnknownTerminal(dst_id)),
        },
    }
}

/// Carrier ids `{6..=9} mod 10` mark encapsulated data, `{0..=5} mod 10`
/// mark signaling. `{4, 8}` are "in-gateway" ids (control/data destined
/// into the gateway leg), so their destination role is terminal.
pub fn destination_role_for_frame(carrier_id: u8) -> DestinationRole {
    let id = carrier_id % 10;
    if id == 4 || id == 8 {
        DestinationRole::Terminal
    } else {
        DestinationRole::Gateway
    }
}

pub fn is_encapsulated_data_carrier(carrier_id: u8) -> bool {
    carrier_id % 10 >= 6
}

/// Downward-forwarding carrier id convention within a satellite: input
/// carriers are even, so the mirrored output carrier is `input + 1`.
pub fn flip_carrier_id_downward(carrier_id: u8) -> u8 {
    carrier_id + 1
}

/// Where a message bound for `(spot_id, role)` should go: delivered
/// locally (crossed to the opposite channel) or forwarded over the ISL to
/// another satellite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayOutcome {
    DeliverLocally,
    ForwardOverIsl { dest_sat_id: u16 },
}

pub fn resolve_relay(routes: &RouteTable, spot_id: u16, role: DestinationRole, this_entity_id: u16) -> Result<RelayOutcome, ProtocolError> {
    let dest_sat_id = routes.lookup(spot_id, role).ok_or(ProtocolError::NoRoute { spot_id, role })?;
    if dest_sat_id == this_entity_id {
        Ok(RelayOutcome::DeliverLocally)
    } else {
        Ok(RelayOutcome::ForwardOverIsl { dest_sat_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::route_table::SpotTopology;
    use std::collections::HashMap;

    #[test]
    fn star_mode_flips_gateway_and_terminal() {
        assert_eq!(
            destination_role_for_burst(RelayMode::Star, EntityType::Gateway, 5, EntityType::Unknown).unwrap(),
            DestinationRole::Terminal
        );
        assert_eq!(
            destination_role_for_burst(RelayMode::Star, EntityType::Terminal, 5, EntityType::Unknown).unwrap(),
            DestinationRole::Gateway
        );
    }

    #[test]
    fn mesh_mode_broadcast_goes_to_terminal_side() {
        let role = destination_role_for_burst(RelayMode::Mesh, EntityType::Terminal, crate::packet::BROADCAST_TAL_ID, EntityType::Unknown).unwrap();
        assert_eq!(role, DestinationRole::Terminal);
    }

    #[test]
    fn mesh_mode_rejects_unknown_or_satellite_destination() {
        assert!(destination_role_for_burst(RelayMode::Mesh, EntityType::Terminal, 7, EntityType::Unknown).is_err());
        assert!(destination_role_for_burst(RelayMode::Mesh, EntityType::Terminal, 7, EntityType::Satellite).is_err());
    }

    #[test]
    fn carrier_id_convention_maps_in_gateway_ids_to_terminal_role() {
        assert_eq!(destination_role_for_frame(4), DestinationRole::Terminal);
        assert_eq!(destination_role_for_frame(8), DestinationRole::Terminal);
        assert_eq!(destination_role_for_frame(6), DestinationRole::Gateway);
        assert!(is_encapsulated_data_carrier(6));
        assert!(!is_encapsulated_data_carrier(5));
    }

    #[test]
    fn resolve_relay_distinguishes_local_delivery_from_isl_forward() {
        let topo = SpotTopology { spot_id: 1, gw_id: 10, sat_id_gw: 1, sat_id_st: 2 };
        let routes = RouteTable::build(&[topo], &HashMap::new(), 1, true).unwrap();
        assert_eq!(resolve_relay(&routes, 1, DestinationRole::Gateway, 1).unwrap(), RelayOutcome::DeliverLocally);
        assert_eq!(
            resolve_relay(&routes, 1, DestinationRole::Terminal, 1).unwrap(),
            RelayOutcome::ForwardOverIsl { dest_sat_id: 2 }
        );
    }

    #[test]
    fn missing_route_is_a_protocol_error() {
        let routes = RouteTable::build(&[], &HashMap::new(), 1, false).unwrap();
        assert!(resolve_relay(&routes, 99, DestinationRole::Gateway, 1).is_err());
    }
}
