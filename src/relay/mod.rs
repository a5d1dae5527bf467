//! Transparent relay (satellite block): route table plus the
//! star/mesh destination-role and ISL-forwarding logic.

pub mod route_table;
pub mod transp;

pub use route_table::{DestinationRole, RouteTable, SpotTopology};
pub use transp::{destination_role_for_burst, destination_role_for_frame, flip_carrier_id_downward, is_encapsulated_data_carrier, resolve_relay, EntityType, RelayMode, RelayOutcome};
