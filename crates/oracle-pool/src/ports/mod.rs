//! Ports layer: the inbound status API and the outbound ledger
//! collaborator traits.

pub mod inbound;
pub mod outbound;
