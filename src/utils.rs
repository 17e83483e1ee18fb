pub mod trace;
pub mod udp_scope;
