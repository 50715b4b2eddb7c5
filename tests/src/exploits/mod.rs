//! Attacks by hostile scripts sharing the page with the bridge.

pub mod legacy_surface;
pub mod spoofed_responses;
