//! Cross-crate flows: bridge, provider surfaces and a simulated signing context.

pub mod flows;
