//! # Wallet Bridge Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── signing_context.rs  # Simulated privileged side holding a real keypair
//! ├── exploits/           # Hostile page scripts
//! │   └── spoofed_responses.rs
//! └── integration/        # Bridge + provider surfaces + signing context
//!     └── flows.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p bridge-tests
//! cargo test -p bridge-tests integration::
//! cargo test -p bridge-tests exploits::
//! ```

pub mod exploits;
pub mod integration;
pub mod signing_context;
