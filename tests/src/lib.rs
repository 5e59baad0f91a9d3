//! # Edge Export Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/
//! │   └── pipeline_benchmarks.rs   # Formatter and transformer throughput
//! └── src/
//!     ├── fixtures.rs              # Capture sinks, registration builders
//!     └── integration/
//!         ├── e2e_distribution.rs  # Store -> loop -> actors -> sinks
//!         └── e2e_runtime.rs       # HTTP surface + file store + loop
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p export-tests
//!
//! # By category
//! cargo test -p export-tests integration::e2e_distribution
//! cargo test -p export-tests integration::e2e_runtime
//!
//! # Benchmarks
//! cargo bench -p export-tests
//! ```

pub mod integration;
