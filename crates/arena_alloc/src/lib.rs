//! # Arena Alloc
//!
//! Host-side glue for the arena allocators.
//!
//! ## Modules
//!
//! - `config`: TOML configuration and allocator construction
//! - `instance`: a runtime-selected allocator behind the shared contract
//! - `record`: the fixed-size record the demo stores
//! - `demo`: the timed three-record harness behind `alloc_demo`
//!
//! ## Example
//!
//! ```rust
//! use arena_alloc::{ArenaAllocator, ArenaConfig};
//!
//! let config = ArenaConfig::from_toml_str("strategy = \"buddy\"").unwrap();
//! let mut arena = vec![0u8; config.arena_size];
//! let mut allocator = config.build(&mut arena).unwrap();
//!
//! let block = allocator.alloc(300).unwrap();
//! allocator.free(block);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod demo;
pub mod instance;
pub mod record;

// Re-export the allocator core
pub use arena_alloc_core as allocators;

pub use arena_alloc_core::{AllocError, ArenaAllocator, Block, BuddyConfig, Strategy};
pub use config::{ArenaConfig, BuddySection, ConfigError, ConfigResult, StrategyKind};
pub use demo::{run_demo, run_records, StrategyReport, TimedCall};
pub use instance::AllocatorInstance;
pub use record::{Record, RECORD_SIZE};
