//! # Arena Configuration
//!
//! TOML-driven selection of strategy, arena size and buddy options.
//!
//! ## Format
//!
//! ```toml
//! strategy = "buddy"        # "free_list" | "buddy"
//! arena_size = 1048576      # bytes
//!
//! [buddy]
//! max_order = 20
//! coalesce = false
//! ```
//!
//! Every field is optional; missing fields take [`ArenaConfig::default`].

use std::path::{Path, PathBuf};

use arena_alloc_core::{AllocError, BuddyAllocator, BuddyConfig, FreeListAllocator};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::instance::AllocatorInstance;

/// Errors raised while loading or applying a configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// File that was requested.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid TOML or has unexpected fields.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range.
    #[error("invalid configuration: {0}")]
    Invalid(String),

    /// The allocator rejected the arena.
    #[error(transparent)]
    Alloc(#[from] AllocError),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Strategy selector as written in the config file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// First-fit free list.
    #[default]
    FreeList,
    /// Power-of-two buddy system.
    Buddy,
}

/// The `[buddy]` table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuddySection {
    /// Largest block order.
    pub max_order: u32,
    /// Merge free buddies on release.
    pub coalesce: bool,
}

impl Default for BuddySection {
    fn default() -> Self {
        let observed = BuddyConfig::observed();
        Self {
            max_order: observed.max_order,
            coalesce: observed.coalesce,
        }
    }
}

impl From<BuddySection> for BuddyConfig {
    fn from(section: BuddySection) -> Self {
        Self {
            max_order: section.max_order,
            coalesce: section.coalesce,
        }
    }
}

/// Top-level allocator configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArenaConfig {
    /// Which allocator to build.
    pub strategy: StrategyKind,
    /// Arena size in bytes.
    pub arena_size: usize,
    /// Buddy options (ignored by the free list).
    pub buddy: BuddySection,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::FreeList,
            arena_size: 1 << 20,
            buddy: BuddySection::default(),
        }
    }
}

impl ArenaConfig {
    /// 1 MiB buddy arena with coalescing enabled.
    #[must_use]
    pub const fn coalescing_buddy() -> Self {
        Self {
            strategy: StrategyKind::Buddy,
            arena_size: 1 << 20,
            buddy: BuddySection {
                max_order: 20,
                coalesce: true,
            },
        }
    }

    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] for malformed documents and
    /// [`ConfigError::Invalid`] for out-of-range values.
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`from_toml_str`](Self::from_toml_str).
    pub fn from_toml_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), strategy = ?config.strategy, "config loaded");
        Ok(config)
    }

    /// Checks that the chosen strategy can run on `arena_size` bytes.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] describing the first offending value.
    pub fn validate(&self) -> ConfigResult<()> {
        match self.strategy {
            StrategyKind::FreeList => {
                if self.arena_size < FreeListAllocator::MIN_ARENA_SIZE {
                    return Err(ConfigError::Invalid(format!(
                        "arena_size {} is below the free-list minimum of {} bytes",
                        self.arena_size,
                        FreeListAllocator::MIN_ARENA_SIZE
                    )));
                }
            }
            StrategyKind::Buddy => {
                let top = self
                    .buddy_config()
                    .validate()
                    .map_err(|err| ConfigError::Invalid(err.to_string()))?;
                if self.arena_size < top {
                    return Err(ConfigError::Invalid(format!(
                        "arena_size {} cannot hold one order-{} block ({top} bytes)",
                        self.arena_size, self.buddy.max_order
                    )));
                }
            }
        }
        Ok(())
    }

    /// Buddy settings as the allocator expects them.
    #[must_use]
    pub fn buddy_config(&self) -> BuddyConfig {
        self.buddy.into()
    }

    /// Returns a copy with a different strategy.
    #[must_use]
    pub fn with_strategy(&self, strategy: StrategyKind) -> Self {
        Self {
            strategy,
            ..self.clone()
        }
    }

    /// Builds the configured allocator over `bytes`.
    ///
    /// `bytes` is used whole; `arena_size` only sizes arenas the caller
    /// allocates from this config.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Alloc`] if the allocator rejects the region.
    pub fn build<'a>(&self, bytes: &'a mut [u8]) -> ConfigResult<AllocatorInstance<'a>> {
        let instance = match self.strategy {
            StrategyKind::FreeList => AllocatorInstance::FreeList(FreeListAllocator::create(bytes)?),
            StrategyKind::Buddy => {
                AllocatorInstance::Buddy(BuddyAllocator::with_config(bytes, self.buddy_config())?)
            }
        };
        Ok(instance)
    }
}
