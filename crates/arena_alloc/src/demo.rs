//! # Timed Demo Harness
//!
//! Allocates three records with an allocator, writes them, frees them and
//! times every call. The `alloc_demo` binary prints the resulting report.

use std::time::{Duration, Instant};

use arena_alloc_core::{AllocatorStats, ArenaAllocator, Strategy};

use crate::config::{ArenaConfig, ConfigResult, StrategyKind};
use crate::record::{Record, RECORD_SIZE};

/// One timed allocator call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimedCall {
    /// Payload offset involved, `None` if the allocation failed.
    pub offset: Option<usize>,
    /// Wall-clock time of the call.
    pub elapsed: Duration,
}

/// Everything one strategy run produced.
#[derive(Clone, Debug)]
pub struct StrategyReport {
    /// Strategy that ran.
    pub strategy: Strategy,
    /// One entry per allocation attempt.
    pub allocations: Vec<TimedCall>,
    /// Records read back from the arena just before they were freed.
    pub records: Vec<Record>,
    /// One entry per successful allocation, in free order.
    pub frees: Vec<TimedCall>,
    /// Counters after the run.
    pub stats: AllocatorStats,
}

/// Runs the three-record scenario on `allocator`.
///
/// `prefix` is prepended to each record name.
pub fn run_records<A: ArenaAllocator>(allocator: &mut A, prefix: &str) -> StrategyReport {
    let seeds = [(1, 123.45_f32), (2, 678.90), (3, 135.79)];

    let mut allocations = Vec::with_capacity(seeds.len());
    let mut blocks = Vec::with_capacity(seeds.len());

    for _ in &seeds {
        let start = Instant::now();
        let block = allocator.alloc(RECORD_SIZE);
        let elapsed = start.elapsed();

        allocations.push(TimedCall {
            offset: block.as_ref().map(arena_alloc_core::Block::offset),
            elapsed,
        });
        blocks.push(block);
    }

    for (block, (id, value)) in blocks.iter().zip(seeds) {
        if let Some(block) = block {
            let record = Record::new(id, &format!("{prefix}Object {id}"), value);
            record.write_to(allocator.payload_mut(block));
        }
    }

    let mut records = Vec::with_capacity(seeds.len());
    let mut frees = Vec::with_capacity(seeds.len());

    for block in blocks.into_iter().flatten() {
        records.push(Record::read_from(allocator.payload(&block)));

        let offset = block.offset();
        let start = Instant::now();
        allocator.free(block);
        frees.push(TimedCall {
            offset: Some(offset),
            elapsed: start.elapsed(),
        });
    }

    StrategyReport {
        strategy: allocator.strategy(),
        allocations,
        records,
        frees,
        stats: *allocator.stats(),
    }
}

/// Runs the scenario once per strategy, each over the same arena in turn.
///
/// # Errors
///
/// Returns the first configuration or construction error.
pub fn run_demo(
    config: &ArenaConfig,
    strategies: &[StrategyKind],
) -> ConfigResult<Vec<StrategyReport>> {
    let mut arena = vec![0u8; config.arena_size];
    let mut reports = Vec::with_capacity(strategies.len());

    for &kind in strategies {
        let config = config.with_strategy(kind);
        config.validate()?;

        let mut allocator = config.build(&mut arena)?;
        let prefix = match kind {
            StrategyKind::FreeList => "",
            StrategyKind::Buddy => "Buddy ",
        };
        let report = run_records(&mut allocator, prefix);

        let region = allocator.destroy();
        tracing::debug!(
            strategy = %report.strategy,
            allocations = report.stats.allocations,
            region = region.len(),
            "demo run finished"
        );
        reports.push(report);
    }

    Ok(reports)
}
