//! # Arena Allocator Demo
//!
//! Stores three records with each strategy over one arena and times every
//! allocation and release.
//!
//! ```bash
//! # Both strategies over a 1 MiB arena
//! ./alloc_demo
//!
//! # Only the strategy named in the file
//! ./alloc_demo arena.toml
//! ```

use arena_alloc::{run_demo, ArenaConfig, StrategyKind, StrategyReport};

fn main() {
    println!("╔══════════════════════════════════════════════════════════════════╗");
    println!("║                    ARENA ALLOCATOR DEMO                          ║");
    println!("║            first-fit free list  vs  buddy system                 ║");
    println!("╚══════════════════════════════════════════════════════════════════╝");
    println!();

    let (config, strategies) = match std::env::args().nth(1) {
        Some(path) => match ArenaConfig::from_toml_file(&path) {
            Ok(config) => {
                println!("Config:       {path}");
                let strategy = config.strategy;
                (config, vec![strategy])
            }
            Err(err) => {
                eprintln!("   ✗ FATAL: {err}");
                std::process::exit(1);
            }
        },
        None => (
            ArenaConfig::default(),
            vec![StrategyKind::FreeList, StrategyKind::Buddy],
        ),
    };

    println!("Arena size:   {} bytes", config.arena_size);
    println!(
        "Buddy:        max order {}, coalesce {}",
        config.buddy.max_order, config.buddy.coalesce
    );

    let reports = match run_demo(&config, &strategies) {
        Ok(reports) => reports,
        Err(err) => {
            eprintln!("   ✗ FATAL: {err}");
            std::process::exit(1);
        }
    };

    for report in &reports {
        print_report(report);
    }
}

fn print_report(report: &StrategyReport) {
    println!();
    println!("=== {} ===", report.strategy);

    for (index, call) in report.allocations.iter().enumerate() {
        match call.offset {
            Some(offset) => println!(
                "   ✓ alloc #{}: offset {offset:>8}   {:?}",
                index + 1,
                call.elapsed
            ),
            None => println!(
                "   ✗ alloc #{}: out of memory        {:?}",
                index + 1,
                call.elapsed
            ),
        }
    }

    for record in &report.records {
        println!(
            "     record id={:<3} value={:<10.2} name={}",
            record.id,
            record.value,
            record.name()
        );
    }

    for call in &report.frees {
        if let Some(offset) = call.offset {
            println!("   ✓ free:     offset {offset:>8}   {:?}", call.elapsed);
        }
    }

    let stats = &report.stats;
    println!(
        "   stats: {} allocs, {} frees, {} failed, {} splits, {} merges, {} bytes in use",
        stats.allocations,
        stats.frees,
        stats.failed_allocations,
        stats.splits,
        stats.merges,
        stats.bytes_in_use
    );
}
