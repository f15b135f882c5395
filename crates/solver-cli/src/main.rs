//! Command-line driver for the pawns-only endgame solver.
//!
//! Solves the initial N×N position and prints progress lines and the
//! final result on stdout. The transposition table can be persisted to
//! disk and reloaded, including on SIGHUP/SIGINT.

mod signal;

use anyhow::{ensure, Context, Result};
use clap::Parser;
use solver_core::binom::binom;
use solver_core::{key_fits, Codec, MemTable, Pos, Searcher, Table};
use std::path::PathBuf;

/// Default table capacity: a prime sized so the 29-bit partial key
/// covers the full 8×8 code space (about 27 GiB of slots).
const DEFAULT_TT_ENTRIES: usize = 7_254_963_701;

#[derive(Parser, Debug)]
#[command(author, version, about = "Pawns-only chess endgame solver", long_about = None)]
struct Args {
    /// Board size N (the board is N×N with N pawns per side)
    #[arg(long, default_value_t = 8, value_parser = clap::value_parser!(u8).range(4..=8))]
    board_size: u8,

    /// Transposition table capacity in slots (4 bytes each); primes work best
    #[arg(long, default_value_t = DEFAULT_TT_ENTRIES)]
    tt_entries: usize,

    /// Table dump path (default: tp_<N>_<entries>.data)
    #[arg(long)]
    tt_file: Option<PathBuf>,

    /// Do not load an existing table dump
    #[arg(long)]
    no_load: bool,

    /// Do not save the table after solving
    #[arg(long)]
    no_save: bool,

    /// Print the number of possible boards per pawn-count pair and exit
    #[arg(long)]
    count_boards: bool,

    /// Verbose logging
    #[arg(short, long)]
    debug: bool,
}

/// Sizing table for the code space: boards per (a, b) pawn-count pair.
fn count_boards(n: u8) {
    let num_isq = n as usize * (n as usize - 2);
    let mut total = 0u64;
    println!("Possible {n}x{n} boards with a+b pawns:");
    for a in 1..=n as usize {
        for b in 1..=n as usize {
            let count = binom(num_isq, a) * binom(num_isq, b);
            total += count;
            println!("{a}+{b}\t{:.2}\t\t{count}", (count as f64).log2());
        }
    }
    println!("\ntotal\t{:.2}\t\t{total}", (total as f64).log2());
}

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if args.debug { "debug" } else { "info" }),
    )
    .init();

    let n = args.board_size;
    if args.count_boards {
        count_boards(n);
        return Ok(());
    }

    let codec = Codec::new(n);
    ensure!(
        key_fits(args.tt_entries, codec.code_end()),
        "table capacity {} cannot address the {n}x{n} code space; need at least {} slots",
        args.tt_entries,
        (codec.code_end() - 1) / (1u64 << solver_core::tt::PARTIAL_KEY_BITS) + 1
    );

    let path = args
        .tt_file
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("tp_{n}_{}.data", args.tt_entries)));

    log::info!("allocating transposition table: {} slots", args.tt_entries);
    let table = MemTable::new(args.tt_entries);
    if !args.no_load {
        if path.exists() {
            table
                .load(&path)
                .with_context(|| format!("loading {}", path.display()))?;
        } else {
            log::info!("no transposition table dump to load");
        }
    }

    let requests = signal::unix::install();
    let table_ref = &table;
    let dump_path = path.as_path();
    let no_save = args.no_save;
    let searcher = Searcher::new(&codec, &table).with_checkpoint(move || {
        if requests.save_and_exit() {
            if !no_save {
                if let Err(err) = table_ref.save(dump_path) {
                    log::error!("table save failed: {err:#}");
                }
            }
            std::process::exit(0);
        }
        if requests.take_save() {
            if let Err(err) = table_ref.save(dump_path) {
                log::error!("table save failed: {err:#}");
            }
        }
    });

    searcher.solve(&Pos::initial(n));
    log::info!("searched {} nodes", searcher.nodes());

    if !args.no_save {
        table.save(&path)?;
    }
    Ok(())
}
