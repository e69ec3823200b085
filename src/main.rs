use clap::Parser;
use flexi_logger::{AdaptiveFormat, Logger, WriteMode};

use riptide::cli::Handler;
use riptide::search::SearchConfig;

/// Command line options, mapped onto the engine configuration.
#[derive(Parser, Debug)]
#[command(name = "riptide", version, about = "Parallel alpha-beta chess engine")]
struct Options {
    /// Search depth (a hard limit with --fixed-depth, otherwise the
    /// starting point for iterative deepening).
    #[arg(long, default_value_t = 4)]
    depth: i32,

    /// Stop at --depth instead of deepening until the deadline.
    #[arg(long)]
    fixed_depth: bool,

    /// Search the target depth directly instead of deepening one ply at a
    /// time.
    #[arg(long)]
    no_iterative_deepening: bool,

    /// Soft wall-clock budget per move, in milliseconds.
    #[arg(long, default_value_t = 3500)]
    deadline_ms: u64,

    /// Transposition table capacity, in entries.
    #[arg(long, default_value_t = 1 << 20)]
    tt_entries: usize,

    /// Carry the transposition table over between moves.
    #[arg(long)]
    keep_table: bool,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Options {
    fn search_config(&self) -> SearchConfig {
        SearchConfig {
            depth: self.depth,
            use_iterative_deepening: !self.no_iterative_deepening,
            clear_tt_each_move: !self.keep_table,
            use_fixed_depth: self.fixed_depth,
            soft_deadline_ms: self.deadline_ms,
            tt_entries: self.tt_entries,
        }
    }
}

fn main() {
    let options = Options::parse();

    // Buffer-and-flush so logging doesn't contend with the search workers.
    // The handle has to stay alive for the whole session.
    let _logger = match Logger::try_with_env_or_str(options.log_level.clone()).and_then(|l| {
        l.write_mode(WriteMode::BufferAndFlush)
            .log_to_stderr()
            .adaptive_format_for_stderr(AdaptiveFormat::Detailed)
            .start()
    }) {
        Ok(handle) => Some(handle),
        Err(err) => {
            eprintln!("logger init failed: {}", err);
            None
        }
    };

    log::info!(
        "{} v{} ready",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    Handler::new(options.search_config()).run();
}
