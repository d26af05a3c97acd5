use clap::Parser;

/// Concurrency soak driver for the ledger engine
///
/// Enrolls a set of accounts, seeds each with an initial cash-in, then
/// hammers the engine with random transfers from concurrent workers and
/// checks that money was conserved.
#[derive(Parser, Debug)]
#[command(name = "ledger-engine")]
#[command(about = "Apply concurrent random transfers and verify conservation", long_about = None)]
pub struct CliArgs {
    /// Number of accounts to enroll
    #[arg(
        long = "accounts",
        value_name = "COUNT",
        default_value_t = 8,
        help = "Number of accounts to enroll"
    )]
    pub accounts: usize,

    /// Number of transfer operations to attempt
    #[arg(
        long = "ops",
        value_name = "COUNT",
        default_value_t = 1000,
        help = "Number of transfer operations to attempt"
    )]
    pub ops: usize,

    /// Number of concurrent workers
    #[arg(
        long = "workers",
        value_name = "COUNT",
        help = "Concurrent workers (default: CPU cores)"
    )]
    pub workers: Option<usize>,

    /// Initial balance seeded into every account (whole units)
    #[arg(
        long = "initial-balance",
        value_name = "AMOUNT",
        default_value_t = 100_000,
        help = "Initial cash-in per account, in whole units"
    )]
    pub initial_balance: i64,

    /// RNG seed, for reproducible runs
    #[arg(long = "seed", value_name = "SEED", help = "RNG seed (default: random)")]
    pub seed: Option<u64>,
}

impl CliArgs {
    /// Worker count, defaulting to the number of CPU cores
    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(num_cpus::get).max(1)
    }
}

/// Parse command-line arguments
pub fn parse_args() -> CliArgs {
    CliArgs::parse()
}
