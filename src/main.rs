//! Ledger Engine soak driver
//!
//! Command-line driver that exercises the mutation engine under
//! concurrency: it enrolls a set of accounts, seeds each with a cash-in,
//! fires random transfers from concurrent workers, and then verifies
//! that the total amount of money in the system is unchanged.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- --accounts 8 --ops 10000 --workers 4 --seed 42
//! ```
//!
//! # Exit Codes
//!
//! - 0: Run completed and money was conserved
//! - 1: Conservation check failed or setup failed

use futures::future::join_all;
use ledger_engine::cli;
use ledger_engine::{
    AccountKind, EnrollmentRequest, MemoryStore, OperationGateway, OperationKind,
    OperationRequest, Requester,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use std::process;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{error, info};

#[derive(Default)]
struct Tally {
    committed: AtomicU64,
    rejected: AtomicU64,
}

fn account_number(index: usize) -> String {
    format!("ACC-{:04}", index)
}

fn owner_id(index: usize) -> String {
    format!("user-{:04}", index)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = cli::parse_args();
    let seed = args.seed.unwrap_or_else(rand::random);
    let workers = args.worker_count();
    info!(
        accounts = args.accounts,
        ops = args.ops,
        workers,
        seed,
        "starting soak run"
    );

    if args.accounts < 2 {
        error!("need at least 2 accounts to transfer between");
        process::exit(1);
    }

    let gateway = Arc::new(OperationGateway::new(MemoryStore::new()));
    let initial = Decimal::new(args.initial_balance, 0);

    // Enroll and seed every account.
    for i in 0..args.accounts {
        let requester = Requester::customer(owner_id(i));
        let enrollment = EnrollmentRequest {
            account_number: account_number(i),
            account_name: format!("Soak account {i}"),
            kind: AccountKind::Debit,
        };
        if let Err(e) = gateway.enroll_account(&requester, &enrollment) {
            error!(account = %enrollment.account_number, code = ?e.code, "enrollment failed");
            process::exit(1);
        }
        let cash_in =
            OperationRequest::single(OperationKind::CashIn, account_number(i), initial);
        if let Err(e) = gateway.submit_operation(&requester, &cash_in) {
            error!(account = %account_number(i), code = ?e.code, "seed cash-in failed");
            process::exit(1);
        }
    }

    let tally = Arc::new(Tally::default());
    let mut handles = Vec::with_capacity(workers);
    for worker in 0..workers {
        let gateway = Arc::clone(&gateway);
        let tally = Arc::clone(&tally);
        let accounts = args.accounts;
        let ops = args.ops / workers + usize::from(worker < args.ops % workers);
        let mut rng = StdRng::seed_from_u64(seed.wrapping_add(worker as u64));
        handles.push(tokio::spawn(async move {
            for _ in 0..ops {
                let from = rng.gen_range(0..accounts);
                let mut to = rng.gen_range(0..accounts);
                if to == from {
                    to = (to + 1) % accounts;
                }
                let amount = Decimal::new(rng.gen_range(1..=100), 0);
                let request = OperationRequest::two_party(
                    OperationKind::FundTransfer,
                    account_number(from),
                    account_number(to),
                    amount,
                );
                match gateway.submit_operation(&Requester::customer(owner_id(from)), &request) {
                    Ok(_) => {
                        tally.committed.fetch_add(1, Ordering::Relaxed);
                    }
                    Err(_) => {
                        tally.rejected.fetch_add(1, Ordering::Relaxed);
                    }
                }
            }
        }));
    }
    join_all(handles).await;

    // Conservation check: transfers move money, they never create it.
    let store = gateway.engine().store();
    let mut total = Decimal::ZERO;
    for i in 0..args.accounts {
        let requester = Requester::customer(owner_id(i));
        for account in gateway.list_accounts(&requester) {
            println!(
                "{}  balance={}  history={}",
                account.account_number,
                account.balance,
                ledger_engine::TransactionLog::list_by_account(store, &account.account_number)
                    .len()
            );
            total += account.balance;
        }
    }
    let expected = initial * Decimal::new(args.accounts as i64, 0);
    println!(
        "committed={} rejected={} total={} expected={}",
        tally.committed.load(Ordering::Relaxed),
        tally.rejected.load(Ordering::Relaxed),
        total,
        expected
    );

    if total != expected {
        error!(%total, %expected, "money was not conserved");
        process::exit(1);
    }
    info!("money conserved");
}
