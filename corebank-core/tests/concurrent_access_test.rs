//! Concurrent access tests
//!
//! Many threads hammer the same account or customer through one shared
//! context. Every read-modify-write must serialize: no overdraft, no lost
//! update on the failed-login counter.
//!
//! Run with: cargo test --test concurrent_access_test -- --nocapture

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use rust_decimal::Decimal;
use tempfile::TempDir;

use corebank_core::{BankContext, Error, NewAccount, NewCustomer};

/// Number of concurrent threads for stress tests
const THREAD_COUNT: usize = 8;

/// Debits attempted per thread
const ITERATIONS_PER_THREAD: usize = 10;

fn money(units: i64) -> Decimal {
    Decimal::new(units * 100, 2)
}

fn setup(temp_dir: &TempDir, balance: Decimal) -> (Arc<BankContext>, i64) {
    let ctx = BankContext::new(temp_dir.path()).unwrap();
    let customer = ctx
        .customer_service
        .register(NewCustomer {
            customer_name: "John Doe".to_string(),
            username: "johndoe".to_string(),
            email: "johndoe@example.com".to_string(),
            phone: "081234567890".to_string(),
            cif_number: "CIF999".to_string(),
        })
        .unwrap();
    ctx.account_service
        .open(
            NewAccount::new(customer.id, "1234567890", "John Doe - Savings", "SAVINGS")
                .with_opening_balance(balance),
        )
        .unwrap();
    (Arc::new(ctx), customer.id)
}

/// 80 debits of 100.00 race for 5,000.00: exactly 50 succeed.
#[test]
fn test_concurrent_debits_never_overdraw() {
    let temp_dir = TempDir::new().unwrap();
    let (ctx, _) = setup(&temp_dir, money(5_000));

    let barrier = Arc::new(Barrier::new(THREAD_COUNT));
    let success_count = Arc::new(AtomicUsize::new(0));
    let rejected_count = Arc::new(AtomicUsize::new(0));

    let mut handles = vec![];
    for _ in 0..THREAD_COUNT {
        let ctx = Arc::clone(&ctx);
        let barrier = Arc::clone(&barrier);
        let success_count = Arc::clone(&success_count);
        let rejected_count = Arc::clone(&rejected_count);

        handles.push(thread::spawn(move || {
            barrier.wait();
            for _ in 0..ITERATIONS_PER_THREAD {
                match ctx.ledger.debit("1234567890", money(100)) {
                    Ok(account) => {
                        assert!(account.available_balance >= Decimal::ZERO);
                        success_count.fetch_add(1, Ordering::SeqCst);
                    }
                    Err(Error::InsufficientFunds { .. }) => {
                        rejected_count.fetch_add(1, Ordering::SeqCst);
                    }
                    Err(e) => panic!("unexpected error: {e}"),
                }
            }
        }));
    }
    for handle in handles {
        handle.join().expect("thread panicked");
    }

    assert_eq!(success_count.load(Ordering::SeqCst), 50);
    assert_eq!(
        rejected_count.load(Ordering::SeqCst),
        THREAD_COUNT * ITERATIONS_PER_THREAD - 50
    );
    let balance = ctx.ledger.get_balance("1234567890").unwrap();
    assert_eq!(balance.clear_balance, Decimal::ZERO);
    assert_eq!(balance.available_balance, Decimal::ZERO);
}

/// Interleaved debits and credits of the same amount cancel out.
#[test]
fn test_concurrent_debits_and_credits_conserve_balance() {
    let temp_dir = TempDir::new().unwrap();
    let (ctx, _) = setup(&temp_dir, money(1_000_000));

    let barrier = Arc::new(Barrier::new(THREAD_COUNT));
    let mut handles = vec![];
    for thread_id in 0..THREAD_COUNT {
        let ctx = Arc::clone(&ctx);
        let barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            barrier.wait();
            for _ in 0..ITERATIONS_PER_THREAD {
                if thread_id % 2 == 0 {
                    ctx.ledger.debit("1234567890", money(1_000)).unwrap();
                } else {
                    ctx.ledger.credit("1234567890", money(1_000)).unwrap();
                }
            }
        }));
    }
    for handle in handles {
        handle.join().expect("thread panicked");
    }

    let balance = ctx.ledger.get_balance("1234567890").unwrap();
    assert_eq!(balance.clear_balance, money(1_000_000));
    assert_eq!(balance.available_balance, money(1_000_000));
}

/// Every failure is counted exactly once and the lock engages.
#[test]
fn test_concurrent_failed_logins_are_all_counted() {
    let temp_dir = TempDir::new().unwrap();
    let (ctx, customer_id) = setup(&temp_dir, Decimal::ZERO);

    let barrier = Arc::new(Barrier::new(THREAD_COUNT));
    let mut handles = vec![];
    for _ in 0..THREAD_COUNT {
        let ctx = Arc::clone(&ctx);
        let barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            barrier.wait();
            ctx.login_guard.record_failure(customer_id).unwrap()
        }));
    }

    let mut seen: Vec<u32> = handles
        .into_iter()
        .map(|h| h.join().expect("thread panicked").failed_login_attempts)
        .collect();
    seen.sort_unstable();
    assert_eq!(seen, (1..=THREAD_COUNT as u32).collect::<Vec<_>>());

    let customer = ctx.customer_service.get(customer_id).unwrap();
    assert_eq!(customer.failed_login_attempts, THREAD_COUNT as u32);
    assert!(customer.is_locked);
}
