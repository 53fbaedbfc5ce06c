//! Walkthrough of the par-backed reserve system:
//!
//! 1. **Deposit & rebalance** — native in, issued out one-to-one, with the
//!    excess idle reserve pushed into the yield venue
//! 2. **Swap settlement** — both trade directions forced through the
//!    ledger's fixed conversion inside one unlock context
//! 3. **Yield harvest** — external venue appreciation paid out to the
//!    receiver without touching issued supply
//! 4. **Waterfall withdrawal** — idle reserve and venue sourcing that lands
//!    idle exactly on the threshold

use colored::Colorize;
use parpool_hook::{ConversionHook, InMemoryPoolVenue, TradingVenue};
use parpool_ledger::{InMemoryYieldVenue, ReserveLedger};
use parpool_settlement::SwapRouter;
use parpool_types::{
    AccountId, Asset, AssetBook, Fraction, PoolKey, SwapDirection, SwapIntent,
};

fn header(title: &str) {
    println!();
    println!("{}", "═".repeat(72).cyan());
    println!("  {}", title.cyan().bold());
    println!("{}", "═".repeat(72).cyan());
}

fn show_reserves(book: &AssetBook, ledger: &ReserveLedger) {
    println!(
        "  {} issued {} | idle {} | venue {} | yield {}",
        "├".dimmed(),
        ledger.total_issued().to_string().yellow(),
        ledger.idle_reserve(book).to_string().yellow(),
        ledger.venue_balance(book).to_string().yellow(),
        ledger.yield_accumulated(book).to_string().green(),
    );
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .with_target(false)
        .init();

    let owner = AccountId::new("owner");
    let alice = AccountId::new("alice");
    let treasury = AccountId::new("treasury");
    let escrow = AccountId::new("escrow");

    let mut book = AssetBook::new();
    book.credit(&alice, Asset::Native, 1_500).unwrap();

    // ── Part 1: Deposit & rebalance ─────────────────────────────────
    header("Part 1: Deposit at par, rebalance to the threshold");

    let mut ledger = ReserveLedger::new(AccountId::new("reserve"), owner.clone());
    ledger
        .change_venue(
            &owner,
            &book,
            Some(Box::new(InMemoryYieldVenue::new(AccountId::new(
                "yield-venue",
            )))),
        )
        .unwrap();
    ledger
        .set_rebalance_threshold(&owner, Fraction::from_percent(10))
        .unwrap();
    ledger.set_yield_receiver(&owner, treasury.clone()).unwrap();

    ledger.deposit(&mut book, &alice, 1_000, 0).unwrap();
    println!("  {} alice deposited 1000 native", "├".dimmed());
    show_reserves(&book, &ledger);

    // ── Part 2: Swap settlement through the hook ────────────────────
    header("Part 2: Swaps forced onto the fixed conversion");

    let hook = ConversionHook::new(AccountId::new("hook"), ledger);
    let mut venue = InMemoryPoolVenue::new(escrow.clone(), hook);
    let key = PoolKey::conversion_pair(1);
    venue.initialize(key).unwrap();
    // Working float for the escrow, the way a production venue carries
    // pooled balances across pairs.
    book.credit(&escrow, Asset::Native, 500).unwrap();
    book.transfer(&alice, &escrow, Asset::Issued, 500).unwrap();

    let mut router = SwapRouter::new(AccountId::new("router"));

    let report = router
        .swap(
            &mut venue,
            &mut book,
            key,
            SwapIntent::exact_input(SwapDirection::ZeroForOne, 400),
            alice.clone(),
            None,
        )
        .unwrap();
    println!(
        "  {} native→issued 400 settled: deltas ({}, {})",
        "├".dimmed(),
        report.delta.amount0.to_string().yellow(),
        report.delta.amount1.to_string().yellow(),
    );

    let report = router
        .swap(
            &mut venue,
            &mut book,
            key,
            SwapIntent::exact_output(SwapDirection::OneForZero, 250),
            alice.clone(),
            None,
        )
        .unwrap();
    println!(
        "  {} issued→native 250 settled: deltas ({}, {})",
        "├".dimmed(),
        report.delta.amount0.to_string().yellow(),
        report.delta.amount1.to_string().yellow(),
    );
    show_reserves(&book, venue.hook().ledger());

    // ── Part 3: Yield harvest ───────────────────────────────────────
    header("Part 3: Venue appreciation harvested to the treasury");

    book.credit(&AccountId::new("yield-venue"), Asset::Native, 75)
        .unwrap();
    println!("  {} yield venue appreciated by 75", "├".dimmed());
    show_reserves(&book, venue.hook().ledger());

    let harvested = venue.hook_mut().ledger_mut().harvest(&mut book).unwrap();
    println!(
        "  {} harvested {} to {}",
        "├".dimmed(),
        harvested.to_string().green(),
        "treasury".bold(),
    );
    show_reserves(&book, venue.hook().ledger());

    // ── Part 4: Waterfall withdrawal ────────────────────────────────
    header("Part 4: Withdrawal sourced down the waterfall");

    venue
        .hook_mut()
        .ledger_mut()
        .withdraw(&mut book, &alice, 300)
        .unwrap();
    println!("  {} alice withdrew 300 at par", "├".dimmed());
    show_reserves(&book, venue.hook().ledger());

    println!();
    println!(
        "  {} alice ends with {} native and {} issued",
        "└".dimmed(),
        book.balance_of(&alice, Asset::Native).to_string().yellow(),
        book.balance_of(&alice, Asset::Issued).to_string().yellow(),
    );
}
