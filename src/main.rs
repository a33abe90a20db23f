//! CDP Collateral Ledger Simulation.
//!
//! Walks the deposit and withdrawal flows against in-memory collaborators: the
//! liquidation ratio guard, third party depositors, stability fee accrual and the
//! custody failure that halts the keeper.

use cdp_ledger::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn main() {
    println!("CDP Collateral Ledger Simulation");
    println!("Per-Depositor Accounting, Ratio Guarded Withdrawals\n");

    scenario_1_deposit_and_withdraw();
    scenario_2_third_party_depositor();
    scenario_3_interest_blocks_withdrawal();
    scenario_4_custody_failure_halts();
    scenario_5_many_depositors();

    println!("\nAll simulations completed successfully.");
}

fn bnb_sandbox(config: KeeperConfig) -> Sandbox {
    let mut sandbox = Sandbox::with_config(config, CdpParams::testnet()).unwrap();
    sandbox.set_price("bnb:usd", dec!(1));
    sandbox
}

fn bnb(amount: Decimal) -> Coin {
    Coin::new("bnb", amount).unwrap()
}

/// Deposit 200 against 100 debt, then try to pull 70 and 30.
fn scenario_1_deposit_and_withdraw() {
    println!("Scenario 1: Ratio Guarded Withdrawal\n");

    let mut sandbox = bnb_sandbox(KeeperConfig::verbose());
    let alice = AccountId(1);
    let id = sandbox.open_position(alice, "bnb-a", dec!(100)).unwrap();
    sandbox.fund(alice, &bnb(dec!(500)));

    sandbox.deposit(alice, alice, bnb(dec!(200)), "bnb-a").unwrap();
    let position = sandbox.position(id).unwrap();
    println!("  Alice deposits 200bnb, position holds {}", position.collateral);

    match sandbox.withdraw(alice, alice, bnb(dec!(70)), "bnb-a") {
        Ok(()) => println!("  Withdraw 70bnb: accepted"),
        Err(e) => println!("  Withdraw 70bnb: {}", e),
    }

    sandbox.withdraw(alice, alice, bnb(dec!(30)), "bnb-a").unwrap();
    let deposit = sandbox.keeper.get_deposit(id, alice).unwrap().unwrap();
    println!("  Withdraw 30bnb: accepted, Alice's deposit now {}", deposit.amount);
    println!("  Alice wallet: {} bnb\n", sandbox.bank.balance(alice, "bnb"));
}

/// A depositor other than the owner funds the position. The owner cannot take it back.
fn scenario_2_third_party_depositor() {
    println!("Scenario 2: Third Party Depositor\n");

    let mut sandbox = bnb_sandbox(KeeperConfig::default());
    let owner = AccountId(1);
    let backer = AccountId(2);
    let id = sandbox.open_position(owner, "bnb-a", dec!(100)).unwrap();
    sandbox.fund(owner, &bnb(dec!(50)));
    sandbox.fund(backer, &bnb(dec!(1000)));

    sandbox.deposit(owner, owner, bnb(dec!(50)), "bnb-a").unwrap();
    sandbox.deposit(owner, backer, bnb(dec!(1000)), "bnb-a").unwrap();

    for deposit in sandbox.keeper.get_deposits(id).unwrap() {
        println!("  {} contributed {}", deposit.depositor, deposit.amount);
    }
    println!("  Position collateral: {}", sandbox.position(id).unwrap().collateral);

    match sandbox.withdraw(owner, owner, bnb(dec!(500)), "bnb-a") {
        Ok(()) => println!("  Owner withdraws 500bnb: accepted"),
        Err(e) => println!("  Owner withdraws 500bnb: {}", e),
    }
    sandbox.withdraw(owner, backer, bnb(dec!(500)), "bnb-a").unwrap();
    println!("  Backer withdraws 500bnb: accepted");
    println!("  Ledger total: {}\n", sandbox.keeper.total_deposited(id).unwrap());
}

/// A year of stability fees pushes the position's debt up past what a withdrawal can leave.
fn scenario_3_interest_blocks_withdrawal() {
    println!("Scenario 3: Interest Accrual\n");

    let mut sandbox = Sandbox::new(CdpParams::default())
        .unwrap()
        .with_interest(StabilityFeeAccrual);
    sandbox.set_price("bnb:usd", dec!(1));
    let alice = AccountId(1);
    let id = sandbox.open_position(alice, "bnb-a", dec!(1_000_000)).unwrap();
    sandbox.fund(alice, &bnb(dec!(1_600_000)));
    sandbox.deposit(alice, alice, bnb(dec!(1_600_000)), "bnb-a").unwrap();

    println!("  Debt 1,000,000 usdx, collateral 1,600,000 bnb, liquidation ratio 1.5");

    sandbox.advance_secs(365 * 24 * 60 * 60);
    sandbox.set_price("bnb:usd", dec!(1));

    match sandbox.withdraw(alice, alice, bnb(dec!(90_000)), "bnb-a") {
        Ok(()) => println!("  After a year, withdraw 90,000bnb: accepted"),
        Err(e) => println!("  After a year, withdraw 90,000bnb: {}", e),
    }
    let position = sandbox.position(id).unwrap();
    println!("  Fees booked: {}\n", position.accumulated_fees);
}

/// The bank refuses a release that validation already approved.
fn scenario_4_custody_failure_halts() {
    println!("Scenario 4: Custody Failure\n");

    let mut sandbox = bnb_sandbox(KeeperConfig::verbose());
    let alice = AccountId(1);
    sandbox.open_position(alice, "bnb-a", dec!(100)).unwrap();
    sandbox.fund(alice, &bnb(dec!(300)));
    sandbox.deposit(alice, alice, bnb(dec!(200)), "bnb-a").unwrap();

    sandbox.bank.fail_next_release("account frozen");
    let err = sandbox
        .withdraw(alice, alice, bnb(dec!(10)), "bnb-a")
        .unwrap_err();
    println!("  Withdraw 10bnb: {} (fatal: {})", err, err.is_fatal());

    let err = sandbox
        .deposit(alice, alice, bnb(dec!(50)), "bnb-a")
        .unwrap_err();
    println!("  Next deposit: {}\n", err);
}

/// Many depositors on one position, withdrawn back in a different order.
fn scenario_5_many_depositors() {
    println!("Scenario 5: Many Depositors\n");

    let mut sandbox = bnb_sandbox(KeeperConfig::default());
    let owner = AccountId(1);
    let id = sandbox.open_position(owner, "bnb-a", dec!(1000)).unwrap();

    let depositors: Vec<AccountId> = (10..30).map(AccountId).collect();
    for (i, &depositor) in depositors.iter().enumerate() {
        let amount = dec!(100) + Decimal::from(i) * dec!(10);
        sandbox.fund(depositor, &bnb(amount));
        sandbox.deposit(owner, depositor, bnb(amount), "bnb-a").unwrap();
    }

    let collateral = sandbox.position(id).unwrap().collateral;
    println!("  {} depositors, position holds {}", depositors.len(), collateral);

    let mut accepted = 0;
    let mut rejected = 0;
    for &depositor in depositors.iter().rev() {
        let amount = sandbox.keeper.get_deposit(id, depositor).unwrap().unwrap().amount;
        match sandbox.withdraw(owner, depositor, amount, "bnb-a") {
            Ok(()) => accepted += 1,
            Err(_) => rejected += 1,
        }
    }

    let position = sandbox.position(id).unwrap();
    println!("  Full withdrawals: {} accepted, {} blocked by the ratio guard", accepted, rejected);
    println!(
        "  Remaining collateral {}, ledger total {}",
        position.collateral,
        sandbox.keeper.total_deposited(id).unwrap()
    );
    println!("  Module account: {} bnb", sandbox.bank.module_balance("bnb"));
    println!("  Events generated: {}\n", sandbox.events.events().len());
}
