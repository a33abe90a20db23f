//! Stress tests
//!
//! These tests push many depositors, positions and price moves through the keeper
//! to verify the ledger stays consistent at scale and under volatile prices.

use cdp_ledger::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn bnb(amount: Decimal) -> Coin {
    Coin::new("bnb", amount).unwrap()
}

fn sandbox() -> Sandbox {
    let mut sandbox = Sandbox::new(CdpParams::testnet()).unwrap();
    sandbox.set_price("bnb:usd", dec!(1));
    sandbox
}

fn assert_consistent(sandbox: &Sandbox, id: PositionId) {
    let position = sandbox.position(id).unwrap();
    let total = sandbox.keeper.total_deposited(id).unwrap();
    assert_eq!(position.collateral.amount(), total);

    for deposit in sandbox.keeper.get_deposits(id).unwrap() {
        assert!(deposit.amount.is_positive(), "zero deposit persisted: {:?}", deposit);
        assert_eq!(deposit.position_id, id);
    }
}

/// Many depositors sharing one position.
mod crowded_position_tests {
    use super::*;

    #[test]
    fn hundreds_of_depositors_round_trip() {
        let mut sandbox = sandbox();
        let owner = AccountId(1);
        let id = sandbox.open_position(owner, "bnb-a", dec!(1000)).unwrap();

        let depositors: Vec<AccountId> = (1_000..1_300).map(AccountId).collect();
        for (i, &depositor) in depositors.iter().enumerate() {
            let amount = dec!(10) + Decimal::from(i % 7);
            sandbox.fund(depositor, &bnb(amount));
            sandbox.deposit(owner, depositor, bnb(amount), "bnb-a").unwrap();
        }
        assert_consistent(&sandbox, id);
        assert_eq!(sandbox.keeper.get_deposits(id).unwrap().len(), 300);

        // pull everything back until the guard stops us
        let mut blocked = 0;
        for &depositor in &depositors {
            let amount = sandbox.keeper.get_deposit(id, depositor).unwrap().unwrap().amount;
            match sandbox.withdraw(owner, depositor, amount, "bnb-a") {
                Ok(()) => {
                    assert!(sandbox.keeper.get_deposit(id, depositor).unwrap().is_none());
                }
                Err(CdpError::InvalidCollateralRatio { .. }) => blocked += 1,
                Err(other) => panic!("unexpected error {:?}", other),
            }
            assert_consistent(&sandbox, id);
        }

        let remaining = sandbox.position(id).unwrap().collateral.amount();
        assert!(remaining >= dec!(1500), "guard let collateral fall to {}", remaining);
        assert!(blocked > 0);
        assert_eq!(sandbox.bank.module_balance("bnb"), remaining);
    }

    #[test]
    fn partial_withdrawals_down_to_exact_zero() {
        let mut sandbox = sandbox();
        let owner = AccountId(1);
        let depositor = AccountId(5);
        let id = sandbox.open_position(owner, "bnb-a", Decimal::ZERO).unwrap();

        sandbox.fund(depositor, &bnb(dec!(1)));
        sandbox.deposit(owner, depositor, bnb(dec!(1)), "bnb-a").unwrap();

        for _ in 0..9 {
            sandbox.withdraw(owner, depositor, bnb(dec!(0.1)), "bnb-a").unwrap();
            assert_consistent(&sandbox, id);
        }
        assert_eq!(
            sandbox.keeper.get_deposit(id, depositor).unwrap().unwrap().amount,
            bnb(dec!(0.1))
        );

        sandbox.withdraw(owner, depositor, bnb(dec!(0.1)), "bnb-a").unwrap();
        assert!(sandbox.keeper.get_deposit(id, depositor).unwrap().is_none());
        assert_eq!(sandbox.bank.balance(depositor, "bnb"), dec!(1));
    }
}

/// Price moves between operations.
mod volatility_tests {
    use super::*;

    #[test]
    fn guard_tracks_price() {
        let mut sandbox = sandbox();
        let owner = AccountId(1);
        let id = sandbox.open_position(owner, "bnb-a", dec!(300)).unwrap();
        sandbox.fund(owner, &bnb(dec!(10)));
        sandbox.deposit(owner, owner, bnb(dec!(10)), "bnb-a").unwrap();

        // (10 - 1) * price / 300 >= 1.5 needs price >= 50
        let mut accepted = Vec::new();
        for price in [dec!(20), dec!(40), dec!(49.99), dec!(50), dec!(80)] {
            sandbox.set_price("bnb:usd", price);
            match sandbox.withdraw(owner, owner, bnb(dec!(1)), "bnb-a") {
                Ok(()) => {
                    accepted.push(price);
                    sandbox.fund(owner, &bnb(dec!(1)));
                    sandbox.deposit(owner, owner, bnb(dec!(1)), "bnb-a").unwrap();
                }
                Err(CdpError::InvalidCollateralRatio { .. }) => {}
                Err(other) => panic!("unexpected error {:?}", other),
            }
        }

        assert_eq!(accepted, vec![dec!(50), dec!(80)]);
        assert_consistent(&sandbox, id);
        // unpriced, so every price leaves the same index entry
        assert_eq!(sandbox.positions.indexed_ratio(id), Some(dec!(10) / dec!(300)));
    }

    #[test]
    fn sources_median_feeds_the_guard() {
        let mut sandbox = sandbox();
        let owner = AccountId(1);
        sandbox.open_position(owner, "bnb-a", dec!(100)).unwrap();
        sandbox.fund(owner, &bnb(dec!(200)));
        sandbox.deposit(owner, owner, bnb(dec!(200)), "bnb-a").unwrap();

        // median of 0.995, 1.00, 1.005 is 1.00; leaves 150 / 100
        for (source, price) in [(2, dec!(0.995)), (3, dec!(1.005))] {
            sandbox
                .prices
                .post_price("bnb:usd", PriceUpdate::new(price, sandbox.block_time, source));
        }
        assert_eq!(sandbox.prices.source_count("bnb:usd"), 3);
        sandbox.withdraw(owner, owner, bnb(dec!(50)), "bnb-a").unwrap();

        // sources 20% apart are not a price
        sandbox
            .prices
            .post_price("bnb:usd", PriceUpdate::new(dec!(1.2), sandbox.block_time, 4));
        let err = sandbox
            .withdraw(owner, owner, bnb(dec!(1)), "bnb-a")
            .unwrap_err();
        assert!(matches!(
            err,
            CdpError::InvalidCollateral {
                reason: CollateralRejection::PricefeedDown(PriceFeedError::ExcessiveDeviation { .. }),
                ..
            }
        ));
    }
}

/// Many independent positions.
mod many_positions_tests {
    use super::*;

    #[test]
    fn deposits_stay_scoped_to_their_position() {
        let mut sandbox = sandbox();
        let backer = AccountId(999);
        sandbox.fund(backer, &bnb(dec!(100_000)));

        let mut ids = Vec::new();
        for owner in 1..=50u64 {
            let id = sandbox.open_position(AccountId(owner), "bnb-a", dec!(10)).unwrap();
            let amount = Decimal::from(owner * 10);
            sandbox.deposit(AccountId(owner), backer, bnb(amount), "bnb-a").unwrap();
            ids.push((id, amount));
        }

        for &(id, amount) in &ids {
            let deposits = sandbox.keeper.get_deposits(id).unwrap();
            assert_eq!(deposits.len(), 1);
            assert_eq!(deposits[0].amount.amount(), amount);
            assert_consistent(&sandbox, id);
        }

        let held: Decimal = ids.iter().map(|(_, amount)| *amount).sum();
        assert_eq!(sandbox.bank.module_balance("bnb"), held);
        assert_eq!(sandbox.events.named(EVENT_TYPE_CDP_DEPOSIT).len(), 50);
    }

    #[test]
    fn iterate_stops_early() {
        let mut sandbox = sandbox();
        let owner = AccountId(1);
        let id = sandbox.open_position(owner, "bnb-a", dec!(1)).unwrap();
        for depositor in 10..20u64 {
            sandbox.fund(AccountId(depositor), &bnb(dec!(5)));
            sandbox
                .deposit(owner, AccountId(depositor), bnb(dec!(5)), "bnb-a")
                .unwrap();
        }

        let mut seen = Vec::new();
        sandbox
            .keeper
            .iterate_deposits(id, |deposit| {
                seen.push(deposit.depositor);
                seen.len() == 3
            })
            .unwrap();
        assert_eq!(seen, vec![AccountId(10), AccountId(11), AccountId(12)]);
    }
}
