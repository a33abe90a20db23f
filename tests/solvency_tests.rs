//! Solvency invariant tests.
//!
//! These tests verify that the ledger, the position aggregate and the module
//! account never drift apart, and that no depositor can reach collateral that
//! is not theirs or that the position needs.

use cdp_ledger::*;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn params_with_ratio(liquidation_ratio: Decimal) -> CdpParams {
    CdpParams {
        collateral_params: vec![CollateralParam::new("bnb", "bnb-a", liquidation_ratio, "bnb:usd")],
        debt_param: DebtParam {
            denom: "usdx".to_string(),
            conversion_factor: 0,
        },
    }
}

fn sandbox_with_ratio(liquidation_ratio: Decimal) -> Sandbox {
    let mut sandbox = Sandbox::new(params_with_ratio(liquidation_ratio)).unwrap();
    sandbox.set_price("bnb:usd", dec!(1));
    sandbox
}

fn bnb(amount: Decimal) -> Coin {
    Coin::new("bnb", amount).unwrap()
}

fn liquidation_ratio_strategy() -> impl Strategy<Value = Decimal> {
    prop::sample::select(vec![dec!(1.1), dec!(1.25), dec!(1.5), dec!(2.0)])
}

// (depositor index, deposit?, amount)
fn op_strategy() -> impl Strategy<Value = (usize, bool, i64)> {
    (0usize..4, any::<bool>(), 1i64..500)
}

fn deposited(sandbox: &Sandbox, id: PositionId, depositor: AccountId) -> Decimal {
    sandbox
        .keeper
        .get_deposit(id, depositor)
        .unwrap()
        .map_or(Decimal::ZERO, |d| d.amount.amount())
}

proptest! {
    /// Position collateral, ledger total and module holdings agree after every operation,
    /// and every depositor's wallet plus their deposit equals what they were funded with.
    #[test]
    fn collateral_conserved(ops in proptest::collection::vec(op_strategy(), 1..40)) {
        let mut sandbox = sandbox_with_ratio(dec!(1.5));
        let owner = AccountId(1);
        let id = sandbox.open_position(owner, "bnb-a", dec!(100)).unwrap();

        let depositors: Vec<AccountId> = (0..4).map(|i| AccountId(100 + i)).collect();
        for &d in &depositors {
            sandbox.fund(d, &bnb(dec!(5000)));
        }

        for (idx, is_deposit, raw) in ops {
            let depositor = depositors[idx];
            let amount = bnb(Decimal::from(raw));
            let before = sandbox.position(id).unwrap();
            let wallet_before = sandbox.bank.balance(depositor, "bnb");

            let result = if is_deposit {
                sandbox.deposit(owner, depositor, amount, "bnb-a")
            } else {
                sandbox.withdraw(owner, depositor, amount, "bnb-a")
            };

            let after = sandbox.position(id).unwrap();
            if result.is_err() {
                prop_assert_eq!(&before, &after);
                prop_assert_eq!(wallet_before, sandbox.bank.balance(depositor, "bnb"));
            }

            prop_assert_eq!(after.collateral.amount(), sandbox.keeper.total_deposited(id).unwrap());
            prop_assert_eq!(after.collateral.amount(), sandbox.bank.module_balance("bnb"));
            for &d in &depositors {
                prop_assert_eq!(
                    sandbox.bank.balance(d, "bnb") + deposited(&sandbox, id, d),
                    dec!(5000)
                );
            }
        }
    }

    /// Leaving exactly L times the debt is allowed; a hundredth of a coin less is not.
    #[test]
    fn withdrawal_guard_boundary(
        principal in 1i64..10_000,
        liquidation_ratio in liquidation_ratio_strategy(),
        extra in 1i64..1_000,
    ) {
        let owner = AccountId(1);
        let floor = Decimal::from(principal) * liquidation_ratio;
        let total = floor + Decimal::from(extra);

        // just below the floor
        let mut sandbox = sandbox_with_ratio(liquidation_ratio);
        let id = sandbox.open_position(owner, "bnb-a", Decimal::from(principal)).unwrap();
        sandbox.fund(owner, &bnb(total));
        sandbox.deposit(owner, owner, bnb(total), "bnb-a").unwrap();

        let result = sandbox.withdraw(owner, owner, bnb(total - floor + dec!(0.01)), "bnb-a");
        let is_ratio_error = matches!(result, Err(CdpError::InvalidCollateralRatio { .. }));
        prop_assert!(is_ratio_error);
        prop_assert_eq!(sandbox.position(id).unwrap().collateral.amount(), total);

        // exactly at the floor
        sandbox.withdraw(owner, owner, bnb(total - floor), "bnb-a").unwrap();
        prop_assert_eq!(sandbox.position(id).unwrap().collateral.amount(), floor);
        prop_assert_eq!(deposited(&sandbox, id, owner), floor);
    }

    /// A depositor can never take out more than they put in, whatever the aggregate holds.
    #[test]
    fn withdrawal_capped_by_own_deposit(
        own in 1i64..1_000,
        others in 1_000i64..100_000,
        excess in 1i64..500,
    ) {
        let mut sandbox = sandbox_with_ratio(dec!(1.5));
        let owner = AccountId(1);
        let backer = AccountId(2);
        let id = sandbox.open_position(owner, "bnb-a", dec!(10)).unwrap();

        sandbox.fund(owner, &bnb(Decimal::from(own)));
        sandbox.fund(backer, &bnb(Decimal::from(others)));
        sandbox.deposit(owner, owner, bnb(Decimal::from(own)), "bnb-a").unwrap();
        sandbox.deposit(owner, backer, bnb(Decimal::from(others)), "bnb-a").unwrap();

        let result = sandbox.withdraw(owner, owner, bnb(Decimal::from(own + excess)), "bnb-a");
        let is_amount_error = matches!(result, Err(CdpError::InvalidWithdrawAmount { .. }));
        prop_assert!(is_amount_error);
        prop_assert_eq!(deposited(&sandbox, id, owner), Decimal::from(own));
        prop_assert_eq!(deposited(&sandbox, id, backer), Decimal::from(others));
    }

    /// Depositing a then b leaves the same record as depositing a + b once.
    #[test]
    fn split_deposit_matches_single(a in 1i64..10_000, b in 1i64..10_000) {
        let owner = AccountId(1);
        let depositor = AccountId(7);

        let mut split = sandbox_with_ratio(dec!(1.5));
        let split_id = split.open_position(owner, "bnb-a", dec!(100)).unwrap();
        split.fund(depositor, &bnb(Decimal::from(a + b)));
        split.deposit(owner, depositor, bnb(Decimal::from(a)), "bnb-a").unwrap();
        split.deposit(owner, depositor, bnb(Decimal::from(b)), "bnb-a").unwrap();

        let mut single = sandbox_with_ratio(dec!(1.5));
        let single_id = single.open_position(owner, "bnb-a", dec!(100)).unwrap();
        single.fund(depositor, &bnb(Decimal::from(a + b)));
        single.deposit(owner, depositor, bnb(Decimal::from(a + b)), "bnb-a").unwrap();

        prop_assert_eq!(
            split.keeper.get_deposit(split_id, depositor).unwrap(),
            single.keeper.get_deposit(single_id, depositor).unwrap()
        );
        prop_assert_eq!(split.position(split_id), single.position(single_id));
        prop_assert_eq!(
            split.positions.indexed_ratio(split_id),
            single.positions.indexed_ratio(single_id)
        );
    }

    /// Deposits come back in depositor order regardless of arrival order.
    #[test]
    fn deposits_listed_in_depositor_order(
        ids in proptest::collection::hash_set(1u64..100_000, 1..20),
    ) {
        let mut sandbox = sandbox_with_ratio(dec!(1.5));
        let owner = AccountId(1);
        let id = sandbox.open_position(owner, "bnb-a", dec!(1)).unwrap();

        for &raw in &ids {
            sandbox.fund(AccountId(raw), &bnb(dec!(10)));
            sandbox.deposit(owner, AccountId(raw), bnb(dec!(10)), "bnb-a").unwrap();
        }

        let listed: Vec<u64> = sandbox
            .keeper
            .get_deposits(id)
            .unwrap()
            .iter()
            .map(|d| d.depositor.0)
            .collect();
        let mut expected: Vec<u64> = ids.into_iter().collect();
        expected.sort_unstable();
        prop_assert_eq!(listed, expected);
    }
}

#[test]
fn full_withdrawal_removes_record() {
    let mut sandbox = sandbox_with_ratio(dec!(1.5));
    let owner = AccountId(1);
    let backer = AccountId(2);
    let id = sandbox.open_position(owner, "bnb-a", dec!(100)).unwrap();

    sandbox.fund(owner, &bnb(dec!(300)));
    sandbox.fund(backer, &bnb(dec!(50)));
    sandbox.deposit(owner, owner, bnb(dec!(300)), "bnb-a").unwrap();
    sandbox.deposit(owner, backer, bnb(dec!(50)), "bnb-a").unwrap();

    sandbox.withdraw(owner, backer, bnb(dec!(50)), "bnb-a").unwrap();

    assert!(sandbox.keeper.get_deposit(id, backer).unwrap().is_none());
    assert_eq!(sandbox.keeper.get_deposits(id).unwrap().len(), 1);
    assert_eq!(sandbox.bank.balance(backer, "bnb"), dec!(50));

    // nothing left to withdraw against
    let err = sandbox
        .withdraw(owner, backer, bnb(dec!(1)), "bnb-a")
        .unwrap_err();
    assert!(matches!(err, CdpError::DepositNotFound { .. }));
}

#[test]
fn debt_free_position_fully_withdrawable() {
    let mut sandbox = sandbox_with_ratio(dec!(2.0));
    let owner = AccountId(1);
    let id = sandbox.open_position(owner, "bnb-a", Decimal::ZERO).unwrap();

    sandbox.fund(owner, &bnb(dec!(40)));
    sandbox.deposit(owner, owner, bnb(dec!(40)), "bnb-a").unwrap();
    assert_eq!(sandbox.positions.indexed_ratio(id), Some(Decimal::MAX));

    sandbox.withdraw(owner, owner, bnb(dec!(40)), "bnb-a").unwrap();
    assert!(sandbox.position(id).unwrap().collateral.is_zero());
    assert_eq!(sandbox.bank.module_balance("bnb"), Decimal::ZERO);
}
