// 5.0: interest. debt grows by the collateral type's per-second stability fee.
// the keeper only calls synchronize_interest before touching a position; how fees are
// computed is up to the implementation behind the trait.

use crate::config::CollateralParam;
use crate::position::Position;
use crate::types::{Coin, Timestamp};
use rust_decimal::prelude::MathematicalOps;
use rust_decimal::{Decimal, RoundingStrategy};

pub trait InterestAccrual {
    // returns the position with accumulated_fees/fees_updated brought current to `now`
    fn synchronize_interest(
        &self,
        position: Position,
        collateral_param: &CollateralParam,
        now: Timestamp,
    ) -> Position;
}

// debt never grows
#[derive(Debug, Default, Clone, Copy)]
pub struct NoAccrual;

impl InterestAccrual for NoAccrual {
    fn synchronize_interest(
        &self,
        mut position: Position,
        _collateral_param: &CollateralParam,
        now: Timestamp,
    ) -> Position {
        if now > position.fees_updated {
            position.fees_updated = now;
        }
        position
    }
}

// 5.1: compounds stability_fee per elapsed second over principal + fees
#[derive(Debug, Default, Clone, Copy)]
pub struct StabilityFeeAccrual;

impl InterestAccrual for StabilityFeeAccrual {
    fn synchronize_interest(
        &self,
        mut position: Position,
        collateral_param: &CollateralParam,
        now: Timestamp,
    ) -> Position {
        let elapsed = position.fees_updated.elapsed_secs(&now);
        if elapsed == 0 {
            return position;
        }
        if !position.has_debt() {
            position.fees_updated = now;
            return position;
        }

        let interest = calculate_interest(
            position.total_principal().amount(),
            collateral_param.stability_fee,
            elapsed,
        );

        // sub-unit interest stays unbooked; keep the clock so it keeps accruing
        if interest.is_zero() {
            return position;
        }

        if let Some(interest) = Coin::new(position.accumulated_fees.denom(), interest) {
            position.accumulated_fees = position.accumulated_fees.saturating_add(&interest);
            position.fees_updated = now;
        }
        position
    }
}

/// debt * (fee^seconds - 1), truncated to whole base units of the debt denom.
///
/// Saturates at `Decimal::MAX` when the compounded factor or the product leaves
/// Decimal's range. Accrual that large is still accrual, never zero.
pub fn calculate_interest(debt: Decimal, stability_fee: Decimal, seconds: u64) -> Decimal {
    if debt <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    let growth = match stability_fee.checked_powu(seconds) {
        Some(factor) => factor.checked_sub(Decimal::ONE).unwrap_or(Decimal::ZERO),
        None => Decimal::MAX,
    };
    let raw = debt.checked_mul(growth).unwrap_or(Decimal::MAX);
    raw.round_dp_with_strategy(0, RoundingStrategy::ToZero)
        .max(Decimal::ZERO)
}
