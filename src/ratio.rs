//! Collateral ratio math.
//!
//! Two ratios matter. The collateralization ratio prices the collateral and divides by
//! the debt; it is what the withdrawal guard compares against the liquidation ratio.
//! The collateral-to-debt ratio skips the price and is only used as the sort key of the
//! liquidation index, so it can be recomputed without touching the oracle.
//!
//! Debt-free positions report `Decimal::MAX` for both. `None` means an amount could not
//! be brought into whole units at all; validated params never get there.

use crate::config::{CollateralParam, DebtParam};
use crate::types::{Coin, Price};
use rust_decimal::Decimal;

/// Base units to whole coins. `conversion_factor` 8 turns 1e8 base units into 1.
/// `None` past the 28 digits a `Decimal` can scale by.
pub fn to_whole_units(amount: Decimal, conversion_factor: u32) -> Option<Decimal> {
    if conversion_factor == 0 {
        return Some(amount);
    }
    let unit = Decimal::try_from_i128_with_scale(1, conversion_factor).ok()?;
    amount.checked_mul(unit)
}

/// Collateral value at `price` over principal plus fees.
pub fn collateralization_ratio(
    collateral: &Coin,
    collateral_param: &CollateralParam,
    principal: &Coin,
    fees: &Coin,
    debt_param: &DebtParam,
    price: Price,
) -> Option<Decimal> {
    // debt saturates, which only ever pushes the ratio down
    let debt = principal.amount().saturating_add(fees.amount());
    if debt.is_zero() {
        return Some(Decimal::MAX);
    }

    let collateral_value = to_whole_units(collateral.amount(), collateral_param.conversion_factor)?
        .checked_mul(price.value())
        .unwrap_or(Decimal::MAX);
    let debt_value = to_whole_units(debt, debt_param.conversion_factor)?;

    Some(
        collateral_value
            .checked_div(debt_value)
            .unwrap_or(Decimal::MAX),
    )
}

/// Unpriced collateral over total principal. Sort key for the ratio index.
pub fn collateral_to_debt_ratio(
    collateral: &Coin,
    collateral_param: &CollateralParam,
    total_principal: &Coin,
    debt_param: &DebtParam,
) -> Option<Decimal> {
    if total_principal.is_zero() {
        return Some(Decimal::MAX);
    }

    let collateral_units = to_whole_units(collateral.amount(), collateral_param.conversion_factor)?;
    let debt_units = to_whole_units(total_principal.amount(), debt_param.conversion_factor)?;

    Some(
        collateral_units
            .checked_div(debt_units)
            .unwrap_or(Decimal::MAX),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CdpParams;
    use rust_decimal_macros::dec;

    fn coin(denom: &str, amount: Decimal) -> Coin {
        Coin::new(denom, amount).unwrap()
    }

    #[test]
    fn ratio_of_priced_collateral() {
        let params = CdpParams::default();
        let cp = params.collateral_param("bnb-a").unwrap();

        // 200 bnb @ 1.0 against 100 usdx
        let ratio = collateralization_ratio(
            &coin("bnb", dec!(200)),
            cp,
            &coin("usdx", dec!(100)),
            &Coin::zero("usdx"),
            &params.debt_param,
            Price::new_unchecked(dec!(1.0)),
        );
        assert_eq!(ratio, Some(dec!(2)));
    }

    #[test]
    fn fees_count_as_debt() {
        let params = CdpParams::default();
        let cp = params.collateral_param("bnb-a").unwrap();

        let ratio = collateralization_ratio(
            &coin("bnb", dec!(150)),
            cp,
            &coin("usdx", dec!(90)),
            &coin("usdx", dec!(10)),
            &params.debt_param,
            Price::new_unchecked(dec!(2)),
        );
        assert_eq!(ratio, Some(dec!(3)));
    }

    #[test]
    fn conversion_factors_apply() {
        let params = CdpParams::mainnet();
        let cp = params.collateral_param("bnb-a").unwrap();

        // 2 bnb (8 decimals) @ 300 against 400 usdx (6 decimals)
        let ratio = collateralization_ratio(
            &coin("ubnb", dec!(200_000_000)),
            cp,
            &coin("usdx", dec!(400_000_000)),
            &Coin::zero("usdx"),
            &params.debt_param,
            Price::new_unchecked(dec!(300)),
        );
        assert_eq!(ratio, Some(dec!(1.5)));

        let unpriced = collateral_to_debt_ratio(
            &coin("ubnb", dec!(200_000_000)),
            cp,
            &coin("usdx", dec!(400_000_000)),
            &params.debt_param,
        );
        assert_eq!(unpriced, Some(dec!(0.005)));
    }

    #[test]
    fn debt_free_is_max() {
        let params = CdpParams::default();
        let cp = params.collateral_param("bnb-a").unwrap();

        let ratio = collateralization_ratio(
            &Coin::zero("bnb"),
            cp,
            &Coin::zero("usdx"),
            &Coin::zero("usdx"),
            &params.debt_param,
            Price::new_unchecked(dec!(1)),
        );
        assert_eq!(ratio, Some(Decimal::MAX));

        let unpriced =
            collateral_to_debt_ratio(&coin("bnb", dec!(5)), cp, &Coin::zero("usdx"), &params.debt_param);
        assert_eq!(unpriced, Some(Decimal::MAX));
    }

    #[test]
    fn empty_collateral_with_debt_is_zero() {
        let params = CdpParams::default();
        let cp = params.collateral_param("bnb-a").unwrap();

        let ratio = collateralization_ratio(
            &Coin::zero("bnb"),
            cp,
            &coin("usdx", dec!(1)),
            &Coin::zero("usdx"),
            &params.debt_param,
            Price::new_unchecked(dec!(1)),
        );
        assert_eq!(ratio, Some(Decimal::ZERO));
    }

    #[test]
    fn whole_units_past_max_scale_is_none() {
        assert_eq!(to_whole_units(dec!(5), 28), Some(dec!(0.0000000000000000000000000005)));
        assert_eq!(to_whole_units(dec!(5), 29), None);
        assert_eq!(to_whole_units(dec!(5), u32::MAX), None);
    }

    #[test]
    fn unscalable_factor_has_no_ratio() {
        let params = CdpParams::default();
        let cp = params
            .collateral_param("bnb-a")
            .unwrap()
            .clone()
            .with_conversion_factor(29);

        let ratio = collateralization_ratio(
            &coin("bnb", dec!(200)),
            &cp,
            &coin("usdx", dec!(100)),
            &Coin::zero("usdx"),
            &params.debt_param,
            Price::new_unchecked(dec!(1)),
        );
        assert_eq!(ratio, None);
        assert_eq!(
            collateral_to_debt_ratio(&coin("bnb", dec!(200)), &cp, &coin("usdx", dec!(100)), &params.debt_param),
            None
        );
    }

    #[test]
    fn saturated_debt_drives_ratio_down() {
        let params = CdpParams::default();
        let cp = params.collateral_param("bnb-a").unwrap();

        let ratio = collateralization_ratio(
            &coin("bnb", dec!(1)),
            cp,
            &coin("usdx", Decimal::MAX),
            &coin("usdx", Decimal::MAX),
            &params.debt_param,
            Price::new_unchecked(dec!(1)),
        )
        .unwrap();
        assert!(ratio < dec!(0.000001));
    }
}
