//! Ratio lookups that need params or the oracle.

use super::core::{Keeper, ModuleContext};
use super::results::{CdpError, CollateralRejection};
use crate::config::CollateralParam;
use crate::ratio::{collateral_to_debt_ratio, collateralization_ratio};
use crate::store::KvStore;
use crate::types::Coin;
use rust_decimal::Decimal;

impl<S: KvStore> Keeper<S> {
    fn param_for(&self, collateral: &Coin, collateral_type: &str) -> Result<&CollateralParam, CdpError> {
        self.params
            .collateral_param(collateral_type)
            .ok_or_else(|| CdpError::InvalidCollateral {
                collateral_type: collateral_type.to_string(),
                amount: collateral.clone(),
                reason: CollateralRejection::UnknownType,
            })
    }

    /// Minimum collateralization ratio for a type.
    pub fn liquidation_ratio(&self, collateral_type: &str) -> Option<Decimal> {
        self.params
            .collateral_param(collateral_type)
            .map(|cp| cp.liquidation_ratio)
    }

    /// Collateral value at the current spot price over principal + fees.
    pub fn calculate_collateralization_ratio(
        &self,
        ctx: &ModuleContext<'_>,
        collateral: &Coin,
        collateral_type: &str,
        principal: &Coin,
        fees: &Coin,
    ) -> Result<Decimal, CdpError> {
        let param = self.param_for(collateral, collateral_type)?;
        let price = ctx
            .prices
            .current_price(&param.spot_market_id, ctx.block_time)?;

        collateralization_ratio(
            collateral,
            param,
            principal,
            fees,
            &self.params.debt_param,
            price,
        )
        .ok_or_else(|| CdpError::Overflow {
            collateral_type: collateral_type.to_string(),
            operation: "collateralization ratio",
        })
    }

    /// Unpriced collateral over total principal. What the ratio index sorts on.
    pub fn calculate_collateral_to_debt_ratio(
        &self,
        collateral: &Coin,
        collateral_type: &str,
        total_principal: &Coin,
    ) -> Result<Decimal, CdpError> {
        let param = self.param_for(collateral, collateral_type)?;
        collateral_to_debt_ratio(collateral, param, total_principal, &self.params.debt_param)
            .ok_or_else(|| CdpError::Overflow {
                collateral_type: collateral_type.to_string(),
                operation: "collateral to debt ratio",
            })
    }
}
