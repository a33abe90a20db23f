//! Pre-mutation checks: collateral validity and depositor balance.

use super::core::{Keeper, ModuleContext};
use super::results::{CdpError, CollateralRejection};
use crate::config::CollateralParam;
use crate::store::KvStore;
use crate::types::{AccountId, Coin};

impl<S: KvStore> Keeper<S> {
    /// Collateral type is configured, the coin is its denom and positive, and the
    /// type's spot market has a live price. Returns the type's params.
    pub fn validate_collateral(
        &self,
        ctx: &ModuleContext<'_>,
        collateral: &Coin,
        collateral_type: &str,
    ) -> Result<CollateralParam, CdpError> {
        let reject = |reason| CdpError::InvalidCollateral {
            collateral_type: collateral_type.to_string(),
            amount: collateral.clone(),
            reason,
        };

        let param = self
            .params
            .collateral_param(collateral_type)
            .ok_or_else(|| reject(CollateralRejection::UnknownType))?;

        if collateral.denom() != param.denom {
            return Err(reject(CollateralRejection::DenomMismatch {
                expected: param.denom.clone(),
            }));
        }
        if !collateral.is_positive() {
            return Err(reject(CollateralRejection::NonPositiveAmount));
        }

        ctx.prices
            .current_price(&param.spot_market_id, ctx.block_time)
            .map_err(|e| reject(CollateralRejection::PricefeedDown(e)))?;

        Ok(param.clone())
    }

    /// `account` can spend at least `amount`.
    pub fn validate_balance(
        &self,
        ctx: &ModuleContext<'_>,
        amount: &Coin,
        account: AccountId,
    ) -> Result<(), CdpError> {
        let available = ctx.bank.spendable(account, amount.denom());
        if available < amount.amount() {
            return Err(CdpError::InsufficientFunds {
                account,
                requested: amount.clone(),
                available,
            });
        }
        Ok(())
    }
}
