// 7.0 config.rs: module params in one place. per collateral type risk settings plus the debt asset.
// 7.1 presets per environment, 7.2 validation.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// Decimal carries at most 28 fractional digits
pub const MAX_CONVERSION_FACTOR: u32 = 28;

// Per-second ceiling on stability_fee, about 2240% apr
pub const MAX_STABILITY_FEE: Decimal = dec!(1.0000001);

// Risk settings for one collateral type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollateralParam {
    // Denom locked as collateral (e.g. "ubnb")
    pub denom: String,
    // Type tag positions are opened under (e.g. "bnb-a"). several types may share a denom
    #[serde(rename = "type")]
    pub collateral_type: String,
    // Minimum collateralization ratio before a position is liquidatable
    pub liquidation_ratio: Decimal,
    // Per-second interest factor applied to outstanding debt (1.0 = no interest)
    pub stability_fee: Decimal,
    // Price feed market used for collateral value
    pub spot_market_id: String,
    // Decimals between the collateral's base unit and one whole coin
    pub conversion_factor: u32,
}

impl CollateralParam {
    pub fn new(denom: &str, collateral_type: &str, liquidation_ratio: Decimal, spot_market_id: &str) -> Self {
        Self {
            denom: denom.to_string(),
            collateral_type: collateral_type.to_string(),
            liquidation_ratio,
            stability_fee: Decimal::ONE,
            spot_market_id: spot_market_id.to_string(),
            conversion_factor: 0,
        }
    }

    pub fn with_stability_fee(mut self, fee: Decimal) -> Self {
        self.stability_fee = fee;
        self
    }

    pub fn with_conversion_factor(mut self, factor: u32) -> Self {
        self.conversion_factor = factor;
        self
    }
}

// The asset minted against collateral
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtParam {
    pub denom: String,
    pub conversion_factor: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CdpParams {
    pub collateral_params: Vec<CollateralParam>,
    pub debt_param: DebtParam,
}

/** 7.1: development preset. whole-unit denoms so ratios read directly off the amounts */
impl Default for CdpParams {
    fn default() -> Self {
        Self {
            collateral_params: vec![
                CollateralParam::new("bnb", "bnb-a", dec!(1.5), "bnb:usd")
                    .with_stability_fee(dec!(1.000000001547125958)), // ~5% apr
                CollateralParam::new("xrp", "xrp-a", dec!(2.0), "xrp:usd"),
            ],
            debt_param: DebtParam {
                denom: "usdx".to_string(),
                conversion_factor: 0,
            },
        }
    }
}

impl CdpParams {
    // base-unit denoms and stricter ratios
    pub fn mainnet() -> Self {
        Self {
            collateral_params: vec![
                CollateralParam::new("ubnb", "bnb-a", dec!(1.75), "bnb:usd")
                    .with_stability_fee(dec!(1.000000001547125958))
                    .with_conversion_factor(8),
                CollateralParam::new("ubnb", "bnb-b", dec!(2.5), "bnb:usd")
                    .with_stability_fee(dec!(1.000000000782997609))
                    .with_conversion_factor(8),
                CollateralParam::new("xrp", "xrp-a", dec!(2.0), "xrp:usd")
                    .with_stability_fee(dec!(1.000000001547125958))
                    .with_conversion_factor(6),
            ],
            debt_param: DebtParam {
                denom: "usdx".to_string(),
                conversion_factor: 6,
            },
        }
    }

    pub fn testnet() -> Self {
        let mut params = Self::default();
        // cheap debt on testnet
        for cp in &mut params.collateral_params {
            cp.stability_fee = Decimal::ONE;
        }
        params
    }

    pub fn collateral_param(&self, collateral_type: &str) -> Option<&CollateralParam> {
        self.collateral_params
            .iter()
            .find(|cp| cp.collateral_type == collateral_type)
    }

    // 7.2: internal consistency checks
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.debt_param.denom.is_empty() {
            return Err(ConfigError::InvalidDebt {
                reason: "debt denom is empty".to_string(),
            });
        }
        if self.debt_param.conversion_factor > MAX_CONVERSION_FACTOR {
            return Err(ConfigError::InvalidDebt {
                reason: format!(
                    "conversion factor {} above {}",
                    self.debt_param.conversion_factor, MAX_CONVERSION_FACTOR
                ),
            });
        }

        let mut seen = HashSet::new();
        for cp in &self.collateral_params {
            if !seen.insert(cp.collateral_type.as_str()) {
                return Err(ConfigError::DuplicateCollateralType(cp.collateral_type.clone()));
            }
            if cp.denom.is_empty() || cp.spot_market_id.is_empty() {
                return Err(ConfigError::InvalidCollateral {
                    collateral_type: cp.collateral_type.clone(),
                    reason: "denom and spot market must be set".to_string(),
                });
            }
            if cp.liquidation_ratio < Decimal::ONE {
                return Err(ConfigError::InvalidCollateral {
                    collateral_type: cp.collateral_type.clone(),
                    reason: format!("liquidation ratio {} below 1", cp.liquidation_ratio),
                });
            }
            if cp.stability_fee < Decimal::ONE {
                return Err(ConfigError::InvalidCollateral {
                    collateral_type: cp.collateral_type.clone(),
                    reason: format!("stability fee {} below 1", cp.stability_fee),
                });
            }
            if cp.stability_fee > MAX_STABILITY_FEE {
                return Err(ConfigError::InvalidCollateral {
                    collateral_type: cp.collateral_type.clone(),
                    reason: format!("stability fee {} above {}", cp.stability_fee, MAX_STABILITY_FEE),
                });
            }
            if cp.conversion_factor > MAX_CONVERSION_FACTOR {
                return Err(ConfigError::InvalidCollateral {
                    collateral_type: cp.collateral_type.clone(),
                    reason: format!(
                        "conversion factor {} above {}",
                        cp.conversion_factor, MAX_CONVERSION_FACTOR
                    ),
                });
            }
            if cp.denom == self.debt_param.denom {
                return Err(ConfigError::InvalidCollateral {
                    collateral_type: cp.collateral_type.clone(),
                    reason: "collateral cannot be the debt asset".to_string(),
                });
            }
        }

        Ok(())
    }
}

// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Collateral type {0} configured twice")]
    DuplicateCollateralType(String),

    #[error("Invalid collateral param {collateral_type}: {reason}")]
    InvalidCollateral { collateral_type: String, reason: String },

    #[error("Invalid debt param: {reason}")]
    InvalidDebt { reason: String },
}

// Environment presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    Development,
    Testnet,
    Mainnet,
}

impl Environment {
    pub fn params(&self) -> CdpParams {
        match self {
            Environment::Development => CdpParams::default(),
            Environment::Testnet => CdpParams::testnet(),
            Environment::Mainnet => CdpParams::mainnet(),
        }
    }
}
