// cdp-ledger: per-depositor collateral ledger for collateralized debt positions.
// a position is owned by one account but funded by any number of depositors; each
// depositor can only pull back what they put in, and only while the position stays
// above its liquidation ratio. all computation is deterministic with no external I/O.
//
// file map (search X.0 for structs, X.1+ for logic):
//   1.x  types.rs: primitives: PositionId, AccountId, Price, Coin, Timestamp
//   2.x  deposit.rs: deposit records and the prefix keyed ledger
//   2.9  store.rs: ordered key value substrate
//   3.x  position.rs: position struct
//   3.5  index.rs: position store + collateral ratio index (mocked)
//   4.x  ratio.rs: collateralization and collateral to debt ratios
//   5.x  interest.rs: stability fee accrual
//   7.x  config.rs: collateral and debt params, env presets
//   8.x  keeper/: deposit and withdraw orchestration, validation, ledger queries
//   9.x  price_feed.rs: oracle aggregation (mocked)
//   9.2  custody.rs: bank transfers to and from the module account (mocked)
//   10.x hooks.rs: pre-modification notifications
//   11.x events.rs: cdp_deposit / cdp_withdrawal events
//   12.x sandbox.rs: keeper wired to in-memory collaborators

// core ledger modules
pub mod deposit;
pub mod keeper;
pub mod position;
pub mod store;
pub mod types;

// math
pub mod interest;
pub mod ratio;

// integration modules
pub mod config;
pub mod custody;
pub mod events;
pub mod hooks;
pub mod index;
pub mod price_feed;
pub mod sandbox;

// re exports for convenience
pub use deposit::*;
pub use events::*;
pub use hooks::*;
pub use index::*;
pub use interest::*;
pub use keeper::*;
pub use position::*;
pub use ratio::*;
pub use store::*;
pub use types::*;
pub use config::{
    CdpParams, CollateralParam, ConfigError, DebtParam, Environment, MAX_CONVERSION_FACTOR,
    MAX_STABILITY_FEE,
};
pub use custody::{Bank, CustodyError, MockBank};
pub use price_feed::{PriceFeed, PriceFeedConfig, PriceFeedError, PriceOracle, PriceUpdate};
pub use sandbox::Sandbox;
