// 8.0: the cdp keeper. owns the deposit ledger and runs the two collateral entry points,
// deposit and withdraw, against collaborators borrowed for the duration of each call.
// deterministic, single threaded, no I/O of its own.

mod collateral;
mod config;
mod core;
mod ledger;
mod ratios;
mod results;
mod validation;

pub use config::KeeperConfig;
pub use core::{Keeper, ModuleContext};
pub use results::{CdpError, CollateralRejection, FatalError};
