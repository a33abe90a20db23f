// 8.0 keeper/core.rs: main keeper. owns params and the deposit ledger, nothing else.
// positions, prices, balances, hooks, interest and the event sink are borrowed per call.

use super::config::KeeperConfig;
use super::results::{CdpError, FatalError};
use crate::config::{CdpParams, ConfigError};
use crate::custody::Bank;
use crate::deposit::DepositLedger;
use crate::events::{Event, EventEmitter, EventId, EventPayload};
use crate::hooks::PositionHooks;
use crate::index::PositionStore;
use crate::interest::InterestAccrual;
use crate::price_feed::PriceOracle;
use crate::store::{KvStore, MemStore};
use crate::types::Timestamp;

/** 8.1: everything outside the keeper that one operation touches. lives for one call */
pub struct ModuleContext<'a> {
    pub block_time: Timestamp,
    pub bank: &'a mut dyn Bank,
    pub prices: &'a dyn PriceOracle,
    pub positions: &'a mut dyn PositionStore,
    pub hooks: &'a mut dyn PositionHooks,
    pub interest: &'a dyn InterestAccrual,
    pub events: &'a mut dyn EventEmitter,
}

#[derive(Debug)]
pub struct Keeper<S = MemStore> {
    pub(super) config: KeeperConfig,
    pub(super) params: CdpParams,
    pub(super) deposits: DepositLedger<S>,
    pub(super) next_event_id: u64,
    pub(super) halted: Option<FatalError>,
}

impl Keeper<MemStore> {
    pub fn new(config: KeeperConfig, params: CdpParams) -> Result<Self, ConfigError> {
        Self::with_store(config, params, MemStore::new())
    }
}

impl<S: KvStore> Keeper<S> {
    pub fn with_store(config: KeeperConfig, params: CdpParams, store: S) -> Result<Self, ConfigError> {
        params.validate()?;
        Ok(Self {
            config,
            params,
            deposits: DepositLedger::new(store),
            next_event_id: 1,
            halted: None,
        })
    }

    pub fn params(&self) -> &CdpParams {
        &self.params
    }

    pub fn deposit_ledger(&self) -> &DepositLedger<S> {
        &self.deposits
    }

    pub fn is_halted(&self) -> bool {
        self.halted.is_some()
    }

    pub fn halt_reason(&self) -> Option<&FatalError> {
        self.halted.as_ref()
    }

    pub(super) fn ensure_running(&self) -> Result<(), CdpError> {
        match &self.halted {
            Some(reason) => Err(CdpError::Halted(reason.clone())),
            None => Ok(()),
        }
    }

    // records the fatal condition so nothing else runs on top of it
    pub(super) fn halt(&mut self, reason: FatalError) -> CdpError {
        if self.config.verbose {
            println!("[Halt] {}", reason);
        }
        self.halted = Some(reason.clone());
        CdpError::Fatal(reason)
    }

    pub(super) fn emit_event(&mut self, ctx: &mut ModuleContext<'_>, payload: EventPayload) {
        let event = Event::new(EventId(self.next_event_id), ctx.block_time, payload);
        self.next_event_id += 1;

        if self.config.verbose {
            let attrs: Vec<String> = event
                .attributes()
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            println!("[Event {}] {} {}", event.id.0, event.name(), attrs.join(" "));
        }

        ctx.events.emit(event);
    }
}
