//! A keeper wired to in-memory collaborators.
//!
//! Owns one of everything a [`ModuleContext`] borrows plus a block clock. The
//! simulation binary and the integration tests drive the keeper through this.

use crate::config::{CdpParams, ConfigError};
use crate::custody::MockBank;
use crate::events::EventCollector;
use crate::hooks::RecordingHooks;
use crate::index::{IndexError, MemPositionStore, PositionStore};
use crate::interest::{InterestAccrual, NoAccrual};
use crate::keeper::{CdpError, Keeper, KeeperConfig, ModuleContext};
use crate::position::Position;
use crate::price_feed::{PriceFeed, PriceFeedConfig, PriceUpdate};
use crate::types::{AccountId, Coin, PositionId, Timestamp};
use rust_decimal::Decimal;

pub struct Sandbox {
    pub keeper: Keeper,
    pub bank: MockBank,
    pub prices: PriceFeed,
    pub positions: MemPositionStore,
    pub hooks: RecordingHooks,
    pub interest: Box<dyn InterestAccrual>,
    pub events: EventCollector,
    pub block_time: Timestamp,
}

impl Sandbox {
    pub fn new(params: CdpParams) -> Result<Self, ConfigError> {
        Self::with_config(KeeperConfig::default(), params)
    }

    pub fn with_config(config: KeeperConfig, params: CdpParams) -> Result<Self, ConfigError> {
        Ok(Self {
            keeper: Keeper::new(config, params)?,
            bank: MockBank::new(),
            prices: PriceFeed::new(PriceFeedConfig::default()),
            positions: MemPositionStore::new(),
            hooks: RecordingHooks::new(),
            interest: Box::new(NoAccrual),
            events: EventCollector::new(),
            block_time: Timestamp::from_secs(0),
        })
    }

    pub fn with_interest(mut self, interest: impl InterestAccrual + 'static) -> Self {
        self.interest = Box::new(interest);
        self
    }

    /// The keeper plus a context borrowing every collaborator.
    pub fn split(&mut self) -> (&mut Keeper, ModuleContext<'_>) {
        (
            &mut self.keeper,
            ModuleContext {
                block_time: self.block_time,
                bank: &mut self.bank,
                prices: &self.prices,
                positions: &mut self.positions,
                hooks: &mut self.hooks,
                interest: self.interest.as_ref(),
                events: &mut self.events,
            },
        )
    }

    pub fn deposit(
        &mut self,
        owner: AccountId,
        depositor: AccountId,
        collateral: Coin,
        collateral_type: &str,
    ) -> Result<(), CdpError> {
        let (keeper, mut ctx) = self.split();
        keeper.deposit_collateral(&mut ctx, owner, depositor, collateral, collateral_type)
    }

    pub fn withdraw(
        &mut self,
        owner: AccountId,
        depositor: AccountId,
        collateral: Coin,
        collateral_type: &str,
    ) -> Result<(), CdpError> {
        let (keeper, mut ctx) = self.split();
        keeper.withdraw_collateral(&mut ctx, owner, depositor, collateral, collateral_type)
    }

    /// `amount` of the denom configured for `collateral_type`.
    pub fn collateral(&self, collateral_type: &str, amount: Decimal) -> Option<Coin> {
        let param = self.keeper.params().collateral_param(collateral_type)?;
        Coin::new(param.denom.as_str(), amount)
    }

    pub fn debt(&self, amount: Decimal) -> Option<Coin> {
        Coin::new(self.keeper.params().debt_param.denom.as_str(), amount)
    }

    /// Empty position with `principal` of debt already drawn.
    pub fn open_position(
        &mut self,
        owner: AccountId,
        collateral_type: &str,
        principal: Decimal,
    ) -> Result<PositionId, IndexError> {
        let params = self.keeper.params();
        let denom = params
            .collateral_param(collateral_type)
            .map(|cp| cp.denom.clone())
            .unwrap_or_default();
        let principal = Coin::new(params.debt_param.denom.as_str(), principal)
            .unwrap_or_else(|| Coin::zero(params.debt_param.denom.as_str()));
        self.positions
            .open_position(owner, collateral_type, &denom, principal, self.block_time)
    }

    pub fn position(&self, id: PositionId) -> Option<Position> {
        self.positions.get(id)
    }

    pub fn fund(&mut self, account: AccountId, coin: &Coin) {
        self.bank.fund(account, coin);
    }

    // posts from source 1 with a one day ttl
    pub fn set_price(&mut self, market_id: &str, price: Decimal) {
        self.prices.post_price(
            market_id,
            PriceUpdate::new(price, self.block_time, 1).with_ttl(86_400),
        );
    }

    pub fn advance_secs(&mut self, secs: i64) {
        self.block_time = Timestamp::from_millis(self.block_time.as_millis() + secs * 1000);
    }
}
