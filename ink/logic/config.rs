use crate::error::RaffleError;
use crate::error::RaffleError::*;
use openbrush::traits::{AccountId, Balance, Storage};

pub const MAX_FEE_BPS: u16 = 10_000;

#[derive(Default, Debug)]
#[openbrush::storage_item]
pub struct Data {
    config: Option<Config>,
}

#[derive(Debug, Eq, PartialEq, Copy, Clone, scale::Encode, scale::Decode)]
#[cfg_attr(
    feature = "std",
    derive(scale_info::TypeInfo, ink::storage::traits::StorageLayout)
)]
pub struct Config {
    /// protocol fee taken on the proceeds, in basis points
    pub fee_bps: u16,
    pub fee_recipient: AccountId,
}

#[openbrush::trait_definition]
pub trait RaffleConfig: Storage<Data> {
    fn set_config(&mut self, config: Config) -> Result<(), RaffleError> {
        // check the config
        if config.fee_bps > MAX_FEE_BPS {
            return Err(IncorrectConfig);
        }

        self.data::<Data>().config = Some(config);
        Ok(())
    }

    #[ink(message)]
    fn get_config(&self) -> Option<Config> {
        self.data::<Data>().config
    }

    /// return the config and fail when the config is missing
    fn ensure_config(&self) -> Result<Config, RaffleError> {
        match self.data::<Data>().config {
            None => Err(ConfigNotSet),
            Some(config) => Ok(config),
        }
    }

    /// split the gross amount between the protocol fee and the net amount
    fn compute_fee(&self, gross: Balance) -> Result<(Balance, Balance), RaffleError> {
        let config = self.ensure_config()?;

        let fee = gross
            .checked_mul(config.fee_bps as Balance)
            .ok_or(MulOverFlow)?
            .checked_div(MAX_FEE_BPS as Balance)
            .ok_or(DivByZero)?;
        let net = gross.checked_sub(fee).ok_or(SubOverFlow)?;

        Ok((fee, net))
    }
}
