use crate::error::{RaffleError, RaffleError::*};
use crate::RaffleId;
use ink::storage::Mapping;
use openbrush::contracts::psp34::Id;
use openbrush::traits::{AccountId, Storage};

/// Reference to the non-fungible prize: the PSP34 contract and the token id
#[derive(Debug, Eq, PartialEq, Clone, scale::Encode, scale::Decode)]
#[cfg_attr(
    feature = "std",
    derive(scale_info::TypeInfo, ink::storage::traits::StorageLayout)
)]
pub struct PrizeAsset {
    pub contract: AccountId,
    pub token_id: Id,
}

#[derive(Debug, Eq, PartialEq, Clone, scale::Encode, scale::Decode)]
#[cfg_attr(
    feature = "std",
    derive(scale_info::TypeInfo, ink::storage::traits::StorageLayout)
)]
pub struct Custody {
    pub asset: PrizeAsset,
    pub depositor: AccountId,
    /// set when the asset leaves the custody
    pub released_to: Option<AccountId>,
}

/// The external asset. Its issuer owns the transfer policy (ex: pause),
/// so every call may fail and nothing checked before holds at call time.
pub trait AssetCustodian {
    /// pull the asset from `from` into the custody
    fn escrow(&mut self, asset: &PrizeAsset, from: AccountId) -> Result<(), RaffleError>;

    /// push the asset from the custody to `to`
    fn release(&mut self, asset: &PrizeAsset, to: AccountId) -> Result<(), RaffleError>;

    /// advisory only
    fn is_transferable(&self, asset: &PrizeAsset) -> bool;
}

#[derive(Default, Debug)]
#[openbrush::storage_item]
pub struct Data {
    custody: Mapping<RaffleId, Custody>,
}

pub trait EscrowCustodian: Storage<Data> + AssetCustodian {
    /// Pull the prize into the custody for the given raffle
    fn take_custody(
        &mut self,
        raffle_id: RaffleId,
        asset: PrizeAsset,
        from: AccountId,
    ) -> Result<(), RaffleError> {
        // one custody per raffle
        if self.data::<Data>().custody.contains(raffle_id) {
            return Err(CustodyAlreadyTaken);
        }

        // the asset can refuse the transfer
        self.escrow(&asset, from)?;

        let custody = Custody {
            asset,
            depositor: from,
            released_to: None,
        };
        self.data::<Data>().custody.insert(raffle_id, &custody);

        Ok(())
    }

    /// Transfer the prize held for the given raffle. Exactly once per raffle.
    fn release_custody(&mut self, raffle_id: RaffleId, to: AccountId) -> Result<(), RaffleError> {
        let mut custody = self
            .data::<Data>()
            .custody
            .get(raffle_id)
            .ok_or(NoCustody)?;

        if custody.released_to.is_some() {
            return Err(AlreadyReleased);
        }

        // retryable: nothing is written when the asset refuses the transfer
        self.release(&custody.asset, to)?;

        custody.released_to = Some(to);
        self.data::<Data>().custody.insert(raffle_id, &custody);

        Ok(())
    }

    fn get_custody(&self, raffle_id: RaffleId) -> Option<Custody> {
        self.data::<Data>().custody.get(raffle_id)
    }

    fn is_prize_transferable(&self, raffle_id: RaffleId) -> bool {
        match self.data::<Data>().custody.get(raffle_id) {
            Some(custody) if custody.released_to.is_none() => self.is_transferable(&custody.asset),
            _ => false,
        }
    }
}
