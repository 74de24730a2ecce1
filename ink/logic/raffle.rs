use crate::claim_authorization::{ClaimAuthorization, ClaimAuthorizationGate};
use crate::config::RaffleConfig;
use crate::error::{RaffleError, RaffleError::*};
use crate::escrow::{EscrowCustodian, PrizeAsset};
use crate::randomness::RandomnessGateway;
use crate::ticket_ledger::{TicketLedger, TicketRange};
use crate::{EcdsaSignature, RaffleId, RandomValue, RequestId, TicketIndex};
use ink::prelude::string::String;
use ink::storage::Mapping;
use openbrush::traits::{AccountId, Balance, Storage, Timestamp};

#[derive(Default, Debug, Eq, PartialEq, Copy, Clone, scale::Encode, scale::Decode)]
#[cfg_attr(
    feature = "std",
    derive(scale_info::TypeInfo, ink::storage::traits::StorageLayout)
)]
pub enum Status {
    #[default]
    Open,
    Drawing,
    AwaitingClaim,
    Settled,
    Void,
}

/// Operation attempted on a raffle, reported when the status does not allow it
#[derive(Debug, Eq, PartialEq, Copy, Clone, scale::Encode, scale::Decode)]
#[cfg_attr(feature = "std", derive(scale_info::TypeInfo))]
pub enum Transition {
    BuyTickets,
    RequestDraw,
    ClaimPrize,
    Void,
    WithdrawProceeds,
}

/// Display data, never interpreted
#[derive(Default, Debug, Eq, PartialEq, Clone, scale::Encode, scale::Decode)]
#[cfg_attr(
    feature = "std",
    derive(scale_info::TypeInfo, ink::storage::traits::StorageLayout)
)]
pub struct RaffleMetadata {
    pub name: String,
    pub description: String,
    pub image: String,
}

#[derive(Debug, Eq, PartialEq, Clone, scale::Encode, scale::Decode)]
#[cfg_attr(feature = "std", derive(scale_info::TypeInfo))]
pub struct RaffleParams {
    pub prize: PrizeAsset,
    pub metadata: RaffleMetadata,
    pub ticket_price: Balance,
    pub min_tickets: u32,
    pub max_tickets: u32,
    pub max_per_buyer: u32,
    /// sale window [start_time, end_time), in milliseconds
    pub start_time: Timestamp,
    pub end_time: Timestamp,
}

#[derive(Debug, Eq, PartialEq, Clone, scale::Encode, scale::Decode)]
#[cfg_attr(
    feature = "std",
    derive(scale_info::TypeInfo, ink::storage::traits::StorageLayout)
)]
pub struct Raffle {
    pub creator: AccountId,
    pub prize: PrizeAsset,
    pub metadata: RaffleMetadata,
    pub ticket_price: Balance,
    pub min_tickets: u32,
    pub max_tickets: u32,
    pub max_per_buyer: u32,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub require_claim_auth: bool,
    pub status: Status,
    pub winner: Option<AccountId>,
    pub randomness_request_id: Option<RequestId>,
    pub proceeds_withdrawn: bool,
}

/// Result of a successful randomness fulfillment
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub struct Fulfillment {
    pub raffle_id: RaffleId,
    pub ticket_index: TicketIndex,
    pub winner: AccountId,
    /// `Settled` when the prize has been released, `AwaitingClaim` otherwise
    pub status: Status,
}

#[derive(Default, Debug)]
#[openbrush::storage_item]
pub struct Data {
    last_raffle_id: RaffleId,
    raffles: Mapping<RaffleId, Raffle>,
}

fn check_params(params: &RaffleParams) -> Result<(), RaffleError> {
    if params.min_tickets == 0
        || params.max_tickets == 0
        || params.max_per_buyer == 0
        || params.min_tickets > params.max_tickets
        || params.start_time >= params.end_time
    {
        return Err(IncorrectRaffleParams);
    }
    Ok(())
}

pub trait NftRaffle:
    Storage<Data>
    + RaffleConfig
    + EscrowCustodian
    + TicketLedger
    + RandomnessGateway
    + ClaimAuthorizationGate
{
    /// Create the raffle and pull the prize into the custody
    fn create_raffle(
        &mut self,
        creator: AccountId,
        params: RaffleParams,
    ) -> Result<RaffleId, RaffleError> {
        check_params(&params)?;

        let raffle_id = self.get_next_raffle_id()?;

        // fails when the asset is paused, nothing is saved in this case
        self.take_custody(raffle_id, params.prize.clone(), creator)?;

        let raffle = Raffle {
            creator,
            prize: params.prize,
            metadata: params.metadata,
            ticket_price: params.ticket_price,
            min_tickets: params.min_tickets,
            max_tickets: params.max_tickets,
            max_per_buyer: params.max_per_buyer,
            start_time: params.start_time,
            end_time: params.end_time,
            require_claim_auth: false,
            status: Status::Open,
            winner: None,
            randomness_request_id: None,
            proceeds_withdrawn: false,
        };
        self.data::<Data>().raffles.insert(raffle_id, &raffle);
        self.data::<Data>().last_raffle_id = raffle_id;

        Ok(raffle_id)
    }

    fn buy_tickets(
        &mut self,
        raffle_id: RaffleId,
        buyer: AccountId,
        count: u32,
        now: Timestamp,
    ) -> Result<TicketRange, RaffleError> {
        let raffle = self.ensure_raffle(raffle_id)?;
        self.record_purchase(raffle_id, &raffle, buyer, count, now)
    }

    /// Only the creator, only before the draw
    fn set_require_claim_auth(
        &mut self,
        raffle_id: RaffleId,
        caller: AccountId,
        require_claim_auth: bool,
    ) -> Result<(), RaffleError> {
        let mut raffle = self.ensure_raffle(raffle_id)?;

        if raffle.creator != caller {
            return Err(Unauthorized);
        }

        if raffle.status != Status::Open {
            return Err(AlreadyDrawn);
        }

        raffle.require_claim_auth = require_claim_auth;
        self.data::<Data>().raffles.insert(raffle_id, &raffle);

        Ok(())
    }

    /// Close the sale and allocate the randomness request
    fn request_randomness(
        &mut self,
        raffle_id: RaffleId,
        now: Timestamp,
    ) -> Result<RequestId, RaffleError> {
        let mut raffle = self.ensure_raffle(raffle_id)?;

        if raffle.status != Status::Open {
            return Err(InvalidState(Transition::RequestDraw, raffle.status));
        }

        if now < raffle.end_time {
            return Err(SaleNotConcluded);
        }

        if self.get_sold_tickets(raffle_id) < raffle.min_tickets {
            return Err(QuorumNotMet);
        }

        let request_id = self.issue_randomness_request(raffle_id)?;

        raffle.status = Status::Drawing;
        raffle.randomness_request_id = Some(request_id);
        self.data::<Data>().raffles.insert(raffle_id, &raffle);

        Ok(request_id)
    }

    /// Select the winner. Without claim authorization, the prize is released
    /// in the same call; when the asset refuses it, the fulfillment fails and
    /// can be submitted again.
    fn fulfill_randomness(
        &mut self,
        request_id: RequestId,
        random_value: RandomValue,
        correlation: &[u8],
        caller: AccountId,
    ) -> Result<Fulfillment, RaffleError> {
        let raffle_id = self.check_fulfillment(request_id, caller, correlation)?;
        let mut raffle = self.ensure_raffle(raffle_id)?;

        if raffle.randomness_request_id != Some(request_id) {
            return Err(UnknownRequest);
        }

        if raffle.status != Status::Drawing {
            return Err(AlreadyFulfilled);
        }

        let (ticket_index, winner) = self.draw_ticket(raffle_id, &random_value)?;

        if raffle.require_claim_auth {
            raffle.status = Status::AwaitingClaim;
        } else {
            self.release_custody(raffle_id, winner)?;
            raffle.status = Status::Settled;
        }
        raffle.winner = Some(winner);
        self.data::<Data>().raffles.insert(raffle_id, &raffle);

        Ok(Fulfillment {
            raffle_id,
            ticket_index,
            winner,
            status: raffle.status,
        })
    }

    /// Release the prize to `recipient` with an authorization signed for the winner
    fn claim_prize(
        &mut self,
        raffle_id: RaffleId,
        recipient: AccountId,
        deadline: Timestamp,
        signature: EcdsaSignature,
        now: Timestamp,
    ) -> Result<(), RaffleError> {
        let mut raffle = self.ensure_raffle(raffle_id)?;

        let winner = raffle
            .winner
            .ok_or(InvalidState(Transition::ClaimPrize, raffle.status))?;

        let authorization = ClaimAuthorization {
            raffle_id,
            winner,
            recipient,
            deadline,
        };
        // a consumed authorization is reported as such, even once settled
        let digest = self.check_claim_authorization(&authorization, winner, &signature, now)?;

        if raffle.status != Status::AwaitingClaim {
            return Err(InvalidState(Transition::ClaimPrize, raffle.status));
        }

        // the authorization stays usable when the asset refuses the transfer
        self.release_custody(raffle_id, recipient)?;
        self.consume_claim_authorization(raffle_id, digest);

        raffle.status = Status::Settled;
        self.data::<Data>().raffles.insert(raffle_id, &raffle);

        Ok(())
    }

    /// Give the prize back to the creator when the quorum has not been met
    /// at the end of the sale. Tickets are not refunded here.
    fn void_raffle(
        &mut self,
        raffle_id: RaffleId,
        now: Timestamp,
    ) -> Result<AccountId, RaffleError> {
        let mut raffle = self.ensure_raffle(raffle_id)?;

        if raffle.status != Status::Open {
            return Err(InvalidState(Transition::Void, raffle.status));
        }

        if now < raffle.end_time {
            return Err(SaleNotConcluded);
        }

        if self.get_sold_tickets(raffle_id) >= raffle.min_tickets {
            return Err(QuorumMet);
        }

        self.release_custody(raffle_id, raffle.creator)?;

        raffle.status = Status::Void;
        self.data::<Data>().raffles.insert(raffle_id, &raffle);

        Ok(raffle.creator)
    }

    /// Pay the proceeds of a settled raffle: the net amount to the creator,
    /// the protocol fee to the fee recipient. Return (fee, net).
    fn withdraw_proceeds(
        &mut self,
        raffle_id: RaffleId,
        caller: AccountId,
    ) -> Result<(Balance, Balance), RaffleError> {
        let mut raffle = self.ensure_raffle(raffle_id)?;

        if raffle.creator != caller {
            return Err(Unauthorized);
        }

        if raffle.status != Status::Settled {
            return Err(InvalidState(Transition::WithdrawProceeds, raffle.status));
        }

        if raffle.proceeds_withdrawn {
            return Err(ProceedsAlreadyWithdrawn);
        }

        let config = self.ensure_config()?;
        let (fee, net) = self.compute_fee(self.get_proceeds(raffle_id))?;

        if net > 0 {
            self.pay_out(raffle.creator, net)?;
        }
        if fee > 0 {
            self.pay_out(config.fee_recipient, fee)?;
        }

        raffle.proceeds_withdrawn = true;
        self.data::<Data>().raffles.insert(raffle_id, &raffle);

        Ok((fee, net))
    }

    fn ensure_raffle(&self, raffle_id: RaffleId) -> Result<Raffle, RaffleError> {
        self.data::<Data>()
            .raffles
            .get(raffle_id)
            .ok_or(UnknownRaffle)
    }

    fn get_raffle(&self, raffle_id: RaffleId) -> Option<Raffle> {
        self.data::<Data>().raffles.get(raffle_id)
    }

    fn get_status(&self, raffle_id: RaffleId) -> Option<Status> {
        self.get_raffle(raffle_id).map(|raffle| raffle.status)
    }

    fn get_winner(&self, raffle_id: RaffleId) -> Option<AccountId> {
        self.get_raffle(raffle_id).and_then(|raffle| raffle.winner)
    }

    fn is_claim_auth_required(&self, raffle_id: RaffleId) -> Option<bool> {
        self.get_raffle(raffle_id)
            .map(|raffle| raffle.require_claim_auth)
    }

    /// id given to the next created raffle
    fn get_next_raffle_id(&self) -> Result<RaffleId, RaffleError> {
        self.data::<Data>()
            .last_raffle_id
            .checked_add(1)
            .ok_or(AddOverFlow)
    }
}
