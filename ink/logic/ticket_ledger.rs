use crate::error::{RaffleError, RaffleError::*};
use crate::raffle::{Raffle, Status, Transition};
use crate::winner::winning_index;
use crate::{RaffleId, RandomValue, TicketIndex};
use ink::storage::Mapping;
use openbrush::traits::{AccountId, Balance, Storage, Timestamp};

/// The settlement currency
pub trait PaymentCollector {
    /// pull `amount` from `from` through its allowance
    fn collect_payment(&mut self, from: AccountId, amount: Balance) -> Result<(), RaffleError>;

    /// push `amount` held by the contract to `to`
    fn pay_out(&mut self, to: AccountId, amount: Balance) -> Result<(), RaffleError>;
}

/// Tickets assigned by one purchase: `first .. first + count`
#[derive(Debug, Eq, PartialEq, Copy, Clone, scale::Encode, scale::Decode)]
#[cfg_attr(feature = "std", derive(scale_info::TypeInfo))]
pub struct TicketRange {
    pub first: TicketIndex,
    pub count: u32,
}

#[derive(Default, Debug)]
#[openbrush::storage_item]
pub struct Data {
    sold: Mapping<RaffleId, TicketIndex>,
    owners: Mapping<(RaffleId, TicketIndex), AccountId>,
    per_buyer: Mapping<(RaffleId, AccountId), u32>,
    proceeds: Mapping<RaffleId, Balance>,
}

pub trait TicketLedger: Storage<Data> + PaymentCollector {
    /// Charge the buyer and append `count` tickets to the raffle
    fn record_purchase(
        &mut self,
        raffle_id: RaffleId,
        raffle: &Raffle,
        buyer: AccountId,
        count: u32,
        now: Timestamp,
    ) -> Result<TicketRange, RaffleError> {
        if raffle.status != Status::Open {
            return Err(InvalidState(Transition::BuyTickets, raffle.status));
        }

        if now < raffle.start_time || now >= raffle.end_time {
            return Err(OutsideSaleWindow);
        }

        if count == 0 {
            return Err(IncorrectTicketCount);
        }

        let sold = self.get_sold_tickets(raffle_id);
        let new_sold = sold.checked_add(count).ok_or(CapacityExceeded)?;
        if new_sold > raffle.max_tickets {
            return Err(CapacityExceeded);
        }

        let bought = self.get_tickets_of(raffle_id, buyer);
        let new_bought = bought.checked_add(count).ok_or(CapacityExceeded)?;
        if new_bought > raffle.max_per_buyer {
            return Err(CapacityExceeded);
        }

        let cost = raffle
            .ticket_price
            .checked_mul(count as Balance)
            .ok_or(MulOverFlow)?;
        let proceeds = self
            .get_proceeds(raffle_id)
            .checked_add(cost)
            .ok_or(AddOverFlow)?;

        // the payment is the last step which can fail
        if cost > 0 {
            self.collect_payment(buyer, cost)?;
        }

        for index in sold..new_sold {
            self.data::<Data>().owners.insert((raffle_id, index), &buyer);
        }
        self.data::<Data>().sold.insert(raffle_id, &new_sold);
        self.data::<Data>()
            .per_buyer
            .insert((raffle_id, buyer), &new_bought);
        self.data::<Data>().proceeds.insert(raffle_id, &proceeds);

        Ok(TicketRange { first: sold, count })
    }

    /// Select the winning ticket and its owner
    fn draw_ticket(
        &self,
        raffle_id: RaffleId,
        random_value: &RandomValue,
    ) -> Result<(TicketIndex, AccountId), RaffleError> {
        let index = winning_index(random_value, self.get_sold_tickets(raffle_id))?;
        let owner = self.get_ticket_owner(raffle_id, index).ok_or(UnknownRaffle)?;
        Ok((index, owner))
    }

    fn get_sold_tickets(&self, raffle_id: RaffleId) -> TicketIndex {
        self.data::<Data>().sold.get(raffle_id).unwrap_or_default()
    }

    fn get_ticket_owner(&self, raffle_id: RaffleId, index: TicketIndex) -> Option<AccountId> {
        self.data::<Data>().owners.get((raffle_id, index))
    }

    fn get_tickets_of(&self, raffle_id: RaffleId, buyer: AccountId) -> u32 {
        self.data::<Data>()
            .per_buyer
            .get((raffle_id, buyer))
            .unwrap_or_default()
    }

    /// gross amount paid for the tickets
    fn get_proceeds(&self, raffle_id: RaffleId) -> Balance {
        self.data::<Data>()
            .proceeds
            .get(raffle_id)
            .unwrap_or_default()
    }
}
