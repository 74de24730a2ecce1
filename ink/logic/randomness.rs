use crate::error::RaffleError;
use crate::error::RaffleError::*;
use crate::{RaffleId, RequestId};
use ink::prelude::vec::Vec;
use ink::storage::Mapping;
use openbrush::traits::{AccountId, Storage};
use scale::{Decode, DecodeAll, Encode};

/// Message queued for the off-chain VRF worker
#[derive(Eq, PartialEq, Clone, Debug, Encode, Decode)]
#[cfg_attr(feature = "std", derive(scale_info::TypeInfo))]
pub struct RandomnessRequestMessage {
    pub request_id: RequestId,
    pub raffle_id: RaffleId,
    /// returned as is in the response
    pub correlation: Vec<u8>,
}

/// Reply sent by the off-chain VRF worker
#[derive(Eq, PartialEq, Clone, Debug, Encode, Decode)]
#[cfg_attr(feature = "std", derive(scale_info::TypeInfo))]
pub enum RandomnessResponseMessage {
    /// request id, random value, correlation data
    Fulfilled(RequestId, crate::RandomValue, Vec<u8>),
}

#[derive(Default, Debug)]
#[openbrush::storage_item]
pub struct Data {
    operator: Option<AccountId>,
    last_request_id: RequestId,
    requests: Mapping<RequestId, RaffleId>,
}

/// correlation data binding a request to its raffle
pub fn correlation_of(raffle_id: RaffleId) -> Vec<u8> {
    raffle_id.encode()
}

#[openbrush::trait_definition]
pub trait RandomnessGateway: Storage<Data> {
    fn set_randomness_operator(&mut self, operator: AccountId) -> Result<(), RaffleError> {
        self.data::<Data>().operator = Some(operator);
        Ok(())
    }

    #[ink(message)]
    fn get_randomness_operator(&self) -> Option<AccountId> {
        self.data::<Data>().operator
    }

    /// Allocate a fresh request id for the raffle
    fn issue_randomness_request(&mut self, raffle_id: RaffleId) -> Result<RequestId, RaffleError> {
        let request_id = self
            .data::<Data>()
            .last_request_id
            .checked_add(1)
            .ok_or(AddOverFlow)?;

        self.data::<Data>().last_request_id = request_id;
        self.data::<Data>().requests.insert(request_id, &raffle_id);

        Ok(request_id)
    }

    /// Check the fulfillment comes from the operator and targets a known request.
    /// Return the raffle correlated with the request.
    /// Nobody can fulfill while the operator is not set.
    fn check_fulfillment(
        &self,
        request_id: RequestId,
        caller: AccountId,
        correlation: &[u8],
    ) -> Result<RaffleId, RaffleError> {
        if self.data::<Data>().operator != Some(caller) {
            return Err(Unauthorized);
        }

        let raffle_id = self
            .data::<Data>()
            .requests
            .get(request_id)
            .ok_or(UnknownRequest)?;

        let correlated = RaffleId::decode_all(&mut &correlation[..]).map_err(|_| UnknownRequest)?;
        if correlated != raffle_id {
            return Err(UnknownRequest);
        }

        Ok(raffle_id)
    }

    #[ink(message)]
    fn get_request_raffle(&self, request_id: RequestId) -> Option<RaffleId> {
        self.data::<Data>().requests.get(request_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_contract::raffle_contract::Contract;

    #[ink::test]
    fn test_issue_requests() {
        let mut contract = Contract::new();

        assert_eq!(contract.get_request_raffle(1), None);

        assert_eq!(contract.issue_randomness_request(7), Ok(1));
        assert_eq!(contract.issue_randomness_request(3), Ok(2));

        assert_eq!(contract.get_request_raffle(1), Some(7));
        assert_eq!(contract.get_request_raffle(2), Some(3));
        assert_eq!(contract.get_request_raffle(3), None);
    }

    #[ink::test]
    fn test_check_fulfillment_operator() {
        let accounts = ink::env::test::default_accounts::<ink::env::DefaultEnvironment>();
        let mut contract = Contract::new();

        let request_id = contract
            .issue_randomness_request(7)
            .expect("Fail to issue the request");

        // no operator configured
        assert_eq!(contract.get_randomness_operator(), None);
        assert_eq!(
            contract.check_fulfillment(request_id, accounts.eve, &correlation_of(7)),
            Err(Unauthorized)
        );
        assert_eq!(
            contract.check_fulfillment(request_id, accounts.django, &correlation_of(7)),
            Err(Unauthorized)
        );

        contract
            .set_randomness_operator(accounts.django)
            .expect("Fail to set the operator");
        assert_eq!(contract.get_randomness_operator(), Some(accounts.django));

        assert_eq!(
            contract.check_fulfillment(request_id, accounts.eve, &correlation_of(7)),
            Err(Unauthorized)
        );
        assert_eq!(
            contract.check_fulfillment(request_id, accounts.django, &correlation_of(7)),
            Ok(7)
        );
    }

    #[ink::test]
    fn test_check_fulfillment_unknown_request() {
        let accounts = ink::env::test::default_accounts::<ink::env::DefaultEnvironment>();
        let mut contract = Contract::new();
        contract
            .set_randomness_operator(accounts.django)
            .expect("Fail to set the operator");

        let request_id = contract
            .issue_randomness_request(7)
            .expect("Fail to issue the request");

        // unknown id
        assert_eq!(
            contract.check_fulfillment(request_id + 1, accounts.django, &correlation_of(7)),
            Err(UnknownRequest)
        );
        // correlation for another raffle
        assert_eq!(
            contract.check_fulfillment(request_id, accounts.django, &correlation_of(8)),
            Err(UnknownRequest)
        );
        // correlation not decodable
        assert_eq!(
            contract.check_fulfillment(request_id, accounts.django, &[1, 2]),
            Err(UnknownRequest)
        );
        assert_eq!(
            contract.check_fulfillment(request_id, accounts.django, &[]),
            Err(UnknownRequest)
        );
    }
}
