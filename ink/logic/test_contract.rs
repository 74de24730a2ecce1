use crate::escrow::PrizeAsset;
use crate::raffle::{Raffle, RaffleMetadata, RaffleParams, Status};
use crate::{EcdsaAddress, EcdsaSignature, Hash};
use openbrush::contracts::psp34::Id;
use openbrush::traits::{AccountId, Balance};

pub const TICKET_PRICE: Balance = 10_000_000;
pub const CLAIM_SIGNER_KEY: [u8; 32] = [0x11; 32];
pub const OTHER_KEY: [u8; 32] = [0x22; 32];
/// genesis hash of the test chain
pub const CHAIN_ID: Hash = [0x01; 32];

#[openbrush::contract]
pub mod raffle_contract {
    use crate::error::{RaffleError, RaffleError::*};
    use crate::escrow::{AssetCustodian, EscrowCustodian, PrizeAsset};
    use crate::raffle::NftRaffle;
    use crate::ticket_ledger::{PaymentCollector, TicketLedger};
    use crate::{claim_authorization, claim_authorization::*};
    use crate::{config, config::*};
    use crate::{escrow, raffle, randomness, randomness::*, ticket_ledger};
    use ink::storage::Mapping;
    use openbrush::traits::Storage;

    #[ink(storage)]
    #[derive(Default, Storage)]
    pub struct Contract {
        #[storage_field]
        config: config::Data,
        #[storage_field]
        escrow: escrow::Data,
        #[storage_field]
        tickets: ticket_ledger::Data,
        #[storage_field]
        randomness: randomness::Data,
        #[storage_field]
        claim_authorization: claim_authorization::Data,
        #[storage_field]
        raffle: raffle::Data,
        // pausable prize
        asset_owners: Mapping<PrizeAsset, AccountId>,
        asset_paused: bool,
        // settlement currency
        balances: Mapping<AccountId, Balance>,
        allowances: Mapping<AccountId, Balance>,
    }

    impl RaffleConfig for Contract {}
    impl RandomnessGateway for Contract {}
    impl ClaimAuthorizationGate for Contract {}
    impl EscrowCustodian for Contract {}
    impl TicketLedger for Contract {}
    impl NftRaffle for Contract {}

    impl Contract {
        #[ink(constructor)]
        pub fn new() -> Self {
            // the contract gets its own account, distinct from alice
            ink::env::test::set_callee::<ink::env::DefaultEnvironment>(AccountId::from(
                [0xC0; 32],
            ));
            let mut instance = Self::default();
            instance.init_claim_domain(ClaimDomain {
                chain_id: super::CHAIN_ID,
                verifying_contract: Self::env().account_id(),
            });
            instance
        }

        #[ink(message)]
        pub fn get_prize_owner(&self, asset: PrizeAsset) -> Option<AccountId> {
            self.asset_owners.get(asset)
        }

        #[ink(message)]
        pub fn get_balance(&self, account: AccountId) -> Balance {
            self.balances.get(account).unwrap_or_default()
        }
    }

    // test helpers to set up the fakes
    impl Contract {
        pub fn mint_prize(&mut self, asset: PrizeAsset, owner: AccountId) {
            self.asset_owners.insert(asset, &owner);
        }

        pub fn set_prize_paused(&mut self, paused: bool) {
            self.asset_paused = paused;
        }

        pub fn fund(&mut self, account: AccountId, amount: Balance) {
            self.balances.insert(account, &amount);
        }

        /// allowance given by `owner` to this contract
        pub fn approve(&mut self, owner: AccountId, amount: Balance) {
            self.allowances.insert(owner, &amount);
        }

        fn transfer_asset(
            &mut self,
            asset: &PrizeAsset,
            from: AccountId,
            to: AccountId,
        ) -> Result<(), RaffleError> {
            if self.asset_paused || self.asset_owners.get(asset) != Some(from) {
                return Err(TransferBlocked);
            }
            self.asset_owners.insert(asset, &to);
            Ok(())
        }

        fn transfer_balance(
            &mut self,
            from: AccountId,
            to: AccountId,
            amount: Balance,
        ) -> Result<(), RaffleError> {
            let from_balance = self.get_balance(from);
            if from_balance < amount {
                return Err(InsufficientBalance);
            }
            self.balances.insert(from, &(from_balance - amount));
            let to_balance = self.get_balance(to);
            self.balances.insert(to, &(to_balance + amount));
            Ok(())
        }
    }

    impl AssetCustodian for Contract {
        fn escrow(&mut self, asset: &PrizeAsset, from: AccountId) -> Result<(), RaffleError> {
            let custodian = self.env().account_id();
            self.transfer_asset(asset, from, custodian)
        }

        fn release(&mut self, asset: &PrizeAsset, to: AccountId) -> Result<(), RaffleError> {
            let custodian = self.env().account_id();
            self.transfer_asset(asset, custodian, to)
        }

        fn is_transferable(&self, _asset: &PrizeAsset) -> bool {
            !self.asset_paused
        }
    }

    impl PaymentCollector for Contract {
        fn collect_payment(&mut self, from: AccountId, amount: Balance) -> Result<(), RaffleError> {
            let allowance = self.allowances.get(from).unwrap_or_default();
            if allowance < amount {
                return Err(InsufficientAllowance);
            }
            let custodian = self.env().account_id();
            self.transfer_balance(from, custodian, amount)?;
            self.allowances.insert(from, &(allowance - amount));
            Ok(())
        }

        fn pay_out(&mut self, to: AccountId, amount: Balance) -> Result<(), RaffleError> {
            let custodian = self.env().account_id();
            self.transfer_balance(custodian, to, amount)
        }
    }
}

pub fn prize(token: u8) -> PrizeAsset {
    PrizeAsset {
        contract: AccountId::from([0x42; 32]),
        token_id: Id::U8(token),
    }
}

/// sale window [100, 200), 1 to 10 tickets, 3 per buyer
pub fn sample_params(token: u8) -> RaffleParams {
    RaffleParams {
        prize: prize(token),
        metadata: RaffleMetadata {
            name: "Lucky punk".into(),
            description: "One punk to win".into(),
            image: "ipfs://punk".into(),
        },
        ticket_price: TICKET_PRICE,
        min_tickets: 1,
        max_tickets: 10,
        max_per_buyer: 3,
        start_time: 100,
        end_time: 200,
    }
}

pub fn sample_raffle(creator: AccountId) -> Raffle {
    let params = sample_params(1);
    Raffle {
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
    }
}

/// Recoverable signature of the digest, as produced by the off-chain signer
pub fn sign(secret_key: &[u8; 32], digest: &Hash) -> EcdsaSignature {
    let secret_key = libsecp256k1::SecretKey::parse(secret_key).expect("Fail to parse the key");
    let (signature, recovery_id) =
        libsecp256k1::sign(&libsecp256k1::Message::parse(digest), &secret_key);

    let mut result = [0u8; 65];
    result[..64].copy_from_slice(&signature.serialize());
    result[64] = recovery_id.serialize() + 27;
    result
}

pub fn signer_address(secret_key: &[u8; 32]) -> EcdsaAddress {
    let secret_key = libsecp256k1::SecretKey::parse(secret_key).expect("Fail to parse the key");
    let public_key = libsecp256k1::PublicKey::from_secret_key(&secret_key).serialize_compressed();

    let mut address = [0u8; 20];
    ink::env::ecdsa_to_eth_address(&public_key, &mut address)
        .expect("Fail to compute the address");
    address
}
