#![cfg_attr(not(feature = "std"), no_std, no_main)]

#[openbrush::implementation(Ownable, AccessControl)]
#[openbrush::contract]
pub mod nft_raffle_contract {
    use ink::codegen::{EmitEvent, Env};
    use ink::env::call::{build_call, ExecutionInput, Selector};
    use ink::env::DefaultEnvironment;
    use ink::prelude::string::String;
    use ink::prelude::vec::Vec;
    use nft_raffle::{
        claim_authorization, claim_authorization::*, config, config::*, error::*, escrow,
        escrow::*, raffle, raffle::*, randomness, randomness::*, ticket_ledger,
        ticket_ledger::*, EcdsaAddress, EcdsaSignature, RaffleId, RandomValue, RequestId,
        TicketIndex,
    };
    use openbrush::contracts::access_control::*;
    use openbrush::contracts::ownable::*;
    use openbrush::contracts::psp22::{PSP22Error, PSP22Ref};
    use openbrush::contracts::psp34::{Id, PSP34Error, PSP34Ref};
    use openbrush::{modifiers, traits::Storage};
    use phat_rollup_anchor_ink::traits::{rollup_anchor, rollup_anchor::*};

    /// Event emitted when a raffle is created and its prize escrowed
    #[ink(event)]
    pub struct RaffleCreated {
        #[ink(topic)]
        raffle_id: RaffleId,
        #[ink(topic)]
        creator: AccountId,
        prize: PrizeAsset,
    }

    /// Event emitted when tickets are bought
    #[ink(event)]
    pub struct TicketsPurchased {
        #[ink(topic)]
        raffle_id: RaffleId,
        #[ink(topic)]
        buyer: AccountId,
        first: TicketIndex,
        count: u32,
    }

    #[ink(event)]
    pub struct ClaimRequirementUpdated {
        #[ink(topic)]
        raffle_id: RaffleId,
        require_claim_auth: bool,
    }

    /// Event emitted when the draw is requested to the VRF worker
    #[ink(event)]
    pub struct RandomnessRequested {
        #[ink(topic)]
        raffle_id: RaffleId,
        #[ink(topic)]
        request_id: RequestId,
    }

    #[ink(event)]
    pub struct WinnerSelected {
        #[ink(topic)]
        raffle_id: RaffleId,
        #[ink(topic)]
        winner: AccountId,
        ticket_index: TicketIndex,
        random_value: RandomValue,
    }

    /// Event emitted when the prize leaves the custody
    #[ink(event)]
    pub struct PrizeReleased {
        #[ink(topic)]
        raffle_id: RaffleId,
        #[ink(topic)]
        to: AccountId,
    }

    #[ink(event)]
    pub struct RaffleVoided {
        #[ink(topic)]
        raffle_id: RaffleId,
    }

    #[ink(event)]
    pub struct ProceedsWithdrawn {
        #[ink(topic)]
        raffle_id: RaffleId,
        #[ink(topic)]
        creator: AccountId,
        net: Balance,
        fee: Balance,
    }

    /// Errors occurred in the contract
    #[derive(Debug, Eq, PartialEq, scale::Encode, scale::Decode)]
    #[cfg_attr(feature = "std", derive(scale_info::TypeInfo))]
    pub enum ContractError {
        AccessControlError(AccessControlError),
        RaffleError(RaffleError),
        RollupAnchorError(RollupAnchorError),
    }

    /// convertor from AccessControlError to ContractError
    impl From<AccessControlError> for ContractError {
        fn from(error: AccessControlError) -> Self {
            ContractError::AccessControlError(error)
        }
    }

    /// convertor from RaffleError to ContractError
    impl From<RaffleError> for ContractError {
        fn from(error: RaffleError) -> Self {
            ContractError::RaffleError(error)
        }
    }

    /// convertor from RollupAnchorError to ContractError
    impl From<RollupAnchorError> for ContractError {
        fn from(error: RollupAnchorError) -> Self {
            ContractError::RollupAnchorError(error)
        }
    }

    /// convertor from ContractError to RollupAnchorError
    impl From<ContractError> for RollupAnchorError {
        fn from(error: ContractError) -> Self {
            ink::env::debug_println!("Error: {:?}", error);
            RollupAnchorError::UnsupportedAction
        }
    }

    /// the prize contract refused the transfer (paused, not approved, ...)
    fn from_psp34_error(error: PSP34Error) -> RaffleError {
        ink::env::debug_println!("PSP34 error: {:?}", error);
        RaffleError::TransferBlocked
    }

    fn from_psp22_error(error: PSP22Error) -> RaffleError {
        match error {
            PSP22Error::InsufficientAllowance => RaffleError::InsufficientAllowance,
            PSP22Error::InsufficientBalance => RaffleError::InsufficientBalance,
            _ => {
                ink::env::debug_println!("PSP22 error: {:?}", error);
                RaffleError::PaymentFailed
            }
        }
    }

    /// keep a trace of the failures which can be a misuse
    fn audit<T>(operation: &str, result: Result<T, RaffleError>) -> Result<T, RaffleError> {
        if let Err(
            error @ (RaffleError::InvalidSignature
            | RaffleError::WrongWinner
            | RaffleError::UnknownRequest
            | RaffleError::ClaimSignerNotSet),
        ) = &result
        {
            ink::env::debug_println!("{} rejected: {:?}", operation, error);
        }
        result
    }

    // Contract storage
    #[ink(storage)]
    #[derive(Default, Storage)]
    pub struct Contract {
        #[storage_field]
        ownable: ownable::Data,
        #[storage_field]
        access: access_control::Data,
        #[storage_field]
        rollup_anchor: rollup_anchor::Data,
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
        /// PSP22 used to pay the tickets
        payment_token: Option<AccountId>,
    }

    impl RaffleConfig for Contract {}
    impl RandomnessGateway for Contract {}
    impl ClaimAuthorizationGate for Contract {}
    impl EscrowCustodian for Contract {}
    impl TicketLedger for Contract {}
    impl NftRaffle for Contract {}

    impl RollupAnchor for Contract {}

    impl Contract {
        #[ink(constructor)]
        pub fn new(
            payment_token: AccountId,
            fee_recipient: AccountId,
            fee_bps: u16,
            randomness_operator: AccountId,
            chain_id: [u8; 32],
        ) -> Result<Self, ContractError> {
            let mut instance = Self::default();
            let caller = instance.env().caller();
            // set the owner of this contract
            ownable::Internal::_init_with_owner(&mut instance, caller);
            // set the admin of this contract
            access_control::Internal::_init_with_admin(&mut instance, Some(caller));

            instance.payment_token = Some(payment_token);
            RaffleConfig::set_config(
                &mut instance,
                Config {
                    fee_bps,
                    fee_recipient,
                },
            )?;
            RandomnessGateway::set_randomness_operator(&mut instance, randomness_operator)?;
            // the claim authorizations are signed for this chain and this contract only
            let verifying_contract = instance.env().account_id();
            ClaimAuthorizationGate::init_claim_domain(
                &mut instance,
                ClaimDomain {
                    chain_id,
                    verifying_contract,
                },
            );

            Ok(instance)
        }

        #[ink(message)]
        #[openbrush::modifiers(only_role(DEFAULT_ADMIN_ROLE))]
        pub fn set_config(&mut self, config: Config) -> Result<(), ContractError> {
            RaffleConfig::set_config(self, config)?;
            Ok(())
        }

        #[ink(message)]
        #[openbrush::modifiers(only_role(DEFAULT_ADMIN_ROLE))]
        pub fn set_claim_signer(
            &mut self,
            signer: Option<EcdsaAddress>,
        ) -> Result<(), ContractError> {
            ClaimAuthorizationGate::set_claim_signer(self, signer)?;
            Ok(())
        }

        #[ink(message)]
        #[openbrush::modifiers(only_role(DEFAULT_ADMIN_ROLE))]
        pub fn set_randomness_operator(
            &mut self,
            operator: AccountId,
        ) -> Result<(), ContractError> {
            RandomnessGateway::set_randomness_operator(self, operator)?;
            Ok(())
        }

        /// The creator must have approved this contract on the prize token
        #[ink(message)]
        #[allow(clippy::too_many_arguments)]
        pub fn create_raffle(
            &mut self,
            prize_contract: AccountId,
            token_id: Id,
            name: String,
            description: String,
            image: String,
            ticket_price: Balance,
            min_tickets: u32,
            max_tickets: u32,
            max_per_buyer: u32,
            start_time: Timestamp,
            end_time: Timestamp,
        ) -> Result<RaffleId, ContractError> {
            let creator = self.env().caller();
            let prize = PrizeAsset {
                contract: prize_contract,
                token_id,
            };
            let params = RaffleParams {
                prize: prize.clone(),
                metadata: RaffleMetadata {
                    name,
                    description,
                    image,
                },
                ticket_price,
                min_tickets,
                max_tickets,
                max_per_buyer,
                start_time,
                end_time,
            };

            let raffle_id = NftRaffle::create_raffle(self, creator, params)?;

            // emmit the event
            self.env().emit_event(RaffleCreated {
                raffle_id,
                creator,
                prize,
            });

            Ok(raffle_id)
        }

        /// The buyer must have approved this contract on the payment token
        #[ink(message)]
        pub fn buy_tickets(
            &mut self,
            raffle_id: RaffleId,
            count: u32,
        ) -> Result<TicketRange, ContractError> {
            let buyer = self.env().caller();
            let now = self.env().block_timestamp();

            let range = NftRaffle::buy_tickets(self, raffle_id, buyer, count, now)?;

            // emmit the event
            self.env().emit_event(TicketsPurchased {
                raffle_id,
                buyer,
                first: range.first,
                count: range.count,
            });

            Ok(range)
        }

        #[ink(message)]
        pub fn set_require_claim_auth(
            &mut self,
            raffle_id: RaffleId,
            require_claim_auth: bool,
        ) -> Result<(), ContractError> {
            let caller = self.env().caller();
            NftRaffle::set_require_claim_auth(self, raffle_id, caller, require_claim_auth)?;

            self.env().emit_event(ClaimRequirementUpdated {
                raffle_id,
                require_claim_auth,
            });

            Ok(())
        }

        /// Permissionless: anyone can close the sale once the window has elapsed
        #[ink(message)]
        pub fn request_draw(&mut self, raffle_id: RaffleId) -> Result<RequestId, ContractError> {
            let now = self.env().block_timestamp();
            let request_id = NftRaffle::request_randomness(self, raffle_id, now)?;

            // emmit the event
            self.env().emit_event(RandomnessRequested {
                raffle_id,
                request_id,
            });

            // request the random value to the offchain worker
            let message = RandomnessRequestMessage {
                request_id,
                raffle_id,
                correlation: correlation_of(raffle_id),
            };
            RollupAnchor::push_message(self, &message)?;

            Ok(request_id)
        }

        /// Callback for the randomness operator
        #[ink(message)]
        pub fn fulfill_randomness(
            &mut self,
            request_id: RequestId,
            random_value: RandomValue,
            correlation: Vec<u8>,
        ) -> Result<(), ContractError> {
            let caller = self.env().caller();
            self.inner_fulfill_randomness(request_id, random_value, correlation, caller)
        }

        fn inner_fulfill_randomness(
            &mut self,
            request_id: RequestId,
            random_value: RandomValue,
            correlation: Vec<u8>,
            caller: AccountId,
        ) -> Result<(), ContractError> {
            let fulfillment = audit(
                "fulfill_randomness",
                NftRaffle::fulfill_randomness(self, request_id, random_value, &correlation, caller),
            )?;

            // emmit the events
            self.env().emit_event(WinnerSelected {
                raffle_id: fulfillment.raffle_id,
                winner: fulfillment.winner,
                ticket_index: fulfillment.ticket_index,
                random_value,
            });
            if fulfillment.status == Status::Settled {
                self.env().emit_event(PrizeReleased {
                    raffle_id: fulfillment.raffle_id,
                    to: fulfillment.winner,
                });
            }

            Ok(())
        }

        /// Anyone can submit the claim on behalf of the winner
        #[ink(message)]
        pub fn claim_prize(
            &mut self,
            raffle_id: RaffleId,
            recipient: AccountId,
            deadline: Timestamp,
            signature: EcdsaSignature,
        ) -> Result<(), ContractError> {
            let now = self.env().block_timestamp();
            audit(
                "claim_prize",
                NftRaffle::claim_prize(self, raffle_id, recipient, deadline, signature, now),
            )?;

            self.env().emit_event(PrizeReleased {
                raffle_id,
                to: recipient,
            });

            Ok(())
        }

        /// Give the prize back to the creator when the raffle did not sell enough tickets
        #[ink(message)]
        pub fn void_raffle(&mut self, raffle_id: RaffleId) -> Result<(), ContractError> {
            let now = self.env().block_timestamp();
            let creator = NftRaffle::void_raffle(self, raffle_id, now)?;

            self.env().emit_event(RaffleVoided { raffle_id });
            self.env().emit_event(PrizeReleased {
                raffle_id,
                to: creator,
            });

            Ok(())
        }

        #[ink(message)]
        pub fn withdraw_proceeds(&mut self, raffle_id: RaffleId) -> Result<(), ContractError> {
            let creator = self.env().caller();
            let (fee, net) = NftRaffle::withdraw_proceeds(self, raffle_id, creator)?;

            self.env().emit_event(ProceedsWithdrawn {
                raffle_id,
                creator,
                net,
                fee,
            });

            Ok(())
        }

        /// Digest to sign by the claim signer
        #[ink(message)]
        pub fn claim_digest(
            &self,
            raffle_id: RaffleId,
            winner: AccountId,
            recipient: AccountId,
            deadline: Timestamp,
        ) -> Result<Hash, ContractError> {
            let digest = ClaimAuthorizationGate::claim_digest(
                self,
                &ClaimAuthorization {
                    raffle_id,
                    winner,
                    recipient,
                    deadline,
                },
            )?;
            Ok(digest.into())
        }

        #[ink(message)]
        pub fn get_raffle(&self, raffle_id: RaffleId) -> Option<Raffle> {
            NftRaffle::get_raffle(self, raffle_id)
        }

        #[ink(message)]
        pub fn get_status(&self, raffle_id: RaffleId) -> Option<Status> {
            NftRaffle::get_status(self, raffle_id)
        }

        #[ink(message)]
        pub fn get_winner(&self, raffle_id: RaffleId) -> Option<AccountId> {
            NftRaffle::get_winner(self, raffle_id)
        }

        #[ink(message)]
        pub fn is_claim_auth_required(&self, raffle_id: RaffleId) -> Option<bool> {
            NftRaffle::is_claim_auth_required(self, raffle_id)
        }

        #[ink(message)]
        pub fn get_next_raffle_id(&self) -> Result<RaffleId, ContractError> {
            Ok(NftRaffle::get_next_raffle_id(self)?)
        }

        #[ink(message)]
        pub fn get_sold_tickets(&self, raffle_id: RaffleId) -> TicketIndex {
            TicketLedger::get_sold_tickets(self, raffle_id)
        }

        #[ink(message)]
        pub fn get_ticket_owner(
            &self,
            raffle_id: RaffleId,
            index: TicketIndex,
        ) -> Option<AccountId> {
            TicketLedger::get_ticket_owner(self, raffle_id, index)
        }

        #[ink(message)]
        pub fn get_tickets_of(&self, raffle_id: RaffleId, buyer: AccountId) -> u32 {
            TicketLedger::get_tickets_of(self, raffle_id, buyer)
        }

        #[ink(message)]
        pub fn get_proceeds(&self, raffle_id: RaffleId) -> Balance {
            TicketLedger::get_proceeds(self, raffle_id)
        }

        #[ink(message)]
        pub fn get_custody(&self, raffle_id: RaffleId) -> Option<Custody> {
            EscrowCustodian::get_custody(self, raffle_id)
        }

        /// Advisory: the prize contract decides at transfer time
        #[ink(message)]
        pub fn is_prize_transferable(&self, raffle_id: RaffleId) -> bool {
            EscrowCustodian::is_prize_transferable(self, raffle_id)
        }

        #[ink(message)]
        pub fn get_payment_token(&self) -> Option<AccountId> {
            self.payment_token
        }

        #[ink(message)]
        pub fn has_pending_message(&self) -> bool {
            let tail = RollupAnchor::get_queue_tail(self).unwrap_or_default();
            let head = RollupAnchor::get_queue_head(self).unwrap_or_default();
            tail > head
        }

        #[ink(message)]
        #[modifiers(only_role(DEFAULT_ADMIN_ROLE))]
        pub fn register_attestor(
            &mut self,
            account_id: AccountId,
        ) -> Result<(), AccessControlError> {
            AccessControl::grant_role(self, ATTESTOR_ROLE, Some(account_id))?;
            Ok(())
        }

        #[ink(message)]
        pub fn get_attestor_role(&self) -> RoleType {
            ATTESTOR_ROLE
        }

        fn ensure_payment_token(&self) -> Result<AccountId, RaffleError> {
            self.payment_token.ok_or(RaffleError::ConfigNotSet)
        }
    }

    impl AssetCustodian for Contract {
        fn escrow(&mut self, asset: &PrizeAsset, from: AccountId) -> Result<(), RaffleError> {
            // only the owner can put its token in the custody
            let owner = PSP34Ref::owner_of(&asset.contract, asset.token_id.clone());
            if owner != Some(from) {
                return Err(RaffleError::TransferBlocked);
            }
            let custodian = self.env().account_id();
            PSP34Ref::transfer(&asset.contract, custodian, asset.token_id.clone(), Vec::new())
                .map_err(from_psp34_error)
        }

        fn release(&mut self, asset: &PrizeAsset, to: AccountId) -> Result<(), RaffleError> {
            PSP34Ref::transfer(&asset.contract, to, asset.token_id.clone(), Vec::new())
                .map_err(from_psp34_error)
        }

        fn is_transferable(&self, asset: &PrizeAsset) -> bool {
            let paused = build_call::<DefaultEnvironment>()
                .call(asset.contract)
                .gas_limit(0)
                .exec_input(ExecutionInput::new(Selector::new(ink::selector_bytes!(
                    "Pausable::paused"
                ))))
                .returns::<bool>()
                .try_invoke();
            // a prize without pause is always transferable
            !matches!(paused, Ok(Ok(true)))
        }
    }

    impl PaymentCollector for Contract {
        fn collect_payment(&mut self, from: AccountId, amount: Balance) -> Result<(), RaffleError> {
            let token = self.ensure_payment_token()?;
            let custodian = self.env().account_id();
            PSP22Ref::transfer_from(&token, from, custodian, amount, Vec::new())
                .map_err(from_psp22_error)
        }

        fn pay_out(&mut self, to: AccountId, amount: Balance) -> Result<(), RaffleError> {
            let token = self.ensure_payment_token()?;
            PSP22Ref::transfer(&token, to, amount, Vec::new()).map_err(from_psp22_error)
        }
    }

    impl rollup_anchor::MessageHandler for Contract {
        fn on_message_received(&mut self, action: Vec<u8>) -> Result<(), RollupAnchorError> {
            // parse the response
            let response: RandomnessResponseMessage = scale::Decode::decode(&mut &action[..])
                .or(Err(RollupAnchorError::FailedToDecode))?;

            match response {
                RandomnessResponseMessage::Fulfilled(request_id, random_value, correlation) => {
                    // the attestor submitting the reply must be the operator
                    let caller = self.env().caller();
                    self.inner_fulfill_randomness(request_id, random_value, correlation, caller)?
                }
            }

            Ok(())
        }
    }

    /// Event emitted when a message is pushed in the queue
    #[ink(event)]
    pub struct MessageQueued {
        #[ink(topic)]
        id: u32,
        data: Vec<u8>,
    }

    /// Event emitted when a message is processed
    #[ink(event)]
    pub struct MessageProcessedTo {
        #[ink(topic)]
        id: u32,
    }

    impl rollup_anchor::EventBroadcaster for Contract {
        fn emit_event_message_queued(&self, id: u32, data: Vec<u8>) {
            self.env().emit_event(MessageQueued { id, data });
        }
        fn emit_event_message_processed_to(&self, id: u32) {
            self.env().emit_event(MessageProcessedTo { id });
        }
    }

}
