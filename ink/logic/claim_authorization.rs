use crate::error::RaffleError;
use crate::error::RaffleError::*;
use crate::{EcdsaAddress, EcdsaSignature, Hash, RaffleId};
use ink::env::hash::{HashOutput, Keccak256};
use ink::storage::Mapping;
use openbrush::traits::{AccountId, Storage, Timestamp};
use scale::Encode;

pub const DOMAIN_NAME: &[u8] = b"NftRaffle";
pub const DOMAIN_VERSION: &[u8] = b"1";
const DOMAIN_TYPE: &[u8] =
    b"EIP712Domain(string name,string version,bytes32 chainId,bytes32 verifyingContract)";
const CLAIM_TYPE: &[u8] = b"Claim(uint64 raffleId,bytes32 winner,bytes32 to,uint64 deadline)";

/// Signed assertion that the winner passed the off-chain checks (ex: KYC)
/// and can receive the prize on `recipient`. Never stored.
#[derive(Debug, Eq, PartialEq, Copy, Clone, scale::Encode, scale::Decode)]
#[cfg_attr(feature = "std", derive(scale_info::TypeInfo))]
pub struct ClaimAuthorization {
    pub raffle_id: RaffleId,
    pub winner: AccountId,
    pub recipient: AccountId,
    pub deadline: Timestamp,
}

/// Where the signed digests are valid: the chain (genesis hash) and this contract
#[derive(Debug, Eq, PartialEq, Copy, Clone, scale::Encode, scale::Decode)]
#[cfg_attr(
    feature = "std",
    derive(scale_info::TypeInfo, ink::storage::traits::StorageLayout)
)]
pub struct ClaimDomain {
    pub chain_id: Hash,
    pub verifying_contract: AccountId,
}

#[derive(Default, Debug)]
#[openbrush::storage_item]
pub struct Data {
    signer: Option<EcdsaAddress>,
    domain: Option<ClaimDomain>,
    consumed: Mapping<(RaffleId, Hash), ()>,
}

fn keccak(input: &[u8]) -> Hash {
    let mut output = <Keccak256 as HashOutput>::Type::default();
    ink::env::hash_bytes::<Keccak256>(input, &mut output);
    output
}

fn domain_separator(domain: &ClaimDomain) -> Hash {
    keccak(
        &(
            keccak(DOMAIN_TYPE),
            keccak(DOMAIN_NAME),
            keccak(DOMAIN_VERSION),
            domain.chain_id,
            domain.verifying_contract,
        )
            .encode(),
    )
}

fn struct_hash(authorization: &ClaimAuthorization) -> Hash {
    keccak(
        &(
            keccak(CLAIM_TYPE),
            authorization.raffle_id,
            authorization.winner,
            authorization.recipient,
            authorization.deadline,
        )
            .encode(),
    )
}

/// Address of the key that signed the digest
fn recover_signer(signature: &EcdsaSignature, digest: &Hash) -> Result<EcdsaAddress, RaffleError> {
    let mut public_key = [0u8; 33];
    ink::env::ecdsa_recover(signature, digest, &mut public_key).map_err(|_| InvalidSignature)?;

    let mut address = [0u8; 20];
    ink::env::ecdsa_to_eth_address(&public_key, &mut address).map_err(|_| InvalidSignature)?;
    Ok(address)
}

#[openbrush::trait_definition]
pub trait ClaimAuthorizationGate: Storage<Data> {
    /// Bind the signed digests to this chain and this contract
    fn init_claim_domain(&mut self, domain: ClaimDomain) {
        self.data::<Data>().domain = Some(domain);
    }

    #[ink(message)]
    fn get_claim_domain(&self) -> Option<ClaimDomain> {
        self.data::<Data>().domain
    }

    fn set_claim_signer(&mut self, signer: Option<EcdsaAddress>) -> Result<(), RaffleError> {
        self.data::<Data>().signer = signer;
        Ok(())
    }

    #[ink(message)]
    fn get_claim_signer(&self) -> Option<EcdsaAddress> {
        self.data::<Data>().signer
    }

    /// Digest the off-chain service has to sign
    fn claim_digest(&self, authorization: &ClaimAuthorization) -> Result<Hash, RaffleError> {
        let domain = self.data::<Data>().domain.ok_or(ConfigNotSet)?;

        let mut message = ink::prelude::vec::Vec::with_capacity(66);
        message.extend_from_slice(b"\x19\x01");
        message.extend_from_slice(&domain_separator(&domain));
        message.extend_from_slice(&struct_hash(authorization));
        Ok(keccak(&message))
    }

    /// Check the authorization without consuming it. Return its digest.
    fn check_claim_authorization(
        &self,
        authorization: &ClaimAuthorization,
        expected_winner: AccountId,
        signature: &EcdsaSignature,
        now: Timestamp,
    ) -> Result<Hash, RaffleError> {
        let digest = self.claim_digest(authorization)?;

        if self
            .data::<Data>()
            .consumed
            .contains((authorization.raffle_id, digest))
        {
            return Err(AlreadyConsumed);
        }

        let signer = self.data::<Data>().signer.ok_or(ClaimSignerNotSet)?;
        if recover_signer(signature, &digest)? != signer {
            return Err(InvalidSignature);
        }

        if now > authorization.deadline {
            return Err(Expired);
        }

        if authorization.winner != expected_winner {
            return Err(WrongWinner);
        }

        Ok(digest)
    }

    fn consume_claim_authorization(&mut self, raffle_id: RaffleId, digest: Hash) {
        self.data::<Data>().consumed.insert((raffle_id, digest), &());
    }

    fn verify_and_consume(
        &mut self,
        authorization: &ClaimAuthorization,
        expected_winner: AccountId,
        signature: &EcdsaSignature,
        now: Timestamp,
    ) -> Result<(), RaffleError> {
        let digest =
            self.check_claim_authorization(authorization, expected_winner, signature, now)?;
        self.consume_claim_authorization(authorization.raffle_id, digest);
        Ok(())
    }

    fn is_claim_authorization_consumed(&self, raffle_id: RaffleId, digest: Hash) -> bool {
        self.data::<Data>().consumed.contains((raffle_id, digest))
    }
}
