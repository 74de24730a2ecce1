#![cfg_attr(not(feature = "std"), no_std, no_main)]

pub type RaffleId = u64;
pub type RequestId = u64;
pub type TicketIndex = u32;
/// 256 bits random value, big endian
pub type RandomValue = [u8; 32];
/// Ethereum-style address derived from a secp256k1 public key
pub type EcdsaAddress = [u8; 20];
/// Recoverable secp256k1 signature (r, s, v)
pub type EcdsaSignature = [u8; 65];
pub type Hash = [u8; 32];

pub mod claim_authorization;
pub mod config;
pub mod error;
pub mod escrow;
pub mod raffle;
pub mod randomness;
pub mod ticket_ledger;
pub mod winner;

#[cfg(test)]
mod test_contract;
