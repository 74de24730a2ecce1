use crate::error::RaffleError;
use crate::error::RaffleError::*;
use crate::{RandomValue, TicketIndex};

/// Map the random value onto one of the `sold` tickets.
///
/// The random value is read as a 256 bits big endian integer and reduced modulo
/// `sold` byte after byte (Horner's rule) so every bit of the value is used.
///
/// There is no rejection sampling. The resulting modulo bias is accepted: with
/// at most 2^32 tickets and a 256 bits value, the probability skew of any ticket
/// is below 2^-224.
pub fn winning_index(
    random_value: &RandomValue,
    sold: TicketIndex,
) -> Result<TicketIndex, RaffleError> {
    if sold == 0 {
        return Err(DivByZero);
    }
    let modulus = sold as u64;

    let mut rem: u64 = 0;
    for byte in random_value.iter() {
        // rem < 2^32 so the shift never overflows
        rem = ((rem << 8) | *byte as u64)
            .checked_rem(modulus)
            .ok_or(DivByZero)?;
    }

    // rem < sold
    Ok(rem as TicketIndex)
}
