use crate::raffle::{Status, Transition};

#[derive(Debug, Eq, PartialEq, Copy, Clone, scale::Encode, scale::Decode)]
#[cfg_attr(feature = "std", derive(scale_info::TypeInfo))]
pub enum RaffleError {
    // policy violations
    Unauthorized,
    /// the transition is not allowed in the current status
    InvalidState(Transition, Status),
    AlreadyDrawn,
    AlreadyFulfilled,
    AlreadyConsumed,
    AlreadyReleased,
    /// a prize is already held for this raffle
    CustodyAlreadyTaken,
    ProceedsAlreadyWithdrawn,
    UnknownRaffle,
    // capacity and timing violations
    CapacityExceeded,
    OutsideSaleWindow,
    SaleNotConcluded,
    QuorumNotMet,
    QuorumMet,
    Expired,
    IncorrectTicketCount,
    IncorrectRaffleParams,
    // failures of the external asset or currency
    TransferBlocked,
    InsufficientAllowance,
    InsufficientBalance,
    PaymentFailed,
    // integrity violations
    InvalidSignature,
    WrongWinner,
    UnknownRequest,
    ClaimSignerNotSet,
    NoCustody,
    // config
    IncorrectConfig,
    ConfigNotSet,
    // arithmetic
    AddOverFlow,
    SubOverFlow,
    MulOverFlow,
    DivByZero,
}
