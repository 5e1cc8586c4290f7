//! Error types for state machine operations.
//!
//! A denial is a normal business outcome reported to the submitter with a
//! reason identifying which stage failed. Data-integrity errors indicate
//! malformed state rather than a policy outcome; they still deny (the
//! engine fails closed) but are reported as a distinct class.

use crest_core::Address;

use crate::state::keys::ApprovalLevel;

/// All validation and execution errors for state transitions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StateError {
    // === Transfer Denials ===
    /// No collection-level approval matched the transfer.
    NoCollectionApproval {
        from: Address,
        to: Address,
        initiated_by: Address,
    },
    /// A matching combination explicitly disallows the transfer.
    TransferExplicitlyForbidden { level: ApprovalLevel },
    /// The sender's outgoing approvals do not allow the transfer.
    NoOutgoingApproval { user: Address },
    /// The recipient's incoming approvals do not allow the transfer.
    NoIncomingApproval { user: Address },
    /// The matched rule requires the recipient to be the initiator.
    ToMustEqualInitiatedBy { to: Address, initiated_by: Address },
    /// The matched rule requires the sender to be the initiator.
    FromMustEqualInitiatedBy { from: Address, initiated_by: Address },
    /// The matched rule forbids the recipient being the initiator.
    ToMustNotEqualInitiatedBy { address: Address },
    /// The matched rule forbids the sender being the initiator.
    FromMustNotEqualInitiatedBy { address: Address },
    /// The collection is archived and read-only.
    CollectionArchived { collection_id: u64 },
    /// The sender does not hold the transferred badges.
    InsufficientBalance {
        address: Address,
        needed: u64,
        available: u64,
    },

    // === Challenge Denials ===
    /// A challenge on the matched rule has no corresponding proof.
    ChallengeMissingProof { challenge_id: String },
    /// The supplied proof has the wrong number of aunts.
    ChallengeProofLengthMismatch {
        challenge_id: String,
        expected: u64,
        actual: u64,
    },
    /// The supplied proof does not resolve to the challenge root.
    ChallengeInvalidProof { challenge_id: String },
    /// The challenge requires the initiator's address as the leaf.
    ChallengeWrongLeaf { challenge_id: String },
    /// The leaf was already consumed under this challenge ID.
    ChallengeLeafAlreadyUsed {
        challenge_id: String,
        leaf_index: u64,
    },

    // === Tracker Denials ===
    /// The rule's transfer-count cap is exhausted.
    ApprovalTransfersExceeded {
        tracker_id: String,
        used: u64,
        max: u64,
    },
    /// The rule's cumulative-amount cap would be exceeded.
    ApprovalAmountsExceeded { tracker_id: String },
    /// The transfer does not take the badge slice its use number entitles.
    DistributionOutOfSequence { tracker_id: String },

    // === Update Denials ===
    /// The signer is not the collection manager.
    NotManager { manager: Address, signer: Address },
    /// The collection has no manager at this time.
    ManagerNotSet { collection_id: u64 },
    /// A permission combination permanently forbids this update.
    UpdatePermanentlyForbidden { at: u64 },
    /// The mapping ID is already registered.
    MappingAlreadyExists { mapping_id: String },
    /// The mapping ID is empty.
    InvalidMappingId,

    // === Data Integrity ===
    /// Referenced collection does not exist.
    CollectionNotFound { collection_id: u64 },
    /// Referenced address mapping does not exist.
    AddressMappingNotFound { mapping_id: String },
    /// Two timeline entries claim the same instant.
    OverlappingTimeline { instant: u64 },
    /// Arithmetic overflow in calculation.
    ArithmeticOverflow,
}

impl StateError {
    /// Whether this error indicates malformed state rather than an
    /// ordinary policy denial.
    pub fn is_data_integrity_anomaly(&self) -> bool {
        matches!(
            self,
            StateError::CollectionNotFound { .. }
                | StateError::AddressMappingNotFound { .. }
                | StateError::OverlappingTimeline { .. }
                | StateError::ArithmeticOverflow
        )
    }
}

impl std::fmt::Display for StateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // Transfer denials
            StateError::NoCollectionApproval {
                from,
                to,
                initiated_by,
            } => {
                write!(
                    f,
                    "no collection approval matches transfer {:?} -> {:?} initiated by {:?}",
                    &from[..4],
                    &to[..4],
                    &initiated_by[..4]
                )
            }
            StateError::TransferExplicitlyForbidden { level } => {
                write!(f, "transfer explicitly forbidden at {:?} level", level)
            }
            StateError::NoOutgoingApproval { user } => {
                write!(f, "no outgoing approval from user {:?}", &user[..4])
            }
            StateError::NoIncomingApproval { user } => {
                write!(f, "no incoming approval for user {:?}", &user[..4])
            }
            StateError::ToMustEqualInitiatedBy { to, initiated_by } => {
                write!(
                    f,
                    "recipient {:?} must equal initiator {:?}",
                    &to[..4],
                    &initiated_by[..4]
                )
            }
            StateError::FromMustEqualInitiatedBy { from, initiated_by } => {
                write!(
                    f,
                    "sender {:?} must equal initiator {:?}",
                    &from[..4],
                    &initiated_by[..4]
                )
            }
            StateError::ToMustNotEqualInitiatedBy { address } => {
                write!(f, "recipient {:?} must not be the initiator", &address[..4])
            }
            StateError::FromMustNotEqualInitiatedBy { address } => {
                write!(f, "sender {:?} must not be the initiator", &address[..4])
            }
            StateError::CollectionArchived { collection_id } => {
                write!(f, "collection {} is archived", collection_id)
            }
            StateError::InsufficientBalance {
                address,
                needed,
                available,
            } => {
                write!(
                    f,
                    "insufficient balance for {:?}: needed {}, available {}",
                    &address[..4],
                    needed,
                    available
                )
            }

            // Challenge denials
            StateError::ChallengeMissingProof { challenge_id } => {
                write!(f, "no proof supplied for challenge {}", challenge_id)
            }
            StateError::ChallengeProofLengthMismatch {
                challenge_id,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "challenge {} expects proof length {}, got {}",
                    challenge_id, expected, actual
                )
            }
            StateError::ChallengeInvalidProof { challenge_id } => {
                write!(f, "proof for challenge {} does not match root", challenge_id)
            }
            StateError::ChallengeWrongLeaf { challenge_id } => {
                write!(
                    f,
                    "challenge {} requires the initiator address as leaf",
                    challenge_id
                )
            }
            StateError::ChallengeLeafAlreadyUsed {
                challenge_id,
                leaf_index,
            } => {
                write!(
                    f,
                    "leaf {} already used for challenge {}",
                    leaf_index, challenge_id
                )
            }

            // Tracker denials
            StateError::ApprovalTransfersExceeded {
                tracker_id,
                used,
                max,
            } => {
                write!(
                    f,
                    "approval tracker {} exhausted: {} of {} transfers used",
                    tracker_id, used, max
                )
            }
            StateError::ApprovalAmountsExceeded { tracker_id } => {
                write!(f, "approval tracker {} amount cap exceeded", tracker_id)
            }
            StateError::DistributionOutOfSequence { tracker_id } => {
                write!(
                    f,
                    "transfer does not match the next slice for tracker {}",
                    tracker_id
                )
            }

            // Update denials
            StateError::NotManager { manager, signer } => {
                write!(
                    f,
                    "not manager: expected {:?}, got {:?}",
                    &manager[..4],
                    &signer[..4]
                )
            }
            StateError::ManagerNotSet { collection_id } => {
                write!(f, "collection {} has no manager set", collection_id)
            }
            StateError::UpdatePermanentlyForbidden { at } => {
                write!(f, "update forbidden at time {}", at)
            }
            StateError::MappingAlreadyExists { mapping_id } => {
                write!(f, "address mapping {} already exists", mapping_id)
            }
            StateError::InvalidMappingId => write!(f, "address mapping ID is empty"),

            // Data integrity
            StateError::CollectionNotFound { collection_id } => {
                write!(f, "collection not found: {}", collection_id)
            }
            StateError::AddressMappingNotFound { mapping_id } => {
                write!(f, "address mapping not found: {}", mapping_id)
            }
            StateError::OverlappingTimeline { instant } => {
                write!(f, "timeline entries overlap at instant {}", instant)
            }
            StateError::ArithmeticOverflow => write!(f, "arithmetic overflow"),
        }
    }
}

impl std::error::Error for StateError {}

/// Result type for state operations.
pub type StateResult<T> = Result<T, StateError>;
