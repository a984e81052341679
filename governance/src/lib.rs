//! Vote tally and proposal categorisation for the governance cache.
//!
//! A proposal's voting lifecycle is derived, never stored:
//! Unauthorized → Authorized → VotingActive → VotingEnded → Resulted,
//! driven by which plugin rows exist and by the caller-supplied best block.
//!
//! Vote results are materialized lazily and exactly once per proposal by
//! [`VoteTallyEngine::load_vote_results`]. Categorising proposals by outcome
//! refuses to run while any ended vote is still unmaterialized.

pub mod engine;
pub mod error;
pub mod lifecycle;
pub mod likes;
pub mod tally;

pub use engine::{TokenInventory, VoteSummary, VoteTallyEngine};
pub use error::GovernanceError;
pub use lifecycle::VoteStatus;
pub use likes::LikeTally;
pub use tally::{Thresholds, APPROVAL_OPTION_ID};
