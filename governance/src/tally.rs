//! Quorum and pass threshold arithmetic.
//!
//! Quorum is measured against the eligible ticket count, the pass threshold
//! against the votes actually cast. Both are computed as
//! `(percentage / 100.0 * base) as u64` in `f64`, so a percentage without an
//! exact binary fraction can land one below the integer floor
//! (29% of 100 is 28).
//!
//! Only the option whose id is [`APPROVAL_OPTION_ID`] counts towards
//! approval. Ballots with more than a yes/no choice are stored and counted
//! per option, but the approval decision ignores every other option.

use govcache_store::{StartVoteRow, VoteOptionResultRow};

/// Option id whose votes decide approval. Thresholds follow the `f64`
/// arithmetic described in the module docs.
pub const APPROVAL_OPTION_ID: &str = "yes";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Thresholds {
    /// Minimum number of votes cast.
    pub quorum: u64,
    /// Minimum number of approval votes.
    pub pass: u64,
}

impl Thresholds {
    pub fn new(
        quorum_percentage: u32,
        pass_percentage: u32,
        eligible_tickets: u64,
        total_votes: u64,
    ) -> Self {
        Self {
            quorum: percent_of(quorum_percentage, eligible_tickets),
            pass: percent_of(pass_percentage, total_votes),
        }
    }

    pub fn approves(&self, total_votes: u64, approval_votes: u64) -> bool {
        total_votes >= self.quorum && approval_votes >= self.pass
    }
}

fn percent_of(percentage: u32, base: u64) -> u64 {
    (f64::from(percentage) / 100.0 * base as f64) as u64
}

/// Count votes per option of `start_vote`, in option order.
///
/// `count` returns the number of cast votes carrying a vote bit.
pub fn count_options<E>(
    start_vote: &StartVoteRow,
    mut count: impl FnMut(&str) -> Result<u64, E>,
) -> Result<Vec<VoteOptionResultRow>, E> {
    start_vote
        .options
        .iter()
        .map(|option| {
            Ok(VoteOptionResultRow {
                option: option.clone(),
                votes: count(&option.vote_bit())?,
            })
        })
        .collect()
}

/// Decide approval of a finished vote from its per-option counts.
pub fn is_approved(start_vote: &StartVoteRow, results: &[VoteOptionResultRow]) -> bool {
    let total: u64 = results.iter().map(|r| r.votes).sum();
    let approval = results
        .iter()
        .filter(|r| r.option.id == APPROVAL_OPTION_ID)
        .map(|r| r.votes)
        .sum();
    Thresholds::new(
        start_vote.quorum_percentage,
        start_vote.pass_percentage,
        start_vote.eligible_ticket_count,
        total,
    )
    .approves(total, approval)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    use govcache_store::{CastVoteRow, VoteOptionRow, VoteResultsRow};
    use govcache_types::Token;

    fn start_vote(eligible: u64, quorum: u32, pass: u32) -> StartVoteRow {
        StartVoteRow {
            token: Token::new("aa"),
            public_key: String::new(),
            signature: String::new(),
            mask: 3,
            duration: 2016,
            quorum_percentage: quorum,
            pass_percentage: pass,
            options: vec![
                VoteOptionRow {
                    id: "no".into(),
                    description: "Don't approve proposal".into(),
                    bits: 1,
                },
                VoteOptionRow {
                    id: "yes".into(),
                    description: "Approve proposal".into(),
                    bits: 2,
                },
            ],
            start_block_height: 100,
            start_block_hash: String::new(),
            end_height: 2116,
            eligible_tickets: Vec::new(),
            eligible_ticket_count: eligible,
        }
    }

    fn tally(start_vote: &StartVoteRow, cast_votes: &[CastVoteRow]) -> VoteResultsRow {
        let results = count_options(start_vote, |bit| {
            Ok::<_, Infallible>(cast_votes.iter().filter(|v| v.vote_bit == bit).count() as u64)
        })
        .unwrap();
        VoteResultsRow {
            token: start_vote.token.clone(),
            approved: is_approved(start_vote, &results),
            results,
        }
    }

    fn votes(yes: usize, no: usize) -> Vec<CastVoteRow> {
        let vote = |i: usize, bit: &str| CastVoteRow {
            token: Token::new("aa"),
            ticket: format!("ticket{i}-{bit}"),
            vote_bit: bit.into(),
            signature: String::new(),
        };
        (0..yes)
            .map(|i| vote(i, "2"))
            .chain((0..no).map(|i| vote(i, "1")))
            .collect()
    }

    #[test]
    fn quorum_and_pass_met() {
        let sv = start_vote(100, 20, 60);
        let thresholds = Thresholds::new(20, 60, 100, 30);
        assert_eq!(thresholds, Thresholds { quorum: 20, pass: 18 });

        let results = tally(&sv, &votes(20, 10));
        assert!(results.approved);
        assert_eq!(results.total_votes(), 30);
        assert_eq!(results.results[1].votes, 20);
        assert_eq!(results.results[0].votes, 10);
    }

    #[test]
    fn quorum_not_met_rejects() {
        let results = tally(&start_vote(100, 20, 60), &votes(10, 5));
        assert!(!results.approved);
    }

    #[test]
    fn pass_not_met_rejects() {
        // 30 cast, pass = 18, only 17 yes.
        let results = tally(&start_vote(100, 20, 60), &votes(17, 13));
        assert!(!results.approved);
    }

    #[test]
    fn thresholds_round_down() {
        let t = Thresholds::new(20, 60, 7, 7);
        assert_eq!(t.quorum, 1);
        assert_eq!(t.pass, 4);
    }

    #[test]
    fn thresholds_use_float_percentages() {
        let t = Thresholds::new(29, 58, 100, 100);
        assert_eq!(t, Thresholds { quorum: 28, pass: 57 });

        // 28 of 100 eligible voted, all yes: quorum 28 is met exactly.
        let results = tally(&start_vote(100, 29, 58), &votes(28, 0));
        assert!(results.approved);
    }

    #[test]
    fn unknown_bits_are_ignored() {
        let mut cast = votes(3, 0);
        cast.push(CastVoteRow {
            token: Token::new("aa"),
            ticket: "stray".into(),
            vote_bit: "4".into(),
            signature: String::new(),
        });
        let results = tally(&start_vote(4, 50, 50), &cast);
        assert_eq!(results.total_votes(), 3);
        assert!(results.approved);
    }

    #[test]
    fn only_yes_option_approves() {
        let mut sv = start_vote(10, 10, 50);
        sv.options[1].id = "approve".into();
        let results = tally(&sv, &votes(10, 0));
        assert!(!results.approved);
    }
}
