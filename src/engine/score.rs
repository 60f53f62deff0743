//! Time-adjusted vote scoring.

use crate::types::{EventContext, Vote};

/// Score contributed by a single vote.
///
/// Formula: 1 + (vote.timestamp - start) * vote_decay_rate
///
/// Later votes are worth slightly more than early ones. Scores only ever
/// feed relative ordering inside one event, so the steady inflation is
/// harmless. The offset is taken in `f64`, so any pair of timestamps gives
/// a finite weight.
pub fn vote_weight(vote: &Vote, context: &EventContext) -> f64 {
    let offset = vote.timestamp as f64 - context.start as f64;
    1.0 + offset * context.vote_decay_rate
}

/// Sum of `vote_weight` over a ledger. An empty ledger scores 0.
pub fn score_votes(votes: &[Vote], context: &EventContext) -> f64 {
    votes.iter().map(|v| vote_weight(v, context)).sum()
}
