//! Pure computations over post state.

pub mod score;

pub use score::{score_votes, vote_weight};
