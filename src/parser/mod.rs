pub mod candidates;
pub mod parties;
pub mod table;

pub use candidates::CandidateShape;
pub use parties::PartyShape;
pub use table::{extract, ExtractError};
