pub mod job;
pub mod matching;
pub mod profile;

pub use job::{JobPosting, PostedDate, PostingSource};
pub use matching::MatchResult;
pub use profile::CandidateProfile;
