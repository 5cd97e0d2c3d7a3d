pub mod error;
pub mod models;
pub mod validation;
pub mod tally;

pub use error::{ErrorCode, ErrorResponse, PollError, Result};
pub use models::*;
pub use validation::*;
pub use tally::{compute_results, format_vote_count, leader, next_option_id, next_poll_id, percentage, ranking, Leader, OptionResult, PollResults};
