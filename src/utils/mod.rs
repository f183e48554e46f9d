pub mod constants;
pub mod dates;
pub mod progress;

pub use constants::*;
pub use dates::{date_window, date_window_until_yesterday, format_date};
pub use progress::ProgressReporter;
