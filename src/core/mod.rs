pub mod catch_up;
pub mod services;
pub mod session;
pub mod state;
pub mod time;
pub mod utils;

pub use catch_up::{run_catch_up, CatchUpReport, CatchUpWarning};
pub use session::Session;
pub use state::AppState;
pub use time::{Clock, FixedClock, SystemClock};
