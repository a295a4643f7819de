mod detect;
mod resolve;
mod summary;
mod switch;

pub use detect::{run_detect, run_init, run_validate};
pub use resolve::{run_find, run_resolve, run_which};
pub use summary::{run_context, run_state, run_summary};
pub use switch::{run_refresh, run_switch};
