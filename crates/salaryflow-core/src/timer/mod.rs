mod clock;
mod driver;
mod engine;

pub use clock::{Clock, ManualClock, SystemClock};
pub use driver::{TickDriver, TICK_INTERVAL};
pub use engine::{Reading, SalarySource, TimerEngine, TimerState};
