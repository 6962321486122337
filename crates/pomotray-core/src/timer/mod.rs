mod clock;
pub mod driver;
mod engine;
mod wakeup;

pub use clock::{Clock, ManualClock, SystemClock};
pub use driver::{spawn, EngineHandle, Request};
pub use engine::{next_wakeup_interval, Pomodoro, State};
pub use wakeup::Wakeup;
