pub mod card;
pub mod countdown;
pub mod time;
pub mod timer;

pub use card::{CardDisplay, CardView};
pub use countdown::{Countdown, CountdownController, CountdownStatus};
pub use timer::{TimerDisplay, TimerSnapshot};
