pub mod progress;

pub use progress::DayProgress;
