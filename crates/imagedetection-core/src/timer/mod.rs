mod oneshot;

pub use oneshot::{OneShot, TimerId, TimerIds, FAR_FUTURE};
