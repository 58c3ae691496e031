// Session module
// The login state machine, its inactivity timer and the cooperative
// scheduler that drives timer ticks and deferred loan credits.

pub mod auth;
pub mod clock;
pub mod scheduler;
pub mod timer;

pub use auth::{
    AuthSession,
    LoanTicket,
    SessionError,
    SessionEvent,
    SessionJob,
    SessionPolicy,
    SessionSnapshot,
};
pub use clock::{Clock, SystemClock};
pub use scheduler::{JobHandle, Scheduler};
pub use timer::{SessionTimer, TimerTick, TICK};
