pub mod clock;
pub mod dir;
pub mod logging;
pub mod percentage;
pub mod reference_clock;
pub mod runtime;
pub mod time;
