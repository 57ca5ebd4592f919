//! Pure rolling/exponential statistics over price series.
//!
//! Every function here is stateless and side-effect free. Insufficient
//! history yields `None`, never a zero or guessed value.

pub mod ema;
pub mod macd;
pub mod rsi;
pub mod volume;
