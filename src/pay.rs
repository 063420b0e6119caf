//! Payroll calculation and aggregation core.
//!
//! Pure functions over already-fetched, request-scoped data. All monetary
//! coercion happens in [`normalize`]; derivation in [`calc`]; descriptive
//! statistics in [`aggregate`]; the paid-record mutation gate in [`guard`].

pub mod aggregate;
pub mod calc;
pub mod guard;
pub mod normalize;
