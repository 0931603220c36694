//! Meet-in-the-Middle search.
//!
//! The route is cut at day `n / 2`. The first half is searched forward from
//! home; the second half is reversed (each flight flown backwards, days
//! counted from the end) so that it too can be searched forward from home.
//! Two producer threads stream every half route; a matcher joins halves
//! that meet in the same city and together cover every city exactly once.
//!
//! Matching scans all earlier halves from the other side on every arrival,
//! which is quadratic in the worst case.

mod half;
mod matcher;
mod runner;

pub use runner::Mitm;
