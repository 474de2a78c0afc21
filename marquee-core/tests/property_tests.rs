//! Property-based tests for the Marquee core library
//!
//! These validate the grouping fold's contract over generated row sets and
//! the configuration surface over generated documents.

mod properties;
