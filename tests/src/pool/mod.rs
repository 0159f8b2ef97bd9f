//! Lending pool reconciliation tests
//!
//! Every test drives the reconciliation engine against the in-process
//! chain: actions execute on the sim, the expected-state model advances
//! in lockstep, and the engine cross-checks both after each step.

pub mod fixture;

mod base_test;
mod borrow_test;
mod repay_test;
