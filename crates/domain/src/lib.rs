//! # homesched-domain
//!
//! Pure domain model for the homesched device scheduler.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, time-of-day
//! - Define **Devices** (lights, thermostats, alarms) and their derived energy model
//! - Define **Commands** (the closed set of actions a device can receive) and the
//!   free-text grammar accepted at the boundary
//! - Define **Tasks** (a command bound to a device, a time of day, and a repeat flag)
//! - Contain all invariant enforcement and domain logic
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod command;
pub mod device;
pub mod task;
