//! # homesched-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `DeviceRepository`: create, fetch, list, and save devices
//!   - `TaskRepository`: create, list, and delete tasks
//! - Define **driving/inbound ports** as use-case structs:
//!   - `DeviceService`: the device registry: create, get, list, save, run a command
//!   - `TaskService`: the task store: schedule, list, remove
//!   - `Scheduler`: evaluate due tasks on each tick
//! - Orchestrate domain objects without knowing *how* persistence works
//!
//! ## Dependency rule
//! Depends on `homesched-domain` only.
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod ports;
pub mod scheduler;
pub mod services;

#[cfg(test)]
pub(crate) mod testing;
