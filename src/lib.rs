//! Kanban board core for a CRM backend.
//!
//! [`board`] turns stage lookups and record lists into a filtered board and
//! handles drag/drop moves on it, [`client`] talks to the REST backend, and
//! [`session`] ties the two together with optimistic commits and rollback.

pub mod board;
pub mod client;
pub mod config;
pub mod errors;
pub mod session;

pub use crm_common::{Board, BoardStage, Card, Filters, Module, OwnerOption, Record, Stage};
