//! Shared domain types for the CRM kanban board.
//!
//! Everything the board builder, the REST client and the session pass between
//! each other lives here: the [`Module`] selector, [`Stage`] columns, opaque
//! backend [`Record`]s and the display-only [`Card`] projection.

pub mod models;
pub mod module;
pub mod record;

pub use models::{Board, BoardStage, Card, Filters, OwnerOption, STAGE_ID_PREFIX, Stage};
pub use module::Module;
pub use record::Record;
