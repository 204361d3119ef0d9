//! CLI command implementations.
//!
//! | Module   | Commands handled                     |
//! |----------|--------------------------------------|
//! | `board`  | `Stages`, `Owners`, `Show`, `Move`   |
//! | `config` | `Config`                             |

pub mod board;
pub mod config;

pub use board::{cmd_move, cmd_owners, cmd_show, cmd_stages};
pub use config::cmd_config;
