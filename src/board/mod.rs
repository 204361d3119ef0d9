//! Kanban board construction.
//!
//! ## Overview
//!
//! [`build_board`] is the whole read path of the board: it filters the raw
//! records of one module and partitions the survivors into the stage columns.
//! It is pure and synchronous, and is re-run from scratch whenever any of its
//! inputs change. The write path (moving a card between stages) lives in
//! [`drag`] and patches an already-built board in place.
//!
//! ```text
//! records ──> owner ──> stage/status ──> created date ──> search ──┐
//!                                                                  v
//! stages ─────────────────────────────────> partition by discriminator ──> Board
//! ```

pub mod card;
pub mod drag;
pub mod filter;
pub mod format;

use crm_common::{Board, BoardStage, Filters, Module, Record, Stage};

pub use card::to_card;
pub use drag::{DragState, StageMove};

use filter::RecordFilter;

/// Build the per-stage card collections for one module.
///
/// A record lands in the stage whose enum value equals its stringified
/// discriminator. Records matching no stage are left off the board.
pub fn build_board(
    stages: &[Stage],
    records: &[Record],
    module: Module,
    filters: &Filters,
    search: &str,
) -> Board {
    if stages.is_empty() {
        return Vec::new();
    }

    let filter = RecordFilter::new(module, filters, search, stages);
    let field = module.discriminator_field();
    let visible: Vec<(&Record, Option<String>)> = records
        .iter()
        .filter(|r| filter.matches(r))
        .map(|r| (r, r.key(field)))
        .collect();

    stages
        .iter()
        .map(|stage| {
            let value = stage.enum_value();
            let items = visible
                .iter()
                .filter(|(_, key)| key.as_deref() == Some(value))
                .map(|(record, _)| to_card(record, module, stage))
                .collect();
            BoardStage {
                stage: stage.clone(),
                items,
            }
        })
        .collect()
}

/// Number of records whose discriminator matches none of `stages`.
pub fn unplaced_count(stages: &[Stage], records: &[Record], module: Module) -> usize {
    let field = module.discriminator_field();
    records
        .iter()
        .filter(|r| {
            let key = r.key(field);
            !stages.iter().any(|s| key.as_deref() == Some(s.enum_value()))
        })
        .count()
}

/// Total number of cards across all stages.
pub fn card_count(board: &[BoardStage]) -> usize {
    board.iter().map(|s| s.items.len()).sum()
}

/// Locate a card, returning the index of its stage and its position there.
pub fn find_card(board: &[BoardStage], card_id: &str) -> Option<(usize, usize)> {
    board
        .iter()
        .enumerate()
        .find_map(|(si, stage)| stage.position_of(card_id).map(|pos| (si, pos)))
}
