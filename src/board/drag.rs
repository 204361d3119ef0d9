//! Drag-and-drop between stages.
//!
//! [`DragState`] is a two-state machine: `Idle`, or `Armed` with the card
//! being dragged and the stage it was picked up from. Dropping while armed
//! moves the card on the built board immediately and returns a [`StageMove`]
//! describing the change, which the caller commits to the backend. The move
//! also carries its own inverse so a failed commit can be undone without
//! rebuilding the board.

use serde_json::Value;

use crm_common::{Board, BoardStage, Card, Module, Record, Stage};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    Armed {
        source_stage_id: String,
        item_id: String,
    },
}

/// An optimistic card move that has been applied to the board.
#[derive(Debug, Clone, PartialEq)]
pub struct StageMove {
    pub module: Module,
    pub item_id: String,
    pub source_stage_id: String,
    pub target_stage_id: String,
    pub target_stage_title: String,
    /// Position the card held in its source stage.
    pub source_index: usize,
    /// The card as it was before the move.
    pub previous: Card,
    /// The record rewritten to the target stage.
    pub updated: Record,
}

impl DragState {
    pub fn start(&mut self, source_stage_id: impl Into<String>, item_id: impl Into<String>) {
        *self = Self::Armed {
            source_stage_id: source_stage_id.into(),
            item_id: item_id.into(),
        };
    }

    /// Drag ended without a drop.
    pub fn end(&mut self) {
        *self = Self::Idle;
    }

    pub fn is_armed(&self) -> bool {
        matches!(self, Self::Armed { .. })
    }

    /// Drop the dragged card on `target_stage_id`.
    ///
    /// Always returns the state to `Idle`. Returns `None`, leaving the board
    /// untouched, when nothing was being dragged, the target is the source
    /// stage, the target is unknown, or the card is no longer in its source
    /// stage.
    pub fn drop_on(&mut self, board: &mut Board, module: Module, target_stage_id: &str) -> Option<StageMove> {
        let Self::Armed {
            source_stage_id,
            item_id,
        } = std::mem::take(self)
        else {
            return None;
        };
        if source_stage_id == target_stage_id {
            return None;
        }

        let target_idx = stage_index(board, target_stage_id)?;
        let source_idx = stage_index(board, &source_stage_id)?;
        let source_index = board[source_idx].position_of(&item_id)?;

        let previous = board[source_idx].items.remove(source_index);
        let target_stage = board[target_idx].stage.clone();
        let updated = retarget_record(&previous.raw, module, &target_stage);

        let mut moved = previous.clone();
        moved.status = target_stage.title.clone();
        moved.raw = updated.clone();
        board[target_idx].items.push(moved);

        Some(StageMove {
            module,
            item_id,
            source_stage_id,
            target_stage_id: target_stage_id.to_string(),
            target_stage_title: target_stage.title,
            source_index,
            previous,
            updated,
        })
    }
}

impl StageMove {
    /// Full record payload for the update endpoint.
    pub fn update_payload(&self) -> Value {
        self.updated.to_update_payload()
    }

    /// Undo the move on `board`: take the card out of the target stage and put
    /// the original back where it was. Returns false when either stage is gone.
    pub fn revert(&self, board: &mut Board) -> bool {
        let (Some(target_idx), Some(source_idx)) = (
            stage_index(board, &self.target_stage_id),
            stage_index(board, &self.source_stage_id),
        ) else {
            return false;
        };
        let target = &mut board[target_idx].items;
        if let Some(pos) = target.iter().rposition(|c| c.id == self.item_id) {
            target.remove(pos);
        }
        let source = &mut board[source_idx].items;
        let at = self.source_index.min(source.len());
        source.insert(at, self.previous.clone());
        true
    }
}

/// Copy of `record` placed in `stage`. The discriminator is rewritten; its
/// label is rewritten only when the record already carries one. Every other
/// field is kept.
pub fn retarget_record(record: &Record, module: Module, stage: &Stage) -> Record {
    let mut updated = record.clone();
    let value = stage.enum_value();
    let wire_value = value
        .parse::<i64>()
        .map(Value::from)
        .unwrap_or_else(|_| Value::from(value));
    updated.set(module.discriminator_field(), wire_value);
    let name_field = module.discriminator_name_field();
    if record.fields().contains_key(name_field) {
        updated.set(name_field, Value::from(stage.title.as_str()));
    }
    updated
}

fn stage_index(board: &[BoardStage], stage_id: &str) -> Option<usize> {
    board.iter().position(|s| s.id() == stage_id)
}
