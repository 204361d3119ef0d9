//! The board view: one owner for all board state.
//!
//! A [`BoardSession`] holds the latest committed snapshot (module, stages,
//! records, owners, filters, search) and the board built from it. Every
//! setter rebuilds the board synchronously; loads and drops talk to the
//! backend and apply the failure policy (notice, reset, roll back) before
//! returning.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crm_common::{Board, Card, Filters, Module, OwnerOption, Record, Stage};

use crate::board::{self, DragState, StageMove, build_board};
use crate::client::{CrmBackend, RequestContext};
use crate::errors::{ClientError, SessionError};

/// What to do with an optimistic move the backend rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RollbackPolicy {
    /// Discard local records and fetch them again.
    #[default]
    Refetch,
    /// Apply the inverse of the move and keep everything else.
    Inverse,
}

impl std::fmt::Display for RollbackPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RollbackPolicy::Refetch => write!(f, "refetch"),
            RollbackPolicy::Inverse => write!(f, "inverse"),
        }
    }
}

impl std::str::FromStr for RollbackPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "refetch" => Ok(RollbackPolicy::Refetch),
            "inverse" => Ok(RollbackPolicy::Inverse),
            _ => anyhow::bail!(
                "Invalid rollback policy '{}'. Valid values: refetch, inverse",
                s
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A user-facing message, the equivalent of a toast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// Result of a drop that reached the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum DropOutcome {
    /// Nothing was moved and nothing was sent.
    Ignored,
    Committed(StageMove),
}

pub struct BoardSession {
    backend: Arc<dyn CrmBackend>,
    ctx: RequestContext,
    rollback: RollbackPolicy,
    module: Module,
    stages: Vec<Stage>,
    records: Vec<Record>,
    owners: Vec<OwnerOption>,
    filters: Filters,
    search: String,
    board: Board,
    drag: DragState,
    notices: Vec<Notice>,
    last_error: Option<String>,
}

impl BoardSession {
    pub fn new(backend: Arc<dyn CrmBackend>, ctx: RequestContext, module: Module) -> Self {
        Self {
            backend,
            ctx,
            rollback: RollbackPolicy::default(),
            module,
            stages: Vec::new(),
            records: Vec::new(),
            owners: Vec::new(),
            filters: Filters::default(),
            search: String::new(),
            board: Vec::new(),
            drag: DragState::default(),
            notices: Vec::new(),
            last_error: None,
        }
    }

    pub fn with_rollback(mut self, rollback: RollbackPolicy) -> Self {
        self.rollback = rollback;
        self
    }

    pub fn module(&self) -> Module {
        self.module
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn owners(&self) -> &[OwnerOption] {
        &self.owners
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn drag_state(&self) -> &DragState {
        &self.drag
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Drain queued notices, oldest first.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Fetch stages then records for the current module, with owners loading
    /// alongside. Each list that fails to load is reset to empty; the first
    /// stage or record failure is returned after the board is rebuilt.
    pub async fn load(&mut self) -> Result<(), SessionError> {
        let module = self.module;
        let backend = Arc::clone(&self.backend);
        let ctx = self.ctx.clone();

        let board_data = async {
            let stages = backend.fetch_stages(&ctx, module).await;
            let records = backend.fetch_records(&ctx, module).await;
            (stages, records)
        };
        let ((stages, records), owners) = tokio::join!(board_data, backend.fetch_owners(&ctx));

        let mut first_error = None;
        let mut owners_failed = false;
        match stages {
            Ok(stages) => self.stages = stages,
            Err(e) => {
                self.stages.clear();
                first_error = Some(self.fail("stages", e));
            }
        }
        match records {
            Ok(records) => self.records = records,
            Err(e) => {
                self.records.clear();
                let err = self.fail("records", e);
                first_error = first_error.or(Some(err));
            }
        }
        match owners {
            Ok(owners) => self.owners = owners,
            Err(e) => {
                // The owner filter is optional; the board still renders.
                self.owners.clear();
                self.fail("owners", e);
                owners_failed = true;
            }
        }

        self.rebuild();
        info!(
            module = %module,
            stages = self.stages.len(),
            records = self.records.len(),
            owners = self.owners.len(),
            "board loaded"
        );

        match first_error {
            Some(err) => Err(err),
            None => {
                if !owners_failed {
                    self.last_error = None;
                }
                Ok(())
            }
        }
    }

    /// Replace the module and reload everything for it.
    pub async fn switch_module(&mut self, module: Module) -> Result<(), SessionError> {
        if module != self.module {
            self.module = module;
            self.stages.clear();
            self.records.clear();
            self.drag.end();
            self.rebuild();
        }
        self.load().await
    }

    /// Fetch records again, keeping the current stages.
    pub async fn refetch_records(&mut self) -> Result<(), SessionError> {
        let result = self.backend.fetch_records(&self.ctx, self.module).await;
        let outcome = match result {
            Ok(records) => {
                self.records = records;
                Ok(())
            }
            Err(e) => {
                self.records.clear();
                Err(self.fail("records", e))
            }
        };
        self.rebuild();
        outcome
    }

    pub fn set_filters(&mut self, filters: Filters) {
        self.filters = filters;
        self.rebuild();
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
        self.rebuild();
    }

    /// Arm the drag state with a card and the stage it currently sits in.
    pub fn begin_drag(&mut self, source_stage_id: &str, item_id: &str) {
        self.drag.start(source_stage_id, item_id);
    }

    /// Arm the drag state for `item_id`, looking up its stage on the board.
    /// Returns false when the card is not on the board.
    pub fn pick_up(&mut self, item_id: &str) -> bool {
        match board::find_card(&self.board, item_id) {
            Some((stage_idx, _)) => {
                let stage_id = self.board[stage_idx].id().to_string();
                self.drag.start(stage_id, item_id);
                true
            }
            None => false,
        }
    }

    pub fn cancel_drag(&mut self) {
        self.drag.end();
    }

    pub fn find_card(&self, item_id: &str) -> Option<&Card> {
        board::find_card(&self.board, item_id).map(|(s, i)| &self.board[s].items[i])
    }

    /// Drop the dragged card on `target_stage_id` and commit the move.
    ///
    /// The move is applied to the board before the update call goes out. If
    /// the backend rejects it, the configured rollback is applied and the
    /// error is returned.
    pub async fn drop_on(&mut self, target_stage_id: &str) -> Result<DropOutcome, SessionError> {
        let Some(mv) = self.drag.drop_on(&mut self.board, self.module, target_stage_id) else {
            debug!(target_stage_id, "drop ignored");
            return Ok(DropOutcome::Ignored);
        };

        let slot = self.write_back(&mv.previous.raw, &mv.updated);
        let payload = mv.update_payload();

        match self.backend.update_record(&self.ctx, mv.module, &payload).await {
            Ok(()) => {
                info!(
                    card = %mv.item_id,
                    from = %mv.source_stage_id,
                    to = %mv.target_stage_id,
                    "card moved"
                );
                self.notify(
                    NoticeLevel::Success,
                    format!("Moved {} to {}", mv.previous.name, mv.target_stage_title),
                );
                self.last_error = None;
                Ok(DropOutcome::Committed(mv))
            }
            Err(source) => {
                error!(card = %mv.item_id, error = %source, "stage update failed");
                self.notify(
                    NoticeLevel::Error,
                    format!("Failed to move {}: {}", mv.previous.name, source),
                );
                self.last_error = Some(source.to_string());
                self.roll_back(&mv, slot).await;
                Err(SessionError::Update {
                    card_id: mv.item_id,
                    target_stage_id: mv.target_stage_id,
                    source,
                })
            }
        }
    }

    async fn roll_back(&mut self, mv: &StageMove, slot: Option<usize>) {
        match self.rollback {
            RollbackPolicy::Refetch => {
                // Errors are already surfaced as notices by refetch_records.
                let _ = self.refetch_records().await;
            }
            RollbackPolicy::Inverse => {
                if let Some(record) = slot.and_then(|i| self.records.get_mut(i)) {
                    *record = mv.previous.raw.clone();
                }
                if !mv.revert(&mut self.board) {
                    warn!(card = %mv.item_id, "inverse patch did not apply, rebuilding");
                    self.rebuild();
                }
            }
        }
    }

    /// Replace the stored record equal to `previous` with `updated` and return
    /// its index. Matching on the whole record keeps records without an id
    /// apart.
    fn write_back(&mut self, previous: &Record, updated: &Record) -> Option<usize> {
        let index = self.records.iter().position(|r| r == previous)?;
        self.records[index] = updated.clone();
        Some(index)
    }

    fn rebuild(&mut self) {
        self.board = build_board(
            &self.stages,
            &self.records,
            self.module,
            &self.filters,
            &self.search,
        );
        let unplaced = board::unplaced_count(&self.stages, &self.records, self.module);
        if unplaced > 0 {
            debug!(unplaced, module = %self.module, "records match no stage");
        }
    }

    fn fail(&mut self, what: &'static str, source: ClientError) -> SessionError {
        error!(what, error = %source, "load failed");
        self.notify(NoticeLevel::Error, format!("Failed to load {}: {}", what, source));
        self.last_error = Some(source.to_string());
        SessionError::Load { what, source }
    }

    fn notify(&mut self, level: NoticeLevel, message: String) {
        self.notices.push(Notice { level, message });
    }
}
