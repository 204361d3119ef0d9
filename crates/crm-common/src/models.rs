use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::record::Record;

/// Prefix that turns a backend enum value into a stage id.
pub const STAGE_ID_PREFIX: &str = "stage-";

/// A kanban column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    pub id: String,
    pub title: String,
}

impl Stage {
    pub fn new(enum_value: impl std::fmt::Display, title: impl Into<String>) -> Self {
        Self {
            id: format!("{}{}", STAGE_ID_PREFIX, enum_value),
            title: title.into(),
        }
    }

    /// The backend enum value this stage stands for (`stage-2` → `2`).
    pub fn enum_value(&self) -> &str {
        self.id.strip_prefix(STAGE_ID_PREFIX).unwrap_or(&self.id)
    }
}

/// Display-only projection of a [`Record`] placed in a stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    pub name: String,
    pub company: String,
    pub value: String,
    pub owner: String,
    pub created_date: String,
    pub due_date: String,
    pub status: String,
    /// Source record, kept for building update payloads.
    pub raw: Record,
}

/// A stage together with the cards currently shown in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardStage {
    #[serde(flatten)]
    pub stage: Stage,
    pub items: Vec<Card>,
}

impl BoardStage {
    pub fn id(&self) -> &str {
        &self.stage.id
    }

    pub fn position_of(&self, card_id: &str) -> Option<usize> {
        self.items.iter().position(|c| c.id == card_id)
    }
}

pub type Board = Vec<BoardStage>;

/// User-selected board filters. Empty lists and unset dates filter nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filters {
    #[serde(default)]
    pub stages: Vec<String>,
    #[serde(default)]
    pub owners: Vec<String>,
    #[serde(default)]
    pub statuses: Vec<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

impl Filters {
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
            && self.owners.is_empty()
            && self.statuses.is_empty()
            && self.start_date.is_none()
            && self.end_date.is_none()
    }
}

/// An entry of the owner filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerOption {
    pub id: String,
    pub label: String,
}
