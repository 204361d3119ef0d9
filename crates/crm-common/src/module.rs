use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The record family shown on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Module {
    #[default]
    Leads,
    Opportunities,
}

const LEAD_SEARCH_FIELDS: &[&str] = &[
    "leadName",
    "company",
    "email",
    "phone",
    "createdByName",
    "leadStatusName",
];

const OPPORTUNITY_SEARCH_FIELDS: &[&str] = &[
    "opportunityName",
    "accountName",
    "company",
    "createdByName",
    "stageName",
];

impl Module {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Leads => "leads",
            Self::Opportunities => "opportunities",
        }
    }

    /// Human-readable name, as shown in headings.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Leads => "Leads",
            Self::Opportunities => "Opportunities",
        }
    }

    /// Field holding the enum value that places a record in a stage.
    pub fn discriminator_field(&self) -> &'static str {
        match self {
            Self::Leads => "leadStatus",
            Self::Opportunities => "stage",
        }
    }

    /// Field holding the label that accompanies the discriminator.
    pub fn discriminator_name_field(&self) -> &'static str {
        match self {
            Self::Leads => "leadStatusName",
            Self::Opportunities => "stageName",
        }
    }

    /// Record fields matched by the free-text search box.
    pub fn search_fields(&self) -> &'static [&'static str] {
        match self {
            Self::Leads => LEAD_SEARCH_FIELDS,
            Self::Opportunities => OPPORTUNITY_SEARCH_FIELDS,
        }
    }

    /// Card id for a record of this module, e.g. `leads-5`.
    pub fn card_id(&self, record_id: &str) -> String {
        format!("{}-{}", self.as_str(), record_id)
    }
}

impl std::fmt::Display for Module {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Module {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "leads" | "lead" => Ok(Self::Leads),
            "opportunities" | "opportunity" | "opps" => Ok(Self::Opportunities),
            _ => Err(format!(
                "Invalid module '{}'. Valid values: leads, opportunities",
                s
            )),
        }
    }
}
