//! Record filter pipeline: owner → stage/status → creation date → search.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use crm_common::{Filters, Module, Record, Stage};

use super::format::{day_end, day_start, record_timestamp};

const OWNER_FIELD: &str = "createdBy";
const CREATED_FIELD: &str = "createdOn";

pub(crate) struct RecordFilter<'a> {
    module: Module,
    owners: &'a [String],
    labels: &'a [String],
    /// enum value → stage title
    titles: HashMap<&'a str, &'a str>,
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
    needle: String,
}

impl<'a> RecordFilter<'a> {
    pub(crate) fn new(module: Module, filters: &'a Filters, search: &str, stages: &'a [Stage]) -> Self {
        let labels = match module {
            Module::Leads => &filters.statuses,
            Module::Opportunities => &filters.stages,
        };
        Self {
            module,
            owners: &filters.owners,
            labels,
            titles: stages
                .iter()
                .map(|s| (s.enum_value(), s.title.as_str()))
                .collect(),
            start: filters.start_date.map(day_start),
            end: filters.end_date.map(day_end),
            needle: search.trim().to_lowercase(),
        }
    }

    pub(crate) fn matches(&self, record: &Record) -> bool {
        self.matches_owner(record)
            && self.matches_stage_label(record)
            && self.matches_created(record)
            && self.matches_search(record)
    }

    fn matches_owner(&self, record: &Record) -> bool {
        if self.owners.is_empty() {
            return true;
        }
        record
            .key(OWNER_FIELD)
            .is_some_and(|owner| self.owners.iter().any(|o| *o == owner))
    }

    fn matches_stage_label(&self, record: &Record) -> bool {
        if self.labels.is_empty() {
            return true;
        }
        let value = record.key(self.module.discriminator_field());
        let title = value.as_deref().and_then(|v| self.titles.get(v).copied());
        let name = record.text(self.module.discriminator_name_field());

        self.labels.iter().any(|label| {
            Some(label.as_str()) == title
                || Some(label.as_str()) == name.as_deref()
                || Some(label.as_str()) == value.as_deref()
        })
    }

    fn matches_created(&self, record: &Record) -> bool {
        if self.start.is_none() && self.end.is_none() {
            return true;
        }
        let Some(created) = record_timestamp(record, CREATED_FIELD) else {
            return false;
        };
        self.start.is_none_or(|start| created >= start) && self.end.is_none_or(|end| created <= end)
    }

    fn matches_search(&self, record: &Record) -> bool {
        if self.needle.is_empty() {
            return true;
        }
        self.module.search_fields().iter().any(|field| {
            record
                .text(field)
                .is_some_and(|text| text.to_lowercase().contains(&self.needle))
        })
    }
}
