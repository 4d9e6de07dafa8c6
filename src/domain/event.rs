//! Dated market event annotation.

use crate::domain::DateUnix;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub date: NaiveDate,
    pub label: String,
    /// Free-form impact category from the archive (e.g. "positive").
    pub impact: String,
}

impl Event {
    pub fn new(date: NaiveDate, label: impl Into<String>, impact: impl Into<String>) -> Self {
        Self {
            date,
            label: label.into(),
            impact: impact.into(),
        }
    }

    pub fn date_unix(&self) -> DateUnix {
        DateUnix::from_date(self.date)
    }
}
