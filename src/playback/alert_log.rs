use chrono::{DateTime, FixedOffset};

#[derive(Debug, Clone, PartialEq)]
pub struct AlertEntry {
    pub at: DateTime<FixedOffset>,
    pub message: String,
}

impl AlertEntry {
    pub fn time_label(&self) -> String {
        self.at.format("%H:%M:%S").to_string()
    }
}

/// Ordered, append-only record of alerts. Only the alert-log policy may
/// clear it, and only on a switch to a different video.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlertLog {
    entries: Vec<AlertEntry>,
}

impl AlertLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: AlertEntry) {
        self.entries.push(entry);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[cfg(test)]
    pub fn entries(&self) -> &[AlertEntry] {
        &self.entries
    }

    /// The newest `limit` entries, oldest first.
    pub fn recent(&self, limit: usize) -> &[AlertEntry] {
        let start = self.entries.len().saturating_sub(limit);
        &self.entries[start..]
    }
}
