use std::fmt;

// ---------------------------------------------------------------------------
// Session log – "Record" button history
// ---------------------------------------------------------------------------

pub const LOG_HEADER: &str = "FILE N_SEL N_TOTAL";

/// One recorded `(file, selected, total)` snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEntry {
    pub file_name: String,
    pub selected: usize,
    pub total: usize,
}

impl fmt::Display for SessionEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.file_name, self.selected, self.total)
    }
}

/// Append-only record of snapshots for the running session. Duplicates are
/// kept; nothing is ever edited or removed.
#[derive(Debug, Clone, Default)]
pub struct SessionLog {
    entries: Vec<SessionEntry>,
}

impl SessionLog {
    pub fn record(&mut self, entry: SessionEntry) {
        log::info!("Recorded entry {}: {entry}", self.len() + 1);
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[SessionEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Header line, then one line per entry in append order. Every line is
    /// newline-terminated.
    pub fn render(&self) -> String {
        let mut out = format!("{LOG_HEADER}\n");
        for entry in &self.entries {
            out.push_str(&entry.to_string());
            out.push('\n');
        }
        out
    }
}
