// src/features/message.rs
// Trailer counting over commit messages

use crate::config::{FeatureTables, Trailer};
use serde::Serialize;

/// Trailer line counts for one message
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TrailerCounts {
    pub signed_off: u32,
    pub reviewed_by: u32,
    pub tested_by: u32,
    pub reported_by: u32,
    pub acked_by: u32,
    pub cc: u32,
    pub link: u32,
    pub by_sum: u32,
}

impl TrailerCounts {
    pub fn get(&self, trailer: Trailer) -> u32 {
        match trailer {
            Trailer::SignedOff => self.signed_off,
            Trailer::ReviewedBy => self.reviewed_by,
            Trailer::TestedBy => self.tested_by,
            Trailer::ReportedBy => self.reported_by,
            Trailer::AckedBy => self.acked_by,
            Trailer::Cc => self.cc,
            Trailer::Link => self.link,
        }
    }

    fn increment(&mut self, trailer: Trailer) {
        let slot = match trailer {
            Trailer::SignedOff => &mut self.signed_off,
            Trailer::ReviewedBy => &mut self.reviewed_by,
            Trailer::TestedBy => &mut self.tested_by,
            Trailer::ReportedBy => &mut self.reported_by,
            Trailer::AckedBy => &mut self.acked_by,
            Trailer::Cc => &mut self.cc,
            Trailer::Link => &mut self.link,
        };
        *slot += 1;
        self.by_sum += 1;
    }
}

/// Case-insensitive prefix matcher for the seven trailer tags
#[derive(Debug, Clone)]
pub struct MessageAnalyzer {
    prefixes: Vec<(Trailer, String)>,
}

impl MessageAnalyzer {
    pub fn new(tables: &FeatureTables) -> Self {
        let prefixes = tables
            .trailer_prefixes()
            .into_iter()
            .map(|(trailer, prefix)| (trailer, prefix.to_lowercase()))
            .collect();
        Self { prefixes }
    }

    /// Count trailer lines; each line counts toward at most one tag
    pub fn analyze(&self, message: &str) -> TrailerCounts {
        let mut counts = TrailerCounts::default();

        for line in message.lines() {
            let line = line.trim().to_lowercase();
            if let Some((trailer, _)) = self
                .prefixes
                .iter()
                .find(|(_, prefix)| line.starts_with(prefix.as_str()))
            {
                counts.increment(*trailer);
            }
        }

        counts
    }
}

impl Default for MessageAnalyzer {
    fn default() -> Self {
        Self::new(&FeatureTables::default())
    }
}
