// src/table/tools.rs
// Tool mentions among high and low scoring predictions

use crate::error::Result;
use crate::labels::ToolMatcher;
use crate::table::{PROBABILITY_COLUMN, Table};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use std::fmt;
use tracing::warn;

pub const DEFAULT_SAMPLES: usize = 100;
pub const DEFAULT_HIGH: f64 = 0.9;
pub const DEFAULT_LOW: f64 = 0.5;
pub const DEFAULT_SEED: u64 = 42;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupMentions {
    /// Rows that fell into the group before sampling
    pub available: usize,
    pub sampled: usize,
    pub mentions: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToolMentionReport {
    pub high_threshold: f64,
    pub low_threshold: f64,
    /// probability >= high
    pub high: GroupMentions,
    /// probability < low
    pub low: GroupMentions,
}

/// Sample up to `samples` messages from each group and count tool mentions.
///
/// Rows without a probability are ignored and missing messages count as empty.
/// The same seed over the same table always draws the same rows.
pub fn tool_mentions(
    table: &Table,
    matcher: &ToolMatcher,
    samples: usize,
    high: f64,
    low: f64,
    seed: u64,
) -> Result<ToolMentionReport> {
    let messages = table.column("message")?;
    let probabilities = table.numeric_column(PROBABILITY_COLUMN)?;

    let mut high_group = Vec::new();
    let mut low_group = Vec::new();
    for (message, probability) in messages.iter().zip(&probabilities) {
        match probability {
            Some(p) if *p >= high => high_group.push(*message),
            Some(p) if *p < low => low_group.push(*message),
            _ => {}
        }
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut count = |group: &[&str], name: &str| {
        if group.len() < samples {
            warn!(group = name, available = group.len(), samples, "Group smaller than sample size, using all rows");
        }
        let drawn: Vec<&&str> = group.choose_multiple(&mut rng, samples).collect();
        GroupMentions {
            available: group.len(),
            sampled: drawn.len(),
            mentions: drawn.iter().filter(|m| matcher.mentions_tool(m)).count(),
        }
    };

    let high_mentions = count(&high_group, "high");
    let low_mentions = count(&low_group, "low");

    Ok(ToolMentionReport {
        high_threshold: high,
        low_threshold: low,
        high: high_mentions,
        low: low_mentions,
    })
}

impl fmt::Display for ToolMentionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Tool Mention Analysis ===")?;
        writeln!(f, "HIGH group (probability >= {}):", self.high_threshold)?;
        writeln!(
            f,
            "{} of {} messages mention known tools.",
            self.high.mentions, self.high.sampled
        )?;
        writeln!(f)?;
        writeln!(f, "LOW group (probability < {}):", self.low_threshold)?;
        write!(
            f,
            "{} of {} messages mention known tools.",
            self.low.mentions, self.low.sampled
        )
    }
}
