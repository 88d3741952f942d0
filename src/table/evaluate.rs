// src/table/evaluate.rs
// Thresholded predictions against ground-truth labels

use crate::error::{FixtrailError, Result};
use crate::table::{JoinKind, KEY_COLUMN, PROBABILITY_COLUMN, Table, join};
use std::fmt;

/// Probability at or above which a commit counts as a predicted bug fix
pub const DEFAULT_THRESHOLD: f64 = 0.95;

/// False negatives listed in the report
const LISTED_FALSE_NEGATIVES: usize = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Predictions with probability exactly 1.0, split by true label
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CertainPredictions {
    pub total: usize,
    pub correct: usize,
    pub incorrect: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub threshold: f64,
    /// `confusion[true][predicted]` for classes 0 and 1
    pub confusion: [[usize; 2]; 2],
    pub classes: [ClassMetrics; 2],
    pub accuracy: f64,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
    pub false_negative_count: usize,
    /// First false negatives in table order, `(commit_hash, probability)`
    pub false_negatives: Vec<(String, f64)>,
    pub certain: CertainPredictions,
}

impl Evaluation {
    pub fn total(&self) -> usize {
        self.confusion.iter().flatten().sum()
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

fn f1(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}

fn parse_label(table: &Table, row: usize, value: &str) -> Result<usize> {
    match value.trim().parse::<f64>() {
        Ok(v) if v == 0.0 => Ok(0),
        Ok(v) if v == 1.0 => Ok(1),
        _ => Err(FixtrailError::InvalidInput(format!(
            "{}: row {} label must be 0 or 1, got '{value}'",
            table.name(),
            row + 1
        ))),
    }
}

/// Join predictions with labels on commit_hash and score them at `threshold`
pub fn evaluate(labels: &Table, predictions: &Table, threshold: f64) -> Result<Evaluation> {
    let labels = labels.select(&[KEY_COLUMN, "label"])?;
    let predictions = predictions.select(&[KEY_COLUMN, PROBABILITY_COLUMN])?;
    let joined = join(&predictions, &labels, KEY_COLUMN, JoinKind::Inner)?;

    let mut confusion = [[0usize; 2]; 2];
    let mut false_negatives = Vec::new();
    let mut false_negative_count = 0;
    let mut certain = CertainPredictions::default();

    for (i, row) in joined.rows().iter().enumerate() {
        let probability = row[1]
            .trim()
            .parse::<f64>()
            .map_err(|_| joined.bad_cell(i, PROBABILITY_COLUMN, &row[1]))?;
        let truth = parse_label(&joined, i, &row[2])?;
        let predicted = usize::from(probability >= threshold);
        confusion[truth][predicted] += 1;

        if truth == 1 && predicted == 0 {
            false_negative_count += 1;
            if false_negatives.len() < LISTED_FALSE_NEGATIVES {
                false_negatives.push((row[0].clone(), probability));
            }
        }

        if probability == 1.0 {
            certain.total += 1;
            if truth == 1 {
                certain.correct += 1;
            } else {
                certain.incorrect += 1;
            }
        }
    }

    let mut classes = [ClassMetrics::default(); 2];
    for (class, metrics) in classes.iter_mut().enumerate() {
        let other = 1 - class;
        let tp = confusion[class][class];
        let predicted = tp + confusion[other][class];
        let support = tp + confusion[class][other];
        let precision = ratio(tp, predicted);
        let recall = ratio(tp, support);
        *metrics = ClassMetrics {
            precision,
            recall,
            f1: f1(precision, recall),
            support,
        };
    }

    let total = classes[0].support + classes[1].support;
    let macro_avg = ClassMetrics {
        precision: (classes[0].precision + classes[1].precision) / 2.0,
        recall: (classes[0].recall + classes[1].recall) / 2.0,
        f1: (classes[0].f1 + classes[1].f1) / 2.0,
        support: total,
    };
    let weight = |pick: fn(&ClassMetrics) -> f64| {
        classes.iter().map(|c| pick(c) * c.support as f64).sum::<f64>() / total.max(1) as f64
    };
    let weighted_avg = ClassMetrics {
        precision: weight(|c| c.precision),
        recall: weight(|c| c.recall),
        f1: weight(|c| c.f1),
        support: total,
    };

    Ok(Evaluation {
        threshold,
        confusion,
        classes,
        accuracy: ratio(confusion[0][0] + confusion[1][1], total),
        macro_avg,
        weighted_avg,
        false_negative_count,
        false_negatives,
        certain,
    })
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Confusion Matrix (threshold {}) ===", self.threshold)?;
        writeln!(f, "{:>12} {:>8} {:>8}", "", "pred 0", "pred 1")?;
        for (class, row) in self.confusion.iter().enumerate() {
            writeln!(f, "{:>12} {:>8} {:>8}", format!("true {class}"), row[0], row[1])?;
        }

        writeln!(f)?;
        writeln!(f, "=== Classification Report ===")?;
        writeln!(f, "{:>12} {:>9} {:>9} {:>9} {:>9}", "", "precision", "recall", "f1-score", "support")?;
        for (class, m) in self.classes.iter().enumerate() {
            writeln!(
                f,
                "{:>12} {:>9.3} {:>9.3} {:>9.3} {:>9}",
                class, m.precision, m.recall, m.f1, m.support
            )?;
        }
        writeln!(f, "{:>12} {:>9} {:>9} {:>9.3} {:>9}", "accuracy", "", "", self.accuracy, self.total())?;
        for (name, m) in [("macro avg", &self.macro_avg), ("weighted avg", &self.weighted_avg)] {
            writeln!(
                f,
                "{:>12} {:>9.3} {:>9.3} {:>9.3} {:>9}",
                name, m.precision, m.recall, m.f1, m.support
            )?;
        }

        writeln!(f)?;
        writeln!(
            f,
            "False negatives (true bug fix, predicted non-bug fix): {}",
            self.false_negative_count
        )?;
        for (hash, probability) in &self.false_negatives {
            writeln!(f, "  {hash}  {probability:.6}")?;
        }

        writeln!(f)?;
        writeln!(f, "=== Predictions with probability 1.0 ===")?;
        writeln!(f, "Commits:                       {}", self.certain.total)?;
        writeln!(f, "Correctly labeled (label=1):   {}", self.certain.correct)?;
        write!(f, "Incorrectly labeled (label=0): {}", self.certain.incorrect)
    }
}
