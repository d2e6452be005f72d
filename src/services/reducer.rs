//! Reduce analysis occurrences to the latest web-scan occurrence per analysis.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::models::analysis::AnalysisOccurrence;

/// Latest occurrence per `analysis_id`, in first-seen order.
#[derive(Debug, Default)]
pub struct LatestOccurrences {
    entries: Vec<AnalysisOccurrence>,
    index: HashMap<String, usize>,
}

impl LatestOccurrences {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[cfg(test)]
    fn get(&self, analysis_id: &str) -> Option<&AnalysisOccurrence> {
        self.index.get(analysis_id).map(|&i| &self.entries[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &AnalysisOccurrence> {
        self.entries.iter()
    }

    pub fn into_occurrence_ids(self) -> Vec<String> {
        self.entries
            .into_iter()
            .map(|o| o.analysis_occurrence_id)
            .collect()
    }

    fn offer(&mut self, occurrence: AnalysisOccurrence) {
        match self.index.get(&occurrence.analysis_id) {
            Some(&i) => {
                if compare_end_dates(&occurrence, &self.entries[i]) == Ordering::Greater {
                    self.entries[i] = occurrence;
                }
            }
            None => {
                self.index
                    .insert(occurrence.analysis_id.clone(), self.entries.len());
                self.entries.push(occurrence);
            }
        }
    }
}

/// Recency comparator on `actual_end_date`.
///
/// ISO-8601 strings in the same offset order lexicographically the same as
/// chronologically. A missing end date sorts before any present one.
pub fn compare_end_dates(a: &AnalysisOccurrence, b: &AnalysisOccurrence) -> Ordering {
    a.actual_end_date.cmp(&b.actual_end_date)
}

/// Single pass: keep web scans only, replacing an analysis' entry only on a
/// strictly later end date.
pub fn reduce<I>(occurrences: I) -> LatestOccurrences
where
    I: IntoIterator<Item = AnalysisOccurrence>,
{
    let mut latest = LatestOccurrences::default();
    for occurrence in occurrences.into_iter().filter(|o| o.is_web_scan()) {
        latest.offer(occurrence);
    }
    latest
}
