// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Free-text and category filtering of the record set.
//!
//! Filtering is a pure function of its inputs. Output keeps source order and
//! there is no ranking or fuzzy matching.

use crate::record::{LocationRecord, RecordId};

/// Current filter inputs. Empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    /// Free-text query, matched case-insensitively.
    pub query: String,
    /// Exact, case-sensitive category name.
    pub category: String,
}

impl Filter {
    #[must_use]
    pub fn new(query: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            category: category.into(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.query.is_empty() && self.category.is_empty()
    }
}

/// Ids of the records passing `filter`, in source order.
#[must_use]
pub fn filter_records(records: &[LocationRecord], filter: &Filter) -> Vec<RecordId> {
    let needle = filter.query.to_lowercase();
    records
        .iter()
        .enumerate()
        .filter(|(_, r)| needle.is_empty() || r.search_text().contains(&needle))
        .filter(|(_, r)| filter.category.is_empty() || r.category == filter.category)
        .map(|(id, _)| id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(name: &str, category: &str, description: &str) -> LocationRecord {
        LocationRecord {
            name: name.to_string(),
            category: category.to_string(),
            description: description.to_string(),
            lat: 0.0,
            lng: 0.0,
            image: None,
        }
    }

    fn sample() -> Vec<LocationRecord> {
        vec![
            rec("Harbor Light", "Landmark", "Old lighthouse on the pier"),
            rec("Bean There", "Cafe", "Espresso and pastries"),
            rec("City Museum", "Museum", "Local history"),
            rec("Lighthouse Cafe", "Cafe", "Coffee with a view"),
            rec("Night Owl", "cafe", "Late opening"),
        ]
    }

    #[test]
    fn test_empty_filter_returns_everything_in_order() {
        let records = sample();
        assert_eq!(filter_records(&records, &Filter::default()), vec![0, 1, 2, 3, 4]);
        assert!(filter_records(&[], &Filter::default()).is_empty());
    }

    #[test]
    fn test_category_is_exact_and_case_sensitive() {
        let records = sample();
        let ids = filter_records(&records, &Filter::new("", "Cafe"));
        assert_eq!(ids, vec![1, 3]);
        assert!(ids.iter().all(|&id| records[id].category == "Cafe"));
        assert_eq!(filter_records(&records, &Filter::new("", "cafe")), vec![4]);
        assert!(filter_records(&records, &Filter::new("", "Caf")).is_empty());
    }

    #[test]
    fn test_query_is_case_insensitive_substring() {
        let records = sample();
        assert_eq!(filter_records(&records, &Filter::new("LIGHT", "")), vec![0, 3]);
        // matches description and category too
        assert_eq!(filter_records(&records, &Filter::new("history", "")), vec![2]);
        assert_eq!(filter_records(&records, &Filter::new("museum", "")), vec![2]);
    }

    #[test]
    fn test_query_matches_only_concatenated_text() {
        let records = sample();
        for query in ["light", "cafe", "o", "xyz", "pier"] {
            let ids = filter_records(&records, &Filter::new(query, ""));
            for (id, r) in records.iter().enumerate() {
                let haystack =
                    format!("{}{}{}", r.name, r.category, r.description).to_lowercase();
                assert_eq!(ids.contains(&id), haystack.contains(&query.to_lowercase()));
            }
        }
    }

    #[test]
    fn test_query_and_category_combine() {
        let records = sample();
        assert_eq!(filter_records(&records, &Filter::new("light", "Cafe")), vec![3]);
        assert!(filter_records(&records, &Filter::new("espresso", "Museum")).is_empty());
    }

    #[test]
    fn test_query_whitespace_is_significant() {
        let records = vec![
            rec("Harbor Light", "Landmark", "Old pier"),
            rec("Lighthouse", "Cafe", "x"),
        ];
        // "lighthousecafex" has no " light"
        assert_eq!(filter_records(&records, &Filter::new(" light", "")), vec![0]);
        assert!(filter_records(&records, &Filter::new("   ", "")).is_empty());
        assert!(!Filter::new("  ", "").is_empty());
        assert!(!Filter::new("", "Cafe").is_empty());
        assert!(Filter::default().is_empty());
    }
}
