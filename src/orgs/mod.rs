// src/orgs/mod.rs
pub mod source;

use serde::Deserialize;

use crate::config::CategoryConfig;

/// One row of an organization list, as read. Either cell may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OrganizationRow {
    #[serde(rename = "Organization")]
    pub organization: Option<String>,
    #[serde(rename = "Category")]
    pub category: Option<String>,
}

impl OrganizationRow {
    #[cfg(test)]
    pub fn new(organization: &str, category: &str) -> Self {
        Self {
            organization: Some(organization.to_string()),
            category: Some(category.to_string()),
        }
    }
}

/// An in-scope organization with its review flag decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizationRecord {
    pub name: String,
    pub category: String,
    pub review_flag: bool,
}

/// Decides which organizations are looked up and which get flagged.
#[derive(Debug, Clone)]
pub struct OrganizationClassifier {
    categories: CategoryConfig,
}

impl OrganizationClassifier {
    pub fn new(categories: CategoryConfig) -> Self {
        Self { categories }
    }

    /// Keeps rows whose category is relevant or the review category, in input
    /// order. Rows without a usable organization name are skipped.
    pub fn classify<I>(&self, rows: I) -> Vec<OrganizationRecord>
    where
        I: IntoIterator<Item = OrganizationRow>,
    {
        let mut kept = Vec::new();
        let mut excluded = 0usize;
        let mut unnamed = 0usize;

        for row in rows {
            let category = row.category.as_deref().unwrap_or_default();
            let review_flag = category == self.categories.review;
            let relevant = self.categories.relevant.iter().any(|c| c == category);
            if !(relevant || review_flag) {
                excluded += 1;
                continue;
            }

            let Some(name) = row
                .organization
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
            else {
                unnamed += 1;
                continue;
            };

            kept.push(OrganizationRecord {
                name: name.to_string(),
                category: category.to_string(),
                review_flag,
            });
        }

        tracing::info!(
            "Classified organizations: {} kept, {} out of scope, {} without a name",
            kept.len(),
            excluded,
            unnamed
        );
        kept
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_misc_is_flagged_and_other_categories_excluded() {
        let classifier = OrganizationClassifier::new(CategoryConfig::default());
        let rows = vec![
            OrganizationRow::new("A", "Misc"),
            OrganizationRow::new("B", "Theater"),
            OrganizationRow::new("C", "Sports"),
        ];
        let records = classifier.classify(rows);
        assert_eq!(
            records,
            vec![
                OrganizationRecord { name: "A".into(), category: "Misc".into(), review_flag: true },
                OrganizationRecord { name: "B".into(), category: "Theater".into(), review_flag: false },
            ]
        );
    }

    #[test]
    fn test_all_relevant_categories_are_kept_in_order() {
        let classifier = OrganizationClassifier::new(CategoryConfig::default());
        let rows: Vec<_> = CategoryConfig::default()
            .relevant
            .iter()
            .enumerate()
            .map(|(i, c)| OrganizationRow::new(&format!("Org {}", i), c))
            .collect();
        let records = classifier.classify(rows);
        assert_eq!(records.len(), 6);
        assert!(records.iter().all(|r| !r.review_flag));
        assert_eq!(records[0].name, "Org 0");
        assert_eq!(records[5].name, "Org 5");
    }

    #[test]
    fn test_unnamed_rows_are_skipped() {
        let classifier = OrganizationClassifier::new(CategoryConfig::default());
        let rows = vec![
            OrganizationRow { organization: None, category: Some("Museums".into()) },
            OrganizationRow::new("   ", "Tours"),
            OrganizationRow { organization: Some("No Category".into()), category: None },
            OrganizationRow::new("Also Kept", "Tours"),
        ];
        let records = classifier.classify(rows);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Also Kept");
    }

    #[test]
    fn test_category_match_is_exact() {
        let classifier = OrganizationClassifier::new(CategoryConfig::default());
        let records = classifier.classify(vec![
            OrganizationRow::new("Lower", "theater"),
            OrganizationRow::new("Padded", " Museums "),
            OrganizationRow::new("Padded Misc", " Misc "),
            OrganizationRow::new("Exact", "Museums"),
        ]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Exact");
        assert!(!records[0].review_flag);
    }

    #[test]
    fn test_custom_categories() {
        let classifier = OrganizationClassifier::new(CategoryConfig {
            relevant: vec!["Concerts".into()],
            review: "Unsure".into(),
        });
        let records = classifier.classify(vec![
            OrganizationRow::new("Hall", "Concerts"),
            OrganizationRow::new("Stage", "Theater"),
            OrganizationRow::new("Shed", "Unsure"),
        ]);
        let flags: Vec<_> = records.iter().map(|r| (r.name.as_str(), r.review_flag)).collect();
        assert_eq!(flags, vec![("Hall", false), ("Shed", true)]);
    }
}
