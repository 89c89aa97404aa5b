use std::{collections::BTreeMap, fs, path::Path};

use eyre::{Context as _, Result};
use serde::Deserialize;

use crate::model::MemberRow;

pub const UNRANKED: &str = "Unknown";

/// One EHB range mapped to a rank name. `upper` is exclusive; `None`
/// marks the open-ended top range.
#[derive(Clone, Debug, Deserialize)]
pub struct RankThreshold {
    pub lower: f64,
    pub upper: Option<f64>,
    pub name: Box<str>,
}

/// Ordered EHB thresholds, lowest range first.
#[derive(Clone, Debug)]
pub struct RankTable {
    thresholds: Vec<RankThreshold>,
}

impl RankTable {
    /// Loads the table from a JSON file when a path is configured,
    /// otherwise falls back to the built-in tiers.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let bytes = fs::read(path)
            .with_context(|| format!("failed to read rank table {}", path.display()))?;

        let mut thresholds: Vec<RankThreshold> = serde_json::from_slice(&bytes)
            .with_context(|| format!("failed to deserialize rank table {}", path.display()))?;

        thresholds.sort_by(|a, b| a.lower.total_cmp(&b.lower));

        Ok(Self { thresholds })
    }

    pub fn rank_for(&self, ehb: f64) -> &str {
        for threshold in &self.thresholds {
            let matched = match threshold.upper {
                Some(upper) => ehb >= threshold.lower && ehb < upper,
                None => ehb >= threshold.lower,
            };

            if matched {
                return &threshold.name;
            }
        }

        UNRANKED
    }

    /// Rank name to member count, over the given member rows.
    pub fn distribution(&self, members: &[MemberRow]) -> BTreeMap<String, usize> {
        let mut distribution = BTreeMap::new();

        for row in members {
            *distribution
                .entry(self.rank_for(row.ehb).to_owned())
                .or_insert(0) += 1;
        }

        distribution
    }
}

impl Default for RankTable {
    fn default() -> Self {
        let tiers: [(f64, Option<f64>, &str); 7] = [
            (0.0, Some(10.0), "Bronze"),
            (10.0, Some(50.0), "Iron"),
            (50.0, Some(150.0), "Steel"),
            (150.0, Some(300.0), "Mithril"),
            (300.0, Some(600.0), "Adamant"),
            (600.0, Some(1500.0), "Rune"),
            (1500.0, None, "Dragon"),
        ];

        let thresholds = tiers
            .into_iter()
            .map(|(lower, upper, name)| RankThreshold {
                lower,
                upper,
                name: name.into(),
            })
            .collect();

        Self { thresholds }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(ehb: f64) -> MemberRow {
        MemberRow {
            name: "someone".into(),
            role: "Member".into(),
            account_type: "regular".into(),
            exp: 0,
            ehp: 0.0,
            ehb,
        }
    }

    #[test]
    fn range_bounds_are_half_open() {
        let table = RankTable::default();

        assert_eq!(table.rank_for(0.0), "Bronze");
        assert_eq!(table.rank_for(9.99), "Bronze");
        assert_eq!(table.rank_for(10.0), "Iron");
        assert_eq!(table.rank_for(1499.99), "Rune");
        assert_eq!(table.rank_for(1500.0), "Dragon");
        assert_eq!(table.rank_for(99_999.0), "Dragon");
    }

    #[test]
    fn out_of_range_values_are_unranked() {
        let table = RankTable::default();

        assert_eq!(table.rank_for(-1.0), UNRANKED);
    }

    #[test]
    fn distribution_counts_members_per_rank() {
        let table = RankTable::default();
        let members = vec![row(5.0), row(7.0), row(20.0), row(2000.0)];

        let distribution = table.distribution(&members);

        assert_eq!(distribution.get("Bronze"), Some(&2));
        assert_eq!(distribution.get("Iron"), Some(&1));
        assert_eq!(distribution.get("Dragon"), Some(&1));
        assert_eq!(distribution.get("Rune"), None);
    }

    #[test]
    fn table_loads_from_json_file() {
        let root = tempfile::tempdir().unwrap();
        let path = root.path().join("ranks.json");

        fs::write(
            &path,
            r#"[
                {"lower": 100.0, "upper": null, "name": "Elite"},
                {"lower": 0.0, "upper": 100.0, "name": "Regular"}
            ]"#,
        )
        .unwrap();

        let table = RankTable::load(Some(&path)).unwrap();

        assert_eq!(table.rank_for(50.0), "Regular");
        assert_eq!(table.rank_for(150.0), "Elite");
    }
}
