//! Pure aggregation of production rows into the dashboard KPIs. No I/O here;
//! everything is recomputed from scratch on each request.

use std::collections::BTreeMap;

use crate::models::ProductionRow;

/// Target weight in grams a chick must reach to count as passing.
pub const TARGET_WEIGHT: f64 = 1000.0;

#[derive(Debug, Clone, PartialEq)]
pub struct BreedStat {
    pub breed: String,
    pub count: usize,
    pub avg_weight: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FarmStat {
    pub farm: String,
    pub count: usize,
    pub avg_weight: f64,
}

#[derive(Debug, Clone)]
pub struct ProductionReport {
    pub total_count: usize,
    pub pass_count: usize,
    /// Percentage of passing rows, rounded to one decimal. Zero for an empty
    /// row set.
    pub pass_rate: f64,
    /// Per-breed share and mean weight, largest breed first.
    pub breed_stats: Vec<BreedStat>,
    /// Per-farm mean weight and row count, sorted by farm name.
    pub farm_stats: Vec<FarmStat>,
}

impl ProductionReport {
    pub fn from_rows(rows: &[ProductionRow]) -> Self {
        let total_count = rows.len();
        let pass_count = rows.iter().filter(|r| r.weight() >= TARGET_WEIGHT).count();
        let pass_rate = if total_count > 0 {
            (pass_count as f64 / total_count as f64 * 1000.0).round() / 10.0
        } else {
            0.0
        };

        let mut by_breed: BTreeMap<&str, (usize, f64)> = BTreeMap::new();
        let mut by_farm: BTreeMap<&str, (usize, f64)> = BTreeMap::new();
        for row in rows {
            let breed = by_breed.entry(row.breeds.as_str()).or_insert((0, 0.0));
            breed.0 += 1;
            breed.1 += row.weight();

            let farm = by_farm.entry(row.farm.as_str()).or_insert((0, 0.0));
            farm.0 += 1;
            farm.1 += row.weight();
        }

        let mut breed_stats: Vec<BreedStat> = by_breed
            .into_iter()
            .map(|(breed, (count, sum))| BreedStat {
                breed: breed.to_string(),
                count,
                avg_weight: sum / count as f64,
            })
            .collect();
        // Largest share first; the BTreeMap already broke count ties by name.
        breed_stats.sort_by(|a, b| b.count.cmp(&a.count));

        let farm_stats: Vec<FarmStat> = by_farm
            .into_iter()
            .map(|(farm, (count, sum))| FarmStat {
                farm: farm.to_string(),
                count,
                avg_weight: sum / count as f64,
            })
            .collect();

        Self {
            total_count,
            pass_count,
            pass_rate,
            breed_stats,
            farm_stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(chick_no: i64, breeds: &str, farm: &str, raw_weight: Option<f64>) -> ProductionRow {
        ProductionRow {
            chick_no,
            breeds: breeds.to_string(),
            gender: "F".to_string(),
            farm: farm.to_string(),
            raw_weight,
            prod_date: None,
        }
    }

    #[test]
    fn pass_rate_counts_rows_at_or_above_target() {
        let rows = vec![
            row(1, "ross", "A", Some(0.0)),
            row(2, "ross", "A", Some(999.0)),
            row(3, "cobb", "B", Some(1000.0)),
            row(4, "cobb", "B", Some(1500.0)),
        ];
        let report = ProductionReport::from_rows(&rows);

        assert_eq!(report.total_count, 4);
        assert_eq!(report.pass_count, 2);
        assert_eq!(report.pass_rate, 50.0);
    }

    #[test]
    fn pass_rate_rounds_to_one_decimal() {
        let rows = vec![
            row(1, "ross", "A", Some(1200.0)),
            row(2, "ross", "A", Some(800.0)),
            row(3, "ross", "A", Some(700.0)),
        ];
        let report = ProductionReport::from_rows(&rows);

        // 1/3 = 33.333... -> 33.3
        assert_eq!(report.pass_rate, 33.3);
    }

    #[test]
    fn empty_row_set_has_zero_pass_rate() {
        let report = ProductionReport::from_rows(&[]);

        assert_eq!(report.total_count, 0);
        assert_eq!(report.pass_count, 0);
        assert_eq!(report.pass_rate, 0.0);
        assert!(report.breed_stats.is_empty());
        assert!(report.farm_stats.is_empty());
    }

    #[test]
    fn missing_weight_counts_as_zero() {
        let rows = vec![
            row(1, "ross", "A", None),
            row(2, "ross", "A", Some(2000.0)),
        ];
        let report = ProductionReport::from_rows(&rows);

        assert_eq!(report.pass_count, 1);
        assert_eq!(report.farm_stats[0].avg_weight, 1000.0);
    }

    #[test]
    fn breeds_are_ordered_by_descending_count() {
        let rows = vec![
            row(1, "ross", "A", Some(100.0)),
            row(2, "cobb", "A", Some(100.0)),
            row(3, "cobb", "B", Some(300.0)),
        ];
        let report = ProductionReport::from_rows(&rows);

        assert_eq!(report.breed_stats[0].breed, "cobb");
        assert_eq!(report.breed_stats[0].count, 2);
        assert_eq!(report.breed_stats[0].avg_weight, 200.0);
        assert_eq!(report.breed_stats[1].breed, "ross");
    }

    #[test]
    fn farms_are_ordered_by_name_with_mean_weights() {
        let rows = vec![
            row(1, "ross", "B", Some(500.0)),
            row(2, "ross", "A", Some(1000.0)),
            row(3, "ross", "B", Some(1500.0)),
        ];
        let report = ProductionReport::from_rows(&rows);

        assert_eq!(report.farm_stats.len(), 2);
        assert_eq!(report.farm_stats[0].farm, "A");
        assert_eq!(report.farm_stats[0].avg_weight, 1000.0);
        assert_eq!(report.farm_stats[1].farm, "B");
        assert_eq!(report.farm_stats[1].count, 2);
        assert_eq!(report.farm_stats[1].avg_weight, 1000.0);
    }
}
