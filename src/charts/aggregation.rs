//! Summarising transactions into per-category totals.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{Category, CategoryId, Transaction, round_to_cents};

/// The total of one category in a breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartDataPoint {
    /// The name of the category.
    pub label: String,
    /// The sum of the category's transaction amounts, rounded to cents.
    pub value: f64,
    /// The color of the category as a hex string.
    pub color: String,
    /// The share of the breakdown total in percent, 0 if the total is 0.
    pub percentage: f64,
}

/// Group `transactions` by category and sum their amounts.
///
/// Transactions whose category is not in `categories` are left out and do
/// not count towards the total. The points are sorted by value, largest
/// first, with ties kept in the order each category first appears in
/// `transactions`.
pub fn breakdown(transactions: &[Transaction], categories: &[Category]) -> Vec<ChartDataPoint> {
    let categories_by_id: HashMap<CategoryId, &Category> = categories
        .iter()
        .map(|category| (category.id, category))
        .collect();

    let mut sums: Vec<(&Category, f64)> = Vec::new();
    let mut index_by_id: HashMap<CategoryId, usize> = HashMap::new();

    for transaction in transactions {
        let Some(category) = categories_by_id.get(&transaction.category_id) else {
            continue;
        };

        match index_by_id.get(&transaction.category_id) {
            Some(&index) => sums[index].1 += transaction.amount,
            None => {
                index_by_id.insert(transaction.category_id, sums.len());
                sums.push((category, transaction.amount));
            }
        }
    }

    let total: f64 = sums.iter().map(|(_, sum)| sum).sum();

    let mut points: Vec<ChartDataPoint> = sums
        .into_iter()
        .map(|(category, sum)| ChartDataPoint {
            label: category.name.to_string(),
            value: round_to_cents(sum),
            color: category.color.to_string(),
            percentage: if total == 0.0 {
                0.0
            } else {
                sum / total * 100.0
            },
        })
        .collect();

    // `sort_by` is stable, so ties keep their first appearance order.
    points.sort_by(|a, b| b.value.total_cmp(&a.value));

    points
}

/// The sum of the values in a breakdown, rounded to cents.
pub fn total(points: &[ChartDataPoint]) -> f64 {
    round_to_cents(points.iter().map(|point| point.value).sum())
}

/// A breakdown split into parallel columns, the shape chart libraries expect.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    /// The category names.
    pub labels: Vec<String>,
    /// The category totals.
    pub values: Vec<f64>,
    /// The category colors.
    pub colors: Vec<String>,
}

impl From<&[ChartDataPoint]> for ChartSeries {
    fn from(points: &[ChartDataPoint]) -> Self {
        let mut series = ChartSeries::default();

        for point in points {
            series.labels.push(point.label.clone());
            series.values.push(point.value);
            series.colors.push(point.color.clone());
        }

        series
    }
}

impl ChartSeries {
    /// Whether there is nothing to plot.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
