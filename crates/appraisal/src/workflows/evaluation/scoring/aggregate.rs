use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::super::domain::{Category, Rating, RatingSheet, ReviewContext};

/// Mean of the rated slots. Unrated slots are ignored; nothing rated yields `0.0`.
///
/// Unrounded; rounding happens once, on the overall score.
pub fn category_average(scores: &[Option<Rating>]) -> f64 {
    let (sum, count) = scores
        .iter()
        .flatten()
        .fold((0u32, 0u32), |(sum, count), rating| {
            (sum + u32::from(rating.value()), count + 1)
        });

    if count == 0 {
        0.0
    } else {
        f64::from(sum) / f64::from(count)
    }
}

/// Per-category averages keyed by category, so iteration order never depends on insertion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryAverages(BTreeMap<Category, f64>);

impl CategoryAverages {
    pub fn new() -> Self {
        Self::default()
    }

    /// Average every category that applies to the context.
    pub fn from_sheet(sheet: &RatingSheet, context: ReviewContext) -> Self {
        Category::ordered()
            .into_iter()
            .filter(|category| category.applies_to(context))
            .map(|category| (category, category_average(&sheet.scores(category))))
            .collect()
    }

    pub fn insert(&mut self, category: Category, average: f64) -> Option<f64> {
        self.0.insert(category, average)
    }

    pub fn get(&self, category: Category) -> Option<f64> {
        self.0.get(&category).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, f64)> + '_ {
        self.0.iter().map(|(category, average)| (*category, *average))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(Category, f64)> for CategoryAverages {
    fn from_iter<I: IntoIterator<Item = (Category, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
