use super::super::domain::Category;
use super::aggregate::CategoryAverages;

/// Contribution of a category in whole percentage points. Managerial skills are display-only.
const fn weight_percent(category: Category) -> Option<u32> {
    match category {
        Category::JobKnowledge => Some(20),
        Category::QualityOfWork => Some(20),
        Category::Adaptability => Some(10),
        Category::Teamwork => Some(10),
        Category::Reliability => Some(5),
        Category::EthicalBehavior => Some(5),
        Category::CustomerService => Some(30),
        Category::ManagerialSkills => None,
    }
}

/// Contribution of a category to the overall score, as a fraction of 1.0.
pub fn category_weight(category: Category) -> Option<f64> {
    weight_percent(category).map(|percent| f64::from(percent) / 100.0)
}

/// Percentage points carried by the weighted categories present in `averages`.
fn applied_percent_total(averages: &CategoryAverages) -> u32 {
    averages
        .iter()
        .filter_map(|(category, _)| weight_percent(category))
        .sum()
}

/// Weight a category actually carries once the present weights are scaled to sum to 1.0.
pub(crate) fn effective_weight(category: Category, averages: &CategoryAverages) -> Option<f64> {
    let total = applied_percent_total(averages);
    let percent = weight_percent(category)?;
    if total == 0 || averages.get(category).is_none() {
        return None;
    }
    Some(f64::from(percent) / f64::from(total))
}

/// Slack for ties that land a few ulps below the half after non-integer averages.
const TIE_TOLERANCE: f64 = 1e-9;

/// Weighted overall score over the categories present, rounded half-up to one decimal.
///
/// Categories absent from `averages` are treated as not scored and the remaining weights
/// are renormalized, so a Head Office sheet without customer service is still out of 5.
/// Nothing scored yields `0.0`.
pub fn overall_score(averages: &CategoryAverages) -> f64 {
    let total = applied_percent_total(averages);
    if total == 0 {
        return 0.0;
    }

    // Whole percentage points keep integer averages exact, so 2.95 stays a tie.
    let weighted: f64 = averages
        .iter()
        .filter_map(|(category, average)| {
            weight_percent(category).map(|percent| f64::from(percent) * average)
        })
        .sum();

    round_half_up(weighted * 10.0 / f64::from(total)) / 10.0
}

pub fn round_to_tenth(score: f64) -> f64 {
    round_half_up(score * 10.0) / 10.0
}

// Inputs are non-negative, where `round` (half away from zero) is half-up.
fn round_half_up(tenths: f64) -> f64 {
    (tenths + TIE_TOLERANCE).round()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform(value: f64, categories: &[Category]) -> CategoryAverages {
        categories.iter().map(|category| (*category, value)).collect()
    }

    const WEIGHTED: [Category; 7] = [
        Category::JobKnowledge,
        Category::QualityOfWork,
        Category::Adaptability,
        Category::Teamwork,
        Category::Reliability,
        Category::EthicalBehavior,
        Category::CustomerService,
    ];

    #[test]
    fn full_weight_table_sums_to_one() {
        let total: f64 = Category::ordered()
            .into_iter()
            .filter_map(category_weight)
            .sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn uniform_averages_score_to_themselves() {
        assert_eq!(overall_score(&uniform(5.0, &WEIGHTED)), 5.0);
        assert_eq!(overall_score(&uniform(3.0, &WEIGHTED)), 3.0);
        assert_eq!(overall_score(&uniform(2.0, &WEIGHTED)), 2.0);
    }

    #[test]
    fn nothing_scored_is_zero_not_an_error() {
        assert_eq!(overall_score(&CategoryAverages::new()), 0.0);
        assert_eq!(overall_score(&uniform(0.0, &WEIGHTED)), 0.0);
    }

    #[test]
    fn managerial_skills_do_not_move_the_overall() {
        let mut averages = uniform(4.0, &WEIGHTED);
        let baseline = overall_score(&averages);
        averages.insert(Category::ManagerialSkills, 1.0);
        assert_eq!(overall_score(&averages), baseline);
    }

    #[test]
    fn weights_are_renormalized_without_customer_service() {
        let averages = uniform(4.0, &WEIGHTED[..6]);
        assert_eq!(overall_score(&averages), 4.0);

        let total: f64 = WEIGHTED[..6]
            .iter()
            .filter_map(|category| effective_weight(*category, &averages))
            .sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert_eq!(effective_weight(Category::CustomerService, &averages), None);
    }

    #[test]
    fn mixed_averages_follow_the_linear_combination() {
        let averages: CategoryAverages = [
            (Category::JobKnowledge, 4.0),
            (Category::QualityOfWork, 3.0),
            (Category::Adaptability, 5.0),
            (Category::Teamwork, 4.0),
            (Category::Reliability, 2.0),
            (Category::EthicalBehavior, 5.0),
            (Category::CustomerService, 3.0),
        ]
        .into_iter()
        .collect();

        // 0.8 + 0.6 + 0.5 + 0.4 + 0.1 + 0.25 + 0.9 = 3.55
        assert_eq!(overall_score(&averages), 3.6);
    }

    #[test]
    fn overall_is_independent_of_insertion_order() {
        let pairs = [
            (Category::CustomerService, 2.4),
            (Category::JobKnowledge, 4.666),
            (Category::Teamwork, 3.0),
            (Category::QualityOfWork, 3.8),
            (Category::EthicalBehavior, 5.0),
            (Category::Adaptability, 1.333),
            (Category::Reliability, 4.25),
        ];
        let forward: CategoryAverages = pairs.into_iter().collect();
        let reversed: CategoryAverages = pairs.into_iter().rev().collect();
        assert_eq!(overall_score(&forward), overall_score(&reversed));
    }

    #[test]
    fn rounding_is_stable_when_reapplied() {
        for tenths in 0..=50 {
            let score = f64::from(tenths) / 10.0;
            assert_eq!(round_to_tenth(round_to_tenth(score)), round_to_tenth(score));
        }
        assert_eq!(round_to_tenth(3.25), 3.3);
        assert_eq!(round_to_tenth(2.449), 2.4);
        assert_eq!(round_to_tenth(2.95 - 1e-12), 3.0);
    }

    #[test]
    fn integer_averages_round_half_up_exactly() {
        // Exact percentage-point sums, rounded half-up to tenths in integer arithmetic.
        let mut values = [1u32; 7];
        loop {
            let averages: CategoryAverages = WEIGHTED
                .iter()
                .zip(values)
                .map(|(category, value)| (*category, f64::from(value)))
                .collect();
            let points: u32 = WEIGHTED
                .iter()
                .zip(values)
                .filter_map(|(category, value)| weight_percent(*category).map(|p| p * value))
                .sum();
            let expected = f64::from((points + 5) / 10) / 10.0;
            assert_eq!(overall_score(&averages), expected, "{values:?}");

            let head_office: CategoryAverages = averages
                .iter()
                .filter(|(category, _)| *category != Category::CustomerService)
                .collect();
            let head_office_points = points - 30 * values[6];
            let expected = f64::from((2 * head_office_points + 7) / 14) / 10.0;
            assert_eq!(overall_score(&head_office), expected, "{values:?} head office");

            let Some(slot) = values.iter().position(|value| *value < 5) else {
                break;
            };
            values[slot] += 1;
            values[..slot].iter_mut().for_each(|value| *value = 1);
        }
    }
}
