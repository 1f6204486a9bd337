//! Scoreboard scoring.
//!
//! A member's count on a requirement is capped at the cohort's resolved
//! target. Only the part above the requirement's `start_count` scores, at
//! `unit_score` per unit.

use std::collections::BTreeMap;

use dojo_core::{Cohort, Requirement, RequirementProgress, User};
use serde::Serialize;

/// Count toward a requirement, capped at the cohort's target.
pub fn current_count(
    requirement: &Requirement,
    progress: Option<&RequirementProgress>,
    cohort: &Cohort,
) -> i64 {
    let count = progress.map_or(0, |p| p.count_for(cohort));
    count.min(requirement.target_for(cohort))
}

/// Score earned on a requirement.
pub fn current_score(
    requirement: &Requirement,
    progress: Option<&RequirementProgress>,
    cohort: &Cohort,
) -> f64 {
    let above_start = current_count(requirement, progress, cohort) - requirement.start_count;
    above_start.max(0) as f64 * requirement.unit_score
}

/// Completion of one requirement in percent, from `start_count` to the target.
pub fn progress_percent(
    requirement: &Requirement,
    progress: Option<&RequirementProgress>,
    cohort: &Cohort,
) -> f64 {
    let current = current_count(requirement, progress, cohort);
    let target = requirement.target_for(cohort);
    let span = target - requirement.start_count;
    if span <= 0 {
        return if current >= target { 100.0 } else { 0.0 };
    }
    let done = (current - requirement.start_count) as f64 * 100.0 / span as f64;
    done.clamp(0.0, 100.0)
}

/// Score available across `requirements` for a cohort.
pub fn total_score(requirements: &[Requirement], cohort: &Cohort) -> f64 {
    requirements
        .iter()
        .map(|r| (r.target_for(cohort) - r.start_count).max(0) as f64 * r.unit_score)
        .sum()
}

/// Score a user earned across `requirements`.
pub fn cohort_score(user: &User, cohort: &Cohort, requirements: &[Requirement]) -> f64 {
    round_score(
        requirements
            .iter()
            .map(|r| current_score(r, user.progress_on(&r.id), cohort))
            .sum(),
    )
}

/// Score a user earned on the requirements of one category.
pub fn category_score(
    user: &User,
    cohort: &Cohort,
    category: &str,
    requirements: &[Requirement],
) -> f64 {
    round_score(
        requirements
            .iter()
            .filter(|r| r.category == category)
            .map(|r| current_score(r, user.progress_on(&r.id), cohort))
            .sum(),
    )
}

/// Earned score as a percentage of the available score.
pub fn percent_complete(user: &User, cohort: &Cohort, requirements: &[Requirement]) -> f64 {
    let total = total_score(requirements, cohort);
    if total <= 0.0 {
        return 0.0;
    }
    cohort_score(user, cohort, requirements) * 100.0 / total
}

/// A user's scoreboard summary for one cohort.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserScore {
    /// Cohort scored against
    pub cohort: Cohort,

    /// Score earned
    pub cohort_score: f64,

    /// Score available
    pub total_score: f64,

    /// `cohort_score` as a percentage of `total_score`
    pub percent_complete: f64,

    /// Score earned per category
    pub categories: BTreeMap<String, f64>,
}

/// Summarize a user's score over `requirements`.
pub fn score_user(user: &User, cohort: &Cohort, requirements: &[Requirement]) -> UserScore {
    let mut categories = BTreeMap::new();
    for requirement in requirements {
        if !categories.contains_key(&requirement.category) {
            let score = category_score(user, cohort, &requirement.category, requirements);
            categories.insert(requirement.category.clone(), score);
        }
    }

    UserScore {
        cohort: cohort.clone(),
        cohort_score: cohort_score(user, cohort, requirements),
        total_score: round_score(total_score(requirements, cohort)),
        percent_complete: percent_complete(user, cohort, requirements),
        categories,
    }
}

fn round_score(score: f64) -> f64 {
    (score * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use dojo_core::RequirementId;

    fn cohort() -> Cohort {
        Cohort::specific("1200-1300")
    }

    fn requirements() -> Vec<Requirement> {
        let games = Requirement::new("games", "Classical games", "Games").with_count("1200-1300", 10);

        let mut polgar = Requirement::new("polgar", "Polgar mates", "Tactics").with_count(Cohort::All, 5);
        polgar.start_count = 2;
        polgar.unit_score = 0.5;

        let mut rush = Requirement::new("rush", "Puzzle rush", "Tactics").with_count("1200-1300", 6);
        rush.start_count = 3;

        vec![games, polgar, rush]
    }

    fn user_with(counts: &[(&str, i64)]) -> User {
        let now = Utc::now();
        let mut user = User::new("magnus", now);
        for (id, count) in counts {
            let mut progress = RequirementProgress::empty(RequirementId::new(*id), now);
            progress.counts.insert(cohort(), *count);
            user.progress.insert(RequirementId::new(*id), progress);
        }
        user
    }

    #[test]
    fn test_current_count_capped_at_target() {
        let user = user_with(&[("games", 12)]);
        let requirements = requirements();
        let games = &requirements[0];
        assert_eq!(current_count(games, user.progress_on(&games.id), &cohort()), 10);
        assert_eq!(current_score(games, user.progress_on(&games.id), &cohort()), 10.0);
    }

    #[test]
    fn test_no_progress_counts_zero() {
        let requirements = requirements();
        let games = &requirements[0];
        assert_eq!(current_count(games, None, &cohort()), 0);
        assert_eq!(current_score(games, None, &cohort()), 0.0);
    }

    #[test]
    fn test_only_progress_above_start_scores() {
        let user = user_with(&[("polgar", 4), ("rush", 1)]);
        let requirements = requirements();

        let polgar = &requirements[1];
        assert_eq!(current_score(polgar, user.progress_on(&polgar.id), &cohort()), 1.0);

        let rush = &requirements[2];
        assert_eq!(current_count(rush, user.progress_on(&rush.id), &cohort()), 1);
        assert_eq!(current_score(rush, user.progress_on(&rush.id), &cohort()), 0.0);
    }

    #[test]
    fn test_progress_percent_uses_start_as_baseline() {
        let user = user_with(&[("polgar", 4), ("rush", 1), ("games", 30)]);
        let requirements = requirements();

        let percent = progress_percent(&requirements[1], user.progress_on(&requirements[1].id), &cohort());
        assert!((percent - 200.0 / 3.0).abs() < 1e-9);
        assert_eq!(progress_percent(&requirements[2], user.progress_on(&requirements[2].id), &cohort()), 0.0);
        assert_eq!(progress_percent(&requirements[0], user.progress_on(&requirements[0].id), &cohort()), 100.0);
    }

    #[test]
    fn test_requirement_without_span() {
        let mut done = Requirement::new("done", "Join the dojo", "Welcome").with_count("1200-1300", 1);
        done.start_count = 1;
        assert_eq!(progress_percent(&done, None, &cohort()), 0.0);
        assert_eq!(total_score(&[done], &cohort()), 0.0);
    }

    #[test]
    fn test_cohort_and_category_sums() {
        let user = user_with(&[("games", 12), ("polgar", 4), ("rush", 1)]);
        let requirements = requirements();

        assert_eq!(total_score(&requirements, &cohort()), 14.5);
        assert_eq!(cohort_score(&user, &cohort(), &requirements), 11.0);
        assert_eq!(category_score(&user, &cohort(), "Games", &requirements), 10.0);
        assert_eq!(category_score(&user, &cohort(), "Tactics", &requirements), 1.0);

        let percent = percent_complete(&user, &cohort(), &requirements);
        assert!((percent - 11.0 * 100.0 / 14.5).abs() < 1e-9);
    }

    #[test]
    fn test_score_user_summary() {
        let user = user_with(&[("games", 3), ("polgar", 5)]);
        let score = score_user(&user, &cohort(), &requirements());

        assert_eq!(score.cohort_score, 4.5);
        assert_eq!(score.total_score, 14.5);
        assert_eq!(score.categories.len(), 2);
        assert_eq!(score.categories["Games"], 3.0);
        assert_eq!(score.categories["Tactics"], 1.5);
    }

    #[test]
    fn test_empty_catalog_is_zero_percent() {
        let user = user_with(&[]);
        assert_eq!(percent_complete(&user, &cohort(), &[]), 0.0);
    }
}
