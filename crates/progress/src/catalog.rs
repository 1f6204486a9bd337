//! Cohort-scoped requirement listing.

use dojo_core::{Cohort, Requirement};
use dojo_storage::RequirementCatalog;

use crate::error::Result;

/// Keep the requirements that apply to `cohort`, sorted for display.
///
/// Every requirement applies to `Cohort::All`; otherwise a requirement
/// applies when it defines a target for that exact cohort. With
/// `scoreboard_only`, hidden and non-dojo requirements are dropped.
pub fn filter_for_cohort(
    requirements: Vec<Requirement>,
    cohort: &Cohort,
    scoreboard_only: bool,
) -> Vec<Requirement> {
    let mut matching: Vec<Requirement> = requirements
        .into_iter()
        .filter(|r| !scoreboard_only || r.scoreboard_display.on_scoreboard())
        .filter(|r| cohort.is_all() || r.has_target_for(cohort))
        .collect();

    matching.sort_by(|a, b| {
        a.category
            .cmp(&b.category)
            .then_with(|| a.sort_priority.cmp(&b.sort_priority))
            .then_with(|| a.name.cmp(&b.name))
    });
    matching
}

/// List the catalog's requirements for `cohort`.
pub async fn requirements_for_cohort<C: RequirementCatalog + ?Sized>(
    catalog: &C,
    cohort: &Cohort,
    scoreboard_only: bool,
) -> Result<Vec<Requirement>> {
    let requirements = catalog.list_requirements().await?;
    Ok(filter_for_cohort(requirements, cohort, scoreboard_only))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dojo_core::ScoreboardDisplay;
    use dojo_storage::MemoryStorage;

    fn catalog() -> Vec<Requirement> {
        let mut hidden = Requirement::new("hidden", "Hidden drill", "Tactics").with_count("1200-1300", 1);
        hidden.scoreboard_display = ScoreboardDisplay::Hidden;

        let mut non_dojo = Requirement::new("books", "Read books", "Non-Dojo").with_count("1200-1300", 1);
        non_dojo.scoreboard_display = ScoreboardDisplay::NonDojo;

        let mut polgar = Requirement::new("polgar", "Polgar mates", "Tactics").with_count("1200-1300", 306);
        polgar.sort_priority = "02".to_string();
        let mut puzzles = Requirement::new("puzzles", "Puzzle rush", "Tactics").with_count("1200-1300", 10);
        puzzles.sort_priority = "01".to_string();

        let games = Requirement::new("games", "Classical games", "Games").with_count("800-900", 5);
        let wildcard = Requirement::new("openings", "Opening course", "Openings").with_count(Cohort::All, 1);

        vec![hidden, non_dojo, polgar, puzzles, games, wildcard]
    }

    fn ids(requirements: &[Requirement]) -> Vec<&str> {
        requirements.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_specific_cohort_needs_its_own_target() {
        let listed = filter_for_cohort(catalog(), &Cohort::specific("1200-1300"), false);
        assert_eq!(ids(&listed), vec!["books", "hidden", "puzzles", "polgar"]);
    }

    #[test]
    fn test_scoreboard_only_drops_hidden_and_non_dojo() {
        let listed = filter_for_cohort(catalog(), &Cohort::specific("1200-1300"), true);
        assert_eq!(ids(&listed), vec!["puzzles", "polgar"]);
    }

    #[test]
    fn test_all_cohorts_lists_everything() {
        let listed = filter_for_cohort(catalog(), &Cohort::All, false);
        assert_eq!(listed.len(), 6);
        assert_eq!(listed[0].category, "Games");
    }

    #[tokio::test]
    async fn test_reads_from_catalog() {
        let storage = MemoryStorage::new();
        for requirement in catalog() {
            dojo_storage::RequirementCatalog::save_requirement(&storage, &requirement)
                .await
                .unwrap();
        }

        let listed = requirements_for_cohort(&storage, &Cohort::specific("800-900"), true)
            .await
            .unwrap();
        assert_eq!(ids(&listed), vec!["games"]);
    }
}
