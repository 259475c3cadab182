use super::common::*;
use chrono::Duration;

use crate::admissions::evaluation::{match_catalog, rank, InstitutionMatch};

fn ids(ranked: &[InstitutionMatch]) -> Vec<&str> {
    ranked
        .iter()
        .map(|entry| entry.institution.id.0.as_str())
        .collect()
}

#[test]
fn open_institutions_rank_before_fully_closed_ones() {
    let ranked = rank(match_catalog(&mixed_catalog(), &student(), now()));

    assert_eq!(ids(&ranked), vec!["mixed-u", "open-u", "closed-u"]);

    let first_closed = ranked
        .iter()
        .position(|entry| !entry.has_open_unit())
        .expect("a closed institution");
    assert!(ranked[first_closed..]
        .iter()
        .all(|entry| !entry.has_open_unit()));
}

#[test]
fn soonest_deadline_breaks_ties_among_open_institutions() {
    let catalog = vec![
        institution("later", "Later University", vec![unit("A", Duration::days(30))]),
        institution("sooner", "Sooner University", vec![unit("A", Duration::days(3))]),
        institution(
            "spread",
            "Spread University",
            vec![unit("A", Duration::days(40)), unit("B", Duration::days(7))],
        ),
    ];

    let ranked = rank(match_catalog(&catalog, &student(), now()));

    assert_eq!(ids(&ranked), vec!["sooner", "spread", "later"]);
}

#[test]
fn higher_gpa_bar_ranks_first_when_deadlines_tie() {
    let mut demanding = unit("A", Duration::days(5));
    demanding.min_total_gpa = gpa(8.5);
    let relaxed = unit("A", Duration::days(5));
    let catalog = vec![
        institution("relaxed", "Relaxed University", vec![relaxed]),
        institution("demanding", "Demanding University", vec![demanding]),
    ];

    let ranked = rank(match_catalog(&catalog, &student(), now()));

    assert_eq!(ids(&ranked), vec!["demanding", "relaxed"]);
}

#[test]
fn identical_keys_fall_back_to_institution_id() {
    let catalog = vec![
        institution("c", "C University", vec![unit("A", Duration::days(5))]),
        institution("a", "A University", vec![unit("A", Duration::days(5))]),
        institution("b", "B University", vec![unit("A", Duration::days(5))]),
    ];

    let ranked = rank(match_catalog(&catalog, &student(), now()));

    assert_eq!(ids(&ranked), vec!["a", "b", "c"]);
}

#[test]
fn ranking_is_deterministic_across_calls_and_input_orders() {
    let mut catalog = mixed_catalog();
    let first = rank(match_catalog(&catalog, &student(), now()));
    let second = rank(match_catalog(&catalog, &student(), now()));
    catalog.reverse();
    let reversed = rank(match_catalog(&catalog, &student(), now()));

    assert_eq!(first, second);
    assert_eq!(ids(&first), ids(&reversed));
}
