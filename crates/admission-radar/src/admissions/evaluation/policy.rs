use std::cmp::Ordering;

use super::super::domain::Gpa;
use super::InstitutionMatch;

/// Order matches by urgency: institutions with an open unit first, then the
/// soonest deadline, then the highest total-GPA bar, then institution id.
pub fn rank(mut matches: Vec<InstitutionMatch>) -> Vec<InstitutionMatch> {
    matches.sort_by(compare_urgency);
    matches
}

pub(crate) fn compare_urgency(a: &InstitutionMatch, b: &InstitutionMatch) -> Ordering {
    b.has_open_unit()
        .cmp(&a.has_open_unit())
        .then_with(|| soonest_deadline(a).cmp(&soonest_deadline(b)))
        .then_with(|| highest_bar(b).cmp(&highest_bar(a)))
        .then_with(|| a.institution.id.cmp(&b.institution.id))
}

fn soonest_deadline(entry: &InstitutionMatch) -> i64 {
    entry.soonest_deadline_days().unwrap_or(i64::MAX)
}

fn highest_bar(entry: &InstitutionMatch) -> Gpa {
    entry.highest_total_gpa_bar().unwrap_or(Gpa::ZERO)
}
