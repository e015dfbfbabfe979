//! Step navigation.
//!
//! Two answers change the route: sole owners skip the additional-owner screen and
//! practices without extra team members skip the member screen.

use brite_domain::constants::fields;
use brite_domain::step::Step;
use brite_domain::submission::FormData;

fn is_sole_owner(form: &FormData) -> bool {
    form.is_truthy(fields::IS_SOLE_OWNER)
}

fn has_multiple_members(form: &FormData) -> bool {
    form.is_truthy(fields::IS_MULTIPLE_MEMBER)
}

/// The screen after `step`, `None` after card verification.
#[must_use]
pub fn next(step: Step, form: &FormData) -> Option<Step> {
    match step {
        Step::SoleOwner if is_sole_owner(form) => Some(Step::MultipleLocations),
        Step::AskMoreThanOneMember if !has_multiple_members(form) => Some(Step::Contract),
        Step::CardVerification => None,
        _ => Step::from_number(step.number() + 1),
    }
}

/// The screen before `step`, `None` on the first one.
#[must_use]
pub fn previous(step: Step, form: &FormData) -> Option<Step> {
    match step {
        Step::PracticeName => None,
        Step::MultipleLocations if is_sole_owner(form) => Some(Step::SoleOwner),
        Step::Contract if !has_multiple_members(form) => Some(Step::AskMoreThanOneMember),
        _ => Step::from_number(step.number() - 1),
    }
}

/// Whether the current answers route through `step` at all.
#[must_use]
pub fn is_reachable(step: Step, form: &FormData) -> bool {
    match step {
        Step::AdditionalOwner => !is_sole_owner(form),
        Step::AdditionalMembers => has_multiple_members(form),
        _ => true,
    }
}

/// Every screen visited from the first to the last for the current answers.
#[must_use]
pub fn route(form: &FormData) -> Vec<Step> {
    let mut steps = vec![Step::FIRST];
    let mut current = Step::FIRST;
    while let Some(step) = next(current, form) {
        steps.push(step);
        current = step;
    }
    steps
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn answers(sole: bool, multiple: bool) -> FormData {
        serde_json::from_value(json!({ "isSoleOwner": sole, "isMultipleMember": multiple }))
            .unwrap()
    }

    #[test]
    fn sole_owner_skips_additional_owner() {
        let form = answers(true, false);
        assert_eq!(next(Step::SoleOwner, &form), Some(Step::MultipleLocations));
        assert_eq!(previous(Step::MultipleLocations, &form), Some(Step::SoleOwner));
        assert!(!is_reachable(Step::AdditionalOwner, &form));
    }

    #[test]
    fn co_owners_visit_additional_owner() {
        let form = answers(false, false);
        assert_eq!(next(Step::SoleOwner, &form), Some(Step::AdditionalOwner));
        assert_eq!(previous(Step::MultipleLocations, &form), Some(Step::AdditionalOwner));
    }

    #[test]
    fn member_branch() {
        let single = answers(true, false);
        assert_eq!(next(Step::AskMoreThanOneMember, &single), Some(Step::Contract));
        assert_eq!(previous(Step::Contract, &single), Some(Step::AskMoreThanOneMember));

        let many = answers(true, true);
        assert_eq!(next(Step::AskMoreThanOneMember, &many), Some(Step::AdditionalMembers));
        assert_eq!(previous(Step::Contract, &many), Some(Step::AdditionalMembers));
    }

    #[test]
    fn ends_are_closed() {
        let form = FormData::new();
        assert_eq!(previous(Step::FIRST, &form), None);
        assert_eq!(next(Step::LAST, &form), None);
    }

    #[test]
    fn full_route_lengths() {
        assert_eq!(route(&answers(false, true)).len(), 19);
        assert_eq!(route(&answers(true, false)).len(), 17);
    }
}
