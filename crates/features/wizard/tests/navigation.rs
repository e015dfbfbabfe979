use brite_domain::submission::FormData;
use brite_wizard::{Step, Wizard, WizardError, format_phone, is_reachable, next, previous, route};
use proptest::prelude::*;
use serde_json::json;

fn answers(sole: bool, multiple: bool) -> FormData {
    serde_json::from_value(json!({ "isSoleOwner": sole, "isMultipleMember": multiple })).unwrap()
}

proptest! {
    #[test]
    fn back_undoes_forward_on_every_route(sole: bool, multiple: bool) {
        let form = answers(sole, multiple);
        for step in route(&form) {
            prop_assert!(is_reachable(step, &form));
            if let Some(following) = next(step, &form) {
                prop_assert_eq!(previous(following, &form), Some(step));
            }
        }
    }

    #[test]
    fn skipped_screens_are_never_visited(sole: bool, multiple: bool) {
        let visited = route(&answers(sole, multiple));
        prop_assert_eq!(visited.contains(&Step::AdditionalOwner), !sole);
        prop_assert_eq!(visited.contains(&Step::AdditionalMembers), multiple);
        prop_assert_eq!(visited.first(), Some(&Step::FIRST));
        prop_assert_eq!(visited.last(), Some(&Step::LAST));
    }

    #[test]
    fn phone_format_is_stable(input in ".{0,24}") {
        let once = format_phone(&input);
        prop_assert_eq!(format_phone(&once), once.clone());

        let digits: String = input.chars().filter(char::is_ascii_digit).take(10).collect();
        let kept: String = once.chars().filter(char::is_ascii_digit).collect();
        prop_assert_eq!(kept, digits);
    }
}

#[test]
fn advance_defaults_commission() {
    let wizard = Wizard::build().unwrap();
    let advance = wizard.advance(Step::PracticeMarkup, FormData::new(), false).unwrap();

    assert_eq!(advance.next, Some(Step::Hormone));
    assert_eq!(advance.form.commission(), Some(10.0));
}

#[test]
fn advance_keeps_explicit_zero_commission() {
    let wizard = Wizard::build().unwrap();
    let form: FormData = serde_json::from_value(json!({ "commission": 0 })).unwrap();
    let advance = wizard.advance(Step::PracticeMarkup, form, false).unwrap();

    assert_eq!(advance.form.commission(), Some(0.0));
}

#[test]
fn advance_syncs_kits_after_providers() {
    let wizard = Wizard::build().unwrap();
    let form: FormData = serde_json::from_value(json!({
        "email": "lead@glow.com",
        "providers": [{ "providerFullName": "Dr Kim", "email": "kim@glow.com", "selectedLocations": ["1 Main St"] }]
    }))
    .unwrap();

    let advance = wizard.advance(Step::MultipleProvider, form, false).unwrap();
    assert_eq!(advance.next, Some(Step::Kits));

    let kits = advance.form.kits();
    assert_eq!(kits.len(), 1);
    assert_eq!(kits[0].shipping_provider, "Dr Kim");
}

#[test]
fn advance_reports_invalid_fields() {
    let wizard = Wizard::build().unwrap();
    let err = wizard.advance(Step::EmailAddress, FormData::new(), false).unwrap_err();

    assert_eq!(err.status_code(), 422);
    let WizardError::Invalid { errors, context } = err else {
        panic!("expected validation failure");
    };
    assert_eq!(context.as_deref(), Some("emailAddress"));
    assert_eq!(errors.iter().next().map(|e| e.message.as_str()), Some("Email address is required."));
}

#[test]
fn last_step_has_no_successor() {
    let wizard = Wizard::build().unwrap();
    let advance = wizard.advance(Step::CardVerification, FormData::new(), false).unwrap();
    assert_eq!(advance.next, None);
}
