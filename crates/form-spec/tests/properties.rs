use proptest::prelude::*;

use form_spec::{
    FieldDescriptor, FieldKind, FieldValue, Pattern, ValidationRule, ValueBag, is_field_visible,
    validate_field,
};

fn field(rule: ValidationRule) -> FieldDescriptor {
    FieldDescriptor::new("f", FieldKind::Text, "Field").with_validation(rule)
}

fn any_value() -> impl Strategy<Value = FieldValue> {
    prop_oneof![
        any::<bool>().prop_map(FieldValue::Boolean),
        (-1000i32..1000).prop_map(|n| FieldValue::Number(f64::from(n))),
        "[a-z1 ]{0,6}".prop_map(FieldValue::Text),
        prop::collection::vec("[a-z]{1,3}", 0..3).prop_map(FieldValue::List),
    ]
}

proptest! {
    #[test]
    fn blank_text_is_always_missing(spaces in "[ \t\n]{0,8}") {
        let rule = field(ValidationRule::required());
        prop_assert_eq!(
            validate_field(Some(&FieldValue::Text(spaces)), &rule),
            Some("Field is required".to_string())
        );
    }

    #[test]
    fn min_length_fails_exactly_below_bound(text in "[a-z]{0,12}", min in 0usize..12) {
        let rule = field(ValidationRule { min_length: Some(min), ..ValidationRule::default() });
        let error = validate_field(Some(&FieldValue::Text(text.clone())), &rule);
        prop_assert_eq!(error.is_some(), text.chars().count() < min);
    }

    #[test]
    fn numeric_range_fails_exactly_outside_bounds(
        value in -100i32..100,
        lo in -50i32..0,
        hi in 0i32..50,
    ) {
        let rule = field(ValidationRule {
            min: Some(f64::from(lo)),
            max: Some(f64::from(hi)),
            ..ValidationRule::default()
        });
        let error = validate_field(Some(&FieldValue::Number(f64::from(value))), &rule);
        prop_assert_eq!(error.is_some(), value < lo || value > hi);
    }

    #[test]
    fn pattern_fails_exactly_when_not_fully_matched(text in "[a-c0-2]{0,6}") {
        let rule = field(ValidationRule {
            pattern: Some(Pattern::new("[a-c]+").expect("pattern compiles")),
            ..ValidationRule::default()
        });
        let full_match = !text.is_empty() && text.chars().all(|c| ('a'..='c').contains(&c));
        let error = validate_field(Some(&FieldValue::Text(text)), &rule);
        prop_assert_eq!(error.is_none(), full_match);
    }

    #[test]
    fn visibility_is_strict_equality(expected in any_value(), current in prop::option::of(any_value())) {
        let dependent = FieldDescriptor::new("b", FieldKind::Text, "B").depends_on("a", expected.clone());
        let mut values = ValueBag::new();
        if let Some(current) = &current {
            values.insert("a", current.clone());
        }
        prop_assert_eq!(is_field_visible(&dependent, &values), current.as_ref() == Some(&expected));
    }
}
