//! Property-based tests for form data extraction

#![cfg(not(target_arch = "wasm32"))]

use proptest::prelude::*;
use reinhardt_form_data::dom::{Element, SubmitEvent};
use reinhardt_form_data::{FormExtractor, FormValue, OverrideRegistry, data_from};

fn field_name() -> impl Strategy<Value = String> {
	"[a-z][a-z0-9_]{0,11}"
}

fn text_value() -> impl Strategy<Value = String> {
	"[ -~]{0,24}"
}

proptest! {
	#[test]
	fn prop_text_field_round_trips_its_value(name in field_name(), value in text_value()) {
		let form = Element::form().with_child(Element::input("text").with_name(&name).with_value(&value));

		let data = data_from(Some(&SubmitEvent::new(form))).unwrap();

		prop_assert_eq!(data.len(), 1);
		prop_assert_eq!(data.get(&name), Some(&FormValue::Text(value)));
	}

	#[test]
	fn prop_extraction_is_idempotent(
		names in prop::collection::vec(field_name(), 1..8),
		checked in prop::collection::vec(any::<bool>(), 8),
	) {
		let form = Element::form();
		for (index, name) in names.iter().enumerate() {
			let checkbox = Element::input("checkbox").with_name(name).with_value(&index.to_string());
			checkbox.set_checked(checked[index]);
			form.append_child(checkbox);
		}
		let event = SubmitEvent::new(form);
		let registry = OverrideRegistry::new();
		let extractor = FormExtractor::default();

		let first = extractor.extract(Some(&event), &registry).unwrap();
		let second = extractor.extract(Some(&event), &registry).unwrap();

		prop_assert_eq!(first, second);
	}

	#[test]
	fn prop_every_named_control_has_an_entry(
		names in prop::collection::hash_set(field_name(), 1..8),
	) {
		let form = Element::form();
		for name in &names {
			form.append_child(Element::input("number").with_name(name));
		}

		let data = data_from(Some(&SubmitEvent::new(form))).unwrap();

		prop_assert_eq!(data.len(), names.len());
		for name in &names {
			prop_assert_eq!(data.get(name), Some(&FormValue::Null));
		}
	}

	#[test]
	fn prop_checked_radio_is_the_group_value(
		values in prop::collection::vec("[a-z]{1,6}", 1..6),
		pick in any::<prop::sample::Index>(),
	) {
		let chosen = pick.index(values.len());
		let form = Element::form();
		for (index, value) in values.iter().enumerate() {
			let radio = Element::input("radio").with_name("choice").with_value(value);
			radio.set_checked(index == chosen);
			form.append_child(radio);
		}

		let data = data_from(Some(&SubmitEvent::new(form))).unwrap();

		prop_assert_eq!(data.get("choice"), Some(&FormValue::Text(values[chosen].clone())));
	}
}
