//! Browser host tests
//!
//! Run with `wasm-pack test --headless --firefox`.

#[cfg(target_arch = "wasm32")]
mod wasm_web_host_tests {
	use reinhardt_form_data::web::{FormSubmission, JsOverrideRegistry, WebForm};
	use reinhardt_form_data::{
		ExtractError, ExtractOptions, FieldCategory, FormExtractor, FormHost, FormValue,
		OverrideStore, OverrideValue,
	};
	use wasm_bindgen::JsCast;
	use wasm_bindgen_test::*;
	use web_sys::{Element, HtmlFormElement, HtmlInputElement};

	wasm_bindgen_test_configure!(run_in_browser);

	fn build_form(markup: &str) -> HtmlFormElement {
		let document = web_sys::window().unwrap().document().unwrap();
		let form = document
			.create_element("form")
			.unwrap()
			.dyn_into::<HtmlFormElement>()
			.unwrap();
		form.set_inner_html(markup);
		document.body().unwrap().append_child(&form).unwrap();
		form
	}

	fn find(form: &HtmlFormElement, selector: &str) -> Element {
		form.query_selector(selector).unwrap().unwrap()
	}

	fn extract(submission: &FormSubmission, registry: &JsOverrideRegistry) -> reinhardt_form_data::FormData {
		FormExtractor::new(ExtractOptions::default())
			.extract(Some(submission), registry)
			.unwrap()
	}

	#[wasm_bindgen_test]
	fn test_controls_read_live_state() {
		let form = build_form(
			r#"<input name="title" value="Hello">
			<select name="size"><option>s</option><option selected>m</option></select>
			<fieldset disabled><input name="locked" value="x"></fieldset>
			<input type="checkbox" name="draft">"#,
		);

		let controls = WebForm::new(form).controls();
		let categories: Vec<_> = controls.iter().map(|control| control.category()).collect();

		assert_eq!(
			categories,
			vec![
				FieldCategory::Text,
				FieldCategory::Select,
				FieldCategory::Text,
				FieldCategory::Checkbox,
			]
		);
		assert!(controls[2].disabled);
	}

	#[wasm_bindgen_test]
	fn test_extracts_normalized_values() {
		let form = build_form(
			r#"<input name="title" value="Hello">
			<input type="number" name="count" value="3">
			<input type="date" name="due">
			<input type="checkbox" name="draft">
			<input type="radio" name="plan" value="free">
			<input type="radio" name="plan" value="pro" checked>
			<select name="tags" multiple><option selected>a</option><option>b</option></select>"#,
		);

		let data = extract(&FormSubmission::new(form), &JsOverrideRegistry::new());

		assert_eq!(data.get("title"), Some(&FormValue::from("Hello")));
		assert_eq!(data.get("count"), Some(&FormValue::Number(3.0)));
		assert_eq!(data.get("due"), Some(&FormValue::Null));
		assert_eq!(data.get("draft"), Some(&FormValue::Bool(false)));
		assert_eq!(data.get("plan"), Some(&FormValue::from("pro")));
		assert_eq!(data.get("tags"), Some(&FormValue::from(vec!["a"])));
	}

	#[wasm_bindgen_test]
	fn test_submitter_button_is_appended() {
		let form = build_form(
			r#"<button name="action" value="save">Save</button>
			<button name="action" value="publish">Publish</button>"#,
		);
		let publish = find(&form, r#"button[value="publish"]"#);

		let submission = FormSubmission::new(form.clone()).with_submitter(publish);
		let data = extract(&submission, &JsOverrideRegistry::new());
		assert_eq!(data.get("action"), Some(&FormValue::from("publish")));

		let data = extract(&FormSubmission::new(form), &JsOverrideRegistry::new());
		assert!(data.get("action").is_none());
	}

	#[wasm_bindgen_test]
	fn test_override_registry_keys_by_element() {
		let form = build_form(r#"<input type="hidden" name="owner" value="7">"#);
		let hidden = find(&form, "input");
		let registry = JsOverrideRegistry::new();
		let owner = OverrideValue::new(7_u64);

		registry.set_override(&hidden, owner.clone());
		registry.set_override(&hidden, owner.clone());
		assert_eq!(registry.len(), 1);
		let data = extract(&FormSubmission::new(form.clone()), &registry);
		assert_eq!(data.get("owner"), Some(&FormValue::Custom(owner)));

		assert!(registry.delete_override(&hidden));
		assert!(!registry.delete_override(&hidden));
		assert!(registry.is_empty());
		let data = extract(&FormSubmission::new(form), &registry);
		assert_eq!(data.get("owner"), Some(&FormValue::from("7")));
	}

	#[wasm_bindgen_test]
	fn test_non_submitting_submitter_is_ignored() {
		let form = build_form(
			r#"<button type="button" name="noop" value="x">Noop</button>
			<input type="reset" name="clear" value="r">"#,
		);

		for selector in ["button", "input"] {
			let trigger = find(&form, selector);
			let submission = FormSubmission::new(form.clone()).with_submitter(trigger);
			let data = extract(&submission, &JsOverrideRegistry::new());
			assert!(data.is_empty());
		}
	}

	#[wasm_bindgen_test]
	fn test_live_value_changes_are_seen() {
		let form = build_form(r#"<input name="q" value="initial">"#);
		find(&form, "input")
			.dyn_into::<HtmlInputElement>()
			.unwrap()
			.set_value("typed");

		let data = extract(&FormSubmission::new(form), &JsOverrideRegistry::new());

		assert_eq!(data.get("q"), Some(&FormValue::from("typed")));
	}

	#[wasm_bindgen_test]
	fn test_non_form_target_is_rejected() {
		let document = web_sys::window().unwrap().document().unwrap();
		let div = document.create_element("div").unwrap();

		let result = FormExtractor::default()
			.extract(Some(&FormSubmission::new(div)), &JsOverrideRegistry::new());

		assert_eq!(result.unwrap_err(), ExtractError::NotAForm);
	}
}
