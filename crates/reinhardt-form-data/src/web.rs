//! Browser host adapter (WASM only)
//!
//! Reads live `HtmlFormElement`s through `web-sys`. The native entry list
//! comes from `new FormData(form)`; the submitter's entry is appended
//! afterwards because `FormData` never includes buttons on its own.
//!
//! ## Example
//!
//! ```ignore
//! use reinhardt_form_data::web;
//!
//! form.add_event_listener_with_callback("submit", handler)?;
//!
//! // inside the handler
//! let data = web::data_from(Some(&event))?;
//! if let Some(title) = data.get("title").and_then(|value| value.as_str()) {
//!     // ...
//! }
//! ```

use crate::config::ExtractOptions;
use crate::error::ExtractResult;
use crate::extractor::FormExtractor;
use crate::field::{Control, EntryValue, FieldKind, InputState, OptionControl};
use crate::host::{FormHost, OverrideStore, SubmissionContext};
use crate::value::{FileEntry, FormData, OverrideValue};
use crate::warn_log;
use chrono::DateTime;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::wasm_bindgen;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
	Element, Event, File, FileList, HtmlButtonElement, HtmlFormElement, HtmlInputElement,
	HtmlOptionElement, HtmlSelectElement, HtmlTextAreaElement, SubmitEvent,
};

/// A `<form>` element read through `web-sys`
#[derive(Debug, Clone)]
pub struct WebForm(HtmlFormElement);

impl WebForm {
	/// Wrap a form element
	pub fn new(form: HtmlFormElement) -> Self {
		Self(form)
	}

	/// The wrapped form element
	pub fn element(&self) -> &HtmlFormElement {
		&self.0
	}
}

impl FormHost for WebForm {
	type Handle = Element;

	fn controls(&self) -> Vec<Control<Element>> {
		let elements = self.0.elements();
		(0..elements.length())
			.filter_map(|index| elements.item(index))
			.filter_map(read_control)
			.collect()
	}

	fn entries(&self, submitter: Option<&Element>) -> Vec<(String, EntryValue)> {
		let form_data = match web_sys::FormData::new_with_form(&self.0) {
			Ok(form_data) => form_data,
			Err(error) => {
				warn_log!("FormData construction failed: {:?}", error);
				return Vec::new();
			}
		};

		let mut entries = Vec::new();
		if let Ok(Some(iter)) = js_sys::try_iter(&form_data) {
			for pair in iter.flatten() {
				let pair: js_sys::Array = pair.unchecked_into();
				let Some(name) = pair.get(0).as_string() else {
					continue;
				};
				let value = match pair.get(1).dyn_into::<File>() {
					Ok(file) => EntryValue::File(file_entry(&file)),
					Err(value) => EntryValue::Text(value.as_string().unwrap_or_default()),
				};
				entries.push((name, value));
			}
		}

		if let Some(entry) = submitter.and_then(|submitter| submitter_entry(submitter, &self.0)) {
			entries.push(entry);
		}
		entries
	}
}

fn read_control(element: Element) -> Option<Control<Element>> {
	let kind = if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
		let state = InputState {
			value: input.value(),
			value_attribute: element.get_attribute("value"),
			checked: input.checked(),
			multiple: input.multiple(),
			files: input.files().map(file_list_entries).unwrap_or_default(),
		};
		FieldKind::from_input_type(&input.type_(), state)
	} else if let Some(select) = element.dyn_ref::<HtmlSelectElement>() {
		let options = select_options(select);
		if select.multiple() {
			FieldKind::SelectMultiple { options }
		} else {
			FieldKind::SelectSingle { options }
		}
	} else if element.is_instance_of::<HtmlTextAreaElement>() {
		FieldKind::Text
	} else if let Some(button) = element.dyn_ref::<HtmlButtonElement>() {
		FieldKind::Button {
			value: button.value(),
			submit: button.type_().eq_ignore_ascii_case("submit"),
		}
	} else {
		// fieldset, output and object carry no submittable value
		return None;
	};

	Some(Control {
		name: element.get_attribute("name"),
		disabled: element.matches(":disabled").unwrap_or(false),
		kind,
		handle: element,
	})
}

fn select_options(select: &HtmlSelectElement) -> Vec<OptionControl<Element>> {
	let options = select.options();
	(0..options.length())
		.filter_map(|index| options.item(index))
		.filter_map(|element| {
			let option = element.dyn_ref::<HtmlOptionElement>()?;
			Some(OptionControl {
				value: option.value(),
				selected: option.selected(),
				disabled: element.matches(":disabled").unwrap_or(false),
				handle: element.clone(),
			})
		})
		.collect()
}

fn submitter_entry(submitter: &Element, form: &HtmlFormElement) -> Option<(String, EntryValue)> {
	let (owner, value) = if let Some(button) = submitter.dyn_ref::<HtmlButtonElement>() {
		if !button.type_().eq_ignore_ascii_case("submit") {
			return None;
		}
		(button.form(), button.value())
	} else if let Some(input) = submitter.dyn_ref::<HtmlInputElement>() {
		if !matches!(input.type_().to_ascii_lowercase().as_str(), "submit" | "image") {
			return None;
		}
		(input.form(), input.value())
	} else {
		return None;
	};

	if owner.as_ref() != Some(form) || submitter.matches(":disabled").unwrap_or(false) {
		return None;
	}
	let name = submitter.get_attribute("name").filter(|name| !name.is_empty())?;
	Some((name, EntryValue::Text(value)))
}

fn file_list_entries(list: FileList) -> Vec<FileEntry> {
	(0..list.length())
		.filter_map(|index| list.item(index))
		.map(|file| file_entry(&file))
		.collect()
}

fn file_entry(file: &File) -> FileEntry {
	let mut entry = FileEntry::new(file.name(), file.type_(), file.size() as u64);
	entry.last_modified = DateTime::from_timestamp_millis(file.last_modified() as i64);
	entry.handle = Some(file.clone());
	entry
}

impl SubmissionContext for Event {
	type Form = WebForm;

	fn form(&self) -> Option<WebForm> {
		self.current_target()?
			.dyn_into::<HtmlFormElement>()
			.ok()
			.map(WebForm)
	}

	fn submitter(&self) -> Option<Element> {
		self.dyn_ref::<SubmitEvent>()?.submitter().map(Element::from)
	}
}

/// A submission built from a form element outside of an event dispatch
#[derive(Debug, Clone)]
pub struct FormSubmission {
	form: JsValue,
	submitter: Option<Element>,
}

impl FormSubmission {
	/// Submission targeting `target`; it must be a `<form>` to extract
	pub fn new(target: impl Into<JsValue>) -> Self {
		Self {
			form: target.into(),
			submitter: None,
		}
	}

	/// Record the triggering control
	pub fn with_submitter(mut self, submitter: Element) -> Self {
		self.submitter = Some(submitter);
		self
	}
}

impl SubmissionContext for FormSubmission {
	type Form = WebForm;

	fn form(&self) -> Option<WebForm> {
		self.form
			.dyn_ref::<HtmlFormElement>()
			.cloned()
			.map(WebForm)
	}

	fn submitter(&self) -> Option<Element> {
		self.submitter.clone()
	}
}

#[wasm_bindgen]
extern "C" {
	/// JS `FinalizationRegistry`
	type FinalizationRegistry;

	#[wasm_bindgen(constructor)]
	fn new(cleanup: &js_sys::Function) -> FinalizationRegistry;

	#[wasm_bindgen(method)]
	fn register(this: &FinalizationRegistry, target: &JsValue, held: &JsValue, token: &JsValue);

	#[wasm_bindgen(method)]
	fn unregister(this: &FinalizationRegistry, token: &JsValue) -> bool;
}

type SharedValues = Rc<RefCell<HashMap<u32, OverrideValue>>>;

/// Override store keyed by DOM element through a `WeakMap`
///
/// The `WeakMap` holds an id per element; the Rust side maps ids to values.
/// Each element is also registered with a `FinalizationRegistry`, so once the
/// element is garbage collected its value is released as well.
pub struct JsOverrideRegistry {
	ids: js_sys::WeakMap,
	values: SharedValues,
	next_id: Cell<u32>,
	finalizer: FinalizationRegistry,
	// Owned so the cleanup callback outlives every registration
	_cleanup: Closure<dyn FnMut(JsValue)>,
}

impl Default for JsOverrideRegistry {
	fn default() -> Self {
		let values: SharedValues = Rc::default();
		let released = Rc::downgrade(&values);
		let cleanup = Closure::<dyn FnMut(JsValue)>::new(move |held: JsValue| {
			if let (Some(values), Some(id)) = (released.upgrade(), held.as_f64()) {
				values.borrow_mut().remove(&(id as u32));
			}
		});
		Self {
			ids: js_sys::WeakMap::new(),
			values,
			next_id: Cell::new(0),
			finalizer: FinalizationRegistry::new(cleanup.as_ref().unchecked_ref()),
			_cleanup: cleanup,
		}
	}
}

impl JsOverrideRegistry {
	/// Create an empty registry
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of stored values
	pub fn len(&self) -> usize {
		self.values.borrow().len()
	}

	/// Whether no values are stored
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Release every stored value
	pub fn clear(&self) {
		self.values.borrow_mut().clear();
	}

	fn id_of(&self, element: &Element) -> Option<u32> {
		self.ids.get(element).as_f64().map(|id| id as u32)
	}
}

impl OverrideStore<Element> for JsOverrideRegistry {
	fn set_override(&self, element: &Element, value: OverrideValue) {
		let id = self.id_of(element).unwrap_or_else(|| {
			let id = self.next_id.get();
			self.next_id.set(id.wrapping_add(1));
			self.ids.set(element, &JsValue::from(id));
			self.finalizer.register(element, &JsValue::from(id), element);
			id
		});
		self.values.borrow_mut().insert(id, value);
	}

	fn delete_override(&self, element: &Element) -> bool {
		let Some(id) = self.id_of(element) else {
			return false;
		};
		self.ids.delete(element);
		self.finalizer.unregister(element);
		self.values.borrow_mut().remove(&id).is_some()
	}

	fn get_override(&self, element: &Element) -> Option<OverrideValue> {
		let id = self.id_of(element)?;
		self.values.borrow().get(&id).cloned()
	}
}

thread_local! {
	static DEFAULT_REGISTRY: JsOverrideRegistry = JsOverrideRegistry::new();
}

/// Run `f` with the page's default override registry
pub fn with_default_registry<R>(f: impl FnOnce(&JsOverrideRegistry) -> R) -> R {
	DEFAULT_REGISTRY.with(f)
}

/// Attach `value` to `element` in the default registry
pub fn set_override(element: &Element, value: OverrideValue) {
	with_default_registry(|registry| registry.set_override(element, value))
}

/// Remove `element`'s override from the default registry
pub fn delete_override(element: &Element) -> bool {
	with_default_registry(|registry| registry.delete_override(element))
}

/// `element`'s override in the default registry
pub fn get_override(element: &Element) -> Option<OverrideValue> {
	with_default_registry(|registry| registry.get_override(element))
}

/// Extract a submit event with default options and the default registry
pub fn data_from(event: Option<&Event>) -> ExtractResult<FormData> {
	data_from_with(event, ExtractOptions::default())
}

/// Extract a submit event with explicit options and the default registry
pub fn data_from_with<C>(context: Option<&C>, options: ExtractOptions) -> ExtractResult<FormData>
where
	C: SubmissionContext<Form = WebForm>,
{
	with_default_registry(|registry| FormExtractor::new(options).extract(context, registry))
}
