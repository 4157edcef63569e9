//! In-memory host environment
//!
//! A small element tree that behaves like a browser form snapshot: it lists
//! form controls in document order and builds the native entry list the way
//! `new FormData(form, submitter)` does. Server-side rendering and tests use
//! it wherever no browser DOM exists.
//!
//! ## Example
//!
//! ```
//! use reinhardt_form_data::dom::{Element, SubmitEvent};
//! use reinhardt_form_data::{data_from, FormValue};
//!
//! let form = Element::form()
//!     .with_child(Element::input("text").with_name("title").with_value("Hello"))
//!     .with_child(Element::input("number").with_name("count").with_value("3"))
//!     .with_child(Element::input("checkbox").with_name("draft"));
//!
//! let data = data_from(Some(&SubmitEvent::new(form))).unwrap();
//!
//! assert_eq!(data.get("title"), Some(&FormValue::from("Hello")));
//! assert_eq!(data.get("count"), Some(&FormValue::Number(3.0)));
//! assert_eq!(data.get("draft"), Some(&FormValue::Bool(false)));
//! ```

use crate::field::{Control, EntryValue, FieldKind, InputState, OptionControl};
use crate::host::{FormHost, SubmissionContext};
use crate::value::FileEntry;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

struct Node {
	tag: String,
	attributes: RefCell<BTreeMap<String, String>>,
	text: RefCell<String>,
	// Dirty state; `None` falls back to the matching content attribute
	value: RefCell<Option<String>>,
	checked: Cell<Option<bool>>,
	selected: Cell<Option<bool>>,
	files: RefCell<Vec<FileEntry>>,
	children: RefCell<Vec<Element>>,
}

/// Shared handle to an element; equality is identity
#[derive(Clone)]
pub struct Element(Rc<Node>);

/// Non-owning element handle
#[derive(Clone)]
pub struct WeakElement(Weak<Node>);

impl WeakElement {
	/// The element, if it is still alive
	pub fn upgrade(&self) -> Option<Element> {
		self.0.upgrade().map(Element)
	}

	pub(crate) fn points_to(&self, element: &Element) -> bool {
		std::ptr::eq(self.0.as_ptr(), Rc::as_ptr(&element.0))
	}
}

impl Element {
	/// Create an element with the given tag name
	pub fn new(tag: impl Into<String>) -> Self {
		Self(Rc::new(Node {
			tag: tag.into().to_ascii_lowercase(),
			attributes: RefCell::new(BTreeMap::new()),
			text: RefCell::new(String::new()),
			value: RefCell::new(None),
			checked: Cell::new(None),
			selected: Cell::new(None),
			files: RefCell::new(Vec::new()),
			children: RefCell::new(Vec::new()),
		}))
	}

	/// `<form>`
	pub fn form() -> Self {
		Self::new("form")
	}

	/// `<input type="…">`
	pub fn input(input_type: &str) -> Self {
		Self::new("input").with_attr("type", input_type)
	}

	/// `<select>`
	pub fn select() -> Self {
		Self::new("select")
	}

	/// `<option value="…">`
	pub fn option(value: &str) -> Self {
		Self::new("option").with_attr("value", value)
	}

	/// `<textarea>`
	pub fn textarea() -> Self {
		Self::new("textarea")
	}

	/// `<button>` (a submit button unless given another type)
	pub fn button() -> Self {
		Self::new("button")
	}

	/// `<fieldset>`
	pub fn fieldset() -> Self {
		Self::new("fieldset")
	}

	/// Lowercase tag name
	pub fn tag(&self) -> &str {
		&self.0.tag
	}

	/// Whether this is a `<form>` element
	pub fn is_form(&self) -> bool {
		self.tag() == "form"
	}

	/// Set an attribute (builder form)
	pub fn with_attr(self, name: &str, value: &str) -> Self {
		self.set_attribute(name, value);
		self
	}

	/// Set the `name` attribute
	pub fn with_name(self, name: &str) -> Self {
		self.with_attr("name", name)
	}

	/// Set the `value` attribute
	pub fn with_value(self, value: &str) -> Self {
		self.with_attr("value", value)
	}

	/// Set the text content (option label, textarea default value)
	pub fn with_text(self, text: &str) -> Self {
		*self.0.text.borrow_mut() = text.to_string();
		self
	}

	/// Add the `checked` attribute
	pub fn checked(self) -> Self {
		self.with_attr("checked", "")
	}

	/// Add the `selected` attribute
	pub fn selected(self) -> Self {
		self.with_attr("selected", "")
	}

	/// Add the `multiple` attribute
	pub fn multiple(self) -> Self {
		self.with_attr("multiple", "")
	}

	/// Add the `disabled` attribute
	pub fn disabled(self) -> Self {
		self.with_attr("disabled", "")
	}

	/// Select files in a file input
	pub fn with_files(self, files: Vec<FileEntry>) -> Self {
		self.set_files(files);
		self
	}

	/// Append a child element
	pub fn with_child(self, child: Element) -> Self {
		self.append_child(child);
		self
	}

	/// Append several child elements
	pub fn with_children(self, children: impl IntoIterator<Item = Element>) -> Self {
		self.0.children.borrow_mut().extend(children);
		self
	}

	/// Attribute value
	pub fn attr(&self, name: &str) -> Option<String> {
		self.0.attributes.borrow().get(name).cloned()
	}

	/// Whether an attribute is present
	pub fn has_attr(&self, name: &str) -> bool {
		self.0.attributes.borrow().contains_key(name)
	}

	/// Set an attribute
	pub fn set_attribute(&self, name: &str, value: &str) {
		self.0
			.attributes
			.borrow_mut()
			.insert(name.to_ascii_lowercase(), value.to_string());
	}

	/// Remove an attribute
	pub fn remove_attribute(&self, name: &str) {
		self.0.attributes.borrow_mut().remove(name);
	}

	/// Append a child element
	pub fn append_child(&self, child: Element) {
		self.0.children.borrow_mut().push(child);
	}

	/// Child elements
	pub fn children(&self) -> Vec<Element> {
		self.0.children.borrow().clone()
	}

	/// Current value: dirty value, else the default for the element type
	pub fn value(&self) -> String {
		if let Some(value) = self.0.value.borrow().as_ref() {
			return value.clone();
		}
		match self.tag() {
			"textarea" => self.0.text.borrow().clone(),
			"option" => self
				.attr("value")
				.unwrap_or_else(|| self.0.text.borrow().trim().to_string()),
			_ => self.attr("value").unwrap_or_default(),
		}
	}

	/// Set the current value, as user input would
	pub fn set_value(&self, value: &str) {
		*self.0.value.borrow_mut() = Some(value.to_string());
	}

	/// Checkedness of a checkbox or radio input
	pub fn is_checked(&self) -> bool {
		self.0.checked.get().unwrap_or_else(|| self.has_attr("checked"))
	}

	/// Set checkedness
	pub fn set_checked(&self, checked: bool) {
		self.0.checked.set(Some(checked));
	}

	/// Whether an option is marked selected
	pub fn is_selected(&self) -> bool {
		self.0.selected.get().unwrap_or_else(|| self.has_attr("selected"))
	}

	/// Set option selectedness
	pub fn set_selected(&self, selected: bool) {
		self.0.selected.set(Some(selected));
	}

	/// Files selected in a file input
	pub fn files(&self) -> Vec<FileEntry> {
		self.0.files.borrow().clone()
	}

	/// Replace the selected files
	pub fn set_files(&self, files: Vec<FileEntry>) {
		*self.0.files.borrow_mut() = files;
	}

	/// Toggle the `disabled` attribute
	pub fn set_disabled(&self, disabled: bool) {
		if disabled {
			self.set_attribute("disabled", "");
		} else {
			self.remove_attribute("disabled");
		}
	}

	/// Non-owning handle to this element
	pub fn downgrade(&self) -> WeakElement {
		WeakElement(Rc::downgrade(&self.0))
	}

	/// Identity comparison
	pub fn ptr_eq(&self, other: &Element) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}

	pub(crate) fn identity(&self) -> usize {
		Rc::as_ptr(&self.0) as usize
	}

	fn input_type(&self) -> String {
		self.attr("type")
			.map(|kind| kind.to_ascii_lowercase())
			.unwrap_or_else(|| "text".to_string())
	}

	fn is_submit_button(&self) -> bool {
		match self.tag() {
			"button" => self
				.attr("type")
				.is_none_or(|kind| kind.eq_ignore_ascii_case("submit")),
			"input" => matches!(self.input_type().as_str(), "submit" | "image"),
			_ => false,
		}
	}

	fn collect_controls(&self, inherited_disabled: bool, out: &mut Vec<Control<Element>>) {
		for child in self.children() {
			let disabled = inherited_disabled || child.has_attr("disabled");
			match child.tag() {
				"input" | "select" | "textarea" | "button" => {
					let kind = child.field_kind();
					out.push(Control {
						handle: child.clone(),
						name: child.attr("name"),
						disabled,
						kind,
					});
				}
				"fieldset" => child.collect_controls(disabled, out),
				_ => child.collect_controls(inherited_disabled, out),
			}
		}
	}

	fn field_kind(&self) -> FieldKind<Element> {
		match self.tag() {
			"select" => {
				let options = self.select_options();
				if self.has_attr("multiple") {
					FieldKind::SelectMultiple { options }
				} else {
					FieldKind::SelectSingle { options }
				}
			}
			"button" => FieldKind::Button {
				value: self.value(),
				submit: self.is_submit_button(),
			},
			"textarea" => FieldKind::Text,
			_ => FieldKind::from_input_type(
				&self.input_type(),
				InputState {
					value: self.value(),
					value_attribute: self.attr("value"),
					checked: self.is_checked(),
					multiple: self.has_attr("multiple"),
					files: self.files(),
				},
			),
		}
	}

	fn select_options(&self) -> Vec<OptionControl<Element>> {
		let mut options = Vec::new();
		for child in self.children() {
			match child.tag() {
				"option" => options.push(child.option_control(false)),
				"optgroup" => {
					let group_disabled = child.has_attr("disabled");
					for option in child.children().into_iter().filter(|c| c.tag() == "option") {
						options.push(option.option_control(group_disabled));
					}
				}
				_ => {}
			}
		}

		// A single-choice select shows exactly one option: the last one marked
		// selected, else the first enabled one.
		if !self.has_attr("multiple") {
			let chosen = options
				.iter()
				.rposition(|option| option.selected)
				.or_else(|| options.iter().position(|option| !option.disabled));
			for (index, option) in options.iter_mut().enumerate() {
				option.selected = Some(index) == chosen;
			}
		}
		options
	}

	fn option_control(&self, group_disabled: bool) -> OptionControl<Element> {
		OptionControl {
			handle: self.clone(),
			value: self.value(),
			selected: self.is_selected(),
			disabled: group_disabled || self.has_attr("disabled"),
		}
	}
}

impl PartialEq for Element {
	fn eq(&self, other: &Self) -> bool {
		self.ptr_eq(other)
	}
}

impl Eq for Element {}

impl fmt::Debug for Element {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut debug = f.debug_struct("Element");
		debug.field("tag", &self.tag());
		if let Some(name) = self.attr("name") {
			debug.field("name", &name);
		}
		debug.finish_non_exhaustive()
	}
}

impl FormHost for Element {
	type Handle = Element;

	fn controls(&self) -> Vec<Control<Element>> {
		let mut out = Vec::new();
		self.collect_controls(false, &mut out);
		out
	}

	fn entries(&self, submitter: Option<&Element>) -> Vec<(String, EntryValue)> {
		let mut entries = Vec::new();
		for control in self.controls() {
			if control.disabled {
				continue;
			}
			let Some(name) = control.field_name().map(str::to_string) else {
				continue;
			};
			match control.kind {
				FieldKind::Button { value, submit } => {
					if submit && submitter == Some(&control.handle) {
						entries.push((name, EntryValue::Text(value)));
					}
				}
				FieldKind::Checkbox { checked, value } => {
					if checked {
						let value = value.unwrap_or_else(|| "on".to_string());
						entries.push((name, EntryValue::Text(value)));
					}
				}
				FieldKind::Radio { checked, value } => {
					if checked {
						entries.push((name, EntryValue::Text(value)));
					}
				}
				FieldKind::File { files, .. } => {
					if files.is_empty() {
						entries.push((name.clone(), EntryValue::File(FileEntry::empty())));
					}
					for file in files {
						entries.push((name.clone(), EntryValue::File(file)));
					}
				}
				FieldKind::SelectSingle { options } | FieldKind::SelectMultiple { options } => {
					for option in options {
						if option.selected && !option.disabled {
							entries.push((name.clone(), EntryValue::Text(option.value)));
						}
					}
				}
				FieldKind::Text
				| FieldKind::Number { .. }
				| FieldKind::Date { .. }
				| FieldKind::DateTime { .. } => {
					entries.push((name, EntryValue::Text(control.handle.value())));
				}
			}
		}
		entries
	}
}

/// Submission context for the in-memory host
#[derive(Debug, Clone, Default)]
pub struct SubmitEvent {
	current_target: Option<Element>,
	submitter: Option<Element>,
}

impl SubmitEvent {
	/// A submission whose current target is `target`
	pub fn new(target: Element) -> Self {
		Self {
			current_target: Some(target),
			submitter: None,
		}
	}

	/// A submission with no current target
	pub fn detached() -> Self {
		Self::default()
	}

	/// Record the control that triggered the submission
	pub fn with_submitter(mut self, submitter: Element) -> Self {
		self.submitter = Some(submitter);
		self
	}

	/// The event's current target
	pub fn current_target(&self) -> Option<&Element> {
		self.current_target.as_ref()
	}
}

impl SubmissionContext for SubmitEvent {
	type Form = Element;

	fn form(&self) -> Option<Element> {
		self.current_target.clone().filter(Element::is_form)
	}

	fn submitter(&self) -> Option<Element> {
		self.submitter.clone()
	}
}
