//! Capability-tagged field model
//!
//! A host environment reads each form control once into a [`Control`]. The
//! control's [`FieldKind`] decides how its value is normalized, so the
//! extractor never inspects host element types itself.

use crate::value::FileEntry;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A control read from the host, in document order
#[derive(Debug, Clone)]
pub struct Control<H> {
	/// Host element handle, compared by identity
	pub handle: H,
	/// `name` attribute; controls without one are skipped
	pub name: Option<String>,
	/// Whether the control (or an enclosing fieldset) is disabled
	pub disabled: bool,
	/// What kind of control this is, with its live state
	pub kind: FieldKind<H>,
}

impl<H> Control<H> {
	/// The control name, if present and non-empty
	pub fn field_name(&self) -> Option<&str> {
		self.name.as_deref().filter(|name| !name.is_empty())
	}

	/// Category used to detect heterogeneous groups
	pub fn category(&self) -> FieldCategory {
		self.kind.category()
	}
}

/// An `<option>` of a select control
#[derive(Debug, Clone)]
pub struct OptionControl<H> {
	/// Host element handle of the option
	pub handle: H,
	/// Option value (its text when no value attribute is present)
	pub value: String,
	/// Selectedness
	pub selected: bool,
	/// Whether the option or its optgroup is disabled
	pub disabled: bool,
}

/// Tagged union over the supported control types
#[derive(Debug, Clone)]
pub enum FieldKind<H> {
	/// Text-like input or textarea; its value comes from the entry set
	Text,
	/// `number` or `range` input
	Number {
		/// Raw value string
		value: String,
	},
	/// `date` input
	Date {
		/// Raw value string (`YYYY-MM-DD`)
		value: String,
	},
	/// `datetime-local` input
	DateTime {
		/// Raw value string (`YYYY-MM-DDTHH:MM`)
		value: String,
	},
	/// Checkbox input
	Checkbox {
		/// Checkedness
		checked: bool,
		/// `value` attribute, when one is present
		value: Option<String>,
	},
	/// Radio input
	Radio {
		/// Checkedness
		checked: bool,
		/// Value, `"on"` when no value attribute is present
		value: String,
	},
	/// Select without the `multiple` attribute
	SelectSingle {
		/// Options in document order
		options: Vec<OptionControl<H>>,
	},
	/// Select with the `multiple` attribute
	SelectMultiple {
		/// Options in document order
		options: Vec<OptionControl<H>>,
	},
	/// File input
	File {
		/// Whether the `multiple` attribute is present
		multiple: bool,
		/// Selected files
		files: Vec<FileEntry>,
	},
	/// `<button>` or a submit/reset/button/image input
	Button {
		/// Button value
		value: String,
		/// Whether activating the button submits the form
		submit: bool,
	},
}

impl<H> FieldKind<H> {
	/// Category of this kind
	pub fn category(&self) -> FieldCategory {
		match self {
			Self::Text => FieldCategory::Text,
			Self::Number { .. } => FieldCategory::Number,
			Self::Date { .. } => FieldCategory::Date,
			Self::DateTime { .. } => FieldCategory::DateTime,
			Self::Checkbox { .. } => FieldCategory::Checkbox,
			Self::Radio { .. } => FieldCategory::Radio,
			Self::SelectSingle { .. } | Self::SelectMultiple { .. } => FieldCategory::Select,
			Self::File { .. } => FieldCategory::File,
			Self::Button { .. } => FieldCategory::Button,
		}
	}

	/// Map an `<input type>` to a kind, given the input's live state
	///
	/// Unknown types fall back to text, as browsers do.
	pub fn from_input_type(input_type: &str, state: InputState) -> Self {
		match input_type.to_ascii_lowercase().as_str() {
			"number" | "range" => Self::Number { value: state.value },
			"date" => Self::Date { value: state.value },
			"datetime-local" => Self::DateTime { value: state.value },
			"checkbox" => Self::Checkbox {
				checked: state.checked,
				value: state.value_attribute,
			},
			"radio" => Self::Radio {
				checked: state.checked,
				value: state.value_attribute.unwrap_or_else(|| "on".to_string()),
			},
			"file" => Self::File {
				multiple: state.multiple,
				files: state.files,
			},
			"submit" | "image" => Self::Button {
				value: state.value,
				submit: true,
			},
			"reset" | "button" => Self::Button {
				value: state.value,
				submit: false,
			},
			_ => Self::Text,
		}
	}
}

/// Live state of an `<input>` needed to build its [`FieldKind`]
#[derive(Debug, Clone, Default)]
pub struct InputState {
	/// Current value
	pub value: String,
	/// `value` attribute, when present
	pub value_attribute: Option<String>,
	/// Checkedness
	pub checked: bool,
	/// Whether the `multiple` attribute is present
	pub multiple: bool,
	/// Selected files
	pub files: Vec<FileEntry>,
}

/// Coarse control family used for the mixed-type check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldCategory {
	/// Text-like inputs and textareas
	Text,
	/// Number and range inputs
	Number,
	/// Date inputs
	Date,
	/// Datetime-local inputs
	DateTime,
	/// Checkboxes
	Checkbox,
	/// Radio buttons
	Radio,
	/// Single and multiple selects
	Select,
	/// File inputs
	File,
	/// Buttons and button-like inputs
	Button,
}

impl fmt::Display for FieldCategory {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let label = match self {
			Self::Text => "text",
			Self::Number => "number",
			Self::Date => "date",
			Self::DateTime => "datetime-local",
			Self::Checkbox => "checkbox",
			Self::Radio => "radio",
			Self::Select => "select",
			Self::File => "file",
			Self::Button => "button",
		};
		f.write_str(label)
	}
}

/// A value in the host's native entry set
#[derive(Debug, Clone, PartialEq)]
pub enum EntryValue {
	/// String entry
	Text(String),
	/// File entry
	File(FileEntry),
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("number", FieldCategory::Number)]
	#[case("RANGE", FieldCategory::Number)]
	#[case("date", FieldCategory::Date)]
	#[case("datetime-local", FieldCategory::DateTime)]
	#[case("checkbox", FieldCategory::Checkbox)]
	#[case("radio", FieldCategory::Radio)]
	#[case("file", FieldCategory::File)]
	#[case("submit", FieldCategory::Button)]
	#[case("image", FieldCategory::Button)]
	#[case("email", FieldCategory::Text)]
	#[case("hidden", FieldCategory::Text)]
	#[case("not-a-type", FieldCategory::Text)]
	fn test_input_type_category(#[case] input_type: &str, #[case] expected: FieldCategory) {
		let kind = FieldKind::<()>::from_input_type(input_type, InputState::default());
		assert_eq!(kind.category(), expected);
	}

	#[rstest]
	#[case("submit", true)]
	#[case("IMAGE", true)]
	#[case("reset", false)]
	#[case("button", false)]
	fn test_button_input_submit_capability(#[case] input_type: &str, #[case] expected: bool) {
		let kind = FieldKind::<()>::from_input_type(input_type, InputState::default());
		assert!(matches!(kind, FieldKind::Button { submit, .. } if submit == expected));
	}

	#[rstest]
	fn test_radio_value_defaults_to_on() {
		let kind = FieldKind::<()>::from_input_type("radio", InputState::default());
		match kind {
			FieldKind::Radio { value, checked } => {
				assert_eq!(value, "on");
				assert!(!checked);
			}
			other => panic!("unexpected kind: {other:?}"),
		}
	}

	#[rstest]
	fn test_empty_name_is_not_a_field_name() {
		let control = Control {
			handle: (),
			name: Some(String::new()),
			disabled: false,
			kind: FieldKind::Text,
		};
		assert_eq!(control.field_name(), None);
	}
}
