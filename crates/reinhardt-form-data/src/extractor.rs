//! Form data extraction
//!
//! [`FormExtractor`] turns one submission into a [`FormData`] mapping:
//!
//! 1. Collect the host's native entry list for the submission (repeated names
//!    keep their last value).
//! 2. Seed every named control missing from that list with the configured
//!    placeholder, so unchecked boxes and empty multi-selects still appear.
//! 3. Overwrite each value with its per-kind normalization, consulting the
//!    override store before the control's native value. Controls are visited
//!    in document order, so when several controls share a name the last one
//!    decides; checkbox, radio and button groups are normalized once, at their
//!    last member.
//!
//! Buttons contribute only when they triggered the submission.

use crate::config::{ExtractOptions, MixedFieldPolicy};
use crate::dom::Element;
use crate::error::{ExtractError, ExtractResult};
use crate::field::{Control, EntryValue, FieldCategory, FieldKind, OptionControl};
use crate::host::{FormHost, OverrideStore, SubmissionContext};
use crate::registry::with_default_registry;
use crate::value::{FileEntry, FormData, FormValue};
use crate::{debug_log, warn_log};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];

// HTML "valid floating-point number" grammar
static NUMBER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^-?(?:[0-9]+(?:\.[0-9]+)?|\.[0-9]+)(?:[eE][+-]?[0-9]+)?$")
		.expect("NUMBER_REGEX: invalid regex pattern")
});

/// Extracts normalized data from form submissions
#[derive(Debug, Clone, Copy, Default)]
pub struct FormExtractor {
	options: ExtractOptions,
}

impl FormExtractor {
	/// Create an extractor with the given options
	pub fn new(options: ExtractOptions) -> Self {
		Self { options }
	}

	/// Options in effect
	pub fn options(&self) -> &ExtractOptions {
		&self.options
	}

	/// Extract the submission described by `context`
	///
	/// # Errors
	///
	/// - [`ExtractError::InvalidContext`] when `context` is `None`
	/// - [`ExtractError::NotAForm`] when the context does not target a form
	/// - [`ExtractError::MixedFieldTypes`] when a name is shared by controls of
	///   different categories and [`MixedFieldPolicy::Reject`] is active
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_form_data::dom::{Element, SubmitEvent};
	/// use reinhardt_form_data::{ExtractOptions, FormExtractor, FormValue, OverrideRegistry};
	///
	/// let form = Element::form().with_child(
	///     Element::select()
	///         .with_name("tags")
	///         .multiple()
	///         .with_child(Element::option("rust").selected())
	///         .with_child(Element::option("wasm"))
	///         .with_child(Element::option("web").selected()),
	/// );
	///
	/// let extractor = FormExtractor::new(ExtractOptions::default());
	/// let data = extractor
	///     .extract(Some(&SubmitEvent::new(form)), &OverrideRegistry::new())
	///     .unwrap();
	///
	/// assert_eq!(data.get("tags"), Some(&FormValue::from(vec!["rust", "web"])));
	/// ```
	pub fn extract<C, S>(&self, context: Option<&C>, overrides: &S) -> ExtractResult<FormData>
	where
		C: SubmissionContext,
		S: OverrideStore<<C::Form as FormHost>::Handle>,
	{
		let context = context.ok_or(ExtractError::InvalidContext)?;
		let form = context.form().ok_or(ExtractError::NotAForm)?;
		let submitter = context.submitter();
		let controls = form.controls();

		if self.options.mixed_field_policy == MixedFieldPolicy::Reject {
			reject_mixed_groups(&controls)?;
		}

		let collected: FormData = form
			.entries(submitter.as_ref())
			.into_iter()
			.map(|(name, value)| (name, entry_value(value)))
			.collect();
		let mut data = collected.clone();

		let pass = Pass {
			controls: &controls,
			overrides,
			submitter: submitter.as_ref(),
		};
		let last_members = last_group_members(&controls);

		for (index, control) in controls.iter().enumerate() {
			let Some(name) = control.field_name() else {
				debug_log!("Skipping unnamed {} control", control.category());
				continue;
			};
			let closes_group = last_members.get(&(name, control.category())) == Some(&index);

			if matches!(control.kind, FieldKind::Button { .. }) {
				if closes_group {
					pass.apply_button_group(name, &mut data);
				}
				continue;
			}

			if !data.contains(name) {
				data.insert(name, self.options.unsubmitted_default.value());
			}

			match &control.kind {
				FieldKind::Checkbox { .. } => {
					if closes_group {
						data.insert(name, pass.checkbox_group(name));
					}
				}
				FieldKind::Radio { .. } => {
					if closes_group {
						data.insert(name, pass.radio_group(name));
					}
				}
				_ => {
					let submitted = collected
						.get(name)
						.cloned()
						.unwrap_or_else(|| self.options.unsubmitted_default.value());
					if let Some(value) = pass.normalize(control, submitted) {
						data.insert(name, value);
					}
				}
			}
		}

		Ok(data)
	}
}

/// Extract with default options and the thread's default override registry
///
/// This is the in-memory counterpart of the browser `dataFrom(event)`.
///
/// # Examples
///
/// ```
/// use reinhardt_form_data::dom::{Element, SubmitEvent};
/// use reinhardt_form_data::{data_from, ExtractError};
///
/// assert_eq!(
///     data_from::<SubmitEvent>(None).unwrap_err(),
///     ExtractError::InvalidContext
/// );
///
/// let not_a_form = SubmitEvent::new(Element::new("div"));
/// assert_eq!(data_from(Some(&not_a_form)).unwrap_err(), ExtractError::NotAForm);
/// ```
pub fn data_from<C>(context: Option<&C>) -> ExtractResult<FormData>
where
	C: SubmissionContext<Form = Element>,
{
	with_default_registry(|registry| FormExtractor::default().extract(context, registry))
}

fn reject_mixed_groups<H>(controls: &[Control<H>]) -> ExtractResult<()> {
	let mut seen: HashMap<&str, FieldCategory> = HashMap::new();
	for control in controls {
		let Some(name) = control.field_name() else {
			continue;
		};
		let category = control.category();
		let first = *seen.entry(name).or_insert(category);
		if first != category {
			warn_log!("Field '{}' mixes {} and {} controls", name, first, category);
			return Err(ExtractError::MixedFieldTypes {
				name: name.to_string(),
				first,
				second: category,
			});
		}
	}
	Ok(())
}

/// Index of the last control of each (name, category) group
fn last_group_members<H>(controls: &[Control<H>]) -> HashMap<(&str, FieldCategory), usize> {
	controls
		.iter()
		.enumerate()
		.filter_map(|(index, control)| {
			control
				.field_name()
				.map(|name| ((name, control.category()), index))
		})
		.collect()
}

fn entry_value(value: EntryValue) -> FormValue {
	match value {
		EntryValue::Text(text) => FormValue::Text(text),
		EntryValue::File(file) => FormValue::File(file),
	}
}

/// State shared by one extraction pass
struct Pass<'a, H, S> {
	controls: &'a [Control<H>],
	overrides: &'a S,
	submitter: Option<&'a H>,
}

impl<H, S> Pass<'_, H, S>
where
	H: PartialEq,
	S: OverrideStore<H>,
{
	fn override_or(&self, handle: &H, fallback: impl FnOnce() -> FormValue) -> FormValue {
		match self.overrides.get_override(handle) {
			Some(value) => FormValue::Custom(value),
			None => fallback(),
		}
	}

	fn members(&self, name: &str, category: FieldCategory) -> impl Iterator<Item = &Control<H>> {
		self.controls.iter().filter(move |control| {
			control.field_name() == Some(name) && control.category() == category
		})
	}

	/// Per-control normalization; `None` for kinds normalized as a group
	///
	/// `submitted` is the name's last native entry, or the placeholder when
	/// the native entry set has none.
	fn normalize(&self, control: &Control<H>, submitted: FormValue) -> Option<FormValue> {
		let handle = &control.handle;
		let value = match &control.kind {
			FieldKind::Text => self.override_or(handle, || submitted),
			FieldKind::Number { value } => self.override_or(handle, || parse_number(value)),
			FieldKind::Date { value } => self.override_or(handle, || parse_date(value)),
			FieldKind::DateTime { value } => self.override_or(handle, || parse_datetime(value)),
			FieldKind::SelectSingle { options } => {
				self.override_or(handle, || self.single_select(options))
			}
			FieldKind::SelectMultiple { options } => {
				self.override_or(handle, || self.multiple_select(options))
			}
			FieldKind::File { multiple, files } => {
				self.override_or(handle, || selected_files(*multiple, files))
			}
			FieldKind::Checkbox { .. } | FieldKind::Radio { .. } | FieldKind::Button { .. } => {
				return None;
			}
		};
		Some(value)
	}

	fn option_value(&self, option: &OptionControl<H>) -> FormValue {
		self.override_or(&option.handle, || {
			if option.value.is_empty() {
				FormValue::Null
			} else {
				FormValue::Text(option.value.clone())
			}
		})
	}

	fn single_select(&self, options: &[OptionControl<H>]) -> FormValue {
		options
			.iter()
			.find(|option| option.selected && !option.disabled)
			.map_or(FormValue::Null, |option| self.option_value(option))
	}

	fn multiple_select(&self, options: &[OptionControl<H>]) -> FormValue {
		let values = options
			.iter()
			.filter(|option| option.selected && !option.disabled)
			.map(|option| self.option_value(option))
			.filter(|value| !value.is_null())
			.collect();
		FormValue::List(values)
	}

	fn checkbox_group(&self, name: &str) -> FormValue {
		let members: Vec<_> = self.members(name, FieldCategory::Checkbox).collect();

		if let [single] = members.as_slice() {
			let FieldKind::Checkbox { checked, value } = &single.kind else {
				return FormValue::Null;
			};
			let registered = self.overrides.get_override(&single.handle);
			return match (registered, value) {
				(None, None) => FormValue::Bool(*checked),
				(_, _) if !checked => FormValue::Null,
				(Some(registered), _) => FormValue::Custom(registered),
				(None, Some(value)) => FormValue::Text(value.clone()),
			};
		}

		let values = members
			.into_iter()
			.filter_map(|member| match &member.kind {
				FieldKind::Checkbox {
					checked: true,
					value,
				} => Some(self.override_or(&member.handle, || {
					FormValue::Text(value.clone().unwrap_or_else(|| "on".to_string()))
				})),
				_ => None,
			})
			.collect();
		FormValue::List(values)
	}

	fn radio_group(&self, name: &str) -> FormValue {
		self.members(name, FieldCategory::Radio)
			.filter_map(|member| match &member.kind {
				FieldKind::Radio {
					checked: true,
					value,
				} => Some((member, value)),
				_ => None,
			})
			.last()
			.map_or(FormValue::Null, |(member, value)| {
				self.override_or(&member.handle, || FormValue::Text(value.clone()))
			})
	}

	fn apply_button_group(&self, name: &str, data: &mut FormData) {
		let Some(submitter) = self.submitter else {
			return;
		};
		let trigger = self
			.members(name, FieldCategory::Button)
			.find(|member| &member.handle == submitter && !member.disabled);
		if let Some(trigger) = trigger
			&& let FieldKind::Button {
				value,
				submit: true,
			} = &trigger.kind
		{
			let normalized = self.override_or(&trigger.handle, || {
				if value.is_empty() {
					FormValue::Null
				} else {
					FormValue::Text(value.clone())
				}
			});
			data.insert(name, normalized);
		}
	}
}

fn selected_files(multiple: bool, files: &[FileEntry]) -> FormValue {
	if multiple {
		FormValue::List(files.iter().cloned().map(FormValue::File).collect())
	} else {
		files
			.first()
			.cloned()
			.map_or(FormValue::Null, FormValue::File)
	}
}

/// Parse a number input value; empty, invalid and non-finite values are `Null`
///
/// Only valid floating-point numbers are accepted, as for `valueAsNumber`.
pub fn parse_number(raw: &str) -> FormValue {
	if !NUMBER_REGEX.is_match(raw) {
		return FormValue::Null;
	}
	raw.parse::<f64>()
		.ok()
		.filter(|number| number.is_finite())
		.map_or(FormValue::Null, FormValue::Number)
}

/// Parse a date input value (`YYYY-MM-DD`)
pub fn parse_date(raw: &str) -> FormValue {
	NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_or(FormValue::Null, FormValue::Date)
}

/// Parse a datetime-local input value as UTC, truncated to milliseconds
pub fn parse_datetime(raw: &str) -> FormValue {
	let raw = raw.trim();
	DATETIME_FORMATS
		.iter()
		.find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
		.and_then(|naive| DateTime::<Utc>::from_timestamp_millis(naive.and_utc().timestamp_millis()))
		.map_or(FormValue::Null, FormValue::DateTime)
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::TimeZone;
	use rstest::rstest;

	#[rstest]
	#[case("42", FormValue::Number(42.0))]
	#[case("-1.5", FormValue::Number(-1.5))]
	#[case(".5", FormValue::Number(0.5))]
	#[case("1e3", FormValue::Number(1000.0))]
	#[case("2E-2", FormValue::Number(0.02))]
	#[case("", FormValue::Null)]
	#[case(" -1.5 ", FormValue::Null)]
	#[case("+5", FormValue::Null)]
	#[case("1.", FormValue::Null)]
	#[case("1e", FormValue::Null)]
	#[case("1e400", FormValue::Null)]
	#[case("abc", FormValue::Null)]
	#[case("NaN", FormValue::Null)]
	#[case("inf", FormValue::Null)]
	fn test_parse_number(#[case] raw: &str, #[case] expected: FormValue) {
		assert_eq!(parse_number(raw), expected);
	}

	#[rstest]
	#[case("2024-02-29", Some((2024, 2, 29)))]
	#[case("2023-02-29", None)]
	#[case("", None)]
	#[case("29/02/2024", None)]
	fn test_parse_date(#[case] raw: &str, #[case] expected: Option<(i32, u32, u32)>) {
		let expected = expected
			.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d))
			.map_or(FormValue::Null, FormValue::Date);
		assert_eq!(parse_date(raw), expected);
	}

	#[rstest]
	fn test_parse_datetime_minutes() {
		assert_eq!(
			parse_datetime("2024-05-01T13:45"),
			FormValue::DateTime(Utc.with_ymd_and_hms(2024, 5, 1, 13, 45, 0).unwrap())
		);
	}

	#[rstest]
	fn test_parse_datetime_truncates_to_milliseconds() {
		let FormValue::DateTime(timestamp) = parse_datetime("2024-05-01T13:45:10.123456") else {
			panic!("expected a timestamp");
		};
		assert_eq!(timestamp.timestamp_millis() % 1000, 123);
		assert_eq!(timestamp.timestamp_subsec_nanos(), 123_000_000);
	}

	#[rstest]
	#[case("")]
	#[case("2024-05-01")]
	#[case("2024-13-01T00:00")]
	fn test_parse_datetime_invalid(#[case] raw: &str) {
		assert_eq!(parse_datetime(raw), FormValue::Null);
	}

	#[rstest]
	fn test_selected_files() {
		let file = FileEntry::new("a.txt", "text/plain", 3);

		assert_eq!(selected_files(false, &[]), FormValue::Null);
		assert_eq!(selected_files(true, &[]), FormValue::List(vec![]));
		assert_eq!(
			selected_files(false, std::slice::from_ref(&file)),
			FormValue::File(file.clone())
		);
		assert_eq!(
			selected_files(true, &[file.clone(), file.clone()]),
			FormValue::List(vec![FormValue::File(file.clone()), FormValue::File(file)])
		);
	}
}
