//! Normalized values produced by extraction
//!
//! [`FormData`] is the output mapping: one [`FormValue`] per distinct field
//! name, kept in the order names were first seen. It is always a fresh
//! structure and never a view over the live form.

use chrono::{DateTime, NaiveDate, Utc};
use indexmap::IndexMap;
use std::any::Any;
use std::fmt;
use std::rc::Rc;

/// An arbitrary value registered for an element through an
/// [`OverrideStore`](crate::OverrideStore)
///
/// Equality is identity: two overrides are equal only when they share the
/// same allocation.
#[derive(Clone)]
pub struct OverrideValue(Rc<dyn Any>);

impl OverrideValue {
	/// Wrap a value
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_form_data::OverrideValue;
	///
	/// let value = OverrideValue::new(42_u32);
	/// assert_eq!(value.downcast_ref::<u32>(), Some(&42));
	/// assert!(value.downcast_ref::<String>().is_none());
	/// ```
	pub fn new<T: Any>(value: T) -> Self {
		Self(Rc::new(value))
	}

	/// Wrap an already shared value without copying it
	pub fn from_rc(value: Rc<dyn Any>) -> Self {
		Self(value)
	}

	/// Borrow the inner value as `T`, if it is one
	pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
		self.0.downcast_ref::<T>()
	}

	/// Whether the inner value is a `T`
	pub fn is<T: Any>(&self) -> bool {
		self.0.is::<T>()
	}

	/// The shared inner value
	pub fn as_rc(&self) -> &Rc<dyn Any> {
		&self.0
	}
}

impl PartialEq for OverrideValue {
	fn eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}
}

impl fmt::Debug for OverrideValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "OverrideValue({:p})", Rc::as_ptr(&self.0))
	}
}

/// A file selected in a file input
#[derive(Debug, Clone, PartialEq)]
pub struct FileEntry {
	/// File name without path
	pub name: String,
	/// MIME type reported by the host, empty when unknown
	pub content_type: String,
	/// Size in bytes
	pub size: u64,
	/// Last modification time, when the host reports one
	pub last_modified: Option<DateTime<Utc>>,
	/// The browser `File` object this entry was read from
	#[cfg(target_arch = "wasm32")]
	pub handle: Option<web_sys::File>,
}

impl FileEntry {
	/// Create a file entry with a name, MIME type and size
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_form_data::FileEntry;
	///
	/// let file = FileEntry::new("avatar.png", "image/png", 2048);
	/// assert_eq!(file.name, "avatar.png");
	/// assert!(!file.is_empty());
	/// ```
	pub fn new(name: impl Into<String>, content_type: impl Into<String>, size: u64) -> Self {
		Self {
			name: name.into(),
			content_type: content_type.into(),
			size,
			last_modified: None,
			#[cfg(target_arch = "wasm32")]
			handle: None,
		}
	}

	/// The placeholder a browser submits for a file input with no selection
	pub fn empty() -> Self {
		Self::new("", "application/octet-stream", 0)
	}

	/// Set the last modification time
	pub fn with_last_modified(mut self, last_modified: DateTime<Utc>) -> Self {
		self.last_modified = Some(last_modified);
		self
	}

	/// Whether this is the no-selection placeholder
	pub fn is_empty(&self) -> bool {
		self.name.is_empty() && self.size == 0
	}
}

/// A normalized field value
#[derive(Debug, Clone, PartialEq)]
pub enum FormValue {
	/// Raw string value of a text-like control
	Text(String),
	/// Numeric value of a number or range input
	Number(f64),
	/// Calendar date of a date input
	Date(NaiveDate),
	/// Timestamp of a datetime-local input
	DateTime(DateTime<Utc>),
	/// Checked state of a checkbox without a value attribute
	Bool(bool),
	/// Unset, empty or unparsable value
	Null,
	/// A selected file
	File(FileEntry),
	/// Multi-select options, checked checkbox group members or selected files
	List(Vec<FormValue>),
	/// A value registered through an override store
	Custom(OverrideValue),
}

impl FormValue {
	/// Whether the value is [`FormValue::Null`]
	pub fn is_null(&self) -> bool {
		matches!(self, Self::Null)
	}

	/// The string content of a [`FormValue::Text`]
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::Text(text) => Some(text),
			_ => None,
		}
	}

	/// The number held by a [`FormValue::Number`]
	pub fn as_f64(&self) -> Option<f64> {
		match self {
			Self::Number(number) => Some(*number),
			_ => None,
		}
	}

	/// The flag held by a [`FormValue::Bool`]
	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Self::Bool(flag) => Some(*flag),
			_ => None,
		}
	}

	/// The date held by a [`FormValue::Date`]
	pub fn as_date(&self) -> Option<NaiveDate> {
		match self {
			Self::Date(date) => Some(*date),
			_ => None,
		}
	}

	/// The timestamp held by a [`FormValue::DateTime`]
	pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
		match self {
			Self::DateTime(timestamp) => Some(*timestamp),
			_ => None,
		}
	}

	/// The file held by a [`FormValue::File`]
	pub fn as_file(&self) -> Option<&FileEntry> {
		match self {
			Self::File(file) => Some(file),
			_ => None,
		}
	}

	/// The items of a [`FormValue::List`]
	pub fn as_list(&self) -> Option<&[FormValue]> {
		match self {
			Self::List(items) => Some(items),
			_ => None,
		}
	}

	/// The override held by a [`FormValue::Custom`]
	pub fn as_override(&self) -> Option<&OverrideValue> {
		match self {
			Self::Custom(value) => Some(value),
			_ => None,
		}
	}

	/// Borrow a [`FormValue::Custom`] as `T`
	pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
		self.as_override().and_then(OverrideValue::downcast_ref)
	}
}

impl From<&str> for FormValue {
	fn from(value: &str) -> Self {
		Self::Text(value.to_string())
	}
}

impl From<String> for FormValue {
	fn from(value: String) -> Self {
		Self::Text(value)
	}
}

impl From<f64> for FormValue {
	fn from(value: f64) -> Self {
		Self::Number(value)
	}
}

impl From<bool> for FormValue {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}

impl From<NaiveDate> for FormValue {
	fn from(value: NaiveDate) -> Self {
		Self::Date(value)
	}
}

impl From<DateTime<Utc>> for FormValue {
	fn from(value: DateTime<Utc>) -> Self {
		Self::DateTime(value)
	}
}

impl From<FileEntry> for FormValue {
	fn from(value: FileEntry) -> Self {
		Self::File(value)
	}
}

impl From<OverrideValue> for FormValue {
	fn from(value: OverrideValue) -> Self {
		Self::Custom(value)
	}
}

impl<T: Into<FormValue>> From<Vec<T>> for FormValue {
	fn from(values: Vec<T>) -> Self {
		Self::List(values.into_iter().map(Into::into).collect())
	}
}

/// Output mapping of field name to normalized value
///
/// Names are unique. Iteration follows the order in which names were first
/// inserted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormData {
	values: IndexMap<String, FormValue>,
}

impl FormData {
	/// Create an empty mapping
	pub fn new() -> Self {
		Self::default()
	}

	/// Insert or replace the value for `name`, keeping its original position
	pub fn insert(&mut self, name: impl Into<String>, value: FormValue) -> Option<FormValue> {
		self.values.insert(name.into(), value)
	}

	/// Remove the value for `name`; later entries shift up
	pub fn remove(&mut self, name: &str) -> Option<FormValue> {
		self.values.shift_remove(name)
	}

	/// Value for `name`
	pub fn get(&self, name: &str) -> Option<&FormValue> {
		self.values.get(name)
	}

	/// Whether `name` has an entry
	pub fn contains(&self, name: &str) -> bool {
		self.values.contains_key(name)
	}

	/// Number of entries
	pub fn len(&self) -> usize {
		self.values.len()
	}

	/// Whether the mapping has no entries
	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}

	/// Field names in insertion order
	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.values.keys().map(String::as_str)
	}

	/// Entries in insertion order
	pub fn iter(&self) -> impl Iterator<Item = (&str, &FormValue)> {
		self.values.iter().map(|(name, value)| (name.as_str(), value))
	}

	/// Consume the mapping into its underlying ordered map
	pub fn into_map(self) -> IndexMap<String, FormValue> {
		self.values
	}
}

impl IntoIterator for FormData {
	type Item = (String, FormValue);
	type IntoIter = indexmap::map::IntoIter<String, FormValue>;

	fn into_iter(self) -> Self::IntoIter {
		self.values.into_iter()
	}
}

impl<K: Into<String>> FromIterator<(K, FormValue)> for FormData {
	fn from_iter<I: IntoIterator<Item = (K, FormValue)>>(iter: I) -> Self {
		let mut data = Self::new();
		for (name, value) in iter {
			data.insert(name, value);
		}
		data
	}
}
