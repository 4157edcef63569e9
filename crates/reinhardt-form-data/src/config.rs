//! Extraction options
//!
//! Both settings cover behavior that has changed across versions of the
//! browser `dataFrom` helper, so callers choose explicitly.
//!
//! ```
//! use reinhardt_form_data::{ExtractOptions, MixedFieldPolicy, UnsubmittedDefault};
//!
//! let options = ExtractOptions::from_json(
//!     r#"{ "unsubmitted_default": "null", "mixed_field_policy": "best_effort" }"#,
//! )
//! .unwrap();
//!
//! assert_eq!(options.unsubmitted_default, UnsubmittedDefault::Null);
//! assert_eq!(options.mixed_field_policy, MixedFieldPolicy::BestEffort);
//! ```

use crate::value::FormValue;
use serde::{Deserialize, Serialize};

/// Placeholder seeded for named fields missing from the native entry set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnsubmittedDefault {
	/// Seed `""`
	#[default]
	EmptyString,
	/// Seed [`FormValue::Null`]
	Null,
}

impl UnsubmittedDefault {
	/// The seeded value
	pub fn value(self) -> FormValue {
		match self {
			Self::EmptyString => FormValue::Text(String::new()),
			Self::Null => FormValue::Null,
		}
	}
}

/// How to treat a name shared by controls of different categories
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MixedFieldPolicy {
	/// Fail with [`ExtractError::MixedFieldTypes`](crate::ExtractError::MixedFieldTypes)
	#[default]
	Reject,
	/// Normalize each control by its own kind; later controls win
	BestEffort,
}

/// Options for [`FormExtractor`](crate::FormExtractor)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractOptions {
	/// Placeholder for named fields the native entry set omits
	pub unsubmitted_default: UnsubmittedDefault,
	/// Handling of heterogeneous same-named controls
	pub mixed_field_policy: MixedFieldPolicy,
}

impl ExtractOptions {
	/// Default options: empty-string placeholder, reject mixed groups
	pub fn new() -> Self {
		Self::default()
	}

	/// Set the unsubmitted placeholder
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_form_data::{ExtractOptions, UnsubmittedDefault};
	///
	/// let options = ExtractOptions::new().with_unsubmitted_default(UnsubmittedDefault::Null);
	/// assert_eq!(options.unsubmitted_default, UnsubmittedDefault::Null);
	/// ```
	pub fn with_unsubmitted_default(mut self, default: UnsubmittedDefault) -> Self {
		self.unsubmitted_default = default;
		self
	}

	/// Set the mixed-field policy
	pub fn with_mixed_field_policy(mut self, policy: MixedFieldPolicy) -> Self {
		self.mixed_field_policy = policy;
		self
	}

	/// Load options from a JSON document; missing keys keep their defaults
	pub fn from_json(json: &str) -> serde_json::Result<Self> {
		serde_json::from_str(json)
	}
}
