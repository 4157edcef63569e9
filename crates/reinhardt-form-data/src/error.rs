//! Extraction errors
//!
//! Every error is an input-contract violation detected before any field is
//! normalized, so a failed call never yields a partial mapping. Malformed
//! individual values (an unparsable date, an empty number) are not errors;
//! they normalize to [`FormValue::Null`](crate::FormValue::Null).

use crate::field::FieldCategory;

/// Errors raised by [`FormExtractor::extract`](crate::FormExtractor::extract)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractError {
	/// No submission context was supplied
	#[error("Cannot extract form data without a submission context")]
	InvalidContext,

	/// The submission context does not resolve to a `<form>` element
	#[error("Submission context target is not a form")]
	NotAForm,

	/// Controls of different categories share one name
	#[error("Field '{name}' mixes {first} and {second} controls")]
	MixedFieldTypes {
		/// The shared field name
		name: String,
		/// Category of the first control carrying the name
		first: FieldCategory,
		/// Category of the first conflicting control
		second: FieldCategory,
	},
}

/// Result type for form data extraction
pub type ExtractResult<T> = Result<T, ExtractError>;

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_mixed_field_types_message_names_both_categories() {
		let error = ExtractError::MixedFieldTypes {
			name: "color".to_string(),
			first: FieldCategory::Text,
			second: FieldCategory::Select,
		};

		assert_eq!(
			error.to_string(),
			"Field 'color' mixes text and select controls"
		);
	}
}
