//! Host environment seams
//!
//! The extractor only talks to a host through these traits. The in-memory
//! [`dom`](crate::dom) module and the browser `web` adapter both
//! implement them.

use crate::field::{Control, EntryValue};
use crate::value::OverrideValue;

/// A form-like element that can list its controls and its native entry set
pub trait FormHost {
	/// Element handle; `PartialEq` must compare element identity
	type Handle: Clone + PartialEq;

	/// All controls associated with the form, in document order
	fn controls(&self) -> Vec<Control<Self::Handle>>;

	/// The entry list a native submission would produce
	///
	/// Only the `submitter` contributes a button entry.
	fn entries(&self, submitter: Option<&Self::Handle>) -> Vec<(String, EntryValue)>;
}

/// The event-like object identifying one submission
pub trait SubmissionContext {
	/// Form type the context resolves to
	type Form: FormHost;

	/// The form this submission targets, or `None` when the target is not a form
	fn form(&self) -> Option<Self::Form>;

	/// The control that triggered the submission
	fn submitter(&self) -> Option<<Self::Form as FormHost>::Handle>;
}

/// Identity-keyed store attaching arbitrary values to elements
///
/// Implementations must not keep elements alive.
pub trait OverrideStore<H> {
	/// Attach `value` to `element`, replacing any existing override
	fn set_override(&self, element: &H, value: OverrideValue);

	/// Remove the override for `element`, returning whether one existed
	fn delete_override(&self, element: &H) -> bool;

	/// The override for `element`, if any
	fn get_override(&self, element: &H) -> Option<OverrideValue>;
}
