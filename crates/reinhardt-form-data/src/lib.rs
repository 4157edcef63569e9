//! Reinhardt Form Data - typed extraction of HTML form submissions
//!
//! Browser form controls expose every value as a string, each in its own
//! quirky way. This crate turns a submission into a [`FormData`] mapping of
//! field name to normalized [`FormValue`]: numbers for number inputs, dates
//! for date inputs, booleans for lone checkboxes, lists for multi-selects and
//! checkbox groups, files for file inputs.
//!
//! ## Architecture
//!
//! - [`field`]: capability-tagged field model read once from the host
//! - [`host`]: [`FormHost`], [`SubmissionContext`] and [`OverrideStore`] seams
//! - [`extractor`]: [`FormExtractor`] and [`data_from`]
//! - [`registry`]: weak, identity-keyed value overrides
//! - [`dom`]: in-memory host for SSR and tests
//! - `web`: `web-sys` host (WASM only)
//!
//! ## Example
//!
//! ```
//! use reinhardt_form_data::dom::{Element, SubmitEvent};
//! use reinhardt_form_data::{data_from, FormValue};
//!
//! let form = Element::form()
//!     .with_child(Element::input("radio").with_name("plan").with_value("free"))
//!     .with_child(Element::input("radio").with_name("plan").with_value("pro").checked())
//!     .with_child(Element::input("date").with_name("start"));
//!
//! let data = data_from(Some(&SubmitEvent::new(form))).unwrap();
//!
//! assert_eq!(data.get("plan"), Some(&FormValue::from("pro")));
//! assert_eq!(data.get("start"), Some(&FormValue::Null));
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod dom;
pub mod error;
pub mod extractor;
pub mod field;
pub mod host;
pub mod logging;
pub mod registry;
pub mod value;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use config::{ExtractOptions, MixedFieldPolicy, UnsubmittedDefault};
pub use error::{ExtractError, ExtractResult};
pub use extractor::{FormExtractor, data_from};
pub use field::{Control, EntryValue, FieldCategory, FieldKind, InputState, OptionControl};
pub use host::{FormHost, OverrideStore, SubmissionContext};
pub use registry::{
	OverrideRegistry, delete_override, get_override, set_override, with_default_registry,
};
pub use value::{FileEntry, FormData, FormValue, OverrideValue};
