//! Value override registry for the in-memory host
//!
//! Overrides let an application attach a rich value (a domain entity, say)
//! to a control so extraction yields that value instead of the control's
//! string. Entries are keyed by element identity and hold only a weak
//! reference to the element: dropping the last handle to an element makes its
//! entry unreachable. Dead entries are discarded by `set_override`,
//! `delete_override`, `len` and `prune`; lookups skip them.
//!
//! ## Example
//!
//! ```
//! use reinhardt_form_data::dom::Element;
//! use reinhardt_form_data::{delete_override, get_override, set_override, OverrideValue};
//!
//! let hidden = Element::input("hidden").with_name("owner");
//! set_override(&hidden, OverrideValue::new(42_u64));
//!
//! let value = get_override(&hidden).unwrap();
//! assert_eq!(value.downcast_ref::<u64>(), Some(&42));
//!
//! assert!(delete_override(&hidden));
//! assert!(!delete_override(&hidden));
//! assert!(get_override(&hidden).is_none());
//! ```

use crate::dom::{Element, WeakElement};
use crate::host::OverrideStore;
use crate::value::OverrideValue;
use std::cell::RefCell;
use std::collections::HashMap;

struct Slot {
	element: WeakElement,
	value: OverrideValue,
}

/// Weak, identity-keyed override store for [`Element`]s
#[derive(Default)]
pub struct OverrideRegistry {
	slots: RefCell<HashMap<usize, Slot>>,
}

impl OverrideRegistry {
	/// Create an empty registry
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of overrides whose element is still alive
	pub fn len(&self) -> usize {
		self.prune();
		self.slots.borrow().len()
	}

	/// Whether no live overrides remain
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Remove every override
	pub fn clear(&self) {
		self.slots.borrow_mut().clear();
	}

	/// Drop entries whose element no longer exists
	pub fn prune(&self) {
		self.slots
			.borrow_mut()
			.retain(|_, slot| slot.element.upgrade().is_some());
	}
}

impl OverrideStore<Element> for OverrideRegistry {
	fn set_override(&self, element: &Element, value: OverrideValue) {
		self.prune();
		self.slots.borrow_mut().insert(
			element.identity(),
			Slot {
				element: element.downgrade(),
				value,
			},
		);
	}

	fn delete_override(&self, element: &Element) -> bool {
		let removed = self.slots.borrow_mut().remove(&element.identity()).is_some();
		self.prune();
		removed
	}

	fn get_override(&self, element: &Element) -> Option<OverrideValue> {
		let slots = self.slots.borrow();
		let slot = slots.get(&element.identity())?;
		slot.element
			.points_to(element)
			.then(|| slot.value.clone())
	}
}

thread_local! {
	static DEFAULT_REGISTRY: OverrideRegistry = OverrideRegistry::new();
}

/// Run `f` with this thread's default registry
///
/// [`data_from`](crate::data_from) consults the same registry.
pub fn with_default_registry<R>(f: impl FnOnce(&OverrideRegistry) -> R) -> R {
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

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_set_replaces_existing_override() {
		let registry = OverrideRegistry::new();
		let element = Element::input("hidden");
		let second = OverrideValue::new("second");

		registry.set_override(&element, OverrideValue::new("first"));
		registry.set_override(&element, second.clone());

		assert_eq!(registry.get_override(&element), Some(second));
		assert_eq!(registry.len(), 1);
	}

	#[rstest]
	fn test_delete_reports_presence_once() {
		let registry = OverrideRegistry::new();
		let element = Element::input("hidden");
		registry.set_override(&element, OverrideValue::new(1_i32));

		assert!(registry.delete_override(&element));
		assert!(!registry.delete_override(&element));
		assert!(registry.get_override(&element).is_none());
	}

	#[rstest]
	fn test_keyed_by_identity_not_equality() {
		let registry = OverrideRegistry::new();
		let first = Element::input("hidden").with_name("same");
		let twin = Element::input("hidden").with_name("same");
		registry.set_override(&first, OverrideValue::new(1_i32));

		assert!(registry.get_override(&twin).is_none());
		assert!(registry.get_override(&first.clone()).is_some());
	}

	#[rstest]
	fn test_does_not_keep_element_alive() {
		let registry = OverrideRegistry::new();
		let element = Element::input("hidden");
		let weak = element.downgrade();
		registry.set_override(&element, OverrideValue::new(1_i32));

		drop(element);

		assert!(weak.upgrade().is_none());
		assert!(registry.is_empty());
	}

	#[rstest]
	fn test_delete_discards_dead_slots() {
		let registry = OverrideRegistry::new();
		let dropped = Element::input("hidden");
		let kept = Element::input("hidden");
		registry.set_override(&dropped, OverrideValue::new(1_i32));
		registry.set_override(&kept, OverrideValue::new(2_i32));

		drop(dropped);
		assert_eq!(registry.slots.borrow().len(), 2);

		assert!(registry.delete_override(&kept));
		assert!(registry.slots.borrow().is_empty());
	}

	#[rstest]
	fn test_default_registry_is_shared_by_free_functions() {
		let element = Element::input("hidden");
		set_override(&element, OverrideValue::new(5_u8));

		let seen = with_default_registry(|registry| registry.get_override(&element));
		assert_eq!(
			seen.as_ref().and_then(|value| value.downcast_ref::<u8>()),
			Some(&5)
		);

		assert!(delete_override(&element));
	}
}
