//! Lazily derived statistics with explicit overrides.
//!
//! Several entity fields (locus heterozygosity, sample sizes, decoded
//! repeat sequences) can either be assigned by the caller or derived on
//! demand from other data. [`Derived`] tracks which of the three states a
//! value is in; the `read_or_cache` helpers let getters take `&self` by
//! keeping the slot behind a [`RefCell`].

use std::cell::RefCell;

/// The state of a value that may be assigned explicitly or derived on
/// demand from other data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Derived<T> {
    /// Neither assigned nor derived yet; the next read derives and caches.
    Unset,
    /// Assigned by the caller; never recomputed.
    Explicit(T),
    /// Derived on a previous read; reused until cleared.
    Cached(T),
}

impl<T> Derived<T> {
    /// An explicitly supplied value, or the unset state when absent.
    pub fn explicit(value: Option<T>) -> Self {
        match value {
            Some(value) => Derived::Explicit(value),
            None => Derived::Unset,
        }
    }

    /// The held value, explicit or cached.
    pub fn value(&self) -> Option<&T> {
        match self {
            Derived::Unset => None,
            Derived::Explicit(value) | Derived::Cached(value) => Some(value),
        }
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, Derived::Unset)
    }

    /// Explicitly assign or clear the value. Clearing returns the slot to
    /// the unset state, so the next read derives afresh.
    pub fn assign(&mut self, value: Option<T>) {
        *self = match value {
            Some(value) => Derived::Explicit(value),
            None => Derived::Unset,
        };
    }
}

impl<T> Default for Derived<T> {
    fn default() -> Self {
        Derived::Unset
    }
}

/// Read a derived slot through a shared reference. An explicit or cached
/// value is returned as-is; otherwise `derive` runs once and its result is
/// cached for later reads.
pub fn read_or_cache<T: Clone>(slot: &RefCell<Derived<T>>, derive: impl FnOnce() -> T) -> T {
    if let Some(value) = slot.borrow().value() {
        return value.clone();
    }
    let value = derive();
    *slot.borrow_mut() = Derived::Cached(value.clone());
    value
}

/// Like [`read_or_cache`], for values that may have nothing to derive
/// from. A `None` from `derive` is not cached, so the value appears once
/// its inputs do.
pub fn read_or_cache_with<T: Clone>(
    slot: &RefCell<Derived<T>>,
    derive: impl FnOnce() -> Option<T>,
) -> Option<T> {
    if let Some(value) = slot.borrow().value() {
        return Some(value.clone());
    }
    let value = derive()?;
    *slot.borrow_mut() = Derived::Cached(value.clone());
    Some(value)
}
