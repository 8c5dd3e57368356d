//! Reconciliation of a freshly-read entity snapshot with the one the caller
//! declared before mutating it.
//!
//! Remote reads do not echo every field (write-only attributes, fields that
//! lag behind a state change), but a known value must never regress to
//! unknown between plan and apply. Merging patches those holes: wherever the
//! primary (read) value is unknown or null and the fallback (declared) value
//! is not unknown, the fallback wins. Everything else stays as read.

mod attr;
mod value;

pub use attr::{Attr, UNKNOWN_MARKER, merge_attrs};
pub use value::Value;

use std::collections::BTreeMap;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MergeError {
    #[error("cannot merge snapshots of different entities: '{primary}' and '{fallback}'")]
    IdentityMismatch { primary: String, fallback: String },
}

/// Merges a possibly unknown/null attribute with its fallback.
pub trait Merge {
    fn merge_with(&mut self, fallback: &Self);
}

/// Merges the contents of two values that are both known.
pub trait MergeKnown {
    fn merge_known(&mut self, fallback: &Self);
}

impl<T: MergeKnown + Clone> Merge for Value<T> {
    fn merge_with(&mut self, fallback: &Self) {
        if (self.is_unknown() || self.is_null()) && !fallback.is_unknown() {
            *self = fallback.clone();
            return;
        }
        if let (Value::Known(primary), Value::Known(fallback)) = (self, fallback) {
            primary.merge_known(fallback);
        }
    }
}

// Lets collections hold tri-state elements.
impl<T: MergeKnown + Clone> MergeKnown for Value<T> {
    fn merge_known(&mut self, fallback: &Self) {
        self.merge_with(fallback);
    }
}

macro_rules! scalar_merge_known {
    ($($ty:ty),* $(,)?) => {
        $(
            impl MergeKnown for $ty {
                fn merge_known(&mut self, _fallback: &Self) {}
            }
        )*
    };
}

scalar_merge_known!(
    String, bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64,
);

impl MergeKnown for serde_json::Value {
    fn merge_known(&mut self, _fallback: &Self) {}
}

/// Index-for-index merge when lengths match; otherwise the primary list is
/// kept as is, even if the fallback holds information it lacks.
impl<T: MergeKnown> MergeKnown for Vec<T> {
    fn merge_known(&mut self, fallback: &Self) {
        if self.len() != fallback.len() {
            return;
        }
        for (item, other) in self.iter_mut().zip(fallback) {
            item.merge_known(other);
        }
    }
}

/// Keys keep the primary's key set; shared keys are merged.
impl<T: MergeKnown> MergeKnown for BTreeMap<String, T> {
    fn merge_known(&mut self, fallback: &Self) {
        for (key, item) in self.iter_mut() {
            if let Some(other) = fallback.get(key) {
                item.merge_known(other);
            }
        }
    }
}

/// A whole entity that can be reconciled against another snapshot of itself.
pub trait Snapshot: MergeKnown + Clone {
    /// The entity's identity, usually its remote id. `Unknown` or `Null`
    /// before the entity exists remotely.
    fn identity(&self) -> Value<String>;
}

/// Reconciles `primary` (as read) with `fallback` (as declared).
///
/// Fails when both identities are known and differ; merging snapshots of two
/// different entities would produce a nonsensical result.
pub fn merge<T: Snapshot>(mut primary: T, fallback: &T) -> Result<T, MergeError> {
    check_identity(primary.identity().as_known(), fallback.identity().as_known())?;
    primary.merge_known(fallback);
    Ok(primary)
}

pub(crate) fn check_identity(
    primary: Option<&String>,
    fallback: Option<&String>,
) -> Result<(), MergeError> {
    match (primary, fallback) {
        (Some(p), Some(f)) if p != f => Err(MergeError::IdentityMismatch {
            primary: p.clone(),
            fallback: f.clone(),
        }),
        _ => Ok(()),
    }
}

/// Implements [`MergeKnown`] for a struct by merging each listed field.
///
/// Every listed field must implement [`Merge`] (in practice a [`Value`]).
///
/// ```
/// use ovh_reconcile::impl_merge;
/// use ovh_reconcile::merge::Value;
///
/// #[derive(Clone)]
/// struct Disk {
///     name: Value<String>,
///     size: Value<u64>,
/// }
///
/// impl_merge!(Disk { name, size });
/// ```
#[macro_export]
macro_rules! impl_merge {
    ($ty:ty { $($field:ident),+ $(,)? }) => {
        impl $crate::merge::MergeKnown for $ty {
            fn merge_known(&mut self, fallback: &Self) {
                $( $crate::merge::Merge::merge_with(&mut self.$field, &fallback.$field); )+
            }
        }
    };
}
