//! Specialized collection types
//!
//! Arena storage for shared physics resources. Handles are slotmap keys, so
//! every handle carries a generation and a stale handle never aliases a newer
//! entry that reused the same slot.

pub use slotmap::{Key, KeyData, SlotMap};

/// Handle-based map using slot map for stable, generation-checked references
pub type HandleMap<K, T> = SlotMap<K, T>;

/// Conversion between arena handles and plain fixed-width integers
///
/// Collaborators outside Rust (editor, scene files, FFI) only need an opaque
/// `u64`. The value round-trips exactly through [`HandleBits::from_bits`];
/// its bit layout is otherwise unspecified.
pub trait HandleBits: Key {
    /// Pack the handle into a 64-bit integer
    fn to_bits(self) -> u64 {
        self.data().as_ffi()
    }

    /// Rebuild a handle from [`HandleBits::to_bits`] output
    fn from_bits(bits: u64) -> Self {
        KeyData::from_ffi(bits).into()
    }
}

impl<K: Key> HandleBits for K {}
