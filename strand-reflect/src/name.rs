//! Build-time name tokens.

/// A member name lifted into the type system.
///
/// Written with the [`name!`](crate::name!) macro: `name!("Heal")` is the
/// type `Name<{ name_hash("Heal") }>`. Two names are the same type exactly
/// when their strings are equal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Name<const H: u64>;

impl<const H: u64> Name<H> {
    /// The hash this token was built from.
    pub const HASH: u64 = H;
}

/// 64-bit FNV-1a hash of `name`, usable in const context.
pub const fn name_hash(name: &str) -> u64 {
    let bytes = name.as_bytes();
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    let mut i = 0;
    while i < bytes.len() {
        hash ^= bytes[i] as u64;
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
        i += 1;
    }
    hash
}

/// The [`Name`] token type for a string literal.
///
/// ```
/// use strand_reflect::{Name, name, name_hash};
///
/// let _: name!("speed") = Name::<{ name_hash("speed") }>;
/// ```
#[macro_export]
macro_rules! name {
    ($name:literal) => {
        $crate::Name<{ $crate::name_hash($name) }>
    };
}
