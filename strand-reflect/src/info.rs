//! Member descriptors.

use std::fmt;

/// Describes one field of `Owner` holding a `V`.
pub struct FieldInfo<Owner, V> {
    name: &'static str,
    index: usize,
    get: fn(&Owner) -> &V,
    get_mut: fn(&mut Owner) -> &mut V,
}

impl<Owner, V> FieldInfo<Owner, V> {
    /// Build a descriptor. Used by generated code.
    pub const fn new(
        name: &'static str,
        index: usize,
        get: fn(&Owner) -> &V,
        get_mut: fn(&mut Owner) -> &mut V,
    ) -> Self {
        Self {
            name,
            index,
            get,
            get_mut,
        }
    }

    /// Reflected name of the field.
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Position among the reflected fields, in declaration order.
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Read the field on `owner`.
    pub fn get<'a>(&self, owner: &'a Owner) -> &'a V {
        (self.get)(owner)
    }

    /// Write access to the field on `owner`.
    pub fn get_mut<'a>(&self, owner: &'a mut Owner) -> &'a mut V {
        (self.get_mut)(owner)
    }
}

impl<Owner, V> Clone for FieldInfo<Owner, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<Owner, V> Copy for FieldInfo<Owner, V> {}

impl<Owner, V> fmt::Debug for FieldInfo<Owner, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldInfo")
            .field("name", &self.name)
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}

/// Describes one method of `Owner` taking `Args` (a tuple) and returning
/// `Out`.
pub struct MethodInfo<Owner, Args, Out> {
    name: &'static str,
    index: usize,
    call: fn(&mut Owner, Args) -> Out,
}

impl<Owner, Args, Out> MethodInfo<Owner, Args, Out> {
    /// Build a descriptor. Used by generated code.
    pub const fn new(name: &'static str, index: usize, call: fn(&mut Owner, Args) -> Out) -> Self {
        Self { name, index, call }
    }

    /// Reflected name of the method.
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Position among the reflected methods, in declaration order.
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Call the method on `owner`.
    pub fn invoke(&self, owner: &mut Owner, args: Args) -> Out {
        (self.call)(owner, args)
    }
}

impl<Owner, Args, Out> Clone for MethodInfo<Owner, Args, Out> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<Owner, Args, Out> Copy for MethodInfo<Owner, Args, Out> {}

impl<Owner, Args, Out> fmt::Debug for MethodInfo<Owner, Args, Out> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodInfo")
            .field("name", &self.name)
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}
