//! Reflection traits and the [`Reflector`] query surface.
//!
//! Types implement these traits through `#[derive(Reflect)]` and
//! `#[reflect_methods]`; writing them by hand is possible but rarely useful.

use std::any::Any;
use std::marker::PhantomData;

use crate::info::{FieldInfo, MethodInfo};

/// Field-level reflection for a record type.
pub trait Reflect: Sized + 'static {
    /// Name of the type.
    const CLASS_NAME: &'static str;

    /// Reflected field names, in declaration order.
    const FIELD_NAMES: &'static [&'static str];

    /// Call `f` with every reflected field's name and value, in order.
    fn for_each_field(&self, f: &mut dyn FnMut(&'static str, &dyn Any));

    /// Call `f` with every reflected field's name and a mutable reference.
    fn for_each_field_mut(&mut self, f: &mut dyn FnMut(&'static str, &mut dyn Any));
}

/// Descriptor of the field at position `I`.
pub trait FieldAt<const I: usize>: Reflect {
    /// Field type.
    type Value;
    /// The descriptor.
    const INFO: FieldInfo<Self, Self::Value>;
}

/// Descriptor of the field called `N` (a [`Name`](crate::Name) token).
pub trait FieldNamed<N>: Reflect {
    /// Field type.
    type Value;
    /// The descriptor.
    const INFO: FieldInfo<Self, Self::Value>;
}

/// Method-level reflection for a record type.
pub trait ReflectMethods: Sized + 'static {
    /// Reflected method names, in declaration order.
    const METHOD_NAMES: &'static [&'static str];
}

/// Descriptor of the method at position `I`.
pub trait MethodAt<const I: usize>: ReflectMethods {
    /// Argument tuple.
    type Args;
    /// Return type.
    type Output;
    /// The descriptor.
    const INFO: MethodInfo<Self, Self::Args, Self::Output>;
}

/// Descriptor of the method called `N` (a [`Name`](crate::Name) token).
pub trait MethodNamed<N>: ReflectMethods {
    /// Argument tuple.
    type Args;
    /// Return type.
    type Output;
    /// The descriptor.
    const INFO: MethodInfo<Self, Self::Args, Self::Output>;
}

/// Static queries over a reflected type `T`.
///
/// Indexed and named lookups are checked at build time. Asking for a field
/// past the end does not compile:
///
/// ```compile_fail
/// use strand_reflect::{Reflect, Reflector};
///
/// #[derive(Reflect)]
/// struct Point { x: i32, y: i32 }
///
/// let p = Point { x: 1, y: 2 };
/// let _ = Reflector::<Point>::get_field::<2>(&p);
/// ```
///
/// Neither does invoking a method name the type does not declare:
///
/// ```compile_fail
/// use strand_reflect::{Reflect, Reflector, name, reflect_methods};
///
/// #[derive(Reflect)]
/// struct Point { x: i32, y: i32 }
///
/// #[reflect_methods]
/// impl Point {
///     fn shift(&mut self, dx: i32) { self.x += dx; }
/// }
///
/// let mut p = Point { x: 1, y: 2 };
/// Reflector::<Point>::invoke_member_function::<name!("teleport")>(&mut p, (3,));
/// ```
///
/// Or looking a field up by an unknown name:
///
/// ```compile_fail
/// use strand_reflect::{Reflect, Reflector, name};
///
/// #[derive(Reflect)]
/// struct Point { x: i32, y: i32 }
///
/// let p = Point { x: 1, y: 2 };
/// let _ = Reflector::<Point>::get_field_by_name::<name!("z")>(&p);
/// ```
///
/// The same calls with valid arguments compile and run:
///
/// ```
/// use strand_reflect::{Reflect, Reflector, name, reflect_methods};
///
/// #[derive(Reflect)]
/// struct Point { x: i32, y: i32 }
///
/// #[reflect_methods]
/// impl Point {
///     fn shift(&mut self, dx: i32) { self.x += dx; }
/// }
///
/// let mut p = Point { x: 1, y: 2 };
/// assert_eq!(*Reflector::<Point>::get_field::<1>(&p), 2);
/// assert_eq!(*Reflector::<Point>::get_field_by_name::<name!("x")>(&p), 1);
/// Reflector::<Point>::invoke_member_function::<name!("shift")>(&mut p, (3,));
/// assert_eq!(p.x, 4);
/// ```
pub struct Reflector<T>(PhantomData<fn() -> T>);

impl<T: Reflect> Reflector<T> {
    /// Name of the type.
    pub const fn class_name() -> &'static str {
        T::CLASS_NAME
    }

    /// Number of reflected fields.
    pub const fn field_count() -> usize {
        T::FIELD_NAMES.len()
    }

    /// All reflected field names, in order.
    pub const fn field_names() -> &'static [&'static str] {
        T::FIELD_NAMES
    }

    /// Name of field `I`.
    pub fn field_name<const I: usize>() -> &'static str
    where
        T: FieldAt<I>,
    {
        <T as FieldAt<I>>::INFO.name()
    }

    /// Descriptor of field `I`.
    pub fn field_info<const I: usize>() -> FieldInfo<T, <T as FieldAt<I>>::Value>
    where
        T: FieldAt<I>,
    {
        <T as FieldAt<I>>::INFO
    }

    /// Read field `I` of `obj`.
    pub fn get_field<const I: usize>(obj: &T) -> &<T as FieldAt<I>>::Value
    where
        T: FieldAt<I>,
    {
        <T as FieldAt<I>>::INFO.get(obj)
    }

    /// Write access to field `I` of `obj`.
    pub fn get_field_mut<const I: usize>(obj: &mut T) -> &mut <T as FieldAt<I>>::Value
    where
        T: FieldAt<I>,
    {
        <T as FieldAt<I>>::INFO.get_mut(obj)
    }

    /// Read the field named `N` of `obj`.
    pub fn get_field_by_name<N>(obj: &T) -> &<T as FieldNamed<N>>::Value
    where
        T: FieldNamed<N>,
    {
        <T as FieldNamed<N>>::INFO.get(obj)
    }

    /// Write access to the field named `N` of `obj`.
    pub fn get_field_by_name_mut<N>(obj: &mut T) -> &mut <T as FieldNamed<N>>::Value
    where
        T: FieldNamed<N>,
    {
        <T as FieldNamed<N>>::INFO.get_mut(obj)
    }

    /// Position of the field called `name`, if any. The runtime counterpart
    /// of [`FieldNamed`] for names only known at run time.
    pub fn find_field_index(name: &str) -> Option<usize> {
        let found = T::FIELD_NAMES.iter().position(|n| *n == name);
        if found.is_none() {
            tracing::trace!(class = T::CLASS_NAME, field = name, "no such field");
        }
        found
    }

    /// Visit every reflected field of `obj` in declaration order.
    pub fn for_each_field(obj: &T, mut f: impl FnMut(&'static str, &dyn Any)) {
        obj.for_each_field(&mut f);
    }

    /// Visit every reflected field of `obj` mutably, in declaration order.
    pub fn for_each_field_mut(obj: &mut T, mut f: impl FnMut(&'static str, &mut dyn Any)) {
        obj.for_each_field_mut(&mut f);
    }
}

impl<T: ReflectMethods> Reflector<T> {
    /// Number of reflected methods.
    pub const fn method_count() -> usize {
        T::METHOD_NAMES.len()
    }

    /// All reflected method names, in order.
    pub const fn method_names() -> &'static [&'static str] {
        T::METHOD_NAMES
    }

    /// Name of method `I`.
    pub fn method_name<const I: usize>() -> &'static str
    where
        T: MethodAt<I>,
    {
        <T as MethodAt<I>>::INFO.name()
    }

    /// Descriptor of method `I`.
    pub fn method_info<const I: usize>()
    -> MethodInfo<T, <T as MethodAt<I>>::Args, <T as MethodAt<I>>::Output>
    where
        T: MethodAt<I>,
    {
        <T as MethodAt<I>>::INFO
    }

    /// Position of the method called `name`, if any.
    pub fn find_method_index(name: &str) -> Option<usize> {
        T::METHOD_NAMES.iter().position(|n| *n == name)
    }

    /// Call the method named `N` on `obj` with `args`, returning its result.
    pub fn invoke_member_function<N>(
        obj: &mut T,
        args: <T as MethodNamed<N>>::Args,
    ) -> <T as MethodNamed<N>>::Output
    where
        T: MethodNamed<N>,
    {
        <T as MethodNamed<N>>::INFO.invoke(obj, args)
    }

    /// Call method `I` on `obj` with `args`.
    pub fn invoke_method_at<const I: usize>(
        obj: &mut T,
        args: <T as MethodAt<I>>::Args,
    ) -> <T as MethodAt<I>>::Output
    where
        T: MethodAt<I>,
    {
        <T as MethodAt<I>>::INFO.invoke(obj, args)
    }
}
