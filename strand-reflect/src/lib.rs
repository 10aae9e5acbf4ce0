//! # strand-reflect — build-time reflection and type-directed visitation
//!
//! | Piece | Types | What it does |
//! |-------|-------|-------------|
//! | Descriptors | [`FieldInfo`], [`MethodInfo`] | Name, index and accessor of one member |
//! | Reflection | [`Reflect`], [`ReflectMethods`], [`Reflector`] | Class name, counts, lookup by index or name |
//! | Names | [`Name`], [`name!`] | Build-time tokens for member names |
//! | Visitation | [`visit`], [`visit_mut`], [`VisitCase`] | Dispatch a `dyn Any` to the first matching case |
//!
//! Descriptors are generated by `#[derive(Reflect)]` and
//! `#[reflect_methods]` (the `macros` feature, on by default). Every lookup
//! by index or name is resolved by the type checker: an out-of-range index
//! or an unknown name is a compile error, not a runtime failure.
//!
//! ```
//! use strand_reflect::{Reflect, Reflector, name, reflect_methods};
//!
//! #[derive(Reflect)]
//! struct Player {
//!     health: i32,
//!     speed: f32,
//! }
//!
//! #[reflect_methods]
//! impl Player {
//!     #[reflect(rename = "TakeDamage")]
//!     fn take_damage(&mut self, amount: i32) {
//!         self.health -= amount;
//!     }
//! }
//!
//! let mut p = Player { health: 100, speed: 0.1 };
//! assert_eq!(Reflector::<Player>::class_name(), "Player");
//! assert_eq!(*Reflector::<Player>::get_field::<0>(&p), 100);
//! Reflector::<Player>::invoke_member_function::<name!("TakeDamage")>(&mut p, (30,));
//! assert_eq!(p.health, 70);
//! ```

#![deny(missing_docs)]

// Lets the derive's `::strand_reflect` paths resolve inside this crate.
extern crate self as strand_reflect;

pub mod error;
pub mod info;
pub mod name;
pub mod reflector;
pub mod visit;

pub use error::VisitError;
pub use info::{FieldInfo, MethodInfo};
pub use name::{Name, name_hash};
pub use reflector::{
    FieldAt, FieldNamed, MethodAt, MethodNamed, Reflect, ReflectMethods, Reflector,
};
pub use visit::{VisitCase, VisitCaseMut, VisitCases, VisitCasesMut, visit, visit_mut};

#[cfg(feature = "macros")]
pub use strand_reflect_macros::{Reflect, reflect_methods};
