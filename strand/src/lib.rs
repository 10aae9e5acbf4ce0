#![deny(missing_docs)]
//! # strand — umbrella crate
//!
//! One import surface for the strand crates, behind feature flags, plus a
//! `prelude` for the common path.
//!
//! | Feature | Crate | What it brings |
//! |---------|-------|----------------|
//! | (always) | [`strand_core`] | Frames, allocation policies, lifecycle states |
//! | `gen` | `strand_gen` | Lazy generators and `generator_invoke` |
//! | `task` | `strand_task` | Eager awaitable tasks |
//! | `reflect` | `strand_reflect` | Field/method reflection and `visit` |
//! | `config` | `strand_config` | Application settings |
//!
//! The reflection macros work through this crate alone:
//!
//! ```
//! # #[cfg(feature = "reflect")] {
//! use strand::prelude::*;
//!
//! #[derive(Reflect)]
//! struct Gauge {
//!     level: u8,
//! }
//!
//! #[reflect_methods]
//! impl Gauge {
//!     fn fill(&mut self, by: u8) -> u8 {
//!         self.level += by;
//!         self.level
//!     }
//! }
//!
//! let mut g = Gauge { level: 1 };
//! assert_eq!(Reflector::<Gauge>::invoke_member_function::<name!("fill")>(&mut g, (2,)), 3);
//! assert_eq!(*Reflector::<Gauge>::get_field_by_name::<name!("level")>(&g), 3);
//! # }
//! ```

pub use strand_core;
#[cfg(feature = "config")]
pub use strand_config;
#[cfg(feature = "gen")]
pub use strand_gen;
#[cfg(feature = "reflect")]
pub use strand_reflect;
#[cfg(feature = "task")]
pub use strand_task;

/// Happy-path imports.
pub mod prelude {
    pub use strand_core::{FrameAllocator, FrameState, Global, SystemAlloc};

    #[cfg(feature = "gen")]
    pub use strand_gen::{
        Co, CustomAllocatorGenerator, Generator, GeneratorError, generator_invoke,
        generator_invoke_with, try_generator_invoke,
    };

    #[cfg(feature = "task")]
    pub use strand_task::{CustomAllocatorTask, Task, TaskError};

    #[cfg(feature = "reflect")]
    pub use strand_reflect::{
        Reflect, ReflectMethods, Reflector, VisitCase, VisitCaseMut, VisitError, name,
        reflect_methods, visit, visit_mut,
    };

    #[cfg(feature = "config")]
    pub use strand_config::{AppConfig, ConfigError, SharedConfig};
}
