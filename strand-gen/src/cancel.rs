//! Process-wide cancel hooks, one slot per generator specialization.
//!
//! A slot is keyed by the `TypeId` of the full generator type, so
//! `Generator<i32>` and `CustomAllocatorGenerator<i32>` never share a hook.

use std::any::{TypeId, type_name};
use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use strand_core::Panicked;

/// Callback run when a generator of a given type stops on an error.
pub type CancelHook = Arc<dyn Fn() + Send + Sync>;

/// Hook slots keyed by generator type.
#[derive(Default)]
struct CancelRegistry {
    hooks: RwLock<HashMap<TypeId, CancelHook>>,
}

impl CancelRegistry {
    fn set<K: 'static>(&self, hook: CancelHook) {
        let mut hooks = self.hooks.write().unwrap_or_else(PoisonError::into_inner);
        if hooks.insert(TypeId::of::<K>(), hook).is_some() {
            tracing::debug!(generator = type_name::<K>(), "cancel hook replaced");
        } else {
            tracing::debug!(generator = type_name::<K>(), "cancel hook registered");
        }
    }

    fn clear<K: 'static>(&self) -> bool {
        let mut hooks = self.hooks.write().unwrap_or_else(PoisonError::into_inner);
        hooks.remove(&TypeId::of::<K>()).is_some()
    }

    fn get<K: 'static>(&self) -> Option<CancelHook> {
        let hooks = self.hooks.read().unwrap_or_else(PoisonError::into_inner);
        hooks.get(&TypeId::of::<K>()).cloned()
    }
}

static REGISTRY: LazyLock<CancelRegistry> = LazyLock::new(CancelRegistry::default);

pub(crate) fn set<K: 'static>(hook: CancelHook) {
    REGISTRY.set::<K>(hook);
}

pub(crate) fn clear<K: 'static>() -> bool {
    REGISTRY.clear::<K>()
}

pub(crate) fn is_set<K: 'static>() -> bool {
    REGISTRY.get::<K>().is_some()
}

/// Run the hook for `K`, if any. The lock is released before the call so a
/// hook may itself register or clear hooks. A panicking hook is logged and
/// contained; the generator's own error still reaches the consumer.
pub(crate) fn fire<K: 'static>() -> bool {
    match REGISTRY.get::<K>() {
        Some(hook) => {
            tracing::debug!(generator = type_name::<K>(), "running cancel hook");
            if let Err(payload) = catch_unwind(AssertUnwindSafe(|| hook())) {
                let panicked = Panicked::from_payload(payload);
                tracing::warn!(
                    generator = type_name::<K>(),
                    error = %panicked,
                    "cancel hook panicked"
                );
            }
            true
        }
        None => false,
    }
}
