//! Type-erased container for initialized feature slices.

use std::any::{Any, TypeId};
use std::fmt::Debug;

/// State owned by a feature crate and shared with its handlers.
pub trait FeatureSlice: Any + Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;
}

/// A feature slice ready to be registered in the API state, keyed by its concrete type.
#[derive(Debug)]
pub struct InitializedSlice {
    pub id: TypeId,
    pub state: Box<dyn FeatureSlice>,
}

impl InitializedSlice {
    pub fn new<T: FeatureSlice>(state: T) -> Self {
        Self { id: TypeId::of::<T>(), state: Box::new(state) }
    }

    /// Downcasts to the concrete slice type.
    #[must_use]
    pub fn downcast_ref<T: FeatureSlice>(&self) -> Option<&T> {
        self.state.as_any().downcast_ref::<T>()
    }
}
