use axum::extract::FromRef;
use brite_domain::config::ApiConfig;
use brite_domain::registry::{FeatureSlice, InitializedSlice};
use fxhash::FxHashMap;
use std::any::TypeId;
use std::borrow::Cow;
use std::ops::Deref;
use std::sync::Arc;

#[brite_derive::brite_error]
pub enum ApiStateError {
    #[error("State validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
    #[error("State missing feature slice{}: {message}", format_context(.context))]
    MissingSlice { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

#[derive(Debug)]
pub struct ApiStateInner {
    pub config: ApiConfig,
    slices: FxHashMap<TypeId, InitializedSlice>,
}

/// Shared axum state: configuration plus the initialized feature slices.
#[derive(Debug, Clone)]
pub struct ApiState {
    inner: Arc<ApiStateInner>,
}

impl ApiState {
    #[must_use]
    pub fn builder() -> ApiStateBuilder {
        ApiStateBuilder::default()
    }

    #[must_use]
    pub fn get_slice<T: FeatureSlice>(&self) -> Option<&T> {
        self.inner.slices.get(&TypeId::of::<T>()).and_then(InitializedSlice::downcast_ref::<T>)
    }

    /// # Errors
    /// Returns [`ApiStateError::MissingSlice`] if the slice was never registered.
    pub fn try_get_slice<T: FeatureSlice>(&self) -> Result<&T, ApiStateError> {
        self.get_slice::<T>().ok_or_else(|| ApiStateError::MissingSlice {
            message: std::any::type_name::<T>().into(),
            context: None,
        })
    }

    /// Number of registered slices (diagnostics).
    #[must_use]
    pub fn slice_count(&self) -> usize {
        self.inner.slices.len()
    }
}

impl Deref for ApiState {
    type Target = ApiStateInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl FromRef<ApiState> for ApiConfig {
    fn from_ref(state: &ApiState) -> Self {
        state.inner.config.clone()
    }
}

#[derive(Debug, Default)]
pub struct ApiStateBuilder {
    config: Option<ApiConfig>,
    slices: FxHashMap<TypeId, InitializedSlice>,
}

impl ApiStateBuilder {
    #[must_use]
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.config = Some(config);
        self
    }

    #[must_use]
    pub fn register_slice(mut self, slice: InitializedSlice) -> Self {
        self.slices.insert(slice.id, slice);
        self
    }

    #[must_use]
    pub fn register_slices<I>(mut self, slices: I) -> Self
    where
        I: IntoIterator<Item = InitializedSlice>,
    {
        self.slices.extend(slices.into_iter().map(|slice| (slice.id, slice)));
        self
    }

    /// # Errors
    /// Returns [`ApiStateError::Validation`] when no configuration was provided.
    pub fn build(self) -> Result<ApiState, ApiStateError> {
        let config = self.config.ok_or_else(|| ApiStateError::Validation {
            message: "ApiConfig not provided".into(),
            context: None,
        })?;

        Ok(ApiState { inner: Arc::new(ApiStateInner { config, slices: self.slices }) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::any::Any;

    #[derive(Debug)]
    struct Marker(u8);

    impl FeatureSlice for Marker {
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn resolves_registered_slices() {
        let state = ApiState::builder()
            .config(ApiConfig::default())
            .register_slice(InitializedSlice::new(Marker(7)))
            .build()
            .unwrap();

        assert_eq!(state.get_slice::<Marker>().map(|p| p.0), Some(7));
        assert_eq!(state.slice_count(), 1);
    }

    #[test]
    fn missing_slice_is_an_error() {
        let state = ApiState::builder().config(ApiConfig::default()).build().unwrap();
        let err = state.try_get_slice::<Marker>().unwrap_err();
        assert!(matches!(err, ApiStateError::MissingSlice { .. }));
    }

    #[test]
    fn build_requires_config() {
        let err = ApiState::builder().build().unwrap_err();
        assert!(matches!(err, ApiStateError::Validation { .. }));
    }
}
