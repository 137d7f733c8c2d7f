//! Caller-owned table of radiative-transfer schemes

use std::fmt;

use rustc_hash::FxHashMap;
use tracing::{debug, info, warn};

use super::beer_lambert::BeerLambertScheme;
use super::goudriaan::GoudriaanScheme;
use super::r#trait::{RadiativeTransferScheme, SchemeInputs, SchemeOutput};
use crate::error::{Result, ValidationError};

/// Schemes addressable by id.
///
/// Nothing is registered implicitly: start from [`SchemeRegistry::new`] or
/// [`SchemeRegistry::with_builtin_schemes`] and add implementations with
/// [`SchemeRegistry::register`].
#[derive(Default)]
pub struct SchemeRegistry {
    schemes: FxHashMap<String, Box<dyn RadiativeTransferScheme>>,
}

impl SchemeRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding `gd` (Goudriaan) and `bl` (Beer–Lambert)
    pub fn with_builtin_schemes() -> Self {
        let mut registry = Self::new();
        registry.register(GoudriaanScheme);
        registry.register(BeerLambertScheme);
        info!("scheme registry initialized with {:?}", registry.ids());
        registry
    }

    /// Add a scheme under its own id, returning any scheme it replaced.
    pub fn register<S>(&mut self, scheme: S) -> Option<Box<dyn RadiativeTransferScheme>>
    where
        S: RadiativeTransferScheme + 'static,
    {
        let id = scheme.id().to_string();
        let previous = self.schemes.insert(id.clone(), Box::new(scheme));
        if previous.is_some() {
            warn!("scheme {id:?} replaced an existing registration");
        } else {
            debug!("registered scheme {id:?}");
        }
        previous
    }

    /// Look up a scheme by id
    ///
    /// # Errors
    ///
    /// [`ValidationError::UnknownScheme`] if nothing is registered under `id`.
    pub fn get(&self, id: &str) -> Result<&dyn RadiativeTransferScheme> {
        match self.schemes.get(id) {
            Some(scheme) => Ok(&**scheme),
            None => Err(ValidationError::UnknownScheme(id.to_string()).into()),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.schemes.contains_key(id)
    }

    /// Registered ids, sorted
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.schemes.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.schemes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemes.is_empty()
    }

    /// Run scheme `id` on `inputs`
    pub fn solve(&self, id: &str, inputs: &SchemeInputs<'_>) -> Result<SchemeOutput> {
        let scheme = self.get(id)?;
        info!("solving with scheme {} ({})", scheme.id(), scheme.long_name());
        scheme.solve(inputs)
    }
}

impl fmt::Debug for SchemeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemeRegistry")
            .field("schemes", &self.ids())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CanopyRtError;

    struct Renamed;

    impl RadiativeTransferScheme for Renamed {
        fn id(&self) -> &str {
            "gd"
        }
        fn short_name(&self) -> &str {
            "alt"
        }
        fn long_name(&self) -> &str {
            "alternate Goudriaan"
        }
        fn solve(&self, inputs: &SchemeInputs<'_>) -> Result<SchemeOutput> {
            GoudriaanScheme.solve(inputs)
        }
    }

    #[test]
    fn test_builtin_ids() {
        let registry = SchemeRegistry::with_builtin_schemes();
        assert_eq!(registry.ids(), vec!["bl", "gd"]);
        assert_eq!(registry.get("gd").unwrap().short_name(), "Gou");
        assert!(registry.contains("bl"));
    }

    #[test]
    fn test_unknown_scheme() {
        let registry = SchemeRegistry::new();
        assert!(registry.is_empty());
        assert!(matches!(
            registry.get("2s"),
            Err(CanopyRtError::Validation(ValidationError::UnknownScheme(_)))
        ));
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = SchemeRegistry::with_builtin_schemes();
        let previous = registry.register(Renamed);
        assert_eq!(previous.unwrap().short_name(), "Gou");
        assert_eq!(registry.get("gd").unwrap().short_name(), "alt");
        assert_eq!(registry.len(), 2);
    }
}
