use std::sync::Arc;
use log::{debug, warn};
use rand::Rng;
use crate::config::SyncConfig;
use crate::core::{Result, SyncError};
use crate::request::RequestParameters;
use crate::store::AuthorizableKind;
use super::filter::PrincipalNameFilter;
use super::generator::{NAME_PARAM, NameInfo, PrincipalNameGenerator};
use super::registry::{RankedRegistry, RegistrationId};

/// `base_suffix`
pub fn next_candidate(base: &str, suffix: u32) -> String {
    format!("{}_{}", base, suffix)
}

/// Turns request parameters into a principal name using the registered
/// generators and filters
pub struct PrincipalNameResolver {
    generators: RankedRegistry<dyn PrincipalNameGenerator>,
    filters: RankedRegistry<dyn PrincipalNameFilter>,
    retry_limit: usize,
    suffix_bound: u32,
}

impl PrincipalNameResolver {
    pub fn new(retry_limit: usize, suffix_bound: u32) -> Self {
        Self {
            generators: RankedRegistry::new(),
            filters: RankedRegistry::new(),
            retry_limit,
            suffix_bound: suffix_bound.max(1),
        }
    }

    /// Resolver without any generator or filter registered
    pub fn from_config(config: &SyncConfig) -> Self {
        Self::new(config.collision_retry_limit, config.collision_suffix_bound)
    }

    pub fn register_generator(&self, generator: Arc<dyn PrincipalNameGenerator>, rank: i32) -> Result<RegistrationId> {
        self.generators.register(generator, rank)
    }

    pub fn unregister_generator(&self, id: RegistrationId) -> Result<bool> {
        self.generators.unregister(id)
    }

    pub fn register_filter(&self, filter: Arc<dyn PrincipalNameFilter>, rank: i32) -> Result<RegistrationId> {
        self.filters.register(filter, rank)
    }

    pub fn unregister_filter(&self, id: RegistrationId) -> Result<bool> {
        self.filters.unregister(id)
    }

    pub fn generators(&self) -> &RankedRegistry<dyn PrincipalNameGenerator> {
        &self.generators
    }

    pub fn filters(&self) -> &RankedRegistry<dyn PrincipalNameFilter> {
        &self.filters
    }

    /// Generated name before any uniqueness handling
    ///
    /// Without registered generators only a single-valued `:name` counts.
    pub fn name_info(&self, params: &RequestParameters, kind: AuthorizableKind) -> Result<Option<NameInfo>> {
        let generators = self.generators.snapshot()?;
        let (Some(default), Some(primary)) = (generators.first(), generators.last()) else {
            return Ok(params.get_string(NAME_PARAM).map(NameInfo::exact));
        };
        let filter = self.filters.highest()?;
        let filter = filter.as_deref();

        if primary.id == default.id {
            return Ok(primary.service.principal_name(params, kind, filter, None));
        }

        let info = primary
            .service
            .principal_name(params, kind, filter, Some(default.service.as_ref()));
        if info.is_some() {
            return Ok(info);
        }

        debug!("Generator {} produced no name, using default generator", primary.id);
        Ok(default.service.principal_name(params, kind, filter, None))
    }

    /// Resolves a principal name, appending a random suffix on collision when
    /// the generator allows it
    pub fn resolve<F>(&self, params: &RequestParameters, kind: AuthorizableKind, exists: F) -> Result<Option<String>>
    where
        F: FnMut(&str) -> Result<bool>,
    {
        let Some(info) = self.name_info(params, kind)? else {
            return Ok(None);
        };
        if !info.is_make_unique() {
            return Ok(Some(info.into_principal_name()));
        }
        self.make_unique(info.principal_name(), &mut rand::thread_rng(), exists)
            .map(Some)
    }

    /// Returns `base` if free, otherwise tries up to the retry limit of
    /// random `base_N` candidates
    pub fn make_unique<R, F>(&self, base: &str, rng: &mut R, mut exists: F) -> Result<String>
    where
        R: Rng,
        F: FnMut(&str) -> Result<bool>,
    {
        if !exists(base)? {
            return Ok(base.to_string());
        }

        let mut candidate = base.to_string();
        for _ in 0..self.retry_limit {
            candidate = next_candidate(base, rng.gen_range(0..self.suffix_bound));
            if !exists(&candidate)? {
                return Ok(candidate);
            }
        }

        warn!("Could not find a free principal name for '{}' after {} attempts", base, self.retry_limit);
        Err(SyncError::Collision(candidate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::{DefaultPrincipalNameFilter, DefaultPrincipalNameGenerator};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    struct Fixed(&'static str);

    impl PrincipalNameGenerator for Fixed {
        fn principal_name(
            &self,
            _params: &RequestParameters,
            _kind: AuthorizableKind,
            _filter: Option<&dyn PrincipalNameFilter>,
            _default_generator: Option<&dyn PrincipalNameGenerator>,
        ) -> Option<NameInfo> {
            Some(NameInfo::exact(self.0))
        }
    }

    struct Declining;

    impl PrincipalNameGenerator for Declining {
        fn principal_name(
            &self,
            _params: &RequestParameters,
            _kind: AuthorizableKind,
            _filter: Option<&dyn PrincipalNameFilter>,
            default_generator: Option<&dyn PrincipalNameGenerator>,
        ) -> Option<NameInfo> {
            assert!(default_generator.is_some());
            None
        }
    }

    fn resolver() -> PrincipalNameResolver {
        let resolver = PrincipalNameResolver::from_config(&SyncConfig::default());
        resolver
            .register_generator(Arc::new(DefaultPrincipalNameGenerator::from_config(&SyncConfig::default())), 0)
            .unwrap();
        resolver.register_filter(Arc::new(DefaultPrincipalNameFilter), 0).unwrap();
        resolver
    }

    #[test]
    fn test_legacy_mode() {
        let resolver = PrincipalNameResolver::new(10, 100);
        let params = RequestParameters::new().with(":name", "Exact Name");
        let name = resolver
            .resolve(&params, AuthorizableKind::User, |_| Ok(true))
            .unwrap();
        assert_eq!(name.as_deref(), Some("Exact Name"));

        let hint_only = RequestParameters::new().with(":nameHint", "bob");
        assert!(resolver.name_info(&hint_only, AuthorizableKind::User).unwrap().is_none());
    }

    #[test]
    fn test_highest_rank_wins() {
        let resolver = resolver();
        resolver.register_generator(Arc::new(Fixed("custom")), 10).unwrap();

        let params = RequestParameters::new().with(":name", "ignored");
        let info = resolver.name_info(&params, AuthorizableKind::User).unwrap().unwrap();
        assert_eq!(info.principal_name(), "custom");
    }

    #[test]
    fn test_falls_back_to_default() {
        let resolver = resolver();
        let id = resolver.register_generator(Arc::new(Declining), 10).unwrap();

        let params = RequestParameters::new().with(":nameHint", "Bob");
        let info = resolver.name_info(&params, AuthorizableKind::User).unwrap().unwrap();
        assert_eq!(info.principal_name(), "bob");

        assert!(resolver.unregister_generator(id).unwrap());
        assert_eq!(resolver.generators().len().unwrap(), 1);
    }

    #[test]
    fn test_unique_name_gets_suffix() {
        let resolver = resolver();
        let params = RequestParameters::new().with(":nameHint", "bob");

        let name = resolver
            .resolve(&params, AuthorizableKind::User, |candidate| Ok(candidate == "bob"))
            .unwrap()
            .unwrap();
        let suffix = name.strip_prefix("bob_").unwrap();
        assert!(!suffix.is_empty() && suffix.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_exact_name_never_suffixed() {
        let resolver = resolver();
        let params = RequestParameters::new().with(":name", "bob");
        let name = resolver
            .resolve(&params, AuthorizableKind::User, |_| Ok(true))
            .unwrap();
        assert_eq!(name.as_deref(), Some("bob"));
    }

    #[test]
    fn test_collision_after_retry_limit() {
        let resolver = PrincipalNameResolver::new(5, 100);
        let mut attempts = 0;
        let result = resolver.make_unique("bob", &mut StdRng::seed_from_u64(7), |_| {
            attempts += 1;
            Ok(true)
        });

        match result {
            Err(SyncError::Collision(name)) => assert!(name.starts_with("bob_")),
            other => panic!("expected collision, got {:?}", other),
        }
        assert_eq!(attempts, 6);
    }

    #[test]
    fn test_seeded_candidates_are_bounded() {
        let resolver = PrincipalNameResolver::new(50, 3);
        let mut seen = HashSet::new();
        let _ = resolver.make_unique("x", &mut StdRng::seed_from_u64(1), |candidate| {
            seen.insert(candidate.to_string());
            Ok(true)
        });

        seen.remove("x");
        assert!(seen.iter().all(|c| ["x_0", "x_1", "x_2"].contains(&c.as_str())));
    }

    #[test]
    fn test_next_candidate() {
        assert_eq!(next_candidate("bob", 42), "bob_42");
    }
}
