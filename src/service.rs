// ============================================================================
// Authorizable Service
// ============================================================================
//
// High-level entry point: creates, updates and deletes users and groups from
// request parameters and reports every repository change it made.
//
// ============================================================================

use std::sync::Arc;
use log::warn;
use tracing::{Level, event, info_span};
use crate::change::{Change, ChangeLog};
use crate::coercion::DateParser;
use crate::config::SyncConfig;
use crate::core::{Result, SyncError, path};
use crate::naming::{DefaultPrincipalNameFilter, DefaultPrincipalNameGenerator, PrincipalNameResolver};
use crate::request::{RequestParameters, RequestPropertyTree};
use crate::store::{AuthorizableKind, AuthorizableRef, AuthorizableStore, NodeStore};
use crate::sync::{PASSWORD_CONFIRM_PARAM, PASSWORD_PARAM, PropertySync};

pub const DISABLED_PARAM: &str = ":disabled";
pub const DISABLED_REASON_PARAM: &str = ":disabledReason";
pub const MEMBER_PARAM: &str = ":member";
pub const MEMBER_DELETE_PARAM: &str = ":member@Delete";
pub const APPLY_TO_PARAM: &str = ":applyTo";
pub const OLD_PASSWORD_PARAM: &str = "oldPwd";
pub const NEW_PASSWORD_PARAM: &str = "newPwd";
pub const NEW_PASSWORD_CONFIRM_PARAM: &str = "newPwdConfirm";
pub const PASSWORD_PROPERTY: &str = "rep:password";
pub const DISABLED_PROPERTY: &str = "rep:disabled";

/// Rank of the built-in generator and filter
pub const DEFAULT_RANK: i32 = 0;

/// User and group management on top of an [`AuthorizableStore`]
///
/// Every operation appends to a caller-supplied [`ChangeLog`]. Records pushed
/// before a failure stay in the log.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use authsync::{AuthorizableService, ChangeLog, MemoryRepository, RequestParameters, SyncConfig};
///
/// # fn main() -> authsync::Result<()> {
/// let store = Arc::new(MemoryRepository::new().hash_cost(4));
/// let service = AuthorizableService::new(store, SyncConfig::default())?;
///
/// let params = RequestParameters::new()
///     .with(":name", "alice")
///     .with("pwd", "secret")
///     .with("pwdConfirm", "secret")
///     .with("email", "alice@example.com");
/// let mut changes = ChangeLog::new();
/// let alice = service.create_user(&params, &mut changes)?;
///
/// assert_eq!(alice.path(), "/home/users/alice");
/// assert_eq!(changes.len(), 2);
/// # Ok(())
/// # }
/// ```
pub struct AuthorizableService<S: AuthorizableStore + NodeStore> {
    store: Arc<S>,
    config: SyncConfig,
    dates: DateParser,
    resolver: PrincipalNameResolver,
}

impl<S: AuthorizableStore + NodeStore> AuthorizableService<S> {
    /// Validates `config` and registers the default name generator and filter
    pub fn new(store: Arc<S>, config: SyncConfig) -> Result<Self> {
        config.validate()?;

        let resolver = PrincipalNameResolver::from_config(&config);
        resolver.register_generator(Arc::new(DefaultPrincipalNameGenerator::from_config(&config)), DEFAULT_RANK)?;
        resolver.register_filter(Arc::new(DefaultPrincipalNameFilter), DEFAULT_RANK)?;

        Ok(Self {
            dates: DateParser::from_config(&config),
            store,
            config,
            resolver,
        })
    }

    /// Uses `resolver` as is; with no generators registered only `:name` is
    /// honoured
    pub fn with_resolver(store: Arc<S>, config: SyncConfig, resolver: PrincipalNameResolver) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            dates: DateParser::from_config(&config),
            store,
            config,
            resolver,
        })
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn resolver(&self) -> &PrincipalNameResolver {
        &self.resolver
    }

    pub fn create_user(&self, params: &RequestParameters, changes: &mut ChangeLog) -> Result<AuthorizableRef> {
        let span = info_span!("authorizable.create", kind = %AuthorizableKind::User);
        let _enter = span.enter();

        let name = self.resolve_name(params, AuthorizableKind::User)?;
        let password = params
            .get_string(PASSWORD_PARAM)
            .ok_or_else(|| SyncError::Validation("Password was not submitted".to_string()))?;
        if params.get_string(PASSWORD_CONFIRM_PARAM).as_deref() != Some(password.as_str()) {
            return Err(SyncError::Validation(
                "Password value does not match the confirmation password".to_string(),
            ));
        }

        let tree = self.prepare_create(&name, params)?;
        let user = self.store.create_user(&name, &password)?;
        changes.push(Change::created(user.path()));
        self.sync(&user, &tree, changes)?;

        event!(Level::INFO, id = %user.id(), changes = changes.len(), "user created");
        Ok(user)
    }

    pub fn create_group(&self, params: &RequestParameters, changes: &mut ChangeLog) -> Result<AuthorizableRef> {
        let span = info_span!("authorizable.create", kind = %AuthorizableKind::Group);
        let _enter = span.enter();

        let name = self.resolve_name(params, AuthorizableKind::Group)?;
        let tree = self.prepare_create(&name, params)?;
        let group = self.store.create_group(&name)?;
        changes.push(Change::created(group.path()));
        self.sync(&group, &tree, changes)?;
        self.update_membership(&group, params, changes)?;

        event!(Level::INFO, id = %group.id(), changes = changes.len(), "group created");
        Ok(group)
    }

    pub fn update_user(&self, id: &str, params: &RequestParameters, changes: &mut ChangeLog) -> Result<()> {
        let span = info_span!("authorizable.update", id = %id, kind = %AuthorizableKind::User);
        let _enter = span.enter();

        let user = self.require(id, AuthorizableKind::User)?;
        let tree = RequestPropertyTree::from_parameters(params);
        self.sync(&user, &tree, changes)?;
        self.update_disabled(&user, params, changes)?;

        event!(Level::INFO, changes = changes.len(), "user updated");
        Ok(())
    }

    pub fn update_group(&self, id: &str, params: &RequestParameters, changes: &mut ChangeLog) -> Result<()> {
        let span = info_span!("authorizable.update", id = %id, kind = %AuthorizableKind::Group);
        let _enter = span.enter();

        let group = self.require(id, AuthorizableKind::Group)?;
        let tree = RequestPropertyTree::from_parameters(params);
        self.sync(&group, &tree, changes)?;
        self.update_membership(&group, params, changes)?;

        event!(Level::INFO, changes = changes.len(), "group updated");
        Ok(())
    }

    pub fn delete_authorizable(&self, id: &str, changes: &mut ChangeLog) -> Result<()> {
        let span = info_span!("authorizable.delete", id = %id);
        let _enter = span.enter();

        let authorizable = self
            .store
            .get_authorizable(id)?
            .ok_or_else(|| SyncError::NotFound(id.to_string()))?;
        self.store.remove_authorizable(&authorizable)?;
        changes.push(Change::deleted(authorizable.path()));

        event!(Level::INFO, changes = changes.len(), "authorizable deleted");
        Ok(())
    }

    /// Removes every authorizable listed in `:applyTo`; unknown ids are skipped
    pub fn delete_authorizables(&self, params: &RequestParameters, changes: &mut ChangeLog) -> Result<()> {
        let span = info_span!("authorizable.delete_batch");
        let _enter = span.enter();

        for id in params.get_strings(APPLY_TO_PARAM) {
            match self.store.get_authorizable(&id)? {
                Some(authorizable) => {
                    self.store.remove_authorizable(&authorizable)?;
                    changes.push(Change::deleted(authorizable.path()));
                }
                None => warn!("Skipping delete of unknown authorizable '{}'", id),
            }
        }

        event!(Level::INFO, changes = changes.len(), "authorizables deleted");
        Ok(())
    }

    pub fn change_password(&self, id: &str, params: &RequestParameters, changes: &mut ChangeLog) -> Result<()> {
        let span = info_span!("authorizable.change_password", id = %id);
        let _enter = span.enter();

        let user = self.require(id, AuthorizableKind::User)?;

        let old_password = params
            .get_string(OLD_PASSWORD_PARAM)
            .ok_or_else(|| SyncError::Validation("Old password was not submitted".to_string()))?;
        if !self.store.verify_password(&user, &old_password)? {
            return Err(SyncError::Validation("Old password does not match".to_string()));
        }

        let new_password = params
            .get_string(NEW_PASSWORD_PARAM)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| SyncError::Validation("New password was not submitted".to_string()))?;
        if params.get_string(NEW_PASSWORD_CONFIRM_PARAM).as_deref() != Some(new_password.as_str()) {
            return Err(SyncError::Validation(
                "New password does not match the confirmation password".to_string(),
            ));
        }

        self.store.change_password(&user, &new_password)?;
        changes.push(Change::modified(path::join(user.path(), PASSWORD_PROPERTY)));

        event!(Level::INFO, changes = changes.len(), "password changed");
        Ok(())
    }

    fn resolve_name(&self, params: &RequestParameters, kind: AuthorizableKind) -> Result<String> {
        let store = &self.store;
        self.resolver
            .resolve(params, kind, |candidate| store.exists(candidate))?
            .filter(|name| !name.is_empty())
            .ok_or_else(|| SyncError::Validation(format!("Principal name for the new {} was not supplied", kind)))
    }

    /// Checks everything that can fail before the authorizable is created
    fn prepare_create(&self, name: &str, params: &RequestParameters) -> Result<RequestPropertyTree> {
        if self.store.exists(name)? {
            return Err(SyncError::Validation(format!(
                "A principal already exists with the requested name: {}",
                name
            )));
        }

        let tree = RequestPropertyTree::from_parameters(params);
        // only the shape relative to the root matters here
        PropertySync::new(&*self.store, &self.dates).check(&format!("{}{}", path::SEPARATOR, name), &tree)?;
        Ok(tree)
    }

    fn sync(&self, authorizable: &AuthorizableRef, tree: &RequestPropertyTree, changes: &mut ChangeLog) -> Result<()> {
        PropertySync::new(&*self.store, &self.dates)
            .with_default_node_type(&self.config.default_node_type)
            .apply(authorizable, tree, changes)
    }

    fn require(&self, id: &str, kind: AuthorizableKind) -> Result<AuthorizableRef> {
        let authorizable = self
            .store
            .get_authorizable(id)?
            .ok_or_else(|| SyncError::NotFound(id.to_string()))?;
        if authorizable.kind() != kind {
            return Err(SyncError::Validation(format!("Authorizable '{}' is not a {}", id, kind)));
        }
        Ok(authorizable)
    }

    fn update_disabled(&self, user: &AuthorizableRef, params: &RequestParameters, changes: &mut ChangeLog) -> Result<()> {
        let Some(flag) = params.get_string(DISABLED_PARAM) else {
            return Ok(());
        };

        if flag.eq_ignore_ascii_case("true") {
            let reason = params.get_string(DISABLED_REASON_PARAM).unwrap_or_default();
            self.store.disable(user, &reason)?;
        } else if flag.eq_ignore_ascii_case("false") {
            if self.store.disabled_reason(user)?.is_none() {
                return Ok(());
            }
            self.store.enable(user)?;
        } else {
            warn!("Ignoring {} value '{}' for {}", DISABLED_PARAM, flag, user.id());
            return Ok(());
        }

        changes.push(Change::modified(path::join(user.path(), DISABLED_PROPERTY)));
        Ok(())
    }

    fn update_membership(&self, group: &AuthorizableRef, params: &RequestParameters, changes: &mut ChangeLog) -> Result<()> {
        for reference in params.get_strings(MEMBER_DELETE_PARAM) {
            if let Some(member) = self.find_member(&reference)? {
                if self.store.remove_member(group, &member)? {
                    changes.push(Change::modified(group.path()).with_destination(member.path()));
                }
            }
        }

        for reference in params.get_strings(MEMBER_PARAM) {
            if let Some(member) = self.find_member(&reference)? {
                if self.store.add_member(group, &member)? {
                    changes.push(Change::modified(group.path()).with_destination(member.path()));
                }
            }
        }
        Ok(())
    }

    /// Looks a member up by id, or by path when the reference is absolute
    fn find_member(&self, reference: &str) -> Result<Option<AuthorizableRef>> {
        let found = if reference.starts_with(path::SEPARATOR) {
            self.store.find_by_path(reference)?
        } else {
            self.store.get_authorizable(reference)?
        };
        if found.is_none() {
            warn!("Ignoring unknown member '{}'", reference);
        }
        Ok(found)
    }
}
