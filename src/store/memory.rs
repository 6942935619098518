use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;
use crate::core::{PropertyType, PropertyValue, Result, SyncError, path};
use super::{AuthorizableKind, AuthorizableRef, AuthorizableStore, NodeStore, NodeTypeDef};

pub const USERS_ROOT: &str = "/home/users";
pub const GROUPS_ROOT: &str = "/home/groups";

const FOLDER_TYPE: &str = "rep:AuthorizableFolder";
const USER_TYPE: &str = "rep:User";
const GROUP_TYPE: &str = "rep:Group";

#[derive(Debug, Clone)]
struct Node {
    primary_type: String,
    mixins: Vec<String>,
    properties: BTreeMap<String, PropertyValue>,
}

impl Node {
    fn new(primary_type: &str) -> Self {
        Self {
            primary_type: primary_type.to_string(),
            mixins: Vec::new(),
            properties: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone)]
struct Principal {
    reference: AuthorizableRef,
    password_hash: Option<String>,
    disabled_reason: Option<String>,
    members: Vec<String>,
}

#[derive(Debug, Default)]
struct RepositoryState {
    nodes: BTreeMap<String, Node>,
    principals: HashMap<String, Principal>,
    node_types: HashMap<String, NodeTypeDef>,
}

impl RepositoryState {
    fn node(&self, path: &str) -> Result<&Node> {
        self.nodes
            .get(path)
            .ok_or_else(|| SyncError::Repository(format!("Node '{}' not found", path)))
    }

    fn node_mut(&mut self, path: &str) -> Result<&mut Node> {
        self.nodes
            .get_mut(path)
            .ok_or_else(|| SyncError::Repository(format!("Node '{}' not found", path)))
    }

    fn principal(&self, id: &str) -> Result<&Principal> {
        self.principals
            .get(id)
            .ok_or_else(|| SyncError::Repository(format!("Authorizable '{}' not found", id)))
    }

    fn principal_mut(&mut self, id: &str) -> Result<&mut Principal> {
        self.principals
            .get_mut(id)
            .ok_or_else(|| SyncError::Repository(format!("Authorizable '{}' not found", id)))
    }

    fn checked_type(&self, name: &str, mixin: bool) -> Result<()> {
        match self.node_types.get(name) {
            Some(def) if def.is_mixin() == mixin => Ok(()),
            Some(_) if mixin => Err(SyncError::Repository(format!("'{}' is not a mixin type", name))),
            Some(_) => Err(SyncError::Repository(format!("'{}' is a mixin type", name))),
            None => Err(SyncError::Repository(format!("No such node type '{}'", name))),
        }
    }

    /// Creates `node_path` and any missing ancestors with `node_type`
    fn ensure_node(&mut self, node_path: &str, node_type: &str) {
        let mut current = String::new();
        for segment in node_path.split(path::SEPARATOR).filter(|s| !s.is_empty()) {
            current.push(path::SEPARATOR);
            current.push_str(segment);
            self.nodes
                .entry(current.clone())
                .or_insert_with(|| Node::new(node_type));
        }
    }
}

/// In-memory repository of users, groups and their node trees
///
/// Users live below `/home/users`, groups below `/home/groups`. Passwords
/// are stored as bcrypt hashes.
pub struct MemoryRepository {
    state: RwLock<RepositoryState>,
    default_node_type: String,
    hash_cost: u32,
}

impl MemoryRepository {
    /// Creates an empty repository with the built-in node types
    pub fn new() -> Self {
        Self::with_default_node_type("nt:unstructured")
    }

    pub fn with_default_node_type(default_node_type: &str) -> Self {
        let mut state = RepositoryState::default();
        for def in Self::builtin_node_types() {
            state.node_types.insert(def.name().to_string(), def);
        }
        if !state.node_types.contains_key(default_node_type) {
            state.node_types.insert(
                default_node_type.to_string(),
                NodeTypeDef::primary(default_node_type),
            );
        }
        state.nodes.insert("/".to_string(), Node::new("rep:root"));
        state.ensure_node(USERS_ROOT, FOLDER_TYPE);
        state.ensure_node(GROUPS_ROOT, FOLDER_TYPE);

        Self {
            state: RwLock::new(state),
            default_node_type: default_node_type.to_string(),
            hash_cost: bcrypt::DEFAULT_COST,
        }
    }

    /// Set the bcrypt cost factor used for new password hashes
    pub fn hash_cost(mut self, cost: u32) -> Self {
        self.hash_cost = cost;
        self
    }

    fn builtin_node_types() -> Vec<NodeTypeDef> {
        vec![
            NodeTypeDef::primary("rep:root"),
            NodeTypeDef::primary(FOLDER_TYPE),
            NodeTypeDef::primary(USER_TYPE)
                .property("rep:principalName", PropertyType::String, false),
            NodeTypeDef::primary(GROUP_TYPE)
                .property("rep:principalName", PropertyType::String, false)
                .property("rep:members", PropertyType::WeakReference, true),
            NodeTypeDef::primary("nt:unstructured"),
            NodeTypeDef::primary("nt:folder"),
            NodeTypeDef::primary("sling:Folder"),
            NodeTypeDef::primary("sling:OrderedFolder"),
            NodeTypeDef::mixin("mix:title")
                .property("jcr:title", PropertyType::String, false)
                .property("jcr:description", PropertyType::String, false),
            NodeTypeDef::mixin("mix:language")
                .property("jcr:language", PropertyType::String, false),
            NodeTypeDef::mixin("mix:lastModified")
                .property("jcr:lastModified", PropertyType::Date, false)
                .property("jcr:lastModifiedBy", PropertyType::String, false),
        ]
    }

    /// Registers or replaces a node type
    pub fn define_node_type(&self, def: NodeTypeDef) -> Result<()> {
        let mut state = self.state.write()?;
        state.node_types.insert(def.name().to_string(), def);
        Ok(())
    }

    /// All node paths, sorted
    pub fn node_paths(&self) -> Result<Vec<String>> {
        let state = self.state.read()?;
        Ok(state.nodes.keys().cloned().collect())
    }

    pub fn principal_count(&self) -> Result<usize> {
        let state = self.state.read()?;
        Ok(state.principals.len())
    }

    fn hash_password(&self, password: &str) -> Result<String> {
        bcrypt::hash(password, self.hash_cost)
            .map_err(|e| SyncError::Repository(format!("Failed to hash password: {}", e)))
    }

    fn validate_id(id: &str) -> Result<()> {
        if id.is_empty() || id.contains(path::SEPARATOR) {
            return Err(SyncError::Repository(format!("Invalid authorizable id '{}'", id)));
        }
        Ok(())
    }

    /// Splits an authorizable-relative property path into node path and name
    fn locate(authorizable: &AuthorizableRef, rel_path: &str) -> Result<(String, String)> {
        if rel_path.trim_matches(path::SEPARATOR).is_empty() || path::has_parent_segment(rel_path) {
            return Err(SyncError::Repository(format!("Invalid property path '{}'", rel_path)));
        }
        let full = path::join(authorizable.path(), rel_path);
        let name = path::name_of(&full).to_string();
        let node = path::parent_of(&full).unwrap_or("/").to_string();
        Ok((node, name))
    }

    fn insert_principal(&self, id: &str, kind: AuthorizableKind, password_hash: Option<String>) -> Result<AuthorizableRef> {
        Self::validate_id(id)?;
        let (root, node_type) = match kind {
            AuthorizableKind::User => (USERS_ROOT, USER_TYPE),
            AuthorizableKind::Group => (GROUPS_ROOT, GROUP_TYPE),
        };
        let reference = AuthorizableRef::new(id, kind, format!("{}/{}", root, id));

        let mut state = self.state.write()?;
        if state.principals.contains_key(id) {
            return Err(SyncError::Repository(format!("Authorizable '{}' already exists", id)));
        }

        state.nodes.insert(reference.path().to_string(), Node::new(node_type));
        state.principals.insert(
            id.to_string(),
            Principal {
                reference: reference.clone(),
                password_hash,
                disabled_reason: None,
                members: Vec::new(),
            },
        );

        Ok(reference)
    }

    fn require_user(authorizable: &AuthorizableRef) -> Result<()> {
        if authorizable.is_group() {
            return Err(SyncError::Repository(format!("'{}' is not a user", authorizable.id())));
        }
        Ok(())
    }

    fn require_group(authorizable: &AuthorizableRef) -> Result<()> {
        if !authorizable.is_group() {
            return Err(SyncError::Repository(format!("'{}' is not a group", authorizable.id())));
        }
        Ok(())
    }
}

impl Default for MemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthorizableStore for MemoryRepository {
    fn get_authorizable(&self, id: &str) -> Result<Option<AuthorizableRef>> {
        let state = self.state.read()?;
        Ok(state.principals.get(id).map(|p| p.reference.clone()))
    }

    fn find_by_path(&self, node_path: &str) -> Result<Option<AuthorizableRef>> {
        let node_path = path::normalize(node_path);
        let state = self.state.read()?;
        Ok(state
            .principals
            .values()
            .find(|p| p.reference.path() == node_path)
            .map(|p| p.reference.clone()))
    }

    fn create_user(&self, id: &str, password: &str) -> Result<AuthorizableRef> {
        let hash = self.hash_password(password)?;
        self.insert_principal(id, AuthorizableKind::User, Some(hash))
    }

    fn create_group(&self, id: &str) -> Result<AuthorizableRef> {
        self.insert_principal(id, AuthorizableKind::Group, None)
    }

    fn remove_authorizable(&self, authorizable: &AuthorizableRef) -> Result<()> {
        let mut state = self.state.write()?;
        if state.principals.remove(authorizable.id()).is_none() {
            return Err(SyncError::Repository(format!(
                "Authorizable '{}' not found",
                authorizable.id()
            )));
        }

        state
            .nodes
            .retain(|p, _| !path::is_same_or_descendant(authorizable.path(), p));

        for principal in state.principals.values_mut() {
            principal.members.retain(|m| m != authorizable.id());
        }

        Ok(())
    }

    fn has_property(&self, authorizable: &AuthorizableRef, rel_path: &str) -> Result<bool> {
        Ok(self.get_property(authorizable, rel_path)?.is_some())
    }

    fn get_property(&self, authorizable: &AuthorizableRef, rel_path: &str) -> Result<Option<PropertyValue>> {
        let (node_path, name) = Self::locate(authorizable, rel_path)?;
        let state = self.state.read()?;
        Ok(state
            .nodes
            .get(&node_path)
            .and_then(|node| node.properties.get(&name))
            .cloned())
    }

    fn set_property(&self, authorizable: &AuthorizableRef, rel_path: &str, value: PropertyValue) -> Result<()> {
        let (node_path, name) = Self::locate(authorizable, rel_path)?;
        let mut state = self.state.write()?;
        state.principal(authorizable.id())?;
        state.ensure_node(&node_path, &self.default_node_type);
        state.node_mut(&node_path)?.properties.insert(name, value);
        Ok(())
    }

    fn remove_property(&self, authorizable: &AuthorizableRef, rel_path: &str) -> Result<bool> {
        let (node_path, name) = Self::locate(authorizable, rel_path)?;
        let mut state = self.state.write()?;
        Ok(state
            .nodes
            .get_mut(&node_path)
            .is_some_and(|node| node.properties.remove(&name).is_some()))
    }

    fn verify_password(&self, user: &AuthorizableRef, password: &str) -> Result<bool> {
        Self::require_user(user)?;
        let hash = {
            let state = self.state.read()?;
            state.principal(user.id())?.password_hash.clone()
        };
        Ok(hash.is_some_and(|h| bcrypt::verify(password, &h).unwrap_or(false)))
    }

    fn change_password(&self, user: &AuthorizableRef, password: &str) -> Result<()> {
        Self::require_user(user)?;
        let hash = self.hash_password(password)?;
        let mut state = self.state.write()?;
        state.principal_mut(user.id())?.password_hash = Some(hash);
        Ok(())
    }

    fn disable(&self, user: &AuthorizableRef, reason: &str) -> Result<()> {
        Self::require_user(user)?;
        let mut state = self.state.write()?;
        state.principal_mut(user.id())?.disabled_reason = Some(reason.to_string());
        Ok(())
    }

    fn enable(&self, user: &AuthorizableRef) -> Result<()> {
        Self::require_user(user)?;
        let mut state = self.state.write()?;
        state.principal_mut(user.id())?.disabled_reason = None;
        Ok(())
    }

    fn disabled_reason(&self, user: &AuthorizableRef) -> Result<Option<String>> {
        let state = self.state.read()?;
        Ok(state.principal(user.id())?.disabled_reason.clone())
    }

    fn add_member(&self, group: &AuthorizableRef, member: &AuthorizableRef) -> Result<bool> {
        Self::require_group(group)?;
        if group.id() == member.id() {
            return Err(SyncError::Repository(format!("Group '{}' cannot contain itself", group.id())));
        }
        let mut state = self.state.write()?;
        state.principal(member.id())?;
        let members = &mut state.principal_mut(group.id())?.members;
        if members.iter().any(|m| m == member.id()) {
            return Ok(false);
        }
        members.push(member.id().to_string());
        Ok(true)
    }

    fn remove_member(&self, group: &AuthorizableRef, member: &AuthorizableRef) -> Result<bool> {
        Self::require_group(group)?;
        let mut state = self.state.write()?;
        let members = &mut state.principal_mut(group.id())?.members;
        let before = members.len();
        members.retain(|m| m != member.id());
        Ok(members.len() != before)
    }

    fn members(&self, group: &AuthorizableRef) -> Result<Vec<String>> {
        Self::require_group(group)?;
        let state = self.state.read()?;
        Ok(state.principal(group.id())?.members.clone())
    }
}

impl NodeStore for MemoryRepository {
    fn node_exists(&self, node_path: &str) -> Result<bool> {
        let state = self.state.read()?;
        Ok(state.nodes.contains_key(&path::normalize(node_path)))
    }

    fn add_child_node(&self, parent_path: &str, name: &str, node_type: Option<&str>) -> Result<String> {
        if name.is_empty() || name.contains(path::SEPARATOR) || name == "." || name == ".." {
            return Err(SyncError::Repository(format!("Invalid node name '{}'", name)));
        }

        let parent_path = path::normalize(parent_path);
        let child_path = path::join(&parent_path, name);
        let node_type = node_type.unwrap_or(&self.default_node_type);

        let mut state = self.state.write()?;
        state.node(&parent_path)?;
        state.checked_type(node_type, false)?;
        if state.nodes.contains_key(&child_path) {
            return Err(SyncError::Repository(format!("Node '{}' already exists", child_path)));
        }
        state.nodes.insert(child_path.clone(), Node::new(node_type));
        Ok(child_path)
    }

    fn primary_type(&self, node_path: &str) -> Result<String> {
        let state = self.state.read()?;
        Ok(state.node(&path::normalize(node_path))?.primary_type.clone())
    }

    fn mixin_types(&self, node_path: &str) -> Result<Vec<String>> {
        let state = self.state.read()?;
        Ok(state.node(&path::normalize(node_path))?.mixins.clone())
    }

    fn add_mixin(&self, node_path: &str, mixin: &str) -> Result<()> {
        let mut state = self.state.write()?;
        state.checked_type(mixin, true)?;
        let node = state.node_mut(&path::normalize(node_path))?;
        if !node.mixins.iter().any(|m| m == mixin) {
            node.mixins.push(mixin.to_string());
        }
        Ok(())
    }

    fn set_primary_type(&self, node_path: &str, node_type: &str) -> Result<()> {
        let mut state = self.state.write()?;
        state.checked_type(node_type, false)?;
        state.node_mut(&path::normalize(node_path))?.primary_type = node_type.to_string();
        Ok(())
    }

    fn node_type(&self, name: &str) -> Result<Option<NodeTypeDef>> {
        let state = self.state.read()?;
        Ok(state.node_types.get(name).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Value;

    fn repo() -> MemoryRepository {
        MemoryRepository::new().hash_cost(4)
    }

    #[test]
    fn test_create_and_lookup() {
        let repo = repo();
        let alice = repo.create_user("alice", "secret").unwrap();

        assert_eq!(alice.path(), "/home/users/alice");
        assert!(repo.exists("alice").unwrap());
        assert_eq!(repo.find_by_path("/home/users/alice/").unwrap(), Some(alice.clone()));
        assert!(repo.verify_password(&alice, "secret").unwrap());
        assert!(!repo.verify_password(&alice, "wrong").unwrap());
        assert!(repo.create_group("alice").is_err());
    }

    #[test]
    fn test_nested_properties_create_nodes() {
        let repo = repo();
        let alice = repo.create_user("alice", "pw").unwrap();

        repo.set_property(&alice, "profile/email", Value::from("a@example.com").into()).unwrap();

        assert!(repo.node_exists("/home/users/alice/profile").unwrap());
        assert_eq!(repo.primary_type("/home/users/alice/profile").unwrap(), "nt:unstructured");
        assert!(repo.has_property(&alice, "profile/email").unwrap());
        assert!(repo.remove_property(&alice, "profile/email").unwrap());
        assert!(!repo.remove_property(&alice, "profile/email").unwrap());
    }

    #[test]
    fn test_unknown_node_types_are_rejected() {
        let repo = repo();
        repo.create_user("alice", "pw").unwrap();

        assert!(repo.add_child_node("/home/users/alice", "x", Some("no:Such")).is_err());
        assert!(repo.add_mixin("/home/users/alice", "nt:folder").is_err());
        assert!(repo.set_primary_type("/home/users/alice", "mix:title").is_err());
        assert!(repo.add_mixin("/home/users/alice", "mix:title").is_ok());
        assert!(repo.is_node_type("/home/users/alice", "mix:title").unwrap());
    }

    #[test]
    fn test_membership() {
        let repo = repo();
        let group = repo.create_group("staff").unwrap();
        let bob = repo.create_user("bob", "pw").unwrap();

        assert!(repo.add_member(&group, &bob).unwrap());
        assert!(!repo.add_member(&group, &bob).unwrap());
        assert_eq!(repo.members(&group).unwrap(), vec!["bob".to_string()]);

        repo.remove_authorizable(&bob).unwrap();
        assert!(repo.members(&group).unwrap().is_empty());
        assert!(!repo.node_exists("/home/users/bob").unwrap());
    }

    #[test]
    fn test_disable() {
        let repo = repo();
        let bob = repo.create_user("bob", "pw").unwrap();
        repo.disable(&bob, "left").unwrap();
        assert_eq!(repo.disabled_reason(&bob).unwrap().as_deref(), Some("left"));
        repo.enable(&bob).unwrap();
        assert_eq!(repo.disabled_reason(&bob).unwrap(), None);
    }
}
