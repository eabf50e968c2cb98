//! # Session Registries
//!
//! Per-run bookkeeping for the resolver. All four structures are created empty when a
//! run starts, owned by its [`ProvisioningSession`] and dropped with it.

use super::naming::{ResourceKey, ResourceKeyStrategy};
use crate::provider::Handle;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// ResourceKey → handle of the declared hierarchy node. Append-only.
#[derive(Debug, Default)]
pub struct ResourceRegistry {
    entries: HashMap<ResourceKey, Handle>,
    /// Keys in declaration order
    order: Vec<ResourceKey>,
}

impl ResourceRegistry {
    pub fn get(&self, key: &ResourceKey) -> Option<&Handle> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &ResourceKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Store the handle for a newly declared key.
    ///
    /// Returns `false` and keeps the existing entry when the key is already present.
    pub fn insert(&mut self, key: ResourceKey, handle: Handle) -> bool {
        if self.entries.contains_key(&key) {
            return false;
        }
        self.order.push(key.clone());
        self.entries.insert(key, handle);
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys in the order they were declared
    pub fn keys(&self) -> &[ResourceKey] {
        &self.order
    }
}

/// Literal segments already declared as a non-root child
#[derive(Debug, Default)]
pub struct ChildResourceSet {
    names: HashSet<String>,
}

impl ChildResourceSet {
    pub fn contains(&self, segment: &str) -> bool {
        self.names.contains(segment)
    }

    pub fn insert(&mut self, segment: &str) {
        self.names.insert(segment.to_string());
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Terminal segment → model name. A later route with the same terminal segment
/// replaces the earlier entry. Model names are declared at most once per run.
#[derive(Debug, Default)]
pub struct RequestModelRegistry {
    models: BTreeMap<String, String>,
    declared: BTreeSet<String>,
}

impl RequestModelRegistry {
    /// Record a model, returning the name it replaced
    pub fn record(&mut self, terminal_segment: &str, model_name: String) -> Option<String> {
        self.models.insert(terminal_segment.to_string(), model_name)
    }

    pub fn get(&self, terminal_segment: &str) -> Option<&str> {
        self.models.get(terminal_segment).map(String::as_str)
    }

    /// Mark a model name as declared, returning false if it already was
    pub fn mark_declared(&mut self, model_name: &str) -> bool {
        self.declared.insert(model_name.to_string())
    }

    pub fn is_declared(&self, model_name: &str) -> bool {
        self.declared.contains(model_name)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

/// Method handles in declaration order, the dependency set of the deployment
#[derive(Debug, Default)]
pub struct MethodDependencySet {
    methods: Vec<Handle>,
}

impl MethodDependencySet {
    pub fn push(&mut self, method: Handle) {
        self.methods.push(method);
    }

    pub fn as_slice(&self) -> &[Handle] {
        &self.methods
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

/// Mutable state of one provisioning run
#[derive(Debug, Default)]
pub struct ProvisioningSession {
    pub key_strategy: ResourceKeyStrategy,
    pub resources: ResourceRegistry,
    pub child_resources: ChildResourceSet,
    pub request_models: RequestModelRegistry,
    pub methods: MethodDependencySet,
}

impl ProvisioningSession {
    pub fn new(key_strategy: ResourceKeyStrategy) -> Self {
        Self {
            key_strategy,
            ..Self::default()
        }
    }
}
