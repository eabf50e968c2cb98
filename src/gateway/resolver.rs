//! # Path Tree Resolver
//!
//! Turns a route's path template into a chain of API Gateway resources, declaring only
//! the nodes no earlier route of the same run has declared.
//!
//! ## Resolution
//!
//! Segments are walked left to right starting at the API root resource:
//!
//! 1. The node's [`ResourceKey`] is derived from every segment up to and including the
//!    current one.
//! 2. A key already in the [`ResourceRegistry`] is reused and nothing is declared.
//! 3. Otherwise the node is declared under the current parent. A first-level node is
//!    named after its segment. A deeper node takes the bare segment as its name unless
//!    that literal was already declared as a child somewhere else, in which case the
//!    parent id is appended.
//! 4. The resolved handle becomes the parent of the next segment.

use super::naming::{disambiguated_resource_name, split_path, ResourceKey, ResourceKeyStrategy};
use super::registry::{ChildResourceSet, ResourceRegistry};
use crate::error::{ProvisioningError, ProvisioningResult};
use crate::provider::{Handle, ProvisioningEngine, ResourceDeclaration, RestApiHandle};
use crate::request::RouteSpec;
use tracing::{debug, info_span, Instrument};

/// Terminal node of a resolved route
#[derive(Debug, Clone)]
pub struct ResolvedRoute {
    pub resource_key: ResourceKey,
    pub resource: Handle,
    /// Handles declared while resolving this route, in order
    pub created: Vec<Handle>,
    pub segments: Vec<String>,
}

impl ResolvedRoute {
    /// Last path segment, the key of the request model registry
    pub fn terminal_segment(&self) -> &str {
        self.segments.last().map_or("", String::as_str)
    }
}

/// Resolve `route` against the registry, declaring missing nodes through `engine`.
///
/// The registry and the child set are updated in place. A key is never declared twice
/// within one registry.
pub async fn resolve_route(
    engine: &dyn ProvisioningEngine,
    api: &RestApiHandle,
    key_strategy: ResourceKeyStrategy,
    route: &RouteSpec,
    registry: &mut ResourceRegistry,
    child_resources: &mut ChildResourceSet,
) -> ProvisioningResult<ResolvedRoute> {
    let segments = split_path(&route.path)?;
    let span = info_span!(
        "apigateway.resolve_route",
        route.path = %route.path,
        route.segments = segments.len()
    );

    async {
        let mut created = Vec::new();
        let mut parent_id = api.root_resource_id.clone();
        let mut terminal: Option<(ResourceKey, Handle)> = None;

        for (index, segment) in segments.iter().enumerate() {
            let key = key_strategy.key_for(&segments[..=index]);

            let handle = if let Some(existing) = registry.get(&key) {
                debug!(resource.key = %key, "Reusing declared resource");
                existing.clone()
            } else {
                let name = if index == 0 {
                    segment.clone()
                } else if child_resources.contains(segment) {
                    disambiguated_resource_name(segment, &parent_id)
                } else {
                    segment.clone()
                };

                let declaration = ResourceDeclaration {
                    name,
                    path_part: segment.clone(),
                    parent_id: parent_id.clone(),
                };
                let handle = engine.declare_resource(api, &declaration).await?;
                debug!(
                    resource.key = %key,
                    resource.name = %declaration.name,
                    resource.id = %handle.id,
                    "Declared resource"
                );

                if index > 0 {
                    child_resources.insert(segment);
                }
                registry.insert(key.clone(), handle.clone());
                created.push(handle.clone());
                handle
            };

            parent_id.clone_from(&handle.id);
            terminal = Some((key, handle));
        }

        let (resource_key, resource) = terminal.ok_or_else(|| {
            ProvisioningError::malformed_route(&route.path, "path produced no resources")
        })?;

        Ok::<_, ProvisioningError>(ResolvedRoute {
            resource_key,
            resource,
            created,
            segments,
        })
    }
    .instrument(span)
    .await
}
