//! Domain models and transformations for planner backend responses
//!
//! The backend speaks JSON:API. The raw response types below mirror the
//! nested wire shape; the `transform_*` functions flatten them into the small
//! domain models the rest of the crate works with.

use serde::{Deserialize, Serialize};

/// Space descriptor response from `GET /spaces/{space}`
#[derive(Debug, Deserialize, Clone)]
pub struct SpaceResponse {
    pub data: SpaceResource,
}

/// Space resource, only the links we follow
#[derive(Debug, Deserialize, Clone)]
pub struct SpaceResource {
    pub id: String,
    pub links: SpaceLinks,
}

/// Links attached to a space resource
#[derive(Debug, Deserialize, Clone)]
pub struct SpaceLinks {
    /// Absolute URL of the space's work item type listing
    pub workitemtypes: String,
}

/// Iteration list response from `GET /spaces/{space}/iterations`
#[derive(Debug, Deserialize, Clone)]
pub struct IterationListResponse {
    #[serde(default)]
    pub data: Vec<IterationResource>,
}

/// Raw iteration resource
#[derive(Debug, Deserialize, Clone)]
pub struct IterationResource {
    pub id: String,
    pub attributes: IterationAttributes,
    #[serde(default)]
    pub relationships: Option<IterationRelationships>,
}

/// Iteration attributes
#[derive(Debug, Deserialize, Clone)]
pub struct IterationAttributes {
    pub name: String,
}

/// Iteration relationships (parent iteration, work item totals)
#[derive(Debug, Deserialize, Clone, Default)]
pub struct IterationRelationships {
    #[serde(default)]
    pub parent: Option<Relationship>,
    #[serde(default)]
    pub workitems: Option<WorkItemsRelationship>,
}

/// Generic to-one relationship
#[derive(Debug, Deserialize, Clone)]
pub struct Relationship {
    #[serde(default)]
    pub data: Option<RelationshipData>,
}

/// Relationship target
#[derive(Debug, Deserialize, Clone)]
pub struct RelationshipData {
    pub id: String,
}

/// Work items relationship, carries only a meta total
#[derive(Debug, Deserialize, Clone)]
pub struct WorkItemsRelationship {
    #[serde(default)]
    pub meta: Option<WorkItemsMeta>,
}

/// Meta block of the work items relationship
#[derive(Debug, Deserialize, Clone)]
pub struct WorkItemsMeta {
    pub total: u64,
}

/// Work item type list response
#[derive(Debug, Deserialize, Clone)]
pub struct WorkItemTypeListResponse {
    #[serde(default)]
    pub data: Vec<WorkItemTypeResource>,
}

/// Raw work item type resource
#[derive(Debug, Deserialize, Clone)]
pub struct WorkItemTypeResource {
    pub id: String,
    pub attributes: WorkItemTypeAttributes,
}

/// Work item type attributes
#[derive(Debug, Deserialize, Clone)]
pub struct WorkItemTypeAttributes {
    pub name: String,
}

/// Search response from `GET /search`
#[derive(Debug, Deserialize, Clone)]
pub struct SearchResponse {
    #[serde(default)]
    pub data: Vec<WorkItemResource>,
}

/// Raw work item resource
#[derive(Debug, Deserialize, Clone)]
pub struct WorkItemResource {
    pub id: String,
    pub attributes: WorkItemAttributes,
}

/// Work item attributes.
///
/// The backend stores system fields under literal dotted keys
/// (`"system.state"`, not a nested `system` object).
#[derive(Debug, Deserialize, Clone, Default)]
pub struct WorkItemAttributes {
    #[serde(rename = "system.title", default)]
    pub title: Option<String>,
    #[serde(rename = "system.state", default)]
    pub state: Option<String>,
    #[serde(rename = "system.description", default)]
    pub description: Option<String>,
    #[serde(default)]
    pub storypoints: Option<f64>,
}

/// A sprint/time-boxed grouping of work items
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Iteration {
    pub id: String,
    pub name: String,
    /// Identifier of the containing iteration, if any
    pub parent_id: Option<String>,
    /// Backend-reported total work items under this iteration, including
    /// children and all work item types
    pub total: Option<u64>,
}

/// A category of work item (e.g. "Bug", "Story")
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct WorkItemType {
    pub id: String,
    pub name: String,
}

/// A unit of work belonging to exactly one iteration
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct WorkItem {
    pub id: String,
    pub title: Option<String>,
    pub state: Option<String>,
    pub story_points: Option<f64>,
    pub description: Option<String>,
}

/// Flatten a raw iteration resource into the domain model
pub fn transform_iteration(resource: IterationResource) -> Iteration {
    let relationships = resource.relationships.unwrap_or_default();
    Iteration {
        id: resource.id,
        name: resource.attributes.name,
        parent_id: relationships
            .parent
            .and_then(|parent| parent.data)
            .map(|data| data.id),
        total: relationships
            .workitems
            .and_then(|workitems| workitems.meta)
            .map(|meta| meta.total),
    }
}

/// Flatten an iteration list response into domain models
pub fn transform_iteration_list(response: IterationListResponse) -> Vec<Iteration> {
    response.data.into_iter().map(transform_iteration).collect()
}

/// Flatten a work item type list response into domain models
pub fn transform_work_item_type_list(response: WorkItemTypeListResponse) -> Vec<WorkItemType> {
    response
        .data
        .into_iter()
        .map(|resource| WorkItemType {
            id: resource.id,
            name: resource.attributes.name,
        })
        .collect()
}

/// Flatten a search response into domain work items
pub fn transform_search_response(response: SearchResponse) -> Vec<WorkItem> {
    response
        .data
        .into_iter()
        .map(|resource| WorkItem {
            id: resource.id,
            title: resource.attributes.title,
            state: resource.attributes.state,
            story_points: resource.attributes.storypoints,
            description: resource.attributes.description,
        })
        .collect()
}
