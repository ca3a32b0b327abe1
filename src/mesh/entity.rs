//! Entity selection by kind or by name.

use std::fmt;
use std::str::FromStr;

use nalgebra::Point2;

use super::halfedge::HalfEdgeMesh;
use super::index::MeshIndex;
use super::ragged::Ragged;
use crate::error::{MeshError, Result};

/// The three kinds of mesh entity, by topological dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// Dimension 0.
    Node,
    /// Dimension 1. Also accepted as `face`.
    Edge,
    /// Dimension 2.
    Cell,
}

impl EntityKind {
    /// Topological dimension of the entity.
    pub fn dimension(self) -> usize {
        match self {
            EntityKind::Node => 0,
            EntityKind::Edge => 1,
            EntityKind::Cell => 2,
        }
    }
}

impl FromStr for EntityKind {
    type Err = MeshError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "node" | "0" => Ok(EntityKind::Node),
            "edge" | "face" | "1" => Ok(EntityKind::Edge),
            "cell" | "2" => Ok(EntityKind::Cell),
            _ => Err(MeshError::UnrecognizedEntity { name: s.to_string() }),
        }
    }
}

impl TryFrom<usize> for EntityKind {
    type Error = MeshError;

    fn try_from(dim: usize) -> Result<Self> {
        match dim {
            0 => Ok(EntityKind::Node),
            1 => Ok(EntityKind::Edge),
            2 => Ok(EntityKind::Cell),
            _ => Err(MeshError::UnrecognizedEntity {
                name: dim.to_string(),
            }),
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Node => "node",
            EntityKind::Edge => "edge",
            EntityKind::Cell => "cell",
        };
        f.write_str(name)
    }
}

/// The entities of one kind, in their natural representation.
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    /// Node coordinates.
    Node(Vec<Point2<f64>>),
    /// Edge endpoints.
    Edge(Vec<[usize; 2]>),
    /// Cell vertex lists.
    Cell(Ragged),
}

impl Entity {
    /// Number of entities.
    pub fn len(&self) -> usize {
        match self {
            Entity::Node(v) => v.len(),
            Entity::Edge(v) => v.len(),
            Entity::Cell(v) => v.len(),
        }
    }

    /// Whether there are no entities.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The kind of these entities.
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Node(_) => EntityKind::Node,
            Entity::Edge(_) => EntityKind::Edge,
            Entity::Cell(_) => EntityKind::Cell,
        }
    }
}

impl<I: MeshIndex> HalfEdgeMesh<I> {
    /// Get all entities of a kind.
    pub fn entity(&self, kind: EntityKind) -> Entity {
        match kind {
            EntityKind::Node => Entity::Node(self.nodes.clone()),
            EntityKind::Edge => Entity::Edge(self.edge_to_node()),
            EntityKind::Cell => Entity::Cell(self.cell_to_node()),
        }
    }

    /// Get all entities of a kind given by name (`"node"`, `"edge"`, `"face"`,
    /// `"cell"`) or dimension (`"0"`, `"1"`, `"2"`).
    pub fn entity_by_name(&self, name: &str) -> Result<Entity> {
        Ok(self.entity(name.parse()?))
    }
}
