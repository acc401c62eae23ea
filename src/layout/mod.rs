//! Layout engine: the three named arrangements of the dot field.
//!
//! Every layout is a pure function of the entities it is given. It returns a
//! complete [`LayoutResult`] and leaves the store untouched; applying the
//! result is the caller's explicit step ([`crate::data::EntityStore::apply`]).

pub mod centroid;
pub mod enclose;
pub mod pack;

use std::collections::BTreeMap;

use crate::data::{Entity, EntityId, GroupKey};
use crate::error::LayoutError;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn lerp(self, other: Self, t: f64) -> Self {
        Self {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }
}

/// The available arrangements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutKind {
    /// Everything stacked at the canvas centre
    Initial,
    ClusteredByCategory,
    ClusteredBySecondary,
}

impl LayoutKind {
    pub fn group_key(self) -> Option<GroupKey> {
        match self {
            LayoutKind::Initial => None,
            LayoutKind::ClusteredByCategory => Some(GroupKey::Category),
            LayoutKind::ClusteredBySecondary => Some(GroupKey::Secondary),
        }
    }
}

/// Target placement for every entity, plus label anchors for clustered
/// layouts.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutResult {
    pub kind: LayoutKind,
    pub positions: BTreeMap<EntityId, Point>,
    pub radii: BTreeMap<EntityId, f64>,
    pub centroids: Option<BTreeMap<String, Point>>,
}

/// Canvas geometry shared by all layouts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutParams {
    pub width: f64,
    pub height: f64,
    /// Uniform dot radius `r0`
    pub radius: f64,
    /// Minimum gap between sibling circles in clustered layouts
    pub padding: f64,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            width: 700.0,
            height: 700.0,
            radius: 6.0,
            padding: 10.0,
        }
    }
}

impl LayoutParams {
    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    /// Side of the square clustered layouts are packed into.
    pub fn pack_size(&self) -> f64 {
        self.width.min(self.height)
    }
}

#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    params: LayoutParams,
}

impl LayoutEngine {
    pub fn new(params: LayoutParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &LayoutParams {
        &self.params
    }

    pub fn compute(&self, kind: LayoutKind, entities: &[Entity]) -> Result<LayoutResult, LayoutError> {
        match kind.group_key() {
            None => Ok(self.initial(entities)),
            Some(key) => self.clustered(kind, key, entities),
        }
    }

    /// Every entity at the canvas centre with radius `r0`. Any visual spread
    /// is left to the renderer.
    pub fn initial(&self, entities: &[Entity]) -> LayoutResult {
        let center = self.params.center();
        LayoutResult {
            kind: LayoutKind::Initial,
            positions: entities.iter().map(|e| (e.id, center)).collect(),
            radii: entities.iter().map(|e| (e.id, self.params.radius)).collect(),
            centroids: None,
        }
    }

    pub fn clustered_by_category(&self, entities: &[Entity]) -> Result<LayoutResult, LayoutError> {
        self.clustered(LayoutKind::ClusteredByCategory, GroupKey::Category, entities)
    }

    pub fn clustered_by_secondary(&self, entities: &[Entity]) -> Result<LayoutResult, LayoutError> {
        self.clustered(LayoutKind::ClusteredBySecondary, GroupKey::Secondary, entities)
    }

    fn clustered(
        &self,
        kind: LayoutKind,
        key: GroupKey,
        entities: &[Entity],
    ) -> Result<LayoutResult, LayoutError> {
        let size = self.params.pack_size();
        let packed = pack::pack(entities, key, size, self.params.padding)?;

        // Centre the packed square on the canvas.
        let offset = Point::new(
            (self.params.width - size) / 2.0,
            (self.params.height - size) / 2.0,
        );
        let mut positions = BTreeMap::new();
        for entity in entities {
            let p = packed.position(entity.id)?;
            positions.insert(entity.id, Point::new(p.x + offset.x, p.y + offset.y));
        }
        let radii: BTreeMap<EntityId, f64> =
            entities.iter().map(|e| (e.id, self.params.radius)).collect();

        // Anchors follow the packed positions, not the pre-pack ones.
        let centroids = centroid::group_centroids(
            entities
                .iter()
                .map(|e| (key.value(e), positions[&e.id], radii[&e.id])),
        )?;

        log::debug!("{:?}: {} groups for {} entities", kind, centroids.len(), entities.len());
        Ok(LayoutResult {
            kind,
            positions,
            radii,
            centroids: Some(centroids),
        })
    }
}
