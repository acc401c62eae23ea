//! Entity store: the fixed set of dots and their current placement.
//!
//! Entities are created once by [`EntityStore::load`] and never inserted or
//! removed afterwards. Only `x`, `y` and `radius` change, and only through
//! [`EntityStore::apply`], which takes a complete layout result.

pub mod csv;

use std::collections::{BTreeMap, HashSet};

use crate::error::{DataFormatError, LayoutError};
use crate::layout::{LayoutResult, Point};

/// Stable entity identifier, the row position after upstream filtering.
pub type EntityId = usize;

/// One row as handed over by the dataset reader, before validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    pub id: Option<String>,
    pub category: Option<String>,
    pub secondary: Option<String>,
}

impl RawRow {
    pub fn new(id: &str, category: &str, secondary: &str) -> Self {
        Self {
            id: Some(id.to_string()),
            category: Some(category.to_string()),
            secondary: Some(secondary.to_string()),
        }
    }
}

/// A visualised data point.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: EntityId,
    /// Identifier carried by the source dataset
    pub source_id: i64,
    pub category: String,
    pub secondary: String,
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}

impl Entity {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// The categorical field entities are grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupKey {
    Category,
    Secondary,
}

impl GroupKey {
    pub fn value<'a>(&self, entity: &'a Entity) -> &'a str {
        match self {
            GroupKey::Category => &entity.category,
            GroupKey::Secondary => &entity.secondary,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EntityStore {
    entities: Vec<Entity>,
}

impl EntityStore {
    /// Validate raw rows and assign ids in dataset order.
    ///
    /// Positions start at the origin with zero radius until the first layout
    /// is applied.
    pub fn load<I>(rows: I) -> Result<Self, DataFormatError>
    where
        I: IntoIterator<Item = RawRow>,
    {
        let mut entities = Vec::new();
        for (index, row) in rows.into_iter().enumerate() {
            let row_no = index + 1;
            let raw_id = required(row.id, row_no, "id")?;
            let source_id = raw_id.trim().parse::<i64>().map_err(|_| {
                DataFormatError::new(row_no, format!("id {:?} is not an integer", raw_id))
            })?;
            let category = required(row.category, row_no, "category")?;
            let secondary = required(row.secondary, row_no, "secondary attribute")?;

            entities.push(Entity {
                id: entities.len(),
                source_id,
                category,
                secondary,
                x: 0.0,
                y: 0.0,
                radius: 0.0,
            });
        }
        log::info!("Loaded {} entities", entities.len());
        Ok(Self { entities })
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn get(&self, id: EntityId) -> Result<&Entity, LayoutError> {
        self.entities.get(id).ok_or(LayoutError::Lookup(id))
    }

    /// Distinct values of `key`, in first-appearance order.
    pub fn distinct(&self, key: GroupKey) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for entity in &self.entities {
            let value = key.value(entity);
            if seen.insert(value) {
                out.push(value.to_string());
            }
        }
        out
    }

    pub fn categories(&self) -> Vec<String> {
        self.distinct(GroupKey::Category)
    }

    /// Write a complete layout result into the store.
    ///
    /// Fails without touching any entity if the result names an unknown id
    /// or leaves one out.
    pub fn apply(&mut self, result: &LayoutResult) -> Result<(), LayoutError> {
        check_complete(&result.positions, self.len())?;
        check_complete(&result.radii, self.len())?;

        for entity in &mut self.entities {
            let p = result.positions[&entity.id];
            entity.x = p.x;
            entity.y = p.y;
            entity.radius = result.radii[&entity.id];
        }
        Ok(())
    }
}

fn required(field: Option<String>, row: usize, name: &str) -> Result<String, DataFormatError> {
    match field {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(DataFormatError::new(row, format!("missing {}", name))),
    }
}

fn check_complete<V>(map: &BTreeMap<EntityId, V>, len: usize) -> Result<(), LayoutError> {
    if let Some(&unknown) = map.keys().find(|&&id| id >= len) {
        return Err(LayoutError::Lookup(unknown));
    }
    if let Some(missing) = (0..len).find(|id| !map.contains_key(id)) {
        return Err(LayoutError::Lookup(missing));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutKind;

    fn rows() -> Vec<RawRow> {
        vec![
            RawRow::new("10", "Physics", "male"),
            RawRow::new("11", "Peace", "female"),
            RawRow::new("12", "Physics", "female"),
        ]
    }

    #[test]
    fn test_load_assigns_ids_in_order() {
        let store = EntityStore::load(rows()).unwrap();
        let ids: Vec<_> = store.entities().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(store.entities()[2].source_id, 12);
        assert_eq!(store.categories(), vec!["Physics", "Peace"]);
        assert_eq!(store.distinct(GroupKey::Secondary), vec!["male", "female"]);
    }

    #[test]
    fn test_load_rejects_non_numeric_id() {
        let mut bad = rows();
        bad[1].id = Some("eleven".to_string());
        let err = EntityStore::load(bad).unwrap_err();
        assert_eq!(err.row, 2);
        assert!(err.reason.contains("eleven"), "reason: {}", err.reason);
    }

    #[test]
    fn test_load_rejects_missing_field() {
        let mut bad = rows();
        bad[2].category = None;
        let err = EntityStore::load(bad).unwrap_err();
        assert_eq!(err.row, 3);
        assert!(err.reason.contains("category"));

        let mut blank = rows();
        blank[0].secondary = Some("  ".to_string());
        assert!(EntityStore::load(blank).is_err());
    }

    #[test]
    fn test_apply_requires_complete_result() {
        let mut store = EntityStore::load(rows()).unwrap();
        let mut result = LayoutResult {
            kind: LayoutKind::Initial,
            positions: BTreeMap::new(),
            radii: BTreeMap::new(),
            centroids: None,
        };
        for id in 0..2 {
            result.positions.insert(id, Point::new(1.0, 2.0));
            result.radii.insert(id, 6.0);
        }
        assert_eq!(store.apply(&result), Err(LayoutError::Lookup(2)));
        assert_eq!(store.entities()[0].radius, 0.0, "partial result must not be applied");

        result.positions.insert(2, Point::new(3.0, 4.0));
        result.radii.insert(2, 6.0);
        store.apply(&result).unwrap();
        assert_eq!(store.entities()[2].position(), Point::new(3.0, 4.0));
        assert_eq!(store.entities()[1].radius, 6.0);

        result.positions.insert(7, Point::new(0.0, 0.0));
        assert_eq!(store.apply(&result), Err(LayoutError::Lookup(7)));
    }
}
