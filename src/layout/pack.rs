//! Two-level circle packing: one circle per group, one unit leaf per entity.
//!
//! Siblings are packed with the front-chain algorithm (each new circle is
//! placed tangent to the pair on the chain closest to the centroid, backing
//! off along the chain when it would overlap), then wrapped in their
//! smallest enclosing circle. Padding is given in output units while radii
//! are in leaf units, so it is converted through the root radius of the
//! previous pass and the packing repeated until that radius settles.

use std::collections::{BTreeMap, HashMap};

use super::enclose::{enclose, Circle, Lcg};
use super::Point;
use crate::data::{Entity, EntityId, GroupKey};
use crate::error::LayoutError;

/// A group circle and the entities packed inside it.
#[derive(Debug, Clone, PartialEq)]
pub struct PackedGroup {
    pub key: String,
    pub circle: Circle,
    pub members: Vec<EntityId>,
}

/// Absolute placement of every group and leaf inside `[0, size]²`.
#[derive(Debug, Clone, PartialEq)]
pub struct PackedLayout {
    pub size: f64,
    pub groups: Vec<PackedGroup>,
    pub leaves: BTreeMap<EntityId, Circle>,
}

impl PackedLayout {
    pub fn position(&self, id: EntityId) -> Result<Point, LayoutError> {
        self.leaves
            .get(&id)
            .map(|c| Point::new(c.x, c.y))
            .ok_or(LayoutError::Lookup(id))
    }
}

const MAX_PADDING_PASSES: usize = 64;

/// Accepted difference, in output units, between the requested padding and
/// the gap produced by the last pass.
const PADDING_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Copy)]
struct Settled {
    root_r: f64,
    passes: usize,
    converged: bool,
}

/// Repack until the padding, converted through the root radius, is
/// consistent with the radius it produces.
///
/// A pass with leaf-unit pad `P·r/S` ends with root radius `r'`, so the gap
/// in output units is `P·r/r'`.
fn settle_padding(
    groups: &mut [GroupNode],
    size: f64,
    padding: f64,
    rng: &mut Lcg,
) -> Result<Settled, LayoutError> {
    let mut root_r = pack_level(groups, padding * 0.5, rng)?;
    let mut passes = 1;
    while passes <= MAX_PADDING_PASSES {
        let next = pack_level(groups, padding * root_r / size, rng)?;
        passes += 1;
        let gap_error = padding * (1.0 - root_r / next);
        root_r = next;
        if gap_error.abs() <= PADDING_TOLERANCE {
            return Ok(Settled {
                root_r,
                passes,
                converged: true,
            });
        }
    }
    Ok(Settled {
        root_r,
        passes,
        converged: false,
    })
}

struct GroupNode {
    key: String,
    circle: Circle,
    members: Vec<EntityId>,
    leaves: Vec<Circle>,
}

/// Pack `entities` grouped by `key` into the square `[0, size]²`, keeping
/// at least `padding` between sibling circles at both levels.
pub fn pack(
    entities: &[Entity],
    key: GroupKey,
    size: f64,
    padding: f64,
) -> Result<PackedLayout, LayoutError> {
    let mut groups = build_groups(entities, key);
    let mut rng = Lcg::new();

    if groups.is_empty() {
        return Ok(PackedLayout {
            size,
            groups: Vec::new(),
            leaves: BTreeMap::new(),
        });
    }

    let settled = settle_padding(&mut groups, size, padding, &mut rng)?;
    if !settled.converged {
        log::warn!(
            "Padding {} did not settle for {:?} groups after {} passes",
            padding,
            key,
            settled.passes
        );
    }
    let root_r = settled.root_r;

    // Scale leaf units to output units and translate into the square.
    let k = size / (2.0 * root_r);
    let root = Point::new(size / 2.0, size / 2.0);
    let mut leaves = BTreeMap::new();
    let mut packed_groups = Vec::with_capacity(groups.len());
    for group in groups {
        let center = Circle::new(
            root.x + k * group.circle.x,
            root.y + k * group.circle.y,
            k * group.circle.r,
        );
        for (&id, leaf) in group.members.iter().zip(&group.leaves) {
            let placed = Circle::new(center.x + k * leaf.x, center.y + k * leaf.y, k * leaf.r);
            if leaves.insert(id, placed).is_some() {
                return Err(LayoutError::Lookup(id));
            }
        }
        packed_groups.push(PackedGroup {
            key: group.key,
            circle: center,
            members: group.members,
        });
    }

    resolve_leaves(entities, &leaves)?;
    log::debug!(
        "Packed {} entities into {} {:?} groups (k = {:.4})",
        leaves.len(),
        packed_groups.len(),
        key,
        k
    );

    Ok(PackedLayout {
        size,
        groups: packed_groups,
        leaves,
    })
}

/// Group entities in first-appearance order, one unit leaf per entity.
fn build_groups(entities: &[Entity], key: GroupKey) -> Vec<GroupNode> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<GroupNode> = Vec::new();
    for entity in entities {
        let value = key.value(entity);
        let slot = *index.entry(value).or_insert_with(|| {
            groups.push(GroupNode {
                key: value.to_string(),
                circle: Circle::new(0.0, 0.0, 0.0),
                members: Vec::new(),
                leaves: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].members.push(entity.id);
        // Unit weight: sqrt(1)
        groups[slot].leaves.push(Circle::new(0.0, 0.0, 1.0));
    }
    groups
}

/// One bottom-up pass: pack each group's leaves, then the groups
/// themselves. Returns the root radius.
fn pack_level(groups: &mut [GroupNode], pad: f64, rng: &mut Lcg) -> Result<f64, LayoutError> {
    for group in groups.iter_mut() {
        group.circle.r = pack_children(&mut group.leaves, pad, rng)?;
    }
    let mut circles: Vec<Circle> = groups.iter().map(|g| g.circle).collect();
    let root_r = pack_children(&mut circles, pad, rng)?;
    for (group, circle) in groups.iter_mut().zip(circles) {
        group.circle = circle;
    }
    Ok(root_r)
}

fn pack_children(children: &mut [Circle], pad: f64, rng: &mut Lcg) -> Result<f64, LayoutError> {
    for c in children.iter_mut() {
        c.r += pad;
    }
    let e = pack_siblings(children, rng)?;
    for c in children.iter_mut() {
        c.r -= pad;
    }
    Ok(e + pad)
}

/// Every input entity must own exactly one leaf and every leaf must name an
/// input entity.
fn resolve_leaves(entities: &[Entity], leaves: &BTreeMap<EntityId, Circle>) -> Result<(), LayoutError> {
    for entity in entities {
        if !leaves.contains_key(&entity.id) {
            return Err(LayoutError::Lookup(entity.id));
        }
    }
    if leaves.len() != entities.len() {
        let known: std::collections::HashSet<EntityId> = entities.iter().map(|e| e.id).collect();
        if let Some(&stray) = leaves.keys().find(|id| !known.contains(id)) {
            return Err(LayoutError::Lookup(stray));
        }
    }
    Ok(())
}

/// Place `c` tangent to both `a` and `b`.
fn place(b: &Circle, a: &Circle, c: &mut Circle) {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let d2 = dx * dx + dy * dy;
    if d2 > 0.0 {
        let a2 = (a.r + c.r).powi(2);
        let b2 = (b.r + c.r).powi(2);
        if a2 > b2 {
            let x = (d2 + b2 - a2) / (2.0 * d2);
            let y = (b2 / d2 - x * x).max(0.0).sqrt();
            c.x = b.x - x * dx - y * dy;
            c.y = b.y - x * dy + y * dx;
        } else {
            let x = (d2 + a2 - b2) / (2.0 * d2);
            let y = (a2 / d2 - x * x).max(0.0).sqrt();
            c.x = a.x + x * dx - y * dy;
            c.y = a.y + x * dy + y * dx;
        }
    } else {
        c.x = a.x + c.r;
        c.y = a.y;
    }
}

fn intersects(a: &Circle, b: &Circle) -> bool {
    let dr = a.r + b.r - 1e-6;
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    dr > 0.0 && dr * dr > dx * dx + dy * dy
}

/// Squared distance from the origin to the weighted tangent point of
/// `node` and its successor on the chain.
fn score(circles: &[Circle], next: &[usize], node: usize) -> f64 {
    let (p, q) = (circles[node], circles[next[node]]);
    let ab = p.r + q.r;
    let dx = (p.x * q.r + q.x * p.r) / ab;
    let dy = (p.y * q.r + q.y * p.r) / ab;
    dx * dx + dy * dy
}

/// Pack sibling circles around the origin and return the radius of their
/// enclosing circle, which is centred on the origin afterwards.
pub fn pack_siblings(circles: &mut [Circle], rng: &mut Lcg) -> Result<f64, LayoutError> {
    let n = circles.len();
    if n == 0 {
        return Ok(0.0);
    }

    circles[0].x = 0.0;
    circles[0].y = 0.0;
    if n == 1 {
        return Ok(circles[0].r);
    }

    circles[0].x = -circles[1].r;
    circles[1].x = circles[0].r;
    circles[1].y = 0.0;
    if n == 2 {
        return Ok(circles[0].r + circles[1].r);
    }

    let (first, second) = (circles[0], circles[1]);
    place(&second, &first, &mut circles[2]);

    // Front chain as a doubly linked ring over circle indices.
    let mut next = vec![0usize; n];
    let mut prev = vec![0usize; n];
    let (mut a, mut b) = (0usize, 1usize);
    next[0] = 1;
    prev[2] = 1;
    next[1] = 2;
    prev[0] = 2;
    next[2] = 0;
    prev[1] = 0;

    let mut i = 3;
    'pack: while i < n {
        let (ca, cb) = (circles[a], circles[b]);
        place(&ca, &cb, &mut circles[i]);
        let c = circles[i];

        // Closest intersecting circle on the chain, measured along the chain.
        let (mut j, mut k) = (next[b], prev[a]);
        let (mut sj, mut sk) = (circles[b].r, circles[a].r);
        loop {
            if sj <= sk {
                if intersects(&circles[j], &c) {
                    b = j;
                    next[a] = b;
                    prev[b] = a;
                    continue 'pack;
                }
                sj += circles[j].r;
                j = next[j];
            } else {
                if intersects(&circles[k], &c) {
                    a = k;
                    next[a] = b;
                    prev[b] = a;
                    continue 'pack;
                }
                sk += circles[k].r;
                k = prev[k];
            }
            if j == next[k] {
                break;
            }
        }

        // Insert i between a and b.
        prev[i] = a;
        next[i] = b;
        next[a] = i;
        prev[b] = i;
        b = i;

        // Restart from the chain pair closest to the centroid.
        let mut best = score(circles, &next, a);
        let mut node = next[b];
        while node != b {
            let s = score(circles, &next, node);
            if s < best {
                a = node;
                best = s;
            }
            node = next[node];
        }
        b = next[a];
        i += 1;
    }

    let mut chain = vec![circles[b]];
    let mut node = next[b];
    while node != b {
        chain.push(circles[node]);
        node = next[node];
    }
    let e = enclose(&chain, rng)?.ok_or(LayoutError::Enclose)?;

    for c in circles.iter_mut() {
        c.x -= e.x;
        c.y -= e.y;
    }
    Ok(e.r)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entities(groups: &[(&str, usize)]) -> Vec<Entity> {
        let mut out = Vec::new();
        for &(category, count) in groups {
            for _ in 0..count {
                let id = out.len();
                out.push(Entity {
                    id,
                    source_id: id as i64,
                    category: category.to_string(),
                    secondary: if id % 2 == 0 { "male" } else { "female" }.to_string(),
                    x: 0.0,
                    y: 0.0,
                    radius: 6.0,
                });
            }
        }
        out
    }

    fn distance(a: &Circle, b: &Circle) -> f64 {
        ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
    }

    #[test]
    fn test_pack_siblings_no_overlap() {
        let mut circles: Vec<Circle> = (0..25)
            .map(|i| Circle::new(0.0, 0.0, 1.0 + (i % 4) as f64 * 0.5))
            .collect();
        let r = pack_siblings(&mut circles, &mut Lcg::new()).unwrap();
        for (i, a) in circles.iter().enumerate() {
            assert!(
                distance(a, &Circle::new(0.0, 0.0, 0.0)) + a.r <= r + 1e-6,
                "circle {} escapes enclosing radius {}",
                i,
                r
            );
            for b in &circles[i + 1..] {
                assert!(distance(a, b) >= a.r + b.r - 1e-5, "{:?} overlaps {:?}", a, b);
            }
        }
    }

    #[test]
    fn test_every_entity_in_exactly_one_group() {
        let input = entities(&[("A", 7), ("B", 3), ("C", 12)]);
        let packed = pack(&input, GroupKey::Category, 700.0, 10.0).unwrap();

        let total: usize = packed.groups.iter().map(|g| g.members.len()).sum();
        assert_eq!(total, input.len());
        let mut seen: Vec<EntityId> = packed.groups.iter().flat_map(|g| g.members.clone()).collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..input.len()).collect::<Vec<_>>());
        assert_eq!(packed.leaves.len(), input.len());
        let keys: Vec<&str> = packed.groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_pack_is_deterministic() {
        let input = entities(&[("A", 9), ("B", 9), ("C", 4)]);
        let first = pack(&input, GroupKey::Category, 700.0, 10.0).unwrap();
        let second = pack(&input, GroupKey::Category, 700.0, 10.0).unwrap();
        for (id, a) in &first.leaves {
            let b = second.leaves[id];
            assert_eq!(a.x.to_bits(), b.x.to_bits());
            assert_eq!(a.y.to_bits(), b.y.to_bits());
        }
    }

    fn assert_leaf_gaps(packed: &PackedLayout, padding: f64) {
        for group in &packed.groups {
            for (i, a) in group.members.iter().enumerate() {
                let la = packed.leaves[a];
                for b in &group.members[i + 1..] {
                    let lb = packed.leaves[b];
                    let gap = distance(&la, &lb) - la.r - lb.r;
                    assert!(
                        gap >= padding - 1e-4,
                        "leaves {} and {} in group {} gap {}",
                        a,
                        b,
                        group.key,
                        gap
                    );
                }
            }
        }
    }

    #[test]
    fn test_padding_between_groups_and_leaves() {
        let padding = 10.0;
        let input = entities(&[("A", 6), ("B", 4), ("C", 1)]);
        let packed = pack(&input, GroupKey::Category, 700.0, padding).unwrap();
        assert_leaf_gaps(&packed, padding);

        for (i, a) in packed.groups.iter().enumerate() {
            for b in &packed.groups[i + 1..] {
                let gap = distance(&a.circle, &b.circle) - a.circle.r - b.circle.r;
                assert!(gap >= padding - 1e-4, "groups {} and {} gap {}", a.key, b.key, gap);
            }
            for &id in &a.members {
                let leaf = packed.leaves[&id];
                assert!(
                    distance(&leaf, &a.circle) + leaf.r <= a.circle.r + 1e-6,
                    "leaf {} escapes group {}",
                    id,
                    a.key
                );
            }
        }
    }

    #[test]
    fn test_padding_settles_for_full_dataset() {
        let padding = 10.0;
        let input = entities(&[
            ("physics", 225),
            ("chemistry", 194),
            ("medicine", 227),
            ("literature", 120),
            ("peace", 111),
            ("economics", 93),
        ]);
        assert_eq!(input.len(), 970);

        for key in [GroupKey::Category, GroupKey::Secondary] {
            let mut groups = build_groups(&input, key);
            let settled = settle_padding(&mut groups, 700.0, padding, &mut Lcg::new()).unwrap();
            assert!(
                settled.converged,
                "{:?} padding unsettled after {} passes",
                key,
                settled.passes
            );

            let packed = pack(&input, key, 700.0, padding).unwrap();
            assert_eq!(packed.leaves.len(), input.len());
            assert_leaf_gaps(&packed, padding);
        }
    }

    #[test]
    fn test_zero_padding_settles_immediately() {
        let mut groups = build_groups(&entities(&[("A", 20), ("B", 5)]), GroupKey::Category);
        let settled = settle_padding(&mut groups, 700.0, 0.0, &mut Lcg::new()).unwrap();
        assert!(settled.converged);
        assert_eq!(settled.passes, 2);
    }

    #[test]
    fn test_pack_fits_square() {
        let size = 500.0;
        let input = entities(&[("A", 30), ("B", 11)]);
        let packed = pack(&input, GroupKey::Category, size, 5.0).unwrap();
        for leaf in packed.leaves.values() {
            assert!(leaf.x - leaf.r >= -1e-6 && leaf.x + leaf.r <= size + 1e-6);
            assert!(leaf.y - leaf.r >= -1e-6 && leaf.y + leaf.r <= size + 1e-6);
        }
    }

    #[test]
    fn test_single_member_group_is_not_degenerate() {
        let input = entities(&[("A", 5), ("solo", 1)]);
        let packed = pack(&input, GroupKey::Category, 700.0, 10.0).unwrap();
        let solo = &packed.groups[1];
        assert_eq!(solo.members, vec![5]);
        assert!(solo.circle.r > 0.0 && solo.circle.r.is_finite());
        let leaf = packed.leaves[&5];
        assert!(leaf.x.is_finite() && leaf.y.is_finite() && leaf.r > 0.0);
    }

    #[test]
    fn test_single_group_single_leaf_fills_square() {
        let input = entities(&[("A", 1)]);
        let packed = pack(&input, GroupKey::Category, 100.0, 0.0).unwrap();
        let leaf = packed.leaves[&0];
        assert!((leaf.x - 50.0).abs() < 1e-9 && (leaf.y - 50.0).abs() < 1e-9);
        assert!((leaf.r - 50.0).abs() < 1e-9, "leaf radius {}", leaf.r);
    }

    #[test]
    fn test_duplicate_ids_are_a_lookup_error() {
        let mut input = entities(&[("A", 3)]);
        input[2].id = 0;
        assert_eq!(
            pack(&input, GroupKey::Category, 700.0, 10.0),
            Err(LayoutError::Lookup(0))
        );
    }

    #[test]
    fn test_empty_input() {
        let packed = pack(&[], GroupKey::Secondary, 700.0, 10.0).unwrap();
        assert!(packed.groups.is_empty());
        assert!(packed.leaves.is_empty());
    }
}
