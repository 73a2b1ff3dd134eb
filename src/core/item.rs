//! Item arena with lazy dirty tracking.
//!
//! A [`Model`] owns every item of one sandbox. Items form a tree (parent/children) and
//! additionally carry non-owning `links`: invalidating an item invalidates its parent
//! chain and everything it links to. [`Model::update`] walks an item's subtree,
//! recomputes derived payloads and marks items updated again.
//!
//! Both walks carry a visited bitset over the arena, so cyclic link graphs terminate.

use smallvec::SmallVec;
use std::fmt;
use std::mem;
use std::time::Instant;
use tracing::{debug, trace};

use super::{Collection, EventBus, ItemEvents, TypeId, TypeRegistry};
use crate::geo::{OrientationData, PoseData, PositionData};
use crate::util::{Error, Result};
use crate::values::{SimpleValue, Value};

/// Stable handle to an item inside a [`Model`]. Ids are never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(u32);

impl ItemId {
    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item#{}", self.0)
    }
}

/// Typed state attached to an item.
#[derive(Debug, Default)]
pub(crate) enum Payload {
    #[default]
    None,
    Value(SimpleValue),
    Position(PositionData),
    Orientation(OrientationData),
    Pose(PoseData),
}

impl Payload {
    /// Items whose derived state must be current before this payload refreshes.
    fn dependencies(&self) -> SmallVec<[ItemId; 2]> {
        match self {
            Self::Position(p) => p.dependencies(),
            Self::Orientation(o) => o.dependencies(),
            Self::Pose(p) => p.dependencies(),
            Self::None | Self::Value(_) => SmallVec::new(),
        }
    }

    fn refresh(&mut self, model: &Model) -> Result<()> {
        match self {
            Self::Position(p) => p.refresh(model),
            Self::Orientation(o) => o.refresh(model),
            Self::Pose(p) => p.refresh(model),
            Self::None | Self::Value(_) => Ok(()),
        }
    }
}

struct Node {
    type_id: TypeId,
    name: String,
    parent: Option<ItemId>,
    children: Collection<ItemId>,
    links: Collection<ItemId>,
    backlinks: SmallVec<[ItemId; 4]>,
    updated: bool,
    update_time: Option<Instant>,
    revision: u64,
    events: Option<Box<ItemEvents>>,
    payload: Payload,
}

/// Arena of items plus the type registry and event bus they share.
pub struct Model {
    types: TypeRegistry,
    events: EventBus,
    nodes: Vec<Option<Node>>,
    live: usize,
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("types", &self.types.len())
            .field("items", &self.live)
            .finish()
    }
}

impl Model {
    /// Create a model with the built-in type hierarchy.
    pub fn new() -> Self {
        Self::with_registry(TypeRegistry::with_builtins())
    }

    /// Create a model over a custom registry.
    pub fn with_registry(types: TypeRegistry) -> Self {
        Self {
            types,
            events: EventBus::default(),
            nodes: Vec::new(),
            live: 0,
        }
    }

    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    pub fn types_mut(&mut self) -> &mut TypeRegistry {
        &mut self.types
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    /// Number of live items.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Check if an item exists.
    pub fn contains(&self, id: ItemId) -> bool {
        self.nodes.get(id.index()).is_some_and(Option::is_some)
    }

    fn node(&self, id: ItemId) -> Result<&Node> {
        self.nodes
            .get(id.index())
            .and_then(Option::as_ref)
            .ok_or(Error::ItemNotFound(id))
    }

    fn node_mut(&mut self, id: ItemId) -> Result<&mut Node> {
        self.nodes
            .get_mut(id.index())
            .and_then(Option::as_mut)
            .ok_or(Error::ItemNotFound(id))
    }

    // ========================================================================
    // Creation and structure
    // ========================================================================

    /// Create an item of a registered type, optionally under a parent.
    ///
    /// New items start not-updated and invalidate their parent.
    pub fn create(&mut self, parent: Option<ItemId>, type_name: &str, name: &str) -> Result<ItemId> {
        self.create_with(parent, type_name, name, Payload::None)
    }

    pub(crate) fn create_with(
        &mut self,
        parent: Option<ItemId>,
        type_name: &str,
        name: &str,
        payload: Payload,
    ) -> Result<ItemId> {
        let type_id = self.types.require(type_name)?;
        if let Some(p) = parent {
            self.node(p)?;
        }

        let id = ItemId(self.nodes.len() as u32);
        self.nodes.push(Some(Node {
            type_id,
            name: name.to_string(),
            parent: None,
            children: Collection::new(),
            links: Collection::new(),
            backlinks: SmallVec::new(),
            updated: false,
            update_time: None,
            revision: 0,
            events: None,
            payload,
        }));
        self.live += 1;

        if let Some(p) = parent {
            self.add_child(p, id, None)?;
        }
        trace!(item = %id, type_name, name, "item created");
        self.events.on_created.trigger(&id);
        Ok(id)
    }

    /// Move `child` under `parent` at an optional position (see [`Collection::add`]).
    pub fn add_child(&mut self, parent: ItemId, child: ItemId, position: Option<isize>) -> Result<()> {
        self.node(parent)?;
        self.node(child)?;
        if self.is_ancestor_or_self(child, parent) {
            return Err(Error::InvalidParent {
                child: self.path(child),
                expected: "an item outside its own subtree".to_string(),
                actual: self.path(parent),
            });
        }

        self.detach(child)?;
        self.node_mut(parent)?.children.add(child, position);
        self.node_mut(child)?.parent = Some(parent);
        self.set_updated(parent, false)
    }

    fn detach(&mut self, id: ItemId) -> Result<()> {
        if let Some(old) = self.node(id)?.parent {
            if let Ok(old_parent) = self.node_mut(old) {
                old_parent.children.remove(&id);
            }
            self.node_mut(id)?.parent = None;
            if self.contains(old) {
                self.set_updated(old, false)?;
            }
        }
        Ok(())
    }

    fn is_ancestor_or_self(&self, ancestor: ItemId, id: ItemId) -> bool {
        let mut current = Some(id);
        while let Some(c) = current {
            if c == ancestor {
                return true;
            }
            current = self.node(c).ok().and_then(|n| n.parent);
        }
        false
    }

    /// Destroy an item and its subtree.
    ///
    /// The item is removed from its parent and from every other item's links.
    pub fn destroy(&mut self, id: ItemId) -> Result<()> {
        self.detach(id)?;
        self.destroy_subtree(id);
        Ok(())
    }

    fn destroy_subtree(&mut self, id: ItemId) {
        let Some(node) = self.nodes.get_mut(id.index()).and_then(Option::take) else {
            return;
        };
        self.live -= 1;

        for target in node.links.iter() {
            if let Some(Some(t)) = self.nodes.get_mut(target.index()) {
                t.backlinks.retain(|b| *b != id);
            }
        }
        for source in &node.backlinks {
            if let Some(Some(s)) = self.nodes.get_mut(source.index()) {
                s.links.remove(&id);
            }
        }
        for child in node.children.iter() {
            self.destroy_subtree(*child);
        }
        debug!(item = %id, name = %node.name, "item destroyed");
        self.events.on_destroyed.trigger(&id);
    }

    /// Add a link: whenever `from` is invalidated, `to` is invalidated too.
    pub fn link(&mut self, from: ItemId, to: ItemId) -> Result<()> {
        self.node(to)?;
        self.node_mut(from)?.links.push(to);
        self.node_mut(to)?.backlinks.push(from);
        Ok(())
    }

    /// Remove every link from `from` to `to`.
    pub fn unlink(&mut self, from: ItemId, to: ItemId) -> Result<()> {
        self.node_mut(from)?.links.remove(&to);
        if let Ok(target) = self.node_mut(to) {
            target.backlinks.retain(|b| *b != from);
        }
        Ok(())
    }

    // ========================================================================
    // Lookups
    // ========================================================================

    pub fn name(&self, id: ItemId) -> Result<&str> {
        Ok(&self.node(id)?.name)
    }

    pub fn set_name(&mut self, id: ItemId, name: &str) -> Result<()> {
        self.node_mut(id)?.name = name.to_string();
        Ok(())
    }

    pub fn parent(&self, id: ItemId) -> Result<Option<ItemId>> {
        Ok(self.node(id)?.parent)
    }

    pub fn children(&self, id: ItemId) -> Result<&Collection<ItemId>> {
        Ok(&self.node(id)?.children)
    }

    pub fn links(&self, id: ItemId) -> Result<&Collection<ItemId>> {
        Ok(&self.node(id)?.links)
    }

    /// Items linking to `id`.
    pub fn backlinks(&self, id: ItemId) -> Result<&[ItemId]> {
        Ok(&self.node(id)?.backlinks)
    }

    /// First child with the given name.
    pub fn child_by_name(&self, id: ItemId, name: &str) -> Option<ItemId> {
        let node = self.node(id).ok()?;
        node.children
            .iter()
            .copied()
            .find(|c| self.node(*c).is_ok_and(|n| n.name == name))
    }

    /// Resolve a `/`-separated path of child names below `root`.
    pub fn find_path(&self, root: ItemId, path: &str) -> Option<ItemId> {
        let mut current = root;
        for part in path.split('/').filter(|p| !p.is_empty()) {
            current = self.child_by_name(current, part)?;
        }
        self.contains(current).then_some(current)
    }

    /// Full `/`-separated path from the tree root (for diagnostics).
    pub fn path(&self, id: ItemId) -> String {
        let mut parts = Vec::new();
        let mut current = Some(id);
        while let Some(c) = current {
            match self.node(c) {
                Ok(n) => {
                    parts.push(n.name.as_str());
                    current = n.parent;
                }
                Err(_) => break,
            }
        }
        parts.reverse();
        parts.join("/")
    }

    /// Items without parent, in creation order.
    pub fn roots(&self) -> Vec<ItemId> {
        self.iter_ids()
            .filter(|id| self.node(*id).is_ok_and(|n| n.parent.is_none()))
            .collect()
    }

    fn iter_ids(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.is_some())
            .map(|(i, _)| ItemId(i as u32))
    }

    pub fn type_of(&self, id: ItemId) -> Result<TypeId> {
        Ok(self.node(id)?.type_id)
    }

    pub fn type_name(&self, id: ItemId) -> Result<&str> {
        Ok(self.types.name(self.node(id)?.type_id))
    }

    /// Check whether an item's type is `type_name` or derives from it.
    pub fn is(&self, id: ItemId, type_name: &str) -> bool {
        match (self.node(id), self.types.get(type_name)) {
            (Ok(node), Some(t)) => self.types.is(node.type_id, t),
            _ => false,
        }
    }

    /// Fail with [`Error::TypeMismatch`] unless the item is a `type_name`.
    pub fn require_type(&self, id: ItemId, type_name: &str) -> Result<()> {
        if self.is(id, type_name) {
            Ok(())
        } else {
            Err(Error::TypeMismatch {
                expected: type_name.to_string(),
                actual: self.type_name(id)?.to_string(),
            })
        }
    }

    /// All live items whose type is `type_name` or a subtype.
    pub fn items_of_type(&self, type_name: &str) -> Vec<ItemId> {
        let Some(t) = self.types.get(type_name) else {
            return Vec::new();
        };
        self.iter_ids()
            .filter(|id| self.node(*id).is_ok_and(|n| self.types.is(n.type_id, t)))
            .collect()
    }

    /// Per-item events, created on first access.
    pub fn item_events_mut(&mut self, id: ItemId) -> Result<&mut ItemEvents> {
        let node = self.node_mut(id)?;
        Ok(node.events.get_or_insert_with(|| Box::new(ItemEvents::new(id))))
    }

    // ========================================================================
    // Payload access
    // ========================================================================

    pub(crate) fn payload(&self, id: ItemId) -> Result<&Payload> {
        Ok(&self.node(id)?.payload)
    }

    pub(crate) fn payload_mut(&mut self, id: ItemId) -> Result<&mut Payload> {
        Ok(&mut self.node_mut(id)?.payload)
    }

    /// Value state of a simple item.
    pub fn simple(&self, id: ItemId) -> Result<&SimpleValue> {
        match self.payload(id)? {
            Payload::Value(v) => Ok(v),
            _ => Err(Error::TypeMismatch {
                expected: "Simple".to_string(),
                actual: self.type_name(id)?.to_string(),
            }),
        }
    }

    /// Mutate a simple item's value state; invalidates the item afterwards.
    pub fn modify_simple<R>(&mut self, id: ItemId, f: impl FnOnce(&str, &mut SimpleValue) -> Result<R>) -> Result<R> {
        let type_name = self.type_name(id)?.to_string();
        let node = self.node_mut(id)?;
        let Payload::Value(current) = &node.payload else {
            return Err(Error::TypeMismatch {
                expected: "Simple".to_string(),
                actual: type_name,
            });
        };
        // Edits run on a copy; a failed edit leaves the item untouched.
        let mut next = current.clone();
        let result = f(&node.name, &mut next)?;
        node.payload = Payload::Value(next);
        self.set_updated(id, false)?;
        Ok(result)
    }

    /// Current value of a simple item (falls back to the default).
    pub fn value(&self, id: ItemId) -> Result<Option<&Value>> {
        Ok(self.simple(id)?.get())
    }

    /// Validate and commit a value. Unchanged values do not invalidate.
    pub fn set_value(&mut self, id: ItemId, value: Value) -> Result<()> {
        if self.simple(id)?.raw() == Some(&value) {
            return Ok(());
        }
        self.modify_simple(id, |name, v| v.set(name, Some(value)))
    }

    /// Check whether every value leaf under `id` holds its default.
    pub fn is_default(&self, id: ItemId) -> Result<bool> {
        let node = self.node(id)?;
        if let Payload::Value(v) = &node.payload {
            return Ok(v.is_default());
        }
        for child in node.children.iter() {
            if !self.is_default(*child)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Check whether every value leaf under `id` has neither value nor default.
    pub fn is_undefined(&self, id: ItemId) -> Result<bool> {
        let node = self.node(id)?;
        if let Payload::Value(v) = &node.payload {
            return Ok(v.is_undefined());
        }
        for child in node.children.iter() {
            if !self.is_undefined(*child)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    // ========================================================================
    // Dirty tracking
    // ========================================================================

    pub fn is_updated(&self, id: ItemId) -> bool {
        self.node(id).is_ok_and(|n| n.updated)
    }

    /// Time of the last updated-state change.
    pub fn update_time(&self, id: ItemId) -> Option<Instant> {
        self.node(id).ok().and_then(|n| n.update_time)
    }

    /// Number of updated-state changes so far. Differs from an earlier reading exactly
    /// when the item was invalidated (and possibly updated again) in between.
    pub fn revision(&self, id: ItemId) -> u64 {
        self.node(id).map_or(0, |n| n.revision)
    }

    /// Set the updated flag.
    ///
    /// A no-op when the state is unchanged. Marking an item not-updated also marks its
    /// parent chain and its linked items; marking it updated touches nothing else.
    pub fn set_updated(&mut self, id: ItemId, updated: bool) -> Result<()> {
        self.node(id)?;
        let mut visited = vec![false; self.nodes.len()];
        self.propagate(id, updated, &mut visited);
        Ok(())
    }

    /// Shorthand for `set_updated(id, false)`.
    pub fn invalidate(&mut self, id: ItemId) -> Result<()> {
        self.set_updated(id, false)
    }

    fn propagate(&mut self, id: ItemId, updated: bool, visited: &mut [bool]) {
        match visited.get_mut(id.index()) {
            Some(seen) if !*seen => *seen = true,
            _ => return,
        }
        if !self.mark(id, updated) || updated {
            return;
        }

        let Some(node) = self.nodes[id.index()].as_ref() else {
            return;
        };
        let parent = node.parent;
        let links: SmallVec<[ItemId; 8]> = node.links.iter().copied().collect();
        if let Some(p) = parent {
            self.propagate(p, false, visited);
        }
        for link in links {
            self.propagate(link, false, visited);
        }
    }

    /// Flip the flag and fire modified events. Returns `false` if nothing changed.
    fn mark(&mut self, id: ItemId, updated: bool) -> bool {
        let Some(Some(node)) = self.nodes.get_mut(id.index()) else {
            return false;
        };
        if node.updated == updated {
            return false;
        }
        node.updated = updated;
        node.update_time = Some(Instant::now());
        node.revision += 1;
        if let Some(events) = node.events.as_mut() {
            events.on_modified.trigger(&id);
        }
        self.events.on_modified.trigger(&id);
        true
    }

    /// Bring an item and its subtree up to date.
    ///
    /// Already-updated items are skipped unless `forced`. Children update first, then the
    /// item's own derived state is recomputed and the item is marked updated.
    pub fn update(&mut self, id: ItemId, delta_time: f64, forced: bool) -> Result<()> {
        self.node(id)?;
        let mut visited = vec![false; self.nodes.len()];
        self.update_inner(id, delta_time, forced, &mut visited)
    }

    fn update_inner(&mut self, id: ItemId, delta_time: f64, forced: bool, visited: &mut [bool]) -> Result<()> {
        let index = id.index();
        if visited.get(index).copied().unwrap_or(true) {
            return Ok(());
        }
        let Some(node) = self.nodes[index].as_mut() else {
            return Ok(());
        };
        if node.updated && !forced {
            return Ok(());
        }
        visited[index] = true;

        if let Some(events) = node.events.as_mut() {
            events.on_pre_update.trigger(&id);
        }
        let children: SmallVec<[ItemId; 8]> = node.children.iter().copied().collect();
        self.events.on_pre_update.trigger(&id);

        for child in children {
            self.update_inner(child, delta_time, forced, visited)?;
        }
        self.refresh(id, delta_time, forced, visited)?;
        self.mark(id, true);

        if let Some(Some(node)) = self.nodes.get_mut(index) {
            if let Some(events) = node.events.as_mut() {
                events.on_post_update.trigger(&id);
            }
        }
        self.events.on_post_update.trigger(&id);
        Ok(())
    }

    fn refresh(&mut self, id: ItemId, delta_time: f64, forced: bool, visited: &mut [bool]) -> Result<()> {
        let dependencies = self.node(id)?.payload.dependencies();
        for dependency in dependencies {
            self.update_inner(dependency, delta_time, forced, visited)?;
        }

        let mut payload = mem::take(&mut self.node_mut(id)?.payload);
        let result = payload.refresh(self);
        self.node_mut(id)?.payload = payload;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::names;
    use std::cell::Cell;
    use std::rc::Rc;

    fn tree() -> (Model, ItemId, ItemId, ItemId) {
        let mut model = Model::new();
        let root = model.create(None, names::ITEM, "root").unwrap();
        let a = model.create(Some(root), names::ITEM, "a").unwrap();
        let b = model.create(Some(a), names::ITEM, "b").unwrap();
        (model, root, a, b)
    }

    #[test]
    fn test_create_registers_child() {
        let (model, root, a, b) = tree();
        assert_eq!(model.children(root).unwrap().as_slice(), &[a]);
        assert_eq!(model.parent(b).unwrap(), Some(a));
        assert_eq!(model.find_path(root, "a/b"), Some(b));
        assert_eq!(model.path(b), "root/a/b");
        assert_eq!(model.roots(), vec![root]);
    }

    #[test]
    fn test_unknown_type_rejected() {
        let mut model = Model::new();
        assert!(matches!(model.create(None, "Nope", "x"), Err(Error::UnknownType(_))));
        assert!(model.is_empty());
    }

    #[test]
    fn test_invalidation_propagates_up_and_across_links() {
        let (mut model, root, a, b) = tree();
        let other = model.create(None, names::ITEM, "other").unwrap();
        let sibling = model.create(Some(root), names::ITEM, "sibling").unwrap();
        model.link(b, other).unwrap();
        model.update(root, 0.0, false).unwrap();
        model.update(other, 0.0, false).unwrap();
        assert!(model.is_updated(root) && model.is_updated(other));

        model.set_updated(b, false).unwrap();
        assert!(!model.is_updated(b));
        assert!(!model.is_updated(a));
        assert!(!model.is_updated(root));
        assert!(!model.is_updated(other));
        // Siblings and children are not touched.
        assert!(model.is_updated(sibling));
    }

    #[test]
    fn test_marking_updated_does_not_cascade() {
        let (mut model, root, a, b) = tree();
        model.set_updated(root, true).unwrap();
        assert!(model.is_updated(root));
        assert!(!model.is_updated(a));
        assert!(!model.is_updated(b));
    }

    #[test]
    fn test_update_is_memoized() {
        let (mut model, root, _a, b) = tree();
        let calls = Rc::new(Cell::new(0));
        let c = calls.clone();
        model.item_events_mut(b).unwrap().on_pre_update.listen(move |_| {
            c.set(c.get() + 1);
            true
        });

        model.update(root, 0.016, false).unwrap();
        assert_eq!(calls.get(), 1);
        model.update(root, 0.016, false).unwrap();
        assert_eq!(calls.get(), 1);
        model.update(root, 0.016, true).unwrap();
        assert_eq!(calls.get(), 2);
        assert!(model.is_updated(b));
    }

    #[test]
    fn test_cyclic_links_terminate() {
        let mut model = Model::new();
        let x = model.create(None, names::ITEM, "x").unwrap();
        let y = model.create(None, names::ITEM, "y").unwrap();
        model.link(x, y).unwrap();
        model.link(y, x).unwrap();
        model.update(x, 0.0, false).unwrap();
        model.update(y, 0.0, false).unwrap();

        model.invalidate(x).unwrap();
        assert!(!model.is_updated(x));
        assert!(!model.is_updated(y));
    }

    #[test]
    fn test_destroy_prunes_links_and_subtree() {
        let (mut model, root, a, b) = tree();
        let watcher = model.create(None, names::ITEM, "watcher").unwrap();
        model.link(watcher, b).unwrap();
        model.link(b, watcher).unwrap();

        model.destroy(a).unwrap();
        assert!(!model.contains(a));
        assert!(!model.contains(b));
        assert!(model.children(root).unwrap().is_empty());
        assert!(model.links(watcher).unwrap().is_empty());
        assert!(model.backlinks(watcher).unwrap().is_empty());
        assert!(matches!(model.name(b), Err(Error::ItemNotFound(_))));
        assert_eq!(model.len(), 2);
    }

    #[test]
    fn test_add_child_rejects_cycles() {
        let (mut model, root, _a, b) = tree();
        assert!(matches!(model.add_child(b, root, None), Err(Error::InvalidParent { .. })));
    }

    #[test]
    fn test_events_fire() {
        let mut model = Model::new();
        let created = Rc::new(Cell::new(0));
        let modified = Rc::new(Cell::new(0));
        let c = created.clone();
        model.events_mut().on_created.listen(move |_| {
            c.set(c.get() + 1);
            true
        });
        let m = modified.clone();
        model.events_mut().on_modified.listen(move |_| {
            m.set(m.get() + 1);
            true
        });

        let item = model.create(None, names::ITEM, "item").unwrap();
        assert_eq!(created.get(), 1);
        model.set_updated(item, true).unwrap();
        model.set_updated(item, true).unwrap();
        assert_eq!(modified.get(), 1);
        assert!(model.update_time(item).is_some());
        let before = model.revision(item);
        model.update(item, 0.0, false).unwrap();
        assert_eq!(model.revision(item), before);
        model.invalidate(item).unwrap();
        assert_ne!(model.revision(item), before);
    }

    #[test]
    fn test_items_of_type_includes_subtypes() {
        let mut model = Model::new();
        model.create(None, names::SPHERE, "s").unwrap();
        model.create(None, names::CONE, "c").unwrap();
        model.create(None, names::ITEM, "i").unwrap();
        assert_eq!(model.items_of_type(names::SHAPE).len(), 2);
        assert_eq!(model.items_of_type(names::ITEM).len(), 3);
        assert!(model.items_of_type("Unknown").is_empty());
    }
}
