use std::{
    collections::{HashMap, HashSet},
    rc::{Rc, Weak},
};

use crate::interpreter::value::core::{Closure, Constructor, Value};

/// Index of a frame in a [`Scope`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameId(usize);

/// Keeps a frame alive while a closure, constructor or child frame refers to
/// it.
#[derive(Debug)]
pub struct FrameHandle {
    id: FrameId,
}

impl FrameHandle {
    /// The frame this handle keeps alive.
    #[must_use]
    pub const fn id(&self) -> FrameId {
        self.id
    }
}

#[derive(Debug, Clone, Default)]
struct Frame {
    parent:   Option<Rc<FrameHandle>>,
    bindings: HashMap<String, Value>,
    handle:   Weak<FrameHandle>,
}

/// The evaluator's scope chain, stored as an arena of frames.
///
/// Each frame holds a [`FrameHandle`] of its parent instead of a reference.
/// Closures and constructors hold a handle of the frame they were created in.
/// A frame pushed for a call or block is freed when it completes unless a
/// handle still refers to it; such a frame is retained and freed later, once
/// only other unreachable frames refer to it. Freed slots are reused.
///
/// A `Scope` is cheap to clone and owns everything it refers to, so a REPL
/// can keep the last good scope and retry against a copy.
#[derive(Debug, Clone)]
pub struct Scope {
    frames:   Vec<Option<Frame>>,
    free:     Vec<usize>,
    /// Completed frames that were still referred to when they completed.
    retained: Vec<FrameId>,
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

impl Scope {
    /// The outermost frame, holding globals and module-level bindings.
    pub const ROOT: FrameId = FrameId(0);

    /// Creates a scope with an empty root frame.
    #[must_use]
    pub fn new() -> Self {
        Self::with_globals(HashMap::new())
    }

    /// Creates a scope whose root frame holds `globals`.
    ///
    /// # Example
    /// ```
    /// use std::collections::HashMap;
    ///
    /// use lilt::interpreter::{evaluator::scope::Scope, value::core::Value};
    ///
    /// let globals = HashMap::from([("x".to_string(), Value::from(5.0))]);
    /// let scope = Scope::with_globals(globals);
    ///
    /// assert_eq!(scope.lookup(Scope::ROOT, "x"), Some(&Value::from(5.0)));
    /// ```
    #[must_use]
    pub fn with_globals(globals: HashMap<String, Value>) -> Self {
        Self { frames:   vec![Some(Frame { bindings: globals,
                                           ..Frame::default() })],
               free:     Vec::new(),
               retained: Vec::new(), }
    }

    /// Pushes a new empty frame whose parent is `parent`.
    pub fn push(&mut self, parent: FrameId) -> FrameId {
        let frame = Frame { parent: Some(self.capture(parent)),
                            ..Frame::default() };
        if let Some(index) = self.free.pop() {
            self.frames[index] = Some(frame);
            FrameId(index)
        } else {
            self.frames.push(Some(frame));
            FrameId(self.frames.len() - 1)
        }
    }

    /// Marks `frame` as completed.
    ///
    /// The frame is freed at once if nothing refers to it, and retained
    /// otherwise. Retained frames that are no longer reachable are freed as
    /// well.
    pub fn release(&mut self, frame: FrameId) {
        if frame == Self::ROOT {
            return;
        }
        if self.slot(frame).is_some_and(|slot| slot.handle.strong_count() > 0) {
            self.retained.push(frame);
        } else {
            self.free_frame(frame);
        }
        if !self.retained.is_empty() {
            self.collect();
        }
    }

    /// A handle that keeps `frame` alive, for a long-lived value that refers
    /// to it.
    pub fn capture(&mut self, frame: FrameId) -> Rc<FrameHandle> {
        if let Some(handle) = self.slot(frame).and_then(|slot| slot.handle.upgrade()) {
            return handle;
        }
        let handle = Rc::new(FrameHandle { id: frame });
        if let Some(Some(slot)) = self.frames.get_mut(frame.0) {
            slot.handle = Rc::downgrade(&handle);
        }
        handle
    }

    /// The number of frames currently allocated, the root frame included.
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frames.iter().filter(|slot| slot.is_some()).count()
    }

    /// Looks `name` up from `frame` outwards.
    #[must_use]
    pub fn lookup(&self, frame: FrameId, name: &str) -> Option<&Value> {
        let mut current = Some(frame);
        while let Some(id) = current {
            let frame = self.slot(id)?;
            if let Some(value) = frame.bindings.get(name) {
                return Some(value);
            }
            current = frame.parent.as_ref().map(|parent| parent.id);
        }
        None
    }

    /// Binds `name` in `frame` itself, replacing any previous binding there.
    pub fn define(&mut self, frame: FrameId, name: &str, value: Value) {
        if let Some(Some(frame)) = self.frames.get_mut(frame.0) {
            frame.bindings.insert(name.to_string(), value);
        }
    }

    /// The binding of `name` in `frame` itself, ignoring parents.
    pub fn local_mut(&mut self, frame: FrameId, name: &str) -> Option<&mut Value> {
        self.frames.get_mut(frame.0)?.as_mut()?.bindings.get_mut(name)
    }

    /// Names bound in the root frame, in no particular order.
    pub fn global_names(&self) -> impl Iterator<Item = &str> {
        self.slot(Self::ROOT)
            .into_iter()
            .flat_map(|root| root.bindings.keys().map(String::as_str))
    }

    fn slot(&self, frame: FrameId) -> Option<&Frame> {
        self.frames.get(frame.0)?.as_ref()
    }

    fn free_frame(&mut self, frame: FrameId) {
        // Taking the frame drops its bindings, which may release handles of
        // other frames.
        if let Some(slot) = self.frames.get_mut(frame.0)
           && slot.take().is_some()
        {
            self.free.push(frame.0);
        }
    }

    /// Frees every retained frame that is only reachable from other retained
    /// frames.
    ///
    /// References are counted twice: once by the handles' reference counts
    /// and once by walking the values stored in retained frames. A value
    /// whose count exceeds the references found by the walk is held from
    /// outside, by a running frame or by the evaluator itself, and everything
    /// it reaches stays alive.
    fn collect(&mut self) {
        let candidates: HashSet<FrameId> = self.retained.iter().copied().collect();
        let mut graph = Graph::default();
        let mut pending: Vec<Node<'_>> =
            self.retained.iter().map(|&frame| self.frame_node(frame)).collect();
        while let Some(node) = pending.pop() {
            if graph.strong.contains_key(&node.key) {
                continue;
            }
            let children = self.children(&node.item, &candidates);
            for child in &children {
                *graph.internal.entry(child.key).or_default() += 1;
            }
            graph.strong.insert(node.key, node.strong);
            graph.edges.insert(node.key, children.iter().map(|child| child.key).collect());
            pending.extend(children);
        }
        let live = graph.live();

        let (kept, dead): (Vec<FrameId>, Vec<FrameId>) =
            self.retained.iter().copied().partition(|frame| live.contains(&Key::Frame(frame.0)));
        self.retained = kept;
        for frame in dead {
            self.free_frame(frame);
        }
    }

    fn frame_node(&self, frame: FrameId) -> Node<'_> {
        Node { key:    Key::Frame(frame.0),
               strong: self.slot(frame).map_or(0, |slot| slot.handle.strong_count()),
               item:   Item::Frame(frame), }
    }

    /// The values and frames `item` refers to. Only retained frames are
    /// walked into; running frames are always alive.
    fn children<'a>(&'a self, item: &Item<'a>, candidates: &HashSet<FrameId>) -> Vec<Node<'a>> {
        match item {
            Item::Frame(frame) => {
                let Some(slot) = self.slot(*frame).filter(|_| candidates.contains(frame)) else {
                    return Vec::new();
                };
                slot.parent
                    .iter()
                    .map(|parent| self.frame_node(parent.id))
                    .chain(slot.bindings.values().filter_map(value_node))
                    .collect()
            },
            Item::Closure(closure) => vec![self.frame_node(closure.scope.id)],
            Item::Constructor(constructor) => vec![self.frame_node(constructor.scope.id)],
            Item::Value(value) => match *value {
                Value::Generic(generic) => {
                    generic.instances
                           .iter()
                           .map(|instance| rc_node(instance, Item::Closure(instance)))
                           .collect()
                },
                Value::Type(union) => union.constructors
                                           .iter()
                                           .map(|constructor| {
                                               rc_node(constructor, Item::Constructor(constructor))
                                           })
                                           .collect(),
                Value::Instance(instance) => {
                    instance.fields.iter().filter_map(|(_, value)| value_node(value)).collect()
                },
                Value::Function(closure) => self.children(&Item::Closure(closure), candidates),
                Value::Constructor(constructor) => {
                    self.children(&Item::Constructor(constructor), candidates)
                },
                _ => Vec::new(),
            },
        }
    }
}

/// Identity of a node in the reference graph walked by [`Scope::collect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Key {
    Frame(usize),
    Object(*const ()),
}

enum Item<'a> {
    Frame(FrameId),
    Closure(&'a Rc<Closure>),
    Constructor(&'a Rc<Constructor>),
    Value(&'a Value),
}

struct Node<'a> {
    key:    Key,
    /// How many references to this node exist in total.
    strong: usize,
    item:   Item<'a>,
}

#[derive(Default)]
struct Graph {
    strong:   HashMap<Key, usize>,
    internal: HashMap<Key, usize>,
    edges:    HashMap<Key, Vec<Key>>,
}

impl Graph {
    /// Nodes held from outside the walked frames, and everything they reach.
    fn live(&self) -> HashSet<Key> {
        let mut pending: Vec<Key> =
            self.strong
                .iter()
                .filter(|(key, strong)| **strong > self.internal.get(*key).copied().unwrap_or(0))
                .map(|(key, _)| *key)
                .collect();
        let mut live = HashSet::new();
        while let Some(key) = pending.pop() {
            if live.insert(key) {
                pending.extend(self.edges.get(&key).into_iter().flatten());
            }
        }
        live
    }
}

fn rc_node<'a, T>(rc: &Rc<T>, item: Item<'a>) -> Node<'a> {
    Node { key:    Key::Object(Rc::as_ptr(rc).cast::<()>()),
           strong: Rc::strong_count(rc),
           item }
}

/// The node for a value that holds references, if it holds any.
fn value_node(value: &Value) -> Option<Node<'_>> {
    let item = Item::Value(value);
    match value {
        Value::Function(closure) => Some(rc_node(closure, item)),
        Value::Generic(generic) => Some(rc_node(generic, item)),
        Value::Type(union) => Some(rc_node(union, item)),
        Value::Constructor(constructor) => Some(rc_node(constructor, item)),
        Value::Instance(instance) => Some(rc_node(instance, item)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_frees_unreferenced_frames() {
        let mut scope = Scope::new();
        let frame = scope.push(Scope::ROOT);
        scope.define(frame, "a", Value::from(1.0));
        scope.release(frame);
        assert_eq!(scope.frame_count(), 1);
    }

    #[test]
    fn freed_slots_are_reused() {
        let mut scope = Scope::new();
        let first = scope.push(Scope::ROOT);
        scope.release(first);
        let second = scope.push(Scope::ROOT);
        assert_eq!(first, second);
        assert_eq!(scope.lookup(second, "a"), None);
    }

    #[test]
    fn handles_keep_frames_and_parents_alive() {
        let mut scope = Scope::new();
        let outer = scope.push(Scope::ROOT);
        let inner = scope.push(outer);
        scope.define(outer, "a", Value::from(1.0));
        let handle = scope.capture(inner);
        scope.release(inner);
        scope.release(outer);
        assert_eq!(scope.lookup(inner, "a"), Some(&Value::from(1.0)));
        assert_eq!(scope.frame_count(), 3);

        drop(handle);
        let other = scope.push(Scope::ROOT);
        scope.release(other);
        assert_eq!(scope.frame_count(), 1);
    }

    #[test]
    fn running_children_keep_retained_parents_alive() {
        let mut scope = Scope::new();
        let outer = scope.push(Scope::ROOT);
        scope.define(outer, "a", Value::from(1.0));
        let handle = scope.capture(outer);
        scope.release(outer);

        let running = scope.push(handle.id());
        drop(handle);
        let nested = scope.push(running);
        scope.release(nested);
        assert_eq!(scope.lookup(running, "a"), Some(&Value::from(1.0)));

        scope.release(running);
        assert_eq!(scope.frame_count(), 1);
    }

    #[test]
    fn lookup_walks_parents_and_shadows() {
        let mut scope = Scope::new();
        scope.define(Scope::ROOT, "x", Value::from(1.0));
        let child = scope.push(Scope::ROOT);
        assert_eq!(scope.lookup(child, "x"), Some(&Value::from(1.0)));
        scope.define(child, "x", Value::from(2.0));
        assert_eq!(scope.lookup(child, "x"), Some(&Value::from(2.0)));
        assert_eq!(scope.lookup(Scope::ROOT, "x"), Some(&Value::from(1.0)));
    }
}
