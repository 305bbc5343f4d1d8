//! Typed publish/subscribe with parkable subscriptions
//!
//! Subscriptions live in an arena and are addressed by index plus generation,
//! so handles stay valid (or detectably stale) no matter how the subscriber
//! lists change. Each tag keeps an ordered list of attached subscriptions;
//! parked subscriptions keep their callback but sit in no list.
//!
//! `publish` iterates over a snapshot of the attached list and re-checks each
//! entry right before invoking it. A callback can therefore attach or detach
//! any subscription, itself included, while a publish is in flight.
//!
//! The bus is a cheap `Rc` handle meant for the render thread. Callbacks that
//! need to toggle subscriptions on their own bus capture a `WeakEventBus`.

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::rc::{Rc, Weak};

/// An event that can be routed by tag
pub trait Event {
    type Tag: Copy + Eq + Hash + fmt::Debug;

    fn tag(&self) -> Self::Tag;
}

/// What a subscriber receives
pub enum Envelope<'a, E: Event> {
    /// A published event
    Event(&'a E),
    /// A bus-local event; the payload is only borrowed for this call
    Internal {
        tag: E::Tag,
        payload: Option<&'a (dyn Any + 'static)>,
    },
}

impl<'a, E: Event> Envelope<'a, E> {
    pub fn tag(&self) -> E::Tag {
        match self {
            Envelope::Event(e) => e.tag(),
            Envelope::Internal { tag, .. } => *tag,
        }
    }

    pub fn event(&self) -> Option<&'a E> {
        match self {
            Envelope::Event(e) => Some(*e),
            Envelope::Internal { .. } => None,
        }
    }

    /// Downcast the internal payload
    pub fn payload<T: 'static>(&self) -> Option<&'a T> {
        match self {
            Envelope::Internal {
                payload: Some(p), ..
            } => {
                let p: &'a (dyn Any + 'static) = *p;
                p.downcast_ref::<T>()
            }
            _ => None,
        }
    }
}

type Callback<E> = Rc<RefCell<dyn FnMut(&Envelope<'_, E>) -> bool>>;

/// Handle to one subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription {
    index: usize,
    generation: u32,
}

struct Slot<E: Event> {
    tag: E::Tag,
    generation: u32,
    attached: bool,
    callback: Callback<E>,
}

struct Inner<E: Event> {
    slots: Vec<Option<Slot<E>>>,
    free: Vec<usize>,
    generations: Vec<u32>,
    attached: HashMap<E::Tag, Vec<Subscription>>,
}

impl<E: Event> Inner<E> {
    fn slot(&self, sub: &Subscription) -> Option<&Slot<E>> {
        self.slots
            .get(sub.index)?
            .as_ref()
            .filter(|s| s.generation == sub.generation)
    }

    fn slot_mut(&mut self, sub: &Subscription) -> Option<&mut Slot<E>> {
        self.slots
            .get_mut(sub.index)?
            .as_mut()
            .filter(|s| s.generation == sub.generation)
    }
}

/// Publish/subscribe bus keyed by event tag
pub struct EventBus<E: Event> {
    inner: Rc<RefCell<Inner<E>>>,
}

/// Non-owning handle for callbacks stored on the bus they manipulate
pub struct WeakEventBus<E: Event> {
    inner: Weak<RefCell<Inner<E>>>,
}

impl<E: Event> Clone for WeakEventBus<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<E: Event> WeakEventBus<E> {
    pub fn upgrade(&self) -> Option<EventBus<E>> {
        self.inner.upgrade().map(|inner| EventBus { inner })
    }
}

impl<E: Event> Clone for EventBus<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<E: Event + 'static> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Event + 'static> fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("EventBus")
            .field("subscriptions", &(inner.slots.len() - inner.free.len()))
            .field("tags", &inner.attached.len())
            .finish()
    }
}

impl<E: Event + 'static> EventBus<E> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                slots: Vec::new(),
                free: Vec::new(),
                generations: Vec::new(),
                attached: HashMap::new(),
            })),
        }
    }

    /// Handle that does not keep the bus alive
    pub fn downgrade(&self) -> WeakEventBus<E> {
        WeakEventBus {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Subscribe and start receiving events immediately
    pub fn connect<F>(&self, tag: E::Tag, callback: F) -> Subscription
    where
        F: FnMut(&Envelope<'_, E>) -> bool + 'static,
    {
        self.insert(tag, Rc::new(RefCell::new(callback)), true)
    }

    /// Subscribe without receiving anything until `attach` is called
    pub fn connect_parked<F>(&self, tag: E::Tag, callback: F) -> Subscription
    where
        F: FnMut(&Envelope<'_, E>) -> bool + 'static,
    {
        self.insert(tag, Rc::new(RefCell::new(callback)), false)
    }

    fn insert(&self, tag: E::Tag, callback: Callback<E>, attached: bool) -> Subscription {
        let mut inner = self.inner.borrow_mut();
        let index = match inner.free.pop() {
            Some(index) => index,
            None => {
                inner.slots.push(None);
                inner.generations.push(0);
                inner.slots.len() - 1
            }
        };
        let generation = inner.generations[index];
        inner.slots[index] = Some(Slot {
            tag,
            generation,
            attached,
            callback,
        });

        let sub = Subscription { index, generation };
        if attached {
            inner.attached.entry(tag).or_default().push(sub);
        }
        sub
    }

    /// Move a parked subscription to the end of its tag's attached list
    pub fn attach(&self, sub: &Subscription) {
        let mut inner = self.inner.borrow_mut();
        let tag = match inner.slot_mut(sub) {
            Some(slot) if !slot.attached => {
                slot.attached = true;
                slot.tag
            }
            _ => return,
        };
        inner.attached.entry(tag).or_default().push(*sub);
    }

    /// Park a subscription; its callback is kept
    pub fn detach(&self, sub: &Subscription) {
        let mut inner = self.inner.borrow_mut();
        let tag = match inner.slot_mut(sub) {
            Some(slot) if slot.attached => {
                slot.attached = false;
                slot.tag
            }
            _ => return,
        };
        if let Some(list) = inner.attached.get_mut(&tag) {
            list.retain(|s| s != sub);
        }
    }

    /// Destroy a subscription; the handle becomes stale
    pub fn disconnect(&self, sub: Subscription) {
        self.detach(&sub);
        let mut inner = self.inner.borrow_mut();
        if inner.slot(&sub).is_none() {
            return;
        }
        inner.slots[sub.index] = None;
        inner.generations[sub.index] = inner.generations[sub.index].wrapping_add(1);
        inner.free.push(sub.index);
    }

    pub fn is_attached(&self, sub: &Subscription) -> bool {
        self.inner
            .borrow()
            .slot(sub)
            .is_some_and(|slot| slot.attached)
    }

    /// Number of attached subscribers for a tag
    pub fn attached_count(&self, tag: E::Tag) -> usize {
        self.inner
            .borrow()
            .attached
            .get(&tag)
            .map_or(0, |list| list.len())
    }

    /// Deliver an event to every attached subscriber of its tag, in order.
    /// Returns true if any subscriber reported the event as handled.
    pub fn publish(&self, event: &E) -> bool {
        self.dispatch(event.tag(), &Envelope::Event(event))
    }

    /// Deliver a bus-local event carrying a borrowed payload
    pub fn publish_internal(&self, tag: E::Tag, payload: Option<&(dyn Any + 'static)>) -> bool {
        self.dispatch(tag, &Envelope::Internal { tag, payload })
    }

    fn dispatch(&self, tag: E::Tag, envelope: &Envelope<'_, E>) -> bool {
        let snapshot = match self.inner.borrow().attached.get(&tag) {
            Some(list) if !list.is_empty() => list.clone(),
            _ => return false,
        };

        let mut handled = false;
        for sub in snapshot {
            let callback = {
                let inner = self.inner.borrow();
                match inner.slot(&sub) {
                    Some(slot) if slot.attached => Rc::clone(&slot.callback),
                    _ => continue,
                }
            };

            match callback.try_borrow_mut() {
                Ok(mut f) => handled |= (&mut *f)(envelope),
                Err(_) => log::debug!("skipping re-entrant subscriber for {:?}", tag),
            };
        }
        handled
    }
}
