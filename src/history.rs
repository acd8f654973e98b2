//! The record of operations that produced a [`Value`](crate::Value).
//!
//! Entries are immutable and linked newest to oldest, so copying a history only clones
//! the head pointer. A snapshot and the handle it was taken from share every entry up to
//! the point where they diverge.

use std::rc::Rc;

use crate::operation::Operation;

#[derive(Debug)]
pub(crate) struct Entry {
    pub(crate) op: Operation,
    pub(crate) prev: Option<Rc<Entry>>,
    len: usize,
}

#[derive(Clone, Debug, Default)]
pub struct History {
    head: Option<Rc<Entry>>,
}

impl History {
    pub fn len(&self) -> usize {
        self.head.as_ref().map_or(0, |entry| entry.len)
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// The newest operation.
    pub fn last(&self) -> Option<&Operation> {
        self.head.as_deref().map(|entry| &entry.op)
    }

    /// Operations from newest to oldest.
    pub fn iter(&self) -> impl Iterator<Item = &Operation> {
        std::iter::successors(self.head.as_deref(), |entry| entry.prev.as_deref())
            .map(|entry| &entry.op)
    }

    pub(crate) fn push(&mut self, op: Operation) {
        let prev = self.head.take();
        let len = prev.as_ref().map_or(0, |entry| entry.len) + 1;
        self.head = Some(Rc::new(Entry { op, prev, len }));
    }

    pub(crate) fn take_head(&mut self) -> Option<Rc<Entry>> {
        self.head.take()
    }
}
