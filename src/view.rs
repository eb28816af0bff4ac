use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Declared view qualifier of an event: whether consumers reached through it
/// get read-only or mutable access to the message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Qualifier {
    #[default]
    ReadOnly,
    Mutable,
}

impl Qualifier {
    pub fn is_mutable(&self) -> bool {
        matches!(self, Qualifier::Mutable)
    }
}

/// Read-only handle to a shared message cell.
///
/// Cloning aliases the same cell; the handle's lifetime is independent of the
/// envelope it was obtained from. No write access exists through this type,
/// which is what keeps the canonical message intact no matter how many
/// consumers hold a reference.
#[derive(Debug)]
pub struct MessageRef<M> {
    pub(crate) cell: Arc<RwLock<M>>,
}

impl<M> MessageRef<M> {
    pub fn new(message: M) -> Self {
        Self {
            cell: Arc::new(RwLock::new(message)),
        }
    }

    pub fn read(&self) -> RwLockReadGuard<'_, M> {
        self.cell.read()
    }

    /// True if both handles alias the same underlying cell.
    pub fn ptr_eq(&self, other: &MessageRef<M>) -> bool {
        Arc::ptr_eq(&self.cell, &other.cell)
    }

    pub(crate) fn addr(&self) -> usize {
        Arc::as_ptr(&self.cell) as *const () as usize
    }
}

impl<M> Clone for MessageRef<M> {
    fn clone(&self) -> Self {
        Self {
            cell: Arc::clone(&self.cell),
        }
    }
}

impl<M> From<M> for MessageRef<M> {
    fn from(message: M) -> Self {
        Self::new(message)
    }
}

/// Mutable handle to a shared message cell.
///
/// Only produced by an envelope: either aliasing the canonical message (when
/// the envelope was told no copy protection is needed) or pointing at the
/// envelope's private copy.
#[derive(Debug)]
pub struct MessageRefMut<M> {
    pub(crate) cell: Arc<RwLock<M>>,
}

impl<M> MessageRefMut<M> {
    pub fn read(&self) -> RwLockReadGuard<'_, M> {
        self.cell.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, M> {
        self.cell.write()
    }

    pub fn ptr_eq(&self, other: &MessageRefMut<M>) -> bool {
        Arc::ptr_eq(&self.cell, &other.cell)
    }

    /// True if this mutable handle aliases the given read-only handle.
    pub fn aliases(&self, other: &MessageRef<M>) -> bool {
        Arc::ptr_eq(&self.cell, &other.cell)
    }
}

impl<M> Clone for MessageRefMut<M> {
    fn clone(&self) -> Self {
        Self {
            cell: Arc::clone(&self.cell),
        }
    }
}

/// The view an envelope hands out for its declared qualifier.
#[derive(Debug)]
pub enum MessageView<M> {
    ReadOnly(MessageRef<M>),
    Mutable(MessageRefMut<M>),
}

impl<M> MessageView<M> {
    pub fn qualifier(&self) -> Qualifier {
        match self {
            MessageView::ReadOnly(_) => Qualifier::ReadOnly,
            MessageView::Mutable(_) => Qualifier::Mutable,
        }
    }

    /// Read access, available for either qualifier.
    pub fn read(&self) -> RwLockReadGuard<'_, M> {
        match self {
            MessageView::ReadOnly(r) => r.read(),
            MessageView::Mutable(m) => m.read(),
        }
    }

    pub fn as_mutable(&self) -> Option<&MessageRefMut<M>> {
        match self {
            MessageView::ReadOnly(_) => None,
            MessageView::Mutable(m) => Some(m),
        }
    }
}
