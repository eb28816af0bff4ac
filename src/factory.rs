use std::sync::Arc;

/// Zero-argument constructor capability for a message type.
///
/// Supplied at envelope construction (or inherited through conversions) and
/// invoked only when a private copy of the message actually has to be
/// allocated. The default factory uses the type's `Default` impl, matching
/// the common case of empty-constructible message types.
pub struct MessageFactory<M> {
    create: Arc<dyn Fn() -> M + Send + Sync>,
}

impl<M> Clone for MessageFactory<M> {
    fn clone(&self) -> Self {
        Self {
            create: Arc::clone(&self.create),
        }
    }
}

impl<M> MessageFactory<M> {
    pub fn new(create: impl Fn() -> M + Send + Sync + 'static) -> Self {
        Self {
            create: Arc::new(create),
        }
    }

    /// Allocate a fresh message instance.
    pub fn create(&self) -> M {
        (self.create)()
    }
}

impl<M: Default> Default for MessageFactory<M>
where
    M: Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new(M::default)
    }
}

impl<M> std::fmt::Debug for MessageFactory<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("MessageFactory")
            .field("message_type", &std::any::type_name::<M>())
            .finish()
    }
}
