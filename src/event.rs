use std::cmp::Ordering;
use std::sync::{Arc, OnceLock};

use crate::{
    ConnectionHeader, Error, MessageFactory, MessageRef, MessageRefMut, MessageView, Qualifier,
    Result, Time,
    header::{CALLER_ID_KEY, UNKNOWN_PUBLISHER},
};

/// Message plus delivery metadata, handed to subscriber callbacks by the
/// dispatch layer.
///
/// One canonical message can back many events (one per subscriber). Each
/// event decides, per request, whether a consumer gets an aliased reference
/// to the canonical message or a private copy:
///
/// - `shared_message()` always aliases; it never allocates and never fails.
/// - `message()` honors the event's declared [`Qualifier`]. For a read-only
///   event it aliases. For a mutable event it either aliases (when
///   `copy_required` is false and the caller is trusted) or materializes a
///   private copy exactly once and returns that same copy on every
///   subsequent call.
///
/// Metadata (header, receipt time, copy flag, factory) is fixed at
/// construction; only the internal copy slot is populated afterwards, and it
/// is populated at most once even under concurrent requests.
#[derive(Debug)]
pub struct MessageEvent<M> {
    message: MessageRef<M>,
    copy: OnceLock<MessageRefMut<M>>,
    header: Option<Arc<ConnectionHeader>>,
    receipt_time: Time,
    qualifier: Qualifier,
    copy_required: bool,
    factory: Option<MessageFactory<M>>,
}

impl<M> MessageEvent<M>
where
    M: Default + Send + Sync + 'static,
{
    /// Wrap a message, sampling the receipt time from the system clock.
    ///
    /// The event gets no connection header, a read-only qualifier,
    /// `copy_required = true` and the default factory.
    pub fn new(message: impl Into<MessageRef<M>>) -> Self {
        Self::with_receipt_time(message, Time::now())
    }

    /// Wrap a message with an explicit receipt time.
    pub fn with_receipt_time(message: impl Into<MessageRef<M>>, receipt_time: Time) -> Self {
        Self::from_parts(
            message.into(),
            None,
            receipt_time,
            Qualifier::ReadOnly,
            true,
            Some(MessageFactory::default()),
        )
    }

    /// Wrap a message with a connection header and an explicit receipt time.
    pub fn with_header(
        message: impl Into<MessageRef<M>>,
        header: Arc<ConnectionHeader>,
        receipt_time: Time,
    ) -> Self {
        Self::from_parts(
            message.into(),
            Some(header),
            receipt_time,
            Qualifier::ReadOnly,
            true,
            Some(MessageFactory::default()),
        )
    }
}

impl<M> MessageEvent<M> {
    /// Full construction form.
    ///
    /// Takes an existing [`MessageRef`] so a dispatcher can share one
    /// canonical message across every event derived from the same delivery.
    /// The factory may be omitted; a mutable view that actually needs a copy
    /// will then fail with [`Error::NoFactoryAvailable`] at request time.
    pub fn from_parts(
        message: MessageRef<M>,
        header: Option<Arc<ConnectionHeader>>,
        receipt_time: Time,
        qualifier: Qualifier,
        copy_required: bool,
        factory: Option<MessageFactory<M>>,
    ) -> Self {
        Self {
            message,
            copy: OnceLock::new(),
            header,
            receipt_time,
            qualifier,
            copy_required,
            factory,
        }
    }

    /// Derive an event with a read-only qualifier.
    ///
    /// Metadata is carried over; the copy slot starts empty, since
    /// memoized copies are private to the instance that made them.
    pub fn to_read_only(&self) -> Self {
        self.derive(Qualifier::ReadOnly, self.copy_required)
    }

    /// Derive an event with a mutable qualifier.
    pub fn to_mutable(&self) -> Self {
        self.derive(Qualifier::Mutable, self.copy_required)
    }

    /// Derive an event with the copy-required flag overridden.
    pub fn with_copy_required(&self, copy_required: bool) -> Self {
        self.derive(self.qualifier, copy_required)
    }

    fn derive(&self, qualifier: Qualifier, copy_required: bool) -> Self {
        Self {
            message: self.message.clone(),
            copy: OnceLock::new(),
            header: self.header.clone(),
            receipt_time: self.receipt_time,
            qualifier,
            copy_required,
            factory: self.factory.clone(),
        }
    }

    /// Read-only alias of the canonical message. O(1), never fails.
    pub fn shared_message(&self) -> MessageRef<M> {
        self.message.clone()
    }

    /// The view matching this event's declared qualifier.
    ///
    /// Read-only events alias the canonical message. Mutable events go
    /// through the copy-on-demand slot; see the type-level docs.
    pub fn message(&self) -> Result<MessageView<M>>
    where
        M: Clone,
    {
        match self.qualifier {
            Qualifier::ReadOnly => Ok(MessageView::ReadOnly(self.shared_message())),
            Qualifier::Mutable => self.copy_on_demand().map(MessageView::Mutable),
        }
    }

    fn copy_on_demand(&self) -> Result<MessageRefMut<M>>
    where
        M: Clone,
    {
        if !self.copy_required {
            return Ok(MessageRefMut {
                cell: Arc::clone(&self.message.cell),
            });
        }
        if let Some(copy) = self.copy.get() {
            return Ok(copy.clone());
        }

        let factory = self.factory.as_ref().ok_or(Error::NoFactoryAvailable)?;
        // get_or_init runs the closure at most once, so concurrent requests
        // settle on a single copy.
        let copy = self.copy.get_or_init(|| {
            tracing::trace!(
                message_type = std::any::type_name::<M>(),
                "materializing private message copy"
            );
            let fresh = Arc::new(parking_lot::RwLock::new(factory.create()));
            fresh.write().clone_from(&*self.message.read());
            MessageRefMut { cell: fresh }
        });
        Ok(copy.clone())
    }

    /// The attached connection header.
    ///
    /// Fails with [`Error::HeaderNotAttached`] when the delivery carried no
    /// header; check [`Self::has_connection_header`] first.
    pub fn connection_header(&self) -> Result<&ConnectionHeader> {
        self.header.as_deref().ok_or(Error::HeaderNotAttached)
    }

    pub fn has_connection_header(&self) -> bool {
        self.header.is_some()
    }

    /// Shared handle to the header, if any. Useful when deriving events.
    pub fn connection_header_ptr(&self) -> Option<&Arc<ConnectionHeader>> {
        self.header.as_ref()
    }

    /// Name of the node that published this message.
    ///
    /// Falls back to [`UNKNOWN_PUBLISHER`](crate::UNKNOWN_PUBLISHER) when no
    /// header is attached, and to `""` when a header is attached but carries
    /// no `"callerid"` field.
    pub fn publisher_name(&self) -> &str {
        match &self.header {
            Some(header) => header.get(CALLER_ID_KEY).unwrap_or(""),
            None => UNKNOWN_PUBLISHER,
        }
    }

    pub fn receipt_time(&self) -> Time {
        self.receipt_time
    }

    pub fn qualifier(&self) -> Qualifier {
        self.qualifier
    }

    /// Whether a mutable-view request on this event must yield a copy.
    pub fn copy_required(&self) -> bool {
        self.copy_required
    }

    /// True iff `message()` on this event would materialize (or reuse) a
    /// private copy: the qualifier is mutable and a copy is required.
    pub fn will_copy(&self) -> bool {
        self.qualifier.is_mutable() && self.copy_required
    }

    pub fn factory(&self) -> Option<&MessageFactory<M>> {
        self.factory.as_ref()
    }

    /// Value-based comparison: message contents, receipt time and the
    /// copy-required flag. Complements the identity-based `Eq` impl, which
    /// considers two events over value-equal messages in different cells
    /// unequal.
    pub fn value_eq(&self, other: &Self) -> bool
    where
        M: PartialEq,
    {
        *self.message.read() == *other.message.read()
            && self.receipt_time == other.receipt_time
            && self.copy_required == other.copy_required
    }
}

/// Cloning derives an event with the same qualifier and flags but a fresh,
/// empty copy slot: memoized copies are never shared between instances.
impl<M> Clone for MessageEvent<M> {
    fn clone(&self) -> Self {
        self.derive(self.qualifier, self.copy_required)
    }
}

/// Identity-based equality: same canonical message *cell* (not value),
/// equal receipt time and equal copy-required flag. Header, factory and
/// qualifier are excluded. Use [`MessageEvent::value_eq`] for value
/// comparison.
impl<M> PartialEq for MessageEvent<M> {
    fn eq(&self, other: &Self) -> bool {
        self.message.ptr_eq(&other.message)
            && self.receipt_time == other.receipt_time
            && self.copy_required == other.copy_required
    }
}

impl<M> Eq for MessageEvent<M> {}

/// Identity-based total order: canonical cell address first, then receipt
/// time, then the copy-required flag. Events over value-equal messages in
/// different cells are ordered by address, which is stable for the life of
/// the allocation but otherwise arbitrary.
impl<M> Ord for MessageEvent<M> {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.message.addr(), self.receipt_time, self.copy_required).cmp(&(
            other.message.addr(),
            other.receipt_time,
            other.copy_required,
        ))
    }
}

impl<M> PartialOrd for MessageEvent<M> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
