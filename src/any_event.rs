use std::any::Any;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::{
    ConnectionHeader, Error, MessageEvent, MessageFactory, MessageRef, Qualifier, Result, Time,
    header::{CALLER_ID_KEY, UNKNOWN_PUBLISHER},
};

/// Type-erased message event, used on generic dispatch paths that only learn
/// the concrete message type when a subscriber callback is invoked.
///
/// An erased event never copies: every access aliases the canonical message,
/// whatever the copy-required flag says. Copy-on-demand resumes once the
/// event is bridged back to a typed [`MessageEvent`] with
/// [`MessageEvent::from_erased`].
#[derive(Clone)]
pub struct AnyMessageEvent {
    message: Arc<dyn Any + Send + Sync>,
    header: Option<Arc<ConnectionHeader>>,
    receipt_time: Time,
    copy_required: bool,
}

impl AnyMessageEvent {
    /// Opaque alias of the canonical message cell.
    pub fn message(&self) -> Arc<dyn Any + Send + Sync> {
        Arc::clone(&self.message)
    }

    /// Typed read-only alias of the canonical message, if `M` is the
    /// event's actual message type.
    pub fn downcast<M: Send + Sync + 'static>(&self) -> Option<MessageRef<M>> {
        Arc::clone(&self.message)
            .downcast::<RwLock<M>>()
            .ok()
            .map(|cell| MessageRef { cell })
    }

    pub fn connection_header(&self) -> Result<&ConnectionHeader> {
        self.header.as_deref().ok_or(Error::HeaderNotAttached)
    }

    pub fn has_connection_header(&self) -> bool {
        self.header.is_some()
    }

    pub fn connection_header_ptr(&self) -> Option<&Arc<ConnectionHeader>> {
        self.header.as_ref()
    }

    /// Name of the node that published this message; see
    /// [`MessageEvent::publisher_name`].
    pub fn publisher_name(&self) -> &str {
        match &self.header {
            Some(header) => header.get(CALLER_ID_KEY).unwrap_or(""),
            None => UNKNOWN_PUBLISHER,
        }
    }

    pub fn receipt_time(&self) -> Time {
        self.receipt_time
    }

    pub fn copy_required(&self) -> bool {
        self.copy_required
    }
}

impl std::fmt::Debug for AnyMessageEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("AnyMessageEvent")
            .field("header", &self.header)
            .field("receipt_time", &self.receipt_time)
            .field("copy_required", &self.copy_required)
            .finish_non_exhaustive()
    }
}

impl<M: Send + Sync + 'static> MessageEvent<M> {
    /// Erase the message type, keeping the metadata and the shared canonical
    /// cell. The erased event carries no factory and no copy slot.
    pub fn erase(&self) -> AnyMessageEvent {
        AnyMessageEvent {
            message: self.shared_message().cell,
            header: self.connection_header_ptr().cloned(),
            receipt_time: self.receipt_time(),
            copy_required: self.copy_required(),
        }
    }

    /// Bridge an erased event back to a typed one.
    ///
    /// The message cell is downcast eagerly; a wrong `M` fails with
    /// [`Error::TypeMismatch`] here rather than at first access. Header,
    /// receipt time and the copy-required flag are inherited; the new event
    /// is read-only qualified (derive with
    /// [`to_mutable`](MessageEvent::to_mutable) for write access) and starts
    /// with an empty copy slot. Passing no factory defers the failure: a
    /// mutable view that needs a copy will report
    /// [`Error::NoFactoryAvailable`] when it is requested.
    pub fn from_erased(
        event: &AnyMessageEvent,
        factory: Option<MessageFactory<M>>,
    ) -> Result<Self> {
        let cell = Arc::clone(&event.message)
            .downcast::<RwLock<M>>()
            .map_err(|_| Error::type_mismatch::<M>())?;
        Ok(MessageEvent::from_parts(
            MessageRef { cell },
            event.header.clone(),
            event.receipt_time,
            Qualifier::ReadOnly,
            event.copy_required,
            factory,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Time, UNKNOWN_PUBLISHER};

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Reading {
        x: i32,
    }

    #[test]
    fn test_erased_event_always_aliases() {
        // copy_required is true, yet the erased path never copies.
        let typed = MessageEvent::new(Reading { x: 5 });
        assert!(typed.copy_required());
        let erased = typed.erase();

        let alias = erased.downcast::<Reading>().expect("same message type");
        assert!(alias.ptr_eq(&typed.shared_message()));
        assert_eq!(alias.read().x, 5);
    }

    #[test]
    fn test_erase_keeps_metadata() {
        let header: Arc<ConnectionHeader> =
            Arc::new([("callerid", "node_a")].into_iter().collect());
        let typed =
            MessageEvent::with_header(Reading { x: 1 }, header, Time::from_nanos(7));
        let erased = typed.erase();

        assert_eq!(erased.publisher_name(), "node_a");
        assert_eq!(erased.receipt_time(), Time::from_nanos(7));
        assert!(erased.copy_required());
    }

    #[test]
    fn test_bridge_round_trip() {
        let typed = MessageEvent::with_receipt_time(Reading { x: 5 }, Time::from_nanos(3));
        let erased = typed.erase();

        let bridged = MessageEvent::<Reading>::from_erased(
            &erased,
            Some(MessageFactory::default()),
        )
        .unwrap();
        assert!(bridged.shared_message().ptr_eq(&typed.shared_message()));
        assert_eq!(bridged.receipt_time(), Time::from_nanos(3));
        assert_eq!(bridged.qualifier(), Qualifier::ReadOnly);

        // Copy-on-demand resumes on the bridged event.
        let writable = bridged.to_mutable();
        let copy = writable.message().unwrap();
        let copy = copy.as_mutable().expect("mutable view");
        copy.write().x = 9;
        assert_eq!(typed.shared_message().read().x, 5);
    }

    #[test]
    fn test_bridge_to_wrong_type_fails_eagerly() {
        let erased = MessageEvent::new(Reading { x: 5 }).erase();
        let result = MessageEvent::<String>::from_erased(&erased, None);
        assert!(matches!(result, Err(Error::TypeMismatch { .. })));
        assert!(erased.downcast::<String>().is_none());
    }

    #[test]
    fn test_bridge_without_factory_fails_at_first_copy() {
        let erased = MessageEvent::new(Reading { x: 5 }).erase();
        let bridged = MessageEvent::<Reading>::from_erased(&erased, None)
            .unwrap()
            .to_mutable();
        assert!(matches!(
            bridged.message(),
            Err(Error::NoFactoryAvailable)
        ));
    }

    #[test]
    fn test_erased_publisher_fallback() {
        let erased = MessageEvent::new(Reading { x: 5 }).erase();
        assert_eq!(erased.publisher_name(), UNKNOWN_PUBLISHER);
        assert!(matches!(
            erased.connection_header(),
            Err(Error::HeaderNotAttached)
        ));
    }
}
