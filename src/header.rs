use std::collections::HashMap;

/// Header key under which the transport records the publisher's name.
pub const CALLER_ID_KEY: &str = "callerid";

/// Publisher name reported when an event carries no connection header.
pub const UNKNOWN_PUBLISHER: &str = "unknown_publisher";

/// Read-only connection metadata attached to a delivery.
///
/// The transport builds this map when a connection is established (sender
/// identity, topic, negotiated options) and the envelope only reads it.
/// An event with no header attached is a valid, distinct state from an
/// event with an empty header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConnectionHeader {
    fields: HashMap<String, String>,
}

impl ConnectionHeader {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// The `"callerid"` field, i.e. the publisher's name.
    pub fn caller_id(&self) -> Option<&str> {
        self.get(CALLER_ID_KEY)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<HashMap<String, String>> for ConnectionHeader {
    fn from(fields: HashMap<String, String>) -> Self {
        Self { fields }
    }
}

impl<K, V> FromIterator<(K, V)> for ConnectionHeader
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
