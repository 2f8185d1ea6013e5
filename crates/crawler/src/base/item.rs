use std::collections::HashMap;

/// A mapping from string keys to arbitrary values, opaque to the runtime and
/// meaningful only to the item processors supplied to the scheduler.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Item(HashMap<String, serde_json::Value>);

impl Item {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.0.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, serde_json::Value)> for Item {
    fn from_iter<I: IntoIterator<Item = (String, serde_json::Value)>>(iter: I) -> Self {
        Self(HashMap::from_iter(iter))
    }
}

/// The sum type produced by a response parser: either a further [`Request`]
/// to admit into the crawl, or an [`Item`] to hand to the item pipeline.
///
/// [`Request`]: crate::base::Request
#[derive(Debug, Clone)]
pub enum Data {
    Request(crate::base::Request),
    Item(Item),
}

impl From<crate::base::Request> for Data {
    fn from(value: crate::base::Request) -> Self {
        Data::Request(value)
    }
}

impl From<Item> for Data {
    fn from(value: Item) -> Self {
        Data::Item(value)
    }
}
