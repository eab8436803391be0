//! URL and query-string composition for the service's OData-style scheme.

use crate::models::RecordId;
use log::warn;
use url::form_urlencoded;

pub const TOP: &str = "$top";
pub const SKIP: &str = "$skip";

/// Ordered query parameters.
///
/// Insertion order is kept on the wire. Setting a key that is already present
/// replaces its value where it stands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl ToString) {
        let key = key.into();
        let value = value.to_string();
        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some(pair) => pair.1 = value,
            None => self.pairs.push((key, value)),
        }
    }

    pub fn filter(self, expression: impl Into<String>) -> Self {
        self.param("$filter", expression.into())
    }

    pub fn select(self, fields: &[&str]) -> Self {
        self.param("$select", fields.join(","))
    }

    pub fn expand(self, relations: &[&str]) -> Self {
        self.param("$expand", relations.join(","))
    }

    pub fn orderby(self, expression: impl Into<String>) -> Self {
        self.param("$orderby", expression.into())
    }

    pub fn top(self, count: usize) -> Self {
        self.param(TOP, count)
    }

    pub fn skip(self, count: usize) -> Self {
        self.param(SKIP, count)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let index = self.pairs.iter().position(|(k, _)| k == key)?;
        Some(self.pairs.remove(index).1)
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Drop `$top`/`$skip`, which the pagination engine controls itself.
    /// `context` names the calling operation in the warning.
    pub fn without_paging(mut self, context: &str) -> Self {
        for key in [TOP, SKIP] {
            if self.remove(key).is_some() {
                warn!("{} does not support the {} parameter. It will be ignored.", context, key);
            }
        }
        self
    }

    /// Form-URL-encoded query string without the leading `?`
    pub fn encode(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.iter())
            .finish()
    }
}

impl<K, V> FromIterator<(K, V)> for QueryParams
where
    K: Into<String>,
    V: ToString,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (key, value) in iter {
            params.set(key, value);
        }
        params
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for QueryParams
where
    K: Into<String>,
    V: ToString,
{
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

/// Append `params` to `base`. With no parameters `base` comes back unchanged.
pub fn build_url(base: &str, params: &QueryParams) -> String {
    if params.is_empty() {
        return base.to_string();
    }
    format!("{}?{}", base, params.encode())
}

/// `Collection` or `Collection(<id>)`, relative to the api root
pub fn resource_path(collection: &str, id: Option<RecordId>) -> String {
    match id {
        Some(id) => format!("{}({})", collection, id),
        None => collection.to_string(),
    }
}
