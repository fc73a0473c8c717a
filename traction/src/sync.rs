//! Resource URLs, query strings and the transport seam.
//!
//! Nothing here talks to a network. A [`Transport`] is handed the URL built
//! from an [`Endpoint`] and returns the decoded response body.

use serde_json::Value;

use crate::config::ApiConfig;
use crate::error::FetchError;

/// Performs the actual request for a fetch.
///
/// Any `Fn(&str) -> Result<Value, FetchError>` is a transport.
pub trait Transport {
    fn get(&self, url: &str) -> Result<Value, FetchError>;
}

impl<F> Transport for F
where
    F: Fn(&str) -> Result<Value, FetchError>,
{
    fn get(&self, url: &str) -> Result<Value, FetchError> {
        self(url)
    }
}

/// A server-side resource: base URL, resource name and, optionally, the key
/// under which responses nest the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    base_url: String,
    name: String,
    subelement: Option<String>,
}

impl Endpoint {
    pub fn new(config: &ApiConfig, name: impl Into<String>) -> Self {
        Self {
            base_url: config.base_url.clone(),
            name: name.into(),
            subelement: None,
        }
    }

    /// Read the payload from `response[key]` instead of the whole response.
    pub fn subelement(mut self, key: impl Into<String>) -> Self {
        self.subelement = Some(key.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn subelement_key(&self) -> Option<&str> {
        self.subelement.as_deref()
    }

    /// `<base>/<name>`, followed by `?<query>` when a query is given.
    pub fn url(&self, query: Option<&str>) -> String {
        let base = format!("{}/{}", self.base_url, self.name);
        match query {
            Some(query) if !query.is_empty() => format!("{base}?{query}"),
            _ => base,
        }
    }

    /// The payload of `response`, honoring the sub-element key.
    ///
    /// A missing sub-element yields `Value::Null`.
    pub fn payload(&self, response: Value) -> Value {
        match (&self.subelement, response) {
            (Some(key), Value::Object(mut map)) => map.remove(key).unwrap_or(Value::Null),
            (Some(_), _) => Value::Null,
            (None, response) => response,
        }
    }
}

/// Build `key=value` pairs joined by `&`, percent-encoding both sides.
pub fn query_string<K, V>(params: impl IntoIterator<Item = (K, V)>) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    params
        .into_iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                urlencoding::encode(key.as_ref()),
                urlencoding::encode(value.as_ref())
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_query_string() {
        assert_eq!(query_string([("page", "2"), ("size", "10")]), "page=2&size=10");
        assert_eq!(query_string(Vec::<(&str, &str)>::new()), "");
    }

    #[test]
    fn test_query_string_encodes() {
        assert_eq!(
            query_string([("name", "Ada Lovelace"), ("q", "a&b=c")]),
            "name=Ada%20Lovelace&q=a%26b%3Dc"
        );
    }

    #[test]
    fn test_endpoint_url() {
        let config = ApiConfig::new("https://api.example.com/");
        let endpoint = Endpoint::new(&config, "people");
        assert_eq!(endpoint.url(None), "https://api.example.com/people");
        assert_eq!(endpoint.url(Some("")), "https://api.example.com/people");
        assert_eq!(
            endpoint.url(Some("page=2")),
            "https://api.example.com/people?page=2"
        );
    }

    #[test]
    fn test_payload_subelement() {
        let config = ApiConfig::default();
        let plain = Endpoint::new(&config, "people");
        let nested = Endpoint::new(&config, "people").subelement("people");

        let response = json!({ "people": [1, 2] });
        assert_eq!(plain.payload(response.clone()), response);
        assert_eq!(nested.payload(response), json!([1, 2]));
        assert_eq!(nested.payload(json!({ "errors": [] })), Value::Null);
        assert_eq!(nested.payload(json!([1])), Value::Null);
    }
}
