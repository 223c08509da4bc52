//! Route values and the fragment grammar `<path>[?<key>=<value>&...]`.

use std::collections::BTreeMap;
use url::form_urlencoded;

/// Route shown when the fragment carries no path.
pub const DEFAULT_ROUTE: &str = "inbox";

/// Route identifier plus decoded query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub path: String,
    pub params: BTreeMap<String, String>,
}

impl Default for Route {
    fn default() -> Self {
        Self::new(DEFAULT_ROUTE)
    }
}

impl Route {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            params: BTreeMap::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Parses a fragment, with or without its leading `#`.
    ///
    /// Splits on the first `?`. A pair without `=` yields an empty value,
    /// pairs with an empty key are dropped and a repeated key keeps its
    /// last value.
    pub fn parse(fragment: &str) -> Self {
        let fragment = fragment.strip_prefix('#').unwrap_or(fragment);
        let (path, query) = match fragment.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (fragment, None),
        };

        let path = if path.is_empty() { DEFAULT_ROUTE } else { path };
        let params = query
            .map(|query| {
                form_urlencoded::parse(query.as_bytes())
                    .filter(|(key, _)| !key.is_empty())
                    .map(|(key, value)| (key.into_owned(), value.into_owned()))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            path: path.to_string(),
            params,
        }
    }

    /// Serializes to a fragment without the leading `#`.
    pub fn to_fragment(&self) -> String {
        if self.params.is_empty() {
            return self.path.clone();
        }
        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.params.iter())
            .finish();
        format!("{}?{}", self.path, query)
    }
}

#[cfg(test)]
mod tests {
    use super::{Route, DEFAULT_ROUTE};

    #[test]
    fn missing_path_defaults_to_inbox() {
        assert_eq!(Route::parse("").path, DEFAULT_ROUTE);
        assert_eq!(Route::parse("#").path, DEFAULT_ROUTE);
        assert_eq!(Route::parse("#?focus=input").param("focus"), Some("input"));
    }

    #[test]
    fn splits_on_first_question_mark_only() {
        let route = Route::parse("#clarify?thingId=3&note=a?b");
        assert_eq!(route.path, "clarify");
        assert_eq!(route.param("thingId"), Some("3"));
        assert_eq!(route.param("note"), Some("a?b"));
    }

    #[test]
    fn pair_without_equals_yields_empty_value() {
        let route = Route::parse("actions?filter&x=1");
        assert_eq!(route.param("filter"), Some(""));
        assert_eq!(route.param("x"), Some("1"));
    }

    #[test]
    fn values_are_percent_decoded() {
        let route = Route::parse("inbox?q=%ED%95%A0%20%EC%9D%BC&plus=a+b");
        assert_eq!(route.param("q"), Some("할 일"));
        assert_eq!(route.param("plus"), Some("a b"));
    }

    #[test]
    fn fragment_without_params_has_no_query() {
        assert_eq!(Route::new("review").to_fragment(), "review");
    }
}
