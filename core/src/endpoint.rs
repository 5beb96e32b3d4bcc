//! Declarative descriptions of API operations.
//!
//! # Design
//! An `Endpoint` names its method, path, query parameters and the model its
//! response decodes into. `ApiClient` is generic over `Endpoint`, so adding
//! an operation means adding a type here and nothing else.
//!
//! Paths are lists of raw segments, not strings. The client percent-encodes
//! each one, so caller input such as a login never acts as URL syntax.

use std::borrow::Cow;
use std::fmt;

use crate::decode::JsonDecodable;
use crate::http::HttpMethod;
use crate::types::{Repository, SearchResult, User};

/// Query parameters in insertion order.
///
/// Optional values are dropped when they are added, so the request never
/// carries an empty placeholder for something the caller left unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl ToString) -> Self {
        self.0.push((key.to_string(), value.to_string()));
        self
    }

    pub fn with_opt<V: ToString>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.with(key, value),
            None => self,
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// An HTTP operation bound to the model its response decodes into.
pub trait Endpoint {
    type Response: JsonDecodable;

    fn method(&self) -> HttpMethod {
        HttpMethod::Get
    }

    /// Unencoded path segments appended to the client's base URL.
    fn path_segments(&self) -> Vec<Cow<'_, str>>;

    fn parameters(&self) -> QueryParams {
        QueryParams::new()
    }
}

/// A search endpoint that can be re-issued page by page for the same query.
pub trait PagedSearch: Endpoint {
    type Item;

    fn for_page(query: &str, page: u32) -> Self;

    fn into_page(response: Self::Response) -> SearchResult<Self::Item>;
}

/// Sort field accepted by `search/repositories`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositorySort {
    Stars,
    Forks,
    HelpWantedIssues,
    Updated,
}

impl fmt::Display for RepositorySort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RepositorySort::Stars => "stars",
            RepositorySort::Forks => "forks",
            RepositorySort::HelpWantedIssues => "help-wanted-issues",
            RepositorySort::Updated => "updated",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        })
    }
}

/// `GET search/repositories?q=…&page=…`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRepositories {
    pub query: String,
    pub page: u32,
    pub sort: Option<RepositorySort>,
    pub order: Option<SortOrder>,
    pub per_page: Option<u32>,
}

impl SearchRepositories {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            page: 1,
            sort: None,
            order: None,
            per_page: None,
        }
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub fn sort(mut self, sort: RepositorySort, order: SortOrder) -> Self {
        self.sort = Some(sort);
        self.order = Some(order);
        self
    }

    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }
}

impl Endpoint for SearchRepositories {
    type Response = SearchResult<Repository>;

    fn path_segments(&self) -> Vec<Cow<'_, str>> {
        vec![Cow::Borrowed("search"), Cow::Borrowed("repositories")]
    }

    fn parameters(&self) -> QueryParams {
        QueryParams::new()
            .with("q", &self.query)
            .with("page", self.page)
            .with_opt("sort", self.sort)
            .with_opt("order", self.order)
            .with_opt("per_page", self.per_page)
    }
}

impl PagedSearch for SearchRepositories {
    type Item = Repository;

    fn for_page(query: &str, page: u32) -> Self {
        Self::new(query).page(page)
    }

    fn into_page(response: Self::Response) -> SearchResult<Repository> {
        response
    }
}

/// `GET users/{login}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetUser {
    pub login: String,
}

impl GetUser {
    pub fn new(login: impl Into<String>) -> Self {
        Self {
            login: login.into(),
        }
    }
}

impl Endpoint for GetUser {
    type Response = User;

    fn path_segments(&self) -> Vec<Cow<'_, str>> {
        vec![Cow::Borrowed("users"), Cow::Borrowed(self.login.as_str())]
    }
}
