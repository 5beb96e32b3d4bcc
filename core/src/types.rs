//! Response models for the GitHub search API.
//!
//! # Design
//! Models are decoded by hand through the `decode` combinators rather than
//! with serde derives, so every failure names the exact key and reason.
//! Field names follow Rust conventions; the wire keys are listed next to
//! each decoder call.

use time::OffsetDateTime;
use url::Url;

use crate::decode::{
    decode_array, decode_date, decode_object, decode_optional, decode_optional_date,
    decode_required, decode_url, JsonDecodable, JsonObject,
};
use crate::error::DecodeError;

/// One page of search output plus the server's total-count metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult<T> {
    pub total_count: u64,
    pub incomplete_results: bool,
    pub items: Vec<T>,
}

impl<T: JsonDecodable> JsonDecodable for SearchResult<T> {
    fn from_json(json: &JsonObject) -> Result<Self, DecodeError> {
        Ok(Self {
            total_count: decode_required(json, "total_count")?,
            incomplete_results: decode_required(json, "incomplete_results")?,
            items: decode_array(json, "items")?,
        })
    }
}

/// A GitHub account, as embedded in a repository or returned by `users/{login}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub login: String,
    pub id: u64,
    pub avatar_url: Url,
    pub gravatar_id: String,
    pub url: Url,
    pub received_events_url: Url,
    /// Wire key `type`, e.g. `"User"` or `"Organization"`.
    pub kind: String,
}

impl JsonDecodable for User {
    fn from_json(json: &JsonObject) -> Result<Self, DecodeError> {
        Ok(Self {
            login: decode_required(json, "login")?,
            id: decode_required(json, "id")?,
            avatar_url: decode_url(json, "avatar_url")?,
            gravatar_id: decode_required(json, "gravatar_id")?,
            url: decode_url(json, "url")?,
            received_events_url: decode_url(json, "received_events_url")?,
            kind: decode_required(json, "type")?,
        })
    }
}

/// A repository search hit.
#[derive(Debug, Clone, PartialEq)]
pub struct Repository {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub is_private: bool,
    pub html_url: Url,
    pub description: Option<String>,
    pub fork: bool,
    pub url: Url,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub pushed_at: Option<OffsetDateTime>,
    /// Free text: the API sends `""` for repositories without a homepage.
    pub homepage: Option<String>,
    pub size: u64,
    pub stargazers_count: u64,
    pub watchers_count: u64,
    pub language: Option<String>,
    pub forks_count: u64,
    pub open_issues_count: u64,
    pub master_branch: Option<String>,
    pub default_branch: String,
    pub score: f64,
    pub owner: User,
}

impl JsonDecodable for Repository {
    fn from_json(json: &JsonObject) -> Result<Self, DecodeError> {
        Ok(Self {
            id: decode_required(json, "id")?,
            name: decode_required(json, "name")?,
            full_name: decode_required(json, "full_name")?,
            is_private: decode_required(json, "private")?,
            html_url: decode_url(json, "html_url")?,
            description: decode_optional(json, "description")?,
            fork: decode_required(json, "fork")?,
            url: decode_url(json, "url")?,
            created_at: decode_date(json, "created_at")?,
            updated_at: decode_date(json, "updated_at")?,
            pushed_at: decode_optional_date(json, "pushed_at")?,
            homepage: decode_optional(json, "homepage")?,
            size: decode_required(json, "size")?,
            stargazers_count: decode_required(json, "stargazers_count")?,
            watchers_count: decode_required(json, "watchers_count")?,
            language: decode_optional(json, "language")?,
            forks_count: decode_required(json, "forks_count")?,
            open_issues_count: decode_required(json, "open_issues_count")?,
            master_branch: decode_optional(json, "master_branch")?,
            default_branch: decode_required(json, "default_branch")?,
            score: decode_required(json, "score")?,
            owner: decode_object(json, "owner")?,
        })
    }
}
