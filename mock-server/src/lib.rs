use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::debug;

pub const DEFAULT_PER_PAGE: usize = 30;
const MAX_PER_PAGE: usize = 100;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Owner {
    pub login: String,
    pub id: u64,
    pub avatar_url: String,
    pub gravatar_id: String,
    pub url: String,
    pub received_events_url: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RepositoryRecord {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    #[serde(rename = "private")]
    pub is_private: bool,
    pub html_url: String,
    pub description: Option<String>,
    pub fork: bool,
    pub url: String,
    pub created_at: String,
    pub updated_at: String,
    pub pushed_at: Option<String>,
    pub homepage: Option<String>,
    pub size: u64,
    pub stargazers_count: u64,
    pub watchers_count: u64,
    pub language: Option<String>,
    pub forks_count: u64,
    pub open_issues_count: u64,
    pub default_branch: String,
    pub score: f64,
    pub owner: Owner,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    pub total_count: usize,
    pub incomplete_results: bool,
    pub items: Vec<RepositoryRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

/// Read-only set of repositories served by the mock.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    repositories: Vec<RepositoryRecord>,
}

impl Catalog {
    pub fn new(repositories: Vec<RepositoryRecord>) -> Self {
        Self { repositories }
    }

    /// 75 `hatena` repositories plus 12 `octocat` ones.
    pub fn sample() -> Self {
        let hatena = owner("hatena", 14185, "Organization");
        let octocat = owner("octocat", 583231, "User");
        let mut repositories: Vec<_> = (1..=75).map(|n| repository(n, &hatena)).collect();
        repositories.extend((76..=87).map(|n| repository(n, &octocat)));
        Self { repositories }
    }

    pub fn len(&self) -> usize {
        self.repositories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repositories.is_empty()
    }

    /// Repositories whose full name or description contains `query`,
    /// case-insensitively, in catalog order.
    pub fn matching(&self, query: &str) -> Vec<&RepositoryRecord> {
        let needle = query.to_lowercase();
        self.repositories
            .iter()
            .filter(|repo| {
                repo.full_name.to_lowercase().contains(&needle)
                    || repo
                        .description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&needle))
            })
            .collect()
    }

    pub fn owner(&self, login: &str) -> Option<&Owner> {
        self.repositories
            .iter()
            .map(|repo| &repo.owner)
            .find(|owner| owner.login == login)
    }
}

pub fn owner(login: &str, id: u64, kind: &str) -> Owner {
    Owner {
        login: login.to_string(),
        id,
        avatar_url: format!("https://avatars.githubusercontent.com/u/{id}?v=3"),
        gravatar_id: String::new(),
        url: format!("https://api.github.com/users/{login}"),
        received_events_url: format!("https://api.github.com/users/{login}/received_events"),
        kind: kind.to_string(),
    }
}

/// Deterministic repository number `n` belonging to `owner`.
pub fn repository(n: u64, owner: &Owner) -> RepositoryRecord {
    const LANGUAGES: [Option<&str>; 4] = [Some("Rust"), Some("Swift"), None, Some("Perl")];
    let name = format!("project-{n:03}");
    let full_name = format!("{}/{name}", owner.login);
    RepositoryRecord {
        id: 1000 + n,
        html_url: format!("https://github.com/{full_name}"),
        url: format!("https://api.github.com/repos/{full_name}"),
        description: (n % 3 != 0).then(|| format!("Sample project number {n}")),
        is_private: false,
        fork: n % 5 == 0,
        created_at: format!("2015-07-{:02}T09:00:00Z", 1 + n % 28),
        updated_at: "2015-08-01T12:00:00Z".to_string(),
        pushed_at: (n % 4 != 0).then(|| "2015-08-01T11:59:59Z".to_string()),
        homepage: (n % 2 == 0).then(String::new),
        size: n * 10,
        stargazers_count: n,
        watchers_count: n,
        language: LANGUAGES[(n % 4) as usize].map(str::to_string),
        forks_count: n / 2,
        open_issues_count: n % 7,
        default_branch: "master".to_string(),
        score: 1.0,
        owner: owner.clone(),
        name,
        full_name,
    }
}

#[derive(Clone)]
struct AppState {
    catalog: Arc<Catalog>,
    per_page: usize,
}

type ApiFailure = (StatusCode, Json<ErrorBody>);

fn failure(status: StatusCode, message: &str) -> ApiFailure {
    (
        status,
        Json(ErrorBody {
            message: message.to_string(),
        }),
    )
}

pub fn app() -> Router {
    app_with(Catalog::sample(), DEFAULT_PER_PAGE)
}

pub fn app_with(catalog: Catalog, per_page: usize) -> Router {
    let state = AppState {
        catalog: Arc::new(catalog),
        per_page: per_page.clamp(1, MAX_PER_PAGE),
    };
    Router::new()
        .route("/search/repositories", get(search_repositories))
        .route("/users/{login}", get(get_user))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    serve(listener, app()).await
}

pub async fn serve(listener: TcpListener, router: Router) -> Result<(), std::io::Error> {
    axum::serve(listener, router).await
}

async fn search_repositories(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiFailure> {
    let query = params.q.unwrap_or_default();
    if query.is_empty() {
        return Err(failure(StatusCode::UNPROCESSABLE_ENTITY, "Validation Failed"));
    }
    let page = params.page.unwrap_or(1).max(1);
    let per_page = params
        .per_page
        .unwrap_or(state.per_page)
        .clamp(1, MAX_PER_PAGE);

    let matches = state.catalog.matching(&query);
    let items: Vec<RepositoryRecord> = matches
        .iter()
        .skip((page - 1).saturating_mul(per_page))
        .take(per_page)
        .map(|repo| (*repo).clone())
        .collect();
    debug!(%query, page, per_page, total = matches.len(), returned = items.len(), "search");

    Ok(Json(SearchResponse {
        total_count: matches.len(),
        incomplete_results: false,
        items,
    }))
}

async fn get_user(
    State(state): State<AppState>,
    Path(login): Path<String>,
) -> Result<Json<Owner>, ApiFailure> {
    state
        .catalog
        .owner(&login)
        .cloned()
        .map(Json)
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "Not Found"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repository_serializes_wire_keys() {
        let repo = repository(6, &owner("hatena", 1, "Organization"));
        let json = serde_json::to_value(&repo).unwrap();
        assert_eq!(json["private"], false);
        assert_eq!(json["owner"]["type"], "Organization");
        assert_eq!(json["full_name"], "hatena/project-006");
        assert!(json["description"].is_null());
        assert_eq!(json["homepage"], "");
        assert!(json.get("is_private").is_none());
    }

    #[test]
    fn sample_catalog_matching() {
        let catalog = Catalog::sample();
        assert_eq!(catalog.len(), 87);
        assert_eq!(catalog.matching("HATENA").len(), 75);
        assert_eq!(catalog.matching("octocat").len(), 12);
        assert_eq!(catalog.matching("project-00").len(), 9);
        assert!(catalog.matching("nothing-like-this").is_empty());
    }

    #[test]
    fn matching_checks_description() {
        let catalog = Catalog::sample();
        let hits = catalog.matching("number 7");
        assert!(hits.iter().all(|repo| repo.description.is_some()));
        assert!(hits.iter().any(|repo| repo.id == 1007));
    }

    #[test]
    fn owner_lookup() {
        let catalog = Catalog::sample();
        assert_eq!(catalog.owner("octocat").unwrap().id, 583231);
        assert!(catalog.owner("ghost").is_none());
    }
}
