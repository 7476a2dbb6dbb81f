//! Blocking GitLab REST v4 client.
//!
//! Thin wrapper over a shared [`ureq::Agent`]: token header on every request,
//! `per_page=100` pagination following the `x-next-page` header. Implements
//! [`GroupDirectory`] so the tree walker never sees HTTP details.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::GitlabError;
use crate::walker::{GroupDirectory, GroupProject, GroupRef};

const PER_PAGE: &str = "100";

pub struct GitlabClient {
    agent: ureq::Agent,
    base_url: String,
    token: String,
}

impl GitlabClient {
    /// `base_url` is the instance root, e.g. `https://gitlab.com`.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(30))
            .build();
        Self {
            agent,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    /// Resolve a group by its full path (`parent/child`). GitLab's search is
    /// fuzzy, so results are matched on `full_path` exactly.
    pub fn find_group(&self, full_path: &str) -> Result<GroupRef, GitlabError> {
        let groups: Vec<ApiGroup> = self.get_paged("/groups", &[("search", full_path)])?;
        groups
            .into_iter()
            .find(|g| g.full_path == full_path)
            .map(GroupRef::from)
            .ok_or_else(|| GitlabError::GroupNotFound {
                path: full_path.to_string(),
            })
    }

    fn get_paged<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>, GitlabError> {
        let url = format!("{}/api/v4{path}", self.base_url);
        let mut items = Vec::new();
        let mut page = String::from("1");

        loop {
            tracing::debug!(%url, page = %page, "gitlab request");
            let mut request = self
                .agent
                .get(&url)
                .set("PRIVATE-TOKEN", &self.token)
                .query("per_page", PER_PAGE)
                .query("page", &page);
            for (key, value) in query {
                request = request.query(key, value);
            }

            let response = request.call().map_err(|e| GitlabError::Http {
                url: url.clone(),
                source: Box::new(e),
            })?;
            let next_page = response
                .header("x-next-page")
                .unwrap_or_default()
                .to_string();
            let mut batch: Vec<T> =
                response.into_json().map_err(|e| GitlabError::Decode {
                    url: url.clone(),
                    source: e,
                })?;
            items.append(&mut batch);

            if next_page.is_empty() {
                return Ok(items);
            }
            page = next_page;
        }
    }
}

impl GroupDirectory for GitlabClient {
    fn list_projects(&self, group: &GroupRef) -> Result<Vec<GroupProject>, GitlabError> {
        let projects: Vec<ApiProject> =
            self.get_paged(&format!("/groups/{}/projects", group.id), &[])?;
        Ok(projects.into_iter().map(GroupProject::from).collect())
    }

    fn list_subgroups(&self, group: &GroupRef) -> Result<Vec<GroupRef>, GitlabError> {
        let groups: Vec<ApiGroup> =
            self.get_paged(&format!("/groups/{}/subgroups", group.id), &[])?;
        Ok(groups.into_iter().map(GroupRef::from).collect())
    }
}

// ---------------------------------------------------------------------------
// API payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ApiGroup {
    id: u64,
    full_path: String,
}

impl From<ApiGroup> for GroupRef {
    fn from(g: ApiGroup) -> Self {
        Self {
            id: g.id,
            full_path: g.full_path,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiProject {
    path_with_namespace: String,
    /// Null for repositories without a single commit.
    #[serde(default)]
    default_branch: Option<String>,
    ssh_url_to_repo: String,
    #[serde(default)]
    archived: bool,
    #[serde(default)]
    shared_with_groups: Vec<serde::de::IgnoredAny>,
}

impl From<ApiProject> for GroupProject {
    fn from(p: ApiProject) -> Self {
        Self {
            path_with_namespace: p.path_with_namespace,
            default_branch: p.default_branch.unwrap_or_default(),
            clone_url: p.ssh_url_to_repo,
            archived: p.archived,
            shared: !p.shared_with_groups.is_empty(),
        }
    }
}
