use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;

/// A source repository whose tasks agents may coordinate on
///
/// Projects are created once at startup and never change afterwards. The
/// serialized field names follow what agents already consume, so
/// `coordination_enabled` travels as `bzzz_enabled` and `claimable` as
/// `ready_to_claim`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    #[serde(rename = "project_id")]
    pub id: u64,
    pub name: String,
    pub git_url: String,
    pub owner: String,
    pub repository: String,
    pub branch: String,
    #[serde(rename = "bzzz_enabled")]
    pub coordination_enabled: bool,
    #[serde(rename = "ready_to_claim")]
    pub claimable: bool,
    pub private_repo: bool,
    pub github_token_required: bool,
}

impl Project {
    /// Creates a public, claimable project on the `main` branch of
    /// `https://github.com/{owner}/{repository}`
    pub fn new(
        id: u64,
        name: impl Into<String>,
        owner: impl Into<String>,
        repository: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::EmptyProjectName);
        }
        let owner = owner.into();
        let repository = repository.into();

        Ok(Self {
            id,
            name,
            git_url: format!("https://github.com/{}/{}", owner, repository),
            owner,
            repository,
            branch: "main".to_string(),
            coordination_enabled: true,
            claimable: true,
            private_repo: false,
            github_token_required: false,
        })
    }

    pub fn with_git_url(mut self, git_url: impl Into<String>) -> Self {
        self.git_url = git_url.into();
        self
    }

    pub fn with_flags(mut self, coordination_enabled: bool, claimable: bool) -> Self {
        self.coordination_enabled = coordination_enabled;
        self.claimable = claimable;
        self
    }

    /// Whether agents should be offered this project at all
    pub fn is_active(&self) -> bool {
        self.coordination_enabled && self.claimable
    }
}
