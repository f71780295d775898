use crate::model::ConfigError;
use itertools::Itertools;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Eq, Hash, PartialEq)]
pub struct Member {
    pub username: String,
    pub display_name: String,
}

/// Team roster in configuration order. A member's position is its mock seed.
#[derive(Debug, Clone)]
pub struct Team {
    pub name: String,
    pub members: Vec<Member>,
}

#[derive(Deserialize)]
struct TeamConfig {
    #[serde(default = "default_team_name")]
    team_name: String,
    #[serde(default)]
    members: Vec<MemberConfig>,
}

#[derive(Deserialize)]
struct MemberConfig {
    #[serde(default)]
    github_username: String,
    display_name: Option<String>,
}

fn default_team_name() -> String {
    "Team".to_string()
}

// Create
impl Member {
    pub fn new(username: impl ToString, display_name: impl ToString) -> Self {
        Self {
            username: username.to_string(),
            display_name: display_name.to_string(),
        }
    }
}

impl Team {
    pub fn from_config(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let json_str = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: TeamConfig =
            serde_json::from_str(&json_str).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        let members = config
            .members
            .into_iter()
            .filter(|m| !m.github_username.trim().is_empty())
            .map(|m| {
                let display_name = m.display_name.unwrap_or_else(|| m.github_username.clone());
                Member::new(m.github_username.trim(), display_name)
            })
            .collect::<Vec<_>>();
        if members.is_empty() {
            return Err(ConfigError::EmptyRoster(path.to_path_buf()));
        }
        Self::new(config.team_name, members)
    }

    pub fn new(name: impl ToString, members: Vec<Member>) -> Result<Self, ConfigError> {
        if let Some(duplicate) = members.iter().map(|m| &m.username).duplicates().next() {
            return Err(ConfigError::DuplicateMember(duplicate.clone()));
        }
        Ok(Self {
            name: name.to_string(),
            members,
        })
    }

    pub fn position(&self, username: &str) -> Option<usize> {
        self.members.iter().position(|m| m.username == username)
    }
}
