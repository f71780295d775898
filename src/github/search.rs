use crate::model::{ActivityItem, ConfigError, Error, FetchError};
use serde::Deserialize;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

const GH: &str = "gh";

/// Remote lookup of pull requests a user reviewed.
pub trait ReviewSource {
    async fn search_reviewed(
        &self,
        user: &str,
        start: &str,
        end: &str,
        limit: usize,
    ) -> Result<Vec<ActivityItem>, FetchError>;
}

/// `gh search prs` backed source.
#[derive(Debug, Clone)]
pub struct GhCli {
    program: PathBuf,
    timeout: Duration,
}

#[derive(Deserialize)]
struct GhPullRequest {
    number: u64,
    repository: GhRepository,
    url: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GhRepository {
    name_with_owner: String,
}

impl GhCli {
    /// Locates the `gh` executable.
    pub fn locate(timeout: Duration) -> Result<Self, ConfigError> {
        let program = which::which(GH).map_err(|_| ConfigError::MissingTool(GH.to_string()))?;
        Ok(Self { program, timeout })
    }

    pub async fn check_auth(&self) -> Result<(), Error> {
        let output = Command::new(&self.program)
            .args(["auth", "status"])
            .stdin(Stdio::null())
            .output()
            .await?;
        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(Error::Authentication(stderr.trim().to_string()))
        }
    }
}

impl ReviewSource for GhCli {
    async fn search_reviewed(
        &self,
        user: &str,
        start: &str,
        end: &str,
        limit: usize,
    ) -> Result<Vec<ActivityItem>, FetchError> {
        let mut command = Command::new(&self.program);
        command
            .args(["search", "prs"])
            .arg(format!("--reviewed-by={}", user))
            .arg(format!("--created={}..{}", start, end))
            .arg(format!("--limit={}", limit))
            .args(["--json", "number,repository,url"])
            .stdin(Stdio::null())
            .kill_on_drop(true);
        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| FetchError::Timeout(self.timeout))??;
        if !output.status.success() {
            return Err(FetchError::Rejected {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        parse_search_output(&output.stdout)
    }
}

pub fn parse_search_output(stdout: &[u8]) -> Result<Vec<ActivityItem>, FetchError> {
    let pull_requests: Vec<GhPullRequest> = serde_json::from_slice(stdout)?;
    Ok(pull_requests
        .into_iter()
        .map(|pr| ActivityItem {
            pr: pr.number,
            repo: pr.repository.name_with_owner,
            url: pr.url,
        })
        .collect())
}
