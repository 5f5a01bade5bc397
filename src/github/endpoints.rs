// GitHub API endpoint functions.
// Provides typed methods for fetching data from the GitHub REST API.

use crate::error::Result;

use super::client::GitHubClient;
use super::types::{LanguageMap, Repository};

/// Largest page size the repos endpoint accepts.
const REPOS_PER_PAGE: u32 = 100;

impl GitHubClient {
    /// Get public repositories owned by a user.
    pub async fn get_user_repos(&self, user: &str) -> Result<Vec<Repository>> {
        let per_page = REPOS_PER_PAGE.to_string();
        let params = [("per_page", per_page.as_str())];
        let response = self
            .get_with_params(&format!("/users/{}/repos", user), &params)
            .await?;
        let repos: Vec<Repository> = response.json().await?;
        Ok(repos)
    }

    /// Get the language breakdown of a repository.
    pub async fn get_repo_languages(&self, owner: &str, repo: &str) -> Result<LanguageMap> {
        let response = self
            .get(&format!("/repos/{}/{}/languages", owner, repo))
            .await?;
        let languages: LanguageMap = response.json().await?;
        Ok(languages)
    }

    /// Get a language breakdown from a `languages_url` returned by the API.
    pub async fn get_languages_at(&self, url: &str) -> Result<LanguageMap> {
        let response = self.get_url(url).await?;
        let languages: LanguageMap = response.json().await?;
        Ok(languages)
    }
}
