use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Owner/name pair identifying a repository on the hosting platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryReference {
    pub owner: String,
    pub name: String,
}

impl fmt::Display for RepositoryReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Extract the owner/name pair from a repository URL.
///
/// Returns `None` when the text is not a URL or its path has fewer than two
/// non-empty segments. Segments are returned verbatim; whether the repository
/// exists is only discovered when its metadata is fetched.
pub fn parse_repository_url(input: &str) -> Option<RepositoryReference> {
    let url = Url::parse(input.trim()).ok()?;
    let mut segments = url.path().split('/').filter(|s| !s.is_empty());
    let owner = segments.next()?;
    let name = segments.next()?;
    Some(RepositoryReference {
        owner: owner.to_string(),
        name: name.to_string(),
    })
}
