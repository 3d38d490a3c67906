use std::fmt;
use std::str::FromStr;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("No route matches '{0}'")]
    NotFound(String),
}

/// Screens reachable by path. `/` is an alias of `/gallery`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Gallery,
    Upload,
    Settings,
    Login,
}

impl Route {
    pub const ALL: [Self; 4] = [Self::Gallery, Self::Upload, Self::Settings, Self::Login];

    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Gallery => "/gallery",
            Self::Upload => "/upload",
            Self::Settings => "/settings",
            Self::Login => "/login",
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Gallery => "gallery",
            Self::Upload => "upload",
            Self::Settings => "settings",
            Self::Login => "login",
        }
    }

    /// Resolves a location such as `#/upload/?tab=1` to its route.
    pub fn resolve(location: &str) -> Result<Self, RouteError> {
        let path = normalize(location);
        if path == "/" {
            return Ok(Self::Gallery);
        }
        Self::ALL
            .into_iter()
            .find(|r| r.path() == path)
            .ok_or_else(|| RouteError::NotFound(location.to_string()))
    }

    /// Where an unauthorized request sends the user: the login screen,
    /// unless it is already displayed.
    #[must_use]
    pub fn on_unauthorized(self) -> Option<Self> {
        (self != Self::Login).then_some(Self::Login)
    }
}

fn normalize(location: &str) -> String {
    let location = location.trim();
    let location = location.strip_prefix('#').unwrap_or(location);
    let path = location
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .trim_end_matches('/');
    if path.starts_with('/') {
        path.to_ascii_lowercase()
    } else {
        format!("/{}", path.to_ascii_lowercase())
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path())
    }
}

impl FromStr for Route {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::resolve(s)
    }
}
