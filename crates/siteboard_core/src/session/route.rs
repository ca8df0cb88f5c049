//! Dashboard routes and their access classification.

use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    Signup,
    ProjectSelection,
    NewProject,
    Dashboard { project_id: String },
    Users,
    ProjectManagement,
    Inventory,
    Finance,
    Fundis,
    Notifications,
    Settings,
}

impl Route {
    /// Maps a path to a route. Unknown paths return `None`.
    pub fn parse(path: &str) -> Option<Self> {
        let trimmed = path.trim().trim_end_matches('/');
        let route = match trimmed {
            "/login" => Self::Login,
            "/signup" => Self::Signup,
            "/projects" => Self::ProjectSelection,
            "/projects/new" => Self::NewProject,
            "/users" => Self::Users,
            "/manage/projects" => Self::ProjectManagement,
            "/inventory" => Self::Inventory,
            "/finance" => Self::Finance,
            "/fundis" => Self::Fundis,
            "/notifications" => Self::Notifications,
            "/settings" => Self::Settings,
            other => {
                let project_id = other.strip_prefix("/dashboard/")?;
                if project_id.is_empty() || project_id.contains('/') {
                    return None;
                }
                Self::Dashboard {
                    project_id: project_id.to_string(),
                }
            }
        };
        Some(route)
    }

    /// Whether the route is reachable without an identity.
    pub fn is_public(&self) -> bool {
        matches!(self, Self::Login | Self::Signup)
    }

    pub fn path(&self) -> String {
        match self {
            Self::Login => "/login".to_string(),
            Self::Signup => "/signup".to_string(),
            Self::ProjectSelection => "/projects".to_string(),
            Self::NewProject => "/projects/new".to_string(),
            Self::Dashboard { project_id } => format!("/dashboard/{project_id}"),
            Self::Users => "/users".to_string(),
            Self::ProjectManagement => "/manage/projects".to_string(),
            Self::Inventory => "/inventory".to_string(),
            Self::Finance => "/finance".to_string(),
            Self::Fundis => "/fundis".to_string(),
            Self::Notifications => "/notifications".to_string(),
            Self::Settings => "/settings".to_string(),
        }
    }
}

impl Display for Route {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path())
    }
}

/// Outcome of guarding a route against the current session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    Allow(Route),
    Redirect(Route),
}
