//! Route access policy, sidebar items and page tabs.

use crate::account::User;

/// Who is looking at the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Viewer {
    #[default]
    Anonymous,
    Customer,
    Admin,
}

impl Viewer {
    /// Classify the (possibly absent) signed-in user.
    #[must_use]
    pub fn of(user: Option<&User>) -> Self {
        match user {
            None => Self::Anonymous,
            Some(user) if user.is_admin => Self::Admin,
            Some(_) => Self::Customer,
        }
    }

    #[must_use]
    pub const fn is_authenticated(self) -> bool {
        !matches!(self, Self::Anonymous)
    }

    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

/// Outcome of an access check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Granted,
    RedirectTo(&'static str),
}

/// Who may open a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessPolicy {
    Public,
    /// Signed-in users only; everyone else goes to `/login`.
    Authenticated,
    /// Admins only; everyone else (signed in or not) goes to `/`.
    Admin,
}

impl AccessPolicy {
    #[must_use]
    pub const fn check(self, viewer: Viewer) -> Access {
        match (self, viewer) {
            (Self::Public, _)
            | (Self::Authenticated, Viewer::Customer | Viewer::Admin)
            | (Self::Admin, Viewer::Admin) => Access::Granted,
            (Self::Authenticated, Viewer::Anonymous) => Access::RedirectTo("/login"),
            (Self::Admin, _) => Access::RedirectTo("/"),
        }
    }
}

/// A sidebar link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavItem {
    pub name: &'static str,
    pub href: &'static str,
    pub active: bool,
}

/// Sidebar links visible to `viewer`, with the one at `current_path`
/// marked active.
#[must_use]
pub fn nav_items(viewer: Viewer, current_path: &str) -> Vec<NavItem> {
    let mut links = vec![("Home", "/")];
    if viewer.is_admin() {
        links.push(("Admin", "/admin"));
    }
    links.push(("Products", "/products"));
    if viewer.is_authenticated() {
        links.push(("Cart", "/cart"));
        links.push(("Profile", "/profile"));
    }

    links
        .into_iter()
        .map(|(name, href)| NavItem {
            name,
            href,
            active: href == current_path,
        })
        .collect()
}

/// Tabs of the admin dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdminTab {
    #[default]
    Overview,
    Categories,
    Products,
}

impl AdminTab {
    pub const ALL: [Self; 3] = [Self::Overview, Self::Categories, Self::Products];

    /// Parse the `?tab=` value. Unknown or missing values select the
    /// overview.
    #[must_use]
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("categories") => Self::Categories,
            Some("products") => Self::Products,
            _ => Self::Overview,
        }
    }

    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Overview => "overview",
            Self::Categories => "categories",
            Self::Products => "products",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Overview => "Overview",
            Self::Categories => "Categories",
            Self::Products => "Products",
        }
    }
}

/// Tabs of the profile page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProfileTab {
    #[default]
    Profile,
    Security,
}

impl ProfileTab {
    pub const ALL: [Self; 2] = [Self::Profile, Self::Security];

    #[must_use]
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("security") => Self::Security,
            _ => Self::Profile,
        }
    }

    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Profile => "profile",
            Self::Security => "security",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Profile => "Profile",
            Self::Security => "Security",
        }
    }
}
