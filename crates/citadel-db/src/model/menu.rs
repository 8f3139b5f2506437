use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Status;

/// Discriminates what a menu node renders as in the admin frontend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MenuType {
    /// A navigable page.
    #[serde(rename = "M")]
    Menu,
    /// An action button inside a page; only carries a permission code.
    #[serde(rename = "B")]
    Button,
    /// External link.
    #[serde(rename = "L")]
    Link,
    /// Embedded iframe.
    #[serde(rename = "I")]
    Iframe,
}

/// A node of the menu forest. `parent_id == 0` marks a root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Menu {
    pub id: u64,
    pub parent_id: u64,
    pub name: String,
    /// Permission code guarding this node.
    pub code: String,
    pub icon: String,
    pub route: String,
    pub component: String,
    pub redirect: String,
    pub is_hidden: bool,
    #[serde(rename = "type")]
    pub menu_type: MenuType,
    pub status: Status,
    pub sort: i32,
    pub remark: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Menu {
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.parent_id == 0
    }
}

#[derive(Debug, Clone)]
pub struct NewMenu {
    pub parent_id: u64,
    pub name: String,
    pub code: String,
    pub icon: String,
    pub route: String,
    pub component: String,
    pub redirect: String,
    pub is_hidden: bool,
    pub menu_type: MenuType,
    pub status: Status,
    pub sort: i32,
    pub remark: String,
}

impl NewMenu {
    /// A page entry with no icon, redirect or remark.
    #[must_use]
    pub fn page(parent_id: u64, name: &str, code: &str, route: &str, component: &str) -> Self {
        Self {
            parent_id,
            name: name.to_string(),
            code: code.to_string(),
            icon: String::new(),
            route: route.to_string(),
            component: component.to_string(),
            redirect: String::new(),
            is_hidden: false,
            menu_type: MenuType::Menu,
            status: Status::Enable,
            sort: 0,
            remark: String::new(),
        }
    }

    /// A button entry under `parent_id` that only carries a permission code.
    #[must_use]
    pub fn button(parent_id: u64, name: &str, code: &str) -> Self {
        Self {
            menu_type: MenuType::Button,
            is_hidden: true,
            ..Self::page(parent_id, name, code, "", "")
        }
    }
}
