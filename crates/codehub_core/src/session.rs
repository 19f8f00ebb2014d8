//! Session identity: who is acting, with which role, in which folder.

use crate::constants::{ANONYMOUS_USER, GENERAL_FOLDER_ID};
use serde::Serialize;

/// Privilege level resolved once when a session starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Member,
}

impl Role {
    /// Resolve the role for `user_name`.
    ///
    /// The admin name matches case-insensitively; an empty user is never admin.
    pub fn resolve(user_name: &str, admin_username: &str) -> Self {
        let user = user_name.trim();
        let admin = admin_username.trim();
        if !user.is_empty() && !admin.is_empty() && user.to_lowercase() == admin.to_lowercase() {
            Self::Admin
        } else {
            Self::Member
        }
    }
}

/// Acting user and active folder for one client session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    user_name: String,
    admin_username: String,
    role: Role,
    current_folder: String,
}

impl Session {
    /// Start a session; a blank `current_folder` falls back to `general`.
    pub fn new(user_name: &str, admin_username: &str, current_folder: &str) -> Self {
        let user_name = user_name.trim().to_string();
        let current_folder = match current_folder.trim() {
            "" => GENERAL_FOLDER_ID.to_string(),
            folder => folder.to_string(),
        };
        Self {
            role: Role::resolve(&user_name, admin_username),
            user_name,
            admin_username: admin_username.trim().to_string(),
            current_folder,
        }
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn is_signed_in(&self) -> bool {
        !self.user_name.is_empty()
    }

    pub fn current_folder(&self) -> &str {
        &self.current_folder
    }

    /// Name recorded as the uploader of new files.
    pub fn uploader_name(&self) -> &str {
        if self.user_name.is_empty() {
            ANONYMOUS_USER
        } else {
            &self.user_name
        }
    }

    pub(crate) fn set_user(&mut self, user_name: &str) {
        self.user_name = user_name.trim().to_string();
        self.role = Role::resolve(&self.user_name, &self.admin_username);
    }

    pub(crate) fn set_current_folder(&mut self, folder_id: &str) {
        self.current_folder = folder_id.to_string();
    }
}
