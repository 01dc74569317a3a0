//! The authenticated principal.
//!
//! An [`Identity`] is always paired with a credential token by the session
//! store: both are set together on login or restore, and cleared together on
//! logout or invalidation. The wire format is the backend's camelCase JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role of an authenticated principal.
///
/// Wire values are `"user"` and `"admin"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum UserRole {
    #[default]
    #[serde(rename = "user")]
    Regular,
    #[serde(rename = "admin")]
    Administrator,
}

/// Account status of a principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    #[default]
    Active,
    Inactive,
    Pending,
}

/// Profile data of the authenticated principal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// Stable identifier assigned by the backend.
    pub id: String,
    /// Login name.
    pub username: String,
    /// Primary email address.
    pub email: String,
    /// Preferred display name, if set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    /// Avatar URL, if set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub role: UserRole,
    pub status: AccountStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<DateTime<Utc>>,
}

impl Identity {
    /// Name shown in the UI: the nickname when present, the username
    /// otherwise.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.nickname.as_deref().unwrap_or(&self.username)
    }

    /// Uppercased initials of the display name, at most two characters.
    ///
    /// The display name is split on whitespace and the first character of
    /// each part is taken, so `"Ada Lovelace"` becomes `"AL"` and a
    /// single-word name contributes one initial.
    #[must_use]
    pub fn initials(&self) -> String {
        self.display_name()
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .flat_map(char::to_uppercase)
            .take(2)
            .collect()
    }

    /// Whether this principal holds the administrator role.
    #[must_use]
    pub const fn is_administrator(&self) -> bool {
        matches!(self.role, UserRole::Administrator)
    }

    /// Merge a partial update into this identity.
    ///
    /// Only the fields present in the patch are replaced.
    pub fn apply(&mut self, patch: IdentityPatch) {
        if let Some(nickname) = patch.nickname {
            self.nickname = Some(nickname);
        }
        if let Some(avatar) = patch.avatar {
            self.avatar = Some(avatar);
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(last_login_at) = patch.last_login_at {
            self.last_login_at = Some(last_login_at);
        }
    }
}

/// Field-level update to an [`Identity`].
///
/// Absent fields leave the current value untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<AccountStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> Identity {
        Identity {
            id: "u-1".to_string(),
            username: "ada".to_string(),
            email: "ada@example.com".to_string(),
            nickname: None,
            avatar: None,
            role: UserRole::Regular,
            status: AccountStatus::Active,
            created_at: Utc::now(),
            last_login_at: None,
        }
    }

    #[test]
    fn test_display_name_prefers_nickname() {
        let mut id = identity();
        assert_eq!(id.display_name(), "ada");
        id.nickname = Some("Ada Lovelace".to_string());
        assert_eq!(id.display_name(), "Ada Lovelace");
    }

    #[test]
    fn test_initials_two_words() {
        let mut id = identity();
        id.nickname = Some("Ada Lovelace".to_string());
        assert_eq!(id.initials(), "AL");
    }

    #[test]
    fn test_initials_single_word() {
        let id = identity();
        assert_eq!(id.initials(), "A");
    }

    #[test]
    fn test_initials_capped_at_two() {
        let mut id = identity();
        id.nickname = Some("anne marie louise".to_string());
        assert_eq!(id.initials(), "AM");
    }

    #[test]
    fn test_role_wire_values() {
        assert_eq!(
            serde_json::to_string(&UserRole::Administrator).unwrap(),
            "\"admin\""
        );
        assert_eq!(
            serde_json::from_str::<UserRole>("\"user\"").unwrap(),
            UserRole::Regular
        );
    }

    #[test]
    fn test_identity_wire_names_are_camel_case() {
        let value = serde_json::to_value(identity()).unwrap();
        assert!(value.get("createdAt").is_some());
        assert!(value.get("created_at").is_none());
    }

    #[test]
    fn test_patch_merges_only_present_fields() {
        let mut id = identity();
        id.apply(IdentityPatch {
            nickname: Some("Ada".to_string()),
            ..IdentityPatch::default()
        });
        assert_eq!(id.nickname.as_deref(), Some("Ada"));
        assert_eq!(id.email, "ada@example.com");
        assert_eq!(id.status, AccountStatus::Active);
    }

    #[test]
    fn test_is_administrator() {
        let mut id = identity();
        assert!(!id.is_administrator());
        id.role = UserRole::Administrator;
        assert!(id.is_administrator());
    }
}
