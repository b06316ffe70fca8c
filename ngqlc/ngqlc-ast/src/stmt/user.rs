//! User and role management sentences.

use serde::{Deserialize, Serialize};

/// Per-space role, strongest first in authority:
/// GOD > ADMIN > DBA > USER > GUEST.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum RoleType {
    #[strum(serialize = "GOD")]
    God,
    #[strum(serialize = "ADMIN")]
    Admin,
    #[strum(serialize = "DBA")]
    Dba,
    #[strum(serialize = "USER")]
    User,
    #[strum(serialize = "GUEST")]
    Guest,
}

impl RoleType {
    /// Higher means more authority.
    pub fn rank(&self) -> u8 {
        match self {
            RoleType::God => 4,
            RoleType::Admin => 3,
            RoleType::Dba => 2,
            RoleType::User => 1,
            RoleType::Guest => 0,
        }
    }

    pub fn outranks(&self, other: RoleType) -> bool {
        self.rank() > other.rank()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateUserSentence {
    pub account: String,
    pub password: String,
    pub if_not_exists: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropUserSentence {
    pub account: String,
    pub if_exists: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlterUserSentence {
    pub account: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangePasswordSentence {
    pub account: String,
    pub old_password: String,
    pub new_password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrantSentence {
    pub role: RoleType,
    pub account: String,
    pub space: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevokeSentence {
    pub role: RoleType,
    pub account: String,
    pub space: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescribeUserSentence {
    pub account: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowRolesSentence {
    pub space: String,
}
