//! The slice of session state the validator needs: who is asking, and
//! which space they are in.

use ngqlc_ast::types::ValueType;
use serde::{Deserialize, Serialize};

use crate::catalog::SpaceDesc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpaceInfo {
    pub id: i32,
    pub name: String,
    pub vid_type: ValueType,
}

impl From<&SpaceDesc> for SpaceInfo {
    fn from(desc: &SpaceDesc) -> Self {
        SpaceInfo {
            id: desc.id,
            name: desc.name.clone(),
            vid_type: desc.vid_value_type(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user: String,
    pub space: Option<SpaceInfo>,
}

impl Session {
    pub fn new(user: &str) -> Self {
        Session {
            user: user.to_string(),
            space: None,
        }
    }

    pub fn with_space(user: &str, space: SpaceInfo) -> Self {
        Session {
            user: user.to_string(),
            space: Some(space),
        }
    }

    pub fn space_chosen(&self) -> bool {
        self.space.is_some()
    }
}
