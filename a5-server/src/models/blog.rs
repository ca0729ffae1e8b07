//! Blog entity

use serde::{Deserialize, Serialize};

use super::validation::{require_min_len, ValidationError};

const MIN_NAME_LEN: usize = 3;
const MIN_HANDLE_LEN: usize = 2;

/// A blog, owned by exactly one user.
///
/// `id` is assigned by the store on first save. `user` is filled in by the
/// store from the principal that created the blog and is ignored on input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blog {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    pub handle: String,
    #[serde(default)]
    pub user: Option<UserRef>,
}

/// Owner of a blog as exposed in responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    pub id: i64,
    #[serde(default)]
    pub login: String,
}

impl Blog {
    pub fn new(name: impl Into<String>, handle: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            handle: handle.into(),
            user: None,
        }
    }

    /// Check field constraints.
    ///
    /// - `name` is required, at least 3 characters
    /// - `handle` is required, at least 2 characters
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_min_len("name", &self.name, MIN_NAME_LEN)?;
        require_min_len("handle", &self.handle, MIN_HANDLE_LEN)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validates_lengths() {
        assert!(Blog::new("Jane's blog", "jane").validate().is_ok());

        let err = Blog::new("ab", "jane").validate().unwrap_err();
        assert_eq!(err, ValidationError::TooShort { field: "name", min: 3 });

        let err = Blog::new("Jane's blog", "").validate().unwrap_err();
        assert_eq!(err, ValidationError::Empty { field: "handle" });
    }

    #[test]
    fn deserializes_without_id_or_user() {
        let blog: Blog = serde_json::from_str(r#"{"name":"Notes","handle":"notes"}"#).unwrap();
        assert_eq!(blog.id, None);
        assert_eq!(blog.user, None);
    }

    #[test]
    fn serializes_owner() {
        let blog = Blog {
            id: Some(7),
            name: "Notes".into(),
            handle: "notes".into(),
            user: Some(UserRef {
                id: 1,
                login: "jane".into(),
            }),
        };
        let json = serde_json::to_value(&blog).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["user"]["login"], "jane");
    }
}
