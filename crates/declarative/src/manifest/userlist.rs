//! Userlist manifests.
//!
//! On the wire users and groups are maps keyed by name with comma-joined
//! membership strings; manifests use plain lists.

use super::{Kind, Resource};
use crate::error::{Error, Result};
use crate::wire;
use dataplane::WireObject;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A user of a userlist.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct User {
    /// User name.
    #[serde(default)]
    pub name: String,
    /// Password hash, sent as a secure password.
    #[serde(default)]
    pub password: String,
    /// Groups the user belongs to.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<String>,
}

/// A group of a userlist.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Group {
    /// Group name.
    #[serde(default)]
    pub name: String,
    /// Members of the group.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub users: Vec<String>,
}

/// A userlist with its users and groups.
///
/// Equality ignores the order of users, groups and memberships.
#[derive(Debug, Clone, Default, Eq, Serialize, Deserialize)]
pub struct Userlist {
    /// Userlist name.
    #[serde(default)]
    pub name: String,
    /// Users.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub users: Vec<User>,
    /// Groups.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<Group>,
}

impl Userlist {
    /// Create an empty userlist.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    fn sorted(&self) -> (Vec<User>, Vec<Group>) {
        let mut users: Vec<User> = self
            .users
            .iter()
            .cloned()
            .map(|mut u| {
                u.groups.sort();
                u
            })
            .collect();
        users.sort();

        let mut groups: Vec<Group> = self
            .groups
            .iter()
            .cloned()
            .map(|mut g| {
                g.users.sort();
                g
            })
            .collect();
        groups.sort();

        (users, groups)
    }
}

impl PartialEq for Userlist {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.sorted() == other.sorted()
    }
}

impl Resource for Userlist {
    const KIND: Kind = Kind::Userlist;

    fn display_name(&self) -> String {
        self.name.clone()
    }

    fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::validation("userlist", "userlist name is required"));
        }
        if self.users.iter().any(|u| u.name.is_empty()) {
            return Err(Error::validation("userlist", "user entry is missing name"));
        }
        if self.groups.iter().any(|g| g.name.is_empty()) {
            return Err(Error::validation("userlist", "group entry is missing name"));
        }
        Ok(())
    }

    fn to_wire(&self) -> Result<WireObject> {
        self.validate()?;

        let mut obj = WireObject::new();
        obj.insert("name".to_string(), Value::String(self.name.clone()));

        let users: Map<String, Value> = self
            .users
            .iter()
            .map(|u| {
                let mut user = Map::new();
                user.insert("username".to_string(), Value::String(u.name.clone()));
                user.insert("password".to_string(), Value::String(u.password.clone()));
                user.insert("secure_password".to_string(), Value::Bool(true));
                wire::put_str(&mut user, "groups", &u.groups.join(","));
                (u.name.clone(), Value::Object(user))
            })
            .collect();
        wire::put_object(&mut obj, "users", &users);

        let groups: Map<String, Value> = self
            .groups
            .iter()
            .map(|g| {
                let mut group = Map::new();
                group.insert("name".to_string(), Value::String(g.name.clone()));
                wire::put_str(&mut group, "users", &g.users.join(","));
                (g.name.clone(), Value::Object(group))
            })
            .collect();
        wire::put_object(&mut obj, "groups", &groups);

        Ok(obj)
    }

    fn from_wire(obj: &WireObject) -> Self {
        let users = wire::object(obj, "users")
            .values()
            .filter_map(Value::as_object)
            .filter_map(|user| {
                let name = wire::string(user, "username");
                (!name.is_empty()).then(|| User {
                    name,
                    password: wire::string(user, "password"),
                    groups: wire::split_csv(&wire::string(user, "groups")),
                })
            })
            .collect();

        let groups = wire::object(obj, "groups")
            .values()
            .filter_map(Value::as_object)
            .filter_map(|group| {
                let name = wire::string(group, "name");
                (!name.is_empty()).then(|| Group {
                    name,
                    users: wire::split_csv(&wire::string(group, "users")),
                })
            })
            .collect();

        Self {
            name: wire::string(obj, "name"),
            users,
            groups,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ops() -> Userlist {
        serde_yaml::from_str(
            "name: ops\nusers:\n  - name: alice\n    password: $5$h\n    groups: [admin, dev]\n\
             groups:\n  - name: admin\n    users: [alice]\n",
        )
        .unwrap()
    }

    #[test]
    fn test_to_wire_shape() {
        let wire = Value::Object(ops().to_wire().unwrap());
        assert_eq!(
            wire,
            json!({
                "name": "ops",
                "users": {
                    "alice": {
                        "username": "alice",
                        "password": "$5$h",
                        "secure_password": true,
                        "groups": "admin,dev"
                    }
                },
                "groups": {"admin": {"name": "admin", "users": "alice"}}
            })
        );
    }

    #[test]
    fn test_from_wire_splits_membership() {
        let obj = json!({
            "name": "ops",
            "users": {"alice": {"username": "alice", "password": "$5$h", "groups": "admin, dev"}},
            "groups": {"admin": {"name": "admin", "users": "alice"}, "bad": "x"}
        });
        let userlist = Userlist::from_wire(obj.as_object().unwrap());
        assert_eq!(userlist, ops());
    }

    #[test]
    fn test_equality_ignores_order() {
        let mut a = ops();
        a.users.push(User {
            name: "bob".to_string(),
            ..User::default()
        });
        let mut b = a.clone();
        b.users.reverse();
        b.users[1].groups.reverse();
        assert_eq!(a, b);

        b.users[0].password = "changed".to_string();
        assert_ne!(a, b);
    }

    #[test]
    fn test_validate() {
        assert!(ops().validate().is_ok());
        assert!(Userlist::default().validate().is_err());

        let mut list = ops();
        list.groups.push(Group::default());
        let err = list.validate().unwrap_err();
        assert!(err.to_string().contains("group entry is missing name"));
    }

    #[test]
    fn test_empty_userlist_wire() {
        let wire = Value::Object(Userlist::new("empty").to_wire().unwrap());
        assert_eq!(wire, json!({"name": "empty"}));
    }
}
