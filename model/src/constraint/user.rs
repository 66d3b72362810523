//! FILENAME: model/src/constraint/user.rs
//! User constraint: values are e-mail addresses resolved against the user
//! directory in `ConstraintData`.

use std::cmp::Ordering;
use serde::{Deserialize, Serialize};
use crate::constraint::{list_to_raw, raw_to_list, ConstraintData};
use crate::record::RawValue;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: String,
}

impl User {
    pub fn new(id: impl Into<String>, email: impl Into<String>, name: impl Into<String>) -> Self {
        User {
            id: id.into(),
            email: email.into(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(default)]
    pub multi: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserDataValue {
    emails: Vec<String>,
    /// Display names resolved at creation; `None` for unknown users.
    names: Vec<Option<String>>,
    multi: bool,
}

impl UserDataValue {
    pub fn new(raw: &RawValue, config: &UserConfig, context: &ConstraintData) -> Self {
        let emails = raw_to_list(raw);
        let names = emails
            .iter()
            .map(|email| {
                context
                    .user_by_email(email)
                    .map(|u| if u.name.is_empty() { u.email.clone() } else { u.name.clone() })
            })
            .collect();
        UserDataValue {
            emails,
            names,
            multi: config.multi,
        }
    }

    pub fn is_valid(&self) -> bool {
        (self.multi || self.emails.len() <= 1) && self.names.iter().all(Option::is_some)
    }

    pub fn format(&self) -> String {
        self.emails
            .iter()
            .zip(&self.names)
            .map(|(email, name)| name.clone().unwrap_or_else(|| email.clone()))
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn serialize(&self) -> RawValue {
        list_to_raw(&self.emails, self.multi)
    }

    pub fn compare_to(&self, other: &UserDataValue) -> Ordering {
        self.format()
            .to_lowercase()
            .cmp(&other.format().to_lowercase())
            .then_with(|| self.emails.cmp(&other.emails))
    }
}
