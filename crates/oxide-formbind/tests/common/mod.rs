#![allow(dead_code)]

use std::collections::HashMap;

use chrono::NaiveDate;
use oxide_formbind::validation::required;
use oxide_formbind::{FieldDef, FormValues, Record};

#[derive(Debug, Default, Record)]
pub struct TestData {
    pub name: String,
    pub age: i32,
}

#[derive(Debug, Default, Record)]
pub struct Address {
    pub city: String,
    pub zip: Option<u32>,
}

#[derive(Debug, Default, Record)]
pub struct Profile {
    pub name: String,
    pub address: Address,
    pub extra: HashMap<String, String>,
    pub nickname: Option<String>,
    pub score: Option<i64>,
    pub tags: Vec<String>,
    pub lucky_numbers: Vec<u8>,
    pub subscribed: bool,
    pub birthday: Option<NaiveDate>,
}

impl Profile {
    /// A profile whose `extra` map already holds an `ExtraField` entry.
    pub fn with_extra() -> Self {
        let mut profile = Self::default();
        profile
            .extra
            .insert("ExtraField".to_string(), String::new());
        profile
    }
}

/// The `Name`/`Age` fields used by the render and fill scenarios.
pub fn name_age_fields() -> Vec<FieldDef> {
    vec![
        FieldDef::new("Name", "Your name")
            .help_text("Your full name")
            .validator(required("Req!")),
        FieldDef::new("Age", "Your age")
            .help_text("Years since your birth.")
            .validator(required("Req!")),
    ]
}

pub fn values(pairs: &[(&str, &str)]) -> FormValues {
    pairs.iter().copied().collect()
}
