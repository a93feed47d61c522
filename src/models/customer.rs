use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Customer kind, used to route portfolio lookups
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum CustomerType {
    Individual,
    Business,
}

impl CustomerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CustomerType::Individual => "INDIVIDUAL",
            CustomerType::Business => "BUSINESS",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum MaritalStatus {
    Single,
    Married,
    Widowed,
    Divorced,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarriageRegime {
    Joint,
    Separate,
    CommonLaw,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IdentityDocument {
    #[serde(rename = "type", default)]
    pub document_type: String,
    #[serde(default)]
    pub number: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Location {
    pub level1: Option<String>,
    pub level2: Option<String>,
    pub level3: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Address {
    pub street: Option<String>,
    pub location: Option<Location>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Regime {
    #[serde(rename = "type")]
    pub regime_type: MarriageRegime,
    pub date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spouse {
    pub name: String,
    pub last_name: String,
    pub identity_document: Option<IdentityDocument>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Marriage {
    pub regime: Regime,
    pub spouse: Option<Spouse>,
}

/// Customer record as returned by the customer lookup
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    #[serde(rename = "type")]
    pub customer_type: CustomerType,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub middle_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub mother_last_name: Option<String>,
    #[serde(default)]
    pub identity_documents: Vec<IdentityDocument>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub mobile: Option<String>,
    #[serde(default)]
    pub birthday: Option<String>,
    #[serde(default)]
    pub nationality: Option<String>,
    #[serde(default)]
    pub residence_country: Option<String>,
    #[serde(default)]
    pub address: Option<Address>,
    #[serde(default)]
    pub marital_status: Option<MaritalStatus>,
    #[serde(default)]
    pub marriage: Option<Marriage>,
}

impl Customer {
    /// `"<type> <number>"` of the first identity document
    pub fn main_identity_document_number(&self) -> Option<String> {
        self.identity_documents
            .first()
            .map(|doc| format!("{} {}", doc.document_type, doc.number).trim().to_string())
    }

    pub fn names(&self) -> String {
        join_words(&[self.name.as_deref(), self.middle_name.as_deref()])
    }

    pub fn last_names(&self) -> String {
        join_words(&[self.last_name.as_deref(), self.mother_last_name.as_deref()])
    }

    pub fn display_name(&self) -> String {
        join_words(&[Some(self.names().as_str()), Some(self.last_names().as_str())])
    }

    /// Identity string printed on every content page, e.g. `DNI 12345678 - Ana Maria Rojas Diaz`
    pub fn identity_line(&self) -> String {
        match self.main_identity_document_number() {
            Some(document) => format!("{} - {}", document, self.display_name()),
            None => self.display_name(),
        }
    }
}

fn join_words(parts: &[Option<&str>]) -> String {
    parts
        .iter()
        .flatten()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .join(" ")
}
