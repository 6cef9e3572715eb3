use serde::{Deserialize, Serialize};

/// Company identity printed in the invoice header. NIF and STAT are the
/// Malagasy tax identifiers.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Company {
    pub name: String,
    #[serde(default)]
    pub nif: String,
    #[serde(default)]
    pub stat: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub contact: String,
}
