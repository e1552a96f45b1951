use serde::{Deserialize, Serialize};

/// Profile collected by form steps 1–7.
/// Identifying fields hold SHA-256 digests only; raw values never reach this struct.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub name_hash: Option<String>,
    pub email_hash: Option<String>,
    pub phone_hash: Option<String>,
    pub experience_years: Option<u8>,
    pub position: Option<String>,
    pub location: Option<String>,
    pub tech_stack: Option<String>,
}
