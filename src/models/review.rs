use serde::{Deserialize, Serialize};

use super::UserId;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(rename = "reviewerID")]
    pub reviewer_id: UserId,
    #[serde(default)]
    pub reviewer_name: Option<String>,
    pub score: f64,
    #[serde(default)]
    pub text: String,
}

/// Reviews of a listing or a user along with their average score
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ReviewSummary {
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub reviews: Vec<Review>,
}
