use serde::Deserialize;
use time::{serde::rfc3339, OffsetDateTime};

/// Raw group details as returned by the statistics service. Owned by the
/// pipeline invocation that fetched it and never mutated.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupDetails {
    pub id: u32,
    pub name: Box<str>,
    pub clan_chat: Option<Box<str>>,
    pub description: Option<Box<str>>,
    pub homeworld: Option<u16>,
    #[serde(default)]
    pub member_count: u32,
    #[serde(with = "rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "rfc3339")]
    pub updated_at: OffsetDateTime,
    #[serde(default)]
    pub memberships: Vec<Membership>,
}

/// One group-player association. The role is missing for plain members
/// on older snapshots of the API schema.
#[derive(Debug, Deserialize)]
pub struct Membership {
    pub role: Option<Box<str>>,
    pub player: Player,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub username: Box<str>,
    pub display_name: Option<Box<str>>,
    #[serde(rename = "type")]
    pub account_type: Option<Box<str>>,
    pub exp: Option<i64>,
    pub ehp: Option<f64>,
    pub ehb: Option<f64>,
}

/// Receipt for an update-all request; the service queues the member
/// updates and reports how many players are affected.
#[derive(Debug, Deserialize)]
pub struct UpdateAllResponse {
    #[serde(default)]
    pub count: u32,
    pub message: Option<Box<str>>,
}
