use std::str::FromStr;

use eyre::Report;
use serde::{Deserialize, Serialize};
use time::{serde::rfc3339, OffsetDateTime};

use super::group::{GroupDetails, Membership};

pub const DEFAULT_ROLE: &str = "Member";
pub const DEFAULT_ACCOUNT_TYPE: &str = "regular";
pub const MISSING_FIELD: &str = "(none)";

/// Display-ready view of one group snapshot. This is also the persisted
/// snapshot shape; the dashboard deserializes the same type back.
///
/// All raw-to-model adaptation happens in the `From<GroupDetails>` impl
/// below so a schema change on the service side touches one place.
#[derive(Debug, Serialize, Deserialize)]
pub struct DisplayModel {
    pub group_id: u32,
    pub name: Box<str>,
    /// Always equal to `members.len()`, regardless of what the raw
    /// response claimed.
    pub member_count: usize,
    #[serde(with = "rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "rfc3339")]
    pub updated_at: OffsetDateTime,
    pub description: Box<str>,
    pub clan_chat: Box<str>,
    pub homeworld: Box<str>,
    pub members: Vec<MemberRow>,
}

impl From<GroupDetails> for DisplayModel {
    fn from(details: GroupDetails) -> Self {
        let GroupDetails {
            id,
            name,
            clan_chat,
            description,
            homeworld,
            member_count: _,
            created_at,
            updated_at,
            memberships,
        } = details;

        let members: Vec<_> = memberships.into_iter().map(MemberRow::from).collect();

        Self {
            group_id: id,
            name,
            member_count: members.len(),
            created_at,
            updated_at,
            description: description.unwrap_or_else(|| MISSING_FIELD.into()),
            clan_chat: clan_chat.unwrap_or_else(|| MISSING_FIELD.into()),
            homeworld: homeworld
                .map(|world| world.to_string().into_boxed_str())
                .unwrap_or_else(|| MISSING_FIELD.into()),
            members,
        }
    }
}

impl DisplayModel {
    pub fn aggregates(&self) -> Option<Aggregates> {
        Aggregates::compute(&self.members)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberRow {
    /// Resolved display name; the username when no display name is set.
    pub name: Box<str>,
    pub role: Box<str>,
    pub account_type: Box<str>,
    pub exp: i64,
    pub ehp: f64,
    pub ehb: f64,
}

impl From<Membership> for MemberRow {
    fn from(membership: Membership) -> Self {
        let Membership { role, player } = membership;

        Self {
            name: player.display_name.unwrap_or(player.username),
            role: role.unwrap_or_else(|| DEFAULT_ROLE.into()),
            account_type: player
                .account_type
                .unwrap_or_else(|| DEFAULT_ACCOUNT_TYPE.into()),
            exp: player.exp.unwrap_or(0),
            ehp: player.ehp.unwrap_or(0.0),
            ehb: player.ehb.unwrap_or(0.0),
        }
    }
}

impl MemberRow {
    /// Efficiency scores are floored to whole hours for display.
    pub fn ehp_floored(&self) -> i64 {
        self.ehp.floor() as i64
    }

    pub fn ehb_floored(&self) -> i64 {
        self.ehb.floor() as i64
    }
}

/// Group-level sums and means. Construction is guarded: a mean over zero
/// members is undefined, so an empty member list yields `None` instead of
/// a division by zero.
#[derive(Debug, PartialEq)]
pub struct Aggregates {
    pub total_exp: i64,
    pub mean_exp: f64,
    pub total_ehp: f64,
    pub mean_ehp: f64,
    pub total_ehb: f64,
    pub mean_ehb: f64,
}

impl Aggregates {
    pub fn compute(members: &[MemberRow]) -> Option<Self> {
        if members.is_empty() {
            return None;
        }

        let len = members.len() as f64;

        let total_exp: i64 = members.iter().map(|row| row.exp).sum();
        let total_ehp: f64 = members.iter().map(|row| row.ehp).sum();
        let total_ehb: f64 = members.iter().map(|row| row.ehb).sum();

        Some(Self {
            total_exp,
            mean_exp: total_exp as f64 / len,
            total_ehp,
            mean_ehp: total_ehp / len,
            total_ehb,
            mean_ehb: total_ehb / len,
        })
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum MemberSort {
    Name,
    Exp,
    Ehp,
    Ehb,
}

impl FromStr for MemberSort {
    type Err = Report;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "name" => Ok(Self::Name),
            "exp" => Ok(Self::Exp),
            "ehp" => Ok(Self::Ehp),
            "ehb" => Ok(Self::Ehb),
            _ => Err(eyre!("invalid sort field `{s}`; expected name, exp, ehp, or ehb")),
        }
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// Case-insensitive substring filter on the resolved display name.
pub fn filter_members<'m>(members: &'m [MemberRow], needle: &str) -> Vec<&'m MemberRow> {
    let needle = needle.to_lowercase();

    members
        .iter()
        .filter(|row| row.name.to_lowercase().contains(&needle))
        .collect()
}

/// Stable sort; equal keys keep their original list order.
pub fn sort_members(rows: &mut [&MemberRow], sort: MemberSort, order: SortOrder) {
    rows.sort_by(|a, b| {
        let ordering = match sort {
            MemberSort::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            MemberSort::Exp => a.exp.cmp(&b.exp),
            MemberSort::Ehp => a.ehp.total_cmp(&b.ehp),
            MemberSort::Ehb => a.ehb.total_cmp(&b.ehb),
        };

        match order {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    });
}
