pub use self::{
    display::{
        filter_members, sort_members, Aggregates, DisplayModel, MemberRow, MemberSort, SortOrder,
    },
    group::{GroupDetails, Membership, Player, UpdateAllResponse},
    record::SavedSnapshotRecord,
};

mod display;
mod group;
mod record;
