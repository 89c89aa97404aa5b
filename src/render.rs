use std::fmt::Write;

use time::{format_description::FormatItem, macros::format_description, OffsetDateTime};

use crate::{
    model::{filter_members, sort_members, DisplayModel, MemberRow, MemberSort, SortOrder},
    ranks::RankTable,
};

const NO_DATA: &str = "(no data)";

const HEADER_FORMAT: &[FormatItem<'_>] = format_description!("[year]-[month]-[day] [hour]:[minute]");

/// Filter and ordering applied to the member table. Without a sort field
/// the members keep their fetched order.
#[derive(Debug, Default)]
pub struct ViewParams {
    pub filter: Option<String>,
    pub sort: Option<MemberSort>,
    pub order: SortOrder,
}

/// Renders a snapshot into its text view. Pure; the same model and
/// params always produce the same output.
pub fn render(model: &DisplayModel, ranks: &RankTable, params: &ViewParams) -> String {
    let mut out = String::new();

    header(&mut out, model);

    let mut rows = match params.filter.as_deref() {
        Some(needle) => filter_members(&model.members, needle),
        None => model.members.iter().collect(),
    };

    if let Some(sort) = params.sort {
        sort_members(&mut rows, sort, params.order);
    }

    member_table(&mut out, &rows, ranks);
    footer(&mut out, model);

    out
}

fn header(out: &mut String, model: &DisplayModel) {
    let _ = writeln!(out, "Group: {} (id {})", model.name, model.group_id);
    let _ = writeln!(out, "Members: {}", model.member_count);
    let _ = writeln!(
        out,
        "Created: {} | Updated: {}",
        timestamp(model.created_at),
        timestamp(model.updated_at),
    );
    let _ = writeln!(out, "Description: {}", model.description);
    let _ = writeln!(
        out,
        "Clan chat: {} | Homeworld: {}",
        model.clan_chat, model.homeworld
    );
    out.push('\n');
}

fn member_table(out: &mut String, rows: &[&MemberRow], ranks: &RankTable) {
    let _ = writeln!(
        out,
        "{:<5}{:<22}{:<14}{:<12}{:>14}{:>8}{:>8}  {}",
        "#", "Player", "Role", "Type", "Exp", "EHP", "EHB", "Rank",
    );
    let _ = writeln!(out, "{}", "-".repeat(92));

    for (row, position) in rows.iter().zip(1..) {
        let _ = writeln!(
            out,
            "{position:<5}{:<22}{:<14}{:<12}{:>14}{:>8}{:>8}  {}",
            row.name,
            row.role,
            row.account_type,
            row.exp,
            row.ehp_floored(),
            row.ehb_floored(),
            ranks.rank_for(row.ehb),
        );
    }

    if rows.is_empty() {
        let _ = writeln!(out, "{NO_DATA}");
    }

    out.push('\n');
}

fn footer(out: &mut String, model: &DisplayModel) {
    match model.aggregates() {
        Some(aggregates) => {
            let _ = writeln!(
                out,
                "Total: exp {}, ehp {:.2}, ehb {:.2}",
                aggregates.total_exp, aggregates.total_ehp, aggregates.total_ehb,
            );
            let _ = writeln!(
                out,
                "Mean:  exp {:.2}, ehp {:.2}, ehb {:.2}",
                aggregates.mean_exp, aggregates.mean_ehp, aggregates.mean_ehb,
            );
        }
        None => {
            let _ = writeln!(out, "Aggregates: {NO_DATA}");
        }
    }
}

fn timestamp(at: OffsetDateTime) -> String {
    at.format(HEADER_FORMAT).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    fn model(members: Vec<MemberRow>) -> DisplayModel {
        DisplayModel {
            group_id: 2300,
            name: "Iron Foundry".into(),
            member_count: members.len(),
            created_at: datetime!(2020-01-01 12:00 UTC),
            updated_at: datetime!(2024-05-01 13:07 UTC),
            description: "(none)".into(),
            clan_chat: "(none)".into(),
            homeworld: "302".into(),
            members,
        }
    }

    fn row(name: &str, ehb: f64) -> MemberRow {
        MemberRow {
            name: name.into(),
            role: "Member".into(),
            account_type: "regular".into(),
            exp: 1000,
            ehp: 10.5,
            ehb,
        }
    }

    #[test]
    fn empty_group_renders_no_data_placeholders() {
        let out = render(&model(Vec::new()), &RankTable::default(), &ViewParams::default());

        assert!(out.contains("Members: 0"));
        assert!(out.contains(NO_DATA));
        assert!(out.contains("Aggregates: (no data)"));
        assert!(!out.contains("NaN"));
    }

    #[test]
    fn header_carries_group_fields() {
        let out = render(&model(Vec::new()), &RankTable::default(), &ViewParams::default());

        assert!(out.contains("Group: Iron Foundry (id 2300)"));
        assert!(out.contains("Created: 2020-01-01 12:00 | Updated: 2024-05-01 13:07"));
        assert!(out.contains("Clan chat: (none) | Homeworld: 302"));
    }

    #[test]
    fn filter_and_sort_shape_the_table() {
        let members = vec![row("Zezima", 5.0), row("Woox", 20.0), row("Zulu", 1.0)];

        let params = ViewParams {
            filter: Some("z".to_owned()),
            sort: Some(MemberSort::Ehb),
            order: SortOrder::Descending,
        };

        let out = render(&model(members), &RankTable::default(), &params);

        assert!(!out.contains("Woox"));

        let zezima = out.find("Zezima").unwrap();
        let zulu = out.find("Zulu").unwrap();
        assert!(zezima < zulu);
    }

    #[test]
    fn unsorted_members_keep_fetched_order() {
        let members = vec![row("second", 5.0), row("first", 20.0)];

        let out = render(&model(members), &RankTable::default(), &ViewParams::default());

        let second = out.find("second").unwrap();
        let first = out.find("first").unwrap();
        assert!(second < first);
    }

    #[test]
    fn footer_totals_cover_all_members() {
        let members = vec![row("a", 4.0), row("b", 8.0)];

        let out = render(&model(members), &RankTable::default(), &ViewParams::default());

        assert!(out.contains("Total: exp 2000, ehp 21.00, ehb 12.00"));
        assert!(out.contains("Mean:  exp 1000.00, ehp 10.50, ehb 6.00"));
    }
}
