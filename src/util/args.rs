use clap::{Parser, Subcommand};

use crate::model::MemberSort;

#[derive(Parser)]
#[clap(about = DESCRIPTION)]
pub struct Args {
    #[clap(short, long, action)]
    /// Set this if no logs should be displayed
    pub quiet: bool,
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Fetch a group's details, render them, and optionally save a snapshot
    Fetch {
        #[clap(value_name = "GROUP_ID")]
        group_id: u32,
        #[clap(short, long, value_name = "TEXT")]
        /// Only show members whose name contains this text (case-insensitive)
        filter: Option<String>,
        #[clap(short, long, value_name = "FIELD")]
        /// Sort members by name, exp, ehp, or ehb
        sort: Option<MemberSort>,
        #[clap(short, long, action)]
        /// Sort in descending order
        descending: bool,
        #[clap(long, action)]
        /// Save the snapshot as a JSON file in the output directory
        save: bool,
    },
    /// Ask the service to refresh every member of a group
    Update {
        #[clap(value_name = "GROUP_ID")]
        group_id: u32,
    },
    /// Serve the chart dashboard's JSON endpoints
    Serve {
        #[clap(short, long, default_value_t = 8080)]
        port: u16,
    },
}

static DESCRIPTION: &str = r#"
###################################################
##  ,--.   ,--.,-----.,--.   ,--.                ##
##  |  |   |  |  .-.  |   `.'   |                ##
##  |  |.'.|  |  | |  |  |'.'|  |                ##
##  |   ,'.   |  '-'  |  |   |  |                ##
##  '--'   '--'`-----'`--'   '--'                ##
###################################################

Fetch a clan's statistics from the Wise Old Man API,
render them as a table, save timestamped JSON
snapshots, and serve the chart dashboard's data.

Actions:
  - fetch: one fetch-and-render cycle for a group,
      with optional filtering, sorting, and saving.
  - update: ask the service to refresh every member
      of a group (requires the verification code).
  - serve: expose rank distribution, top players,
      and per-player EHB history as JSON endpoints."#;
