#![deny(clippy::all, nonstandard_style, rust_2018_idioms)]

#[macro_use]
extern crate eyre;

#[macro_use]
extern crate tracing;

use clap::Parser;
use eyre::{Context as _, Report, Result};
use tokio::{runtime::Builder as RuntimeBuilder, signal};

use self::{
    client::Client,
    config::Config,
    model::{MemberSort, SortOrder},
    ranks::RankTable,
    render::ViewParams,
    session::Session,
    util::{Args, Command},
};

mod client;
mod config;
mod error;
mod history;
mod logging;
mod model;
mod output;
mod ranks;
mod render;
mod server;
mod session;
mod util;

fn main() {
    let args = Args::parse();

    let _ = dotenvy::dotenv();
    let _log_worker_guard = logging::init(args.quiet);

    let runtime = RuntimeBuilder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to build runtime");

    if let Err(err) = runtime.block_on(async_main(args)) {
        error!("{:?}", err.wrap_err("Critical error in main"));
    }
}

async fn async_main(args: Args) -> Result<()> {
    config::init().context("failed to initialize config")?;

    match args.command {
        Command::Fetch {
            group_id,
            filter,
            sort,
            descending,
            save,
        } => fetch(group_id, filter, sort, descending, save).await,
        Command::Update { group_id } => update(group_id).await,
        Command::Serve { port } => {
            tokio::select! {
                res = server::run(port) => res,
                res = signal::ctrl_c() => match res {
                    Ok(_) => {
                        info!("Received Ctrl+C");

                        Ok(())
                    }
                    Err(err) => Err(Report::new(err).wrap_err("Failed to await ctrl+c")),
                }
            }
        }
    }
}

/// One fetch-and-render cycle, followed by an optional save of the
/// snapshot that was just loaded.
async fn fetch(
    group_id: u32,
    filter: Option<String>,
    sort: Option<MemberSort>,
    descending: bool,
    save: bool,
) -> Result<()> {
    let config = Config::get();
    let client = Client::new();
    let mut session = Session::new();

    info!("fetching details of group {group_id}");

    let details = match client.get_group_details(group_id).await {
        Ok(details) => details,
        Err(err) => {
            error!("{:?}", Report::new(err).wrap_err("Failed to fetch group details"));

            return Ok(());
        }
    };

    info!("group details fetched successfully");

    let model = session.load(details.into());

    if let Err(err) = history::append_members(&config.history_path, &model.members) {
        error!("{:?}", err.wrap_err("Failed to append history rows"));
    }

    let ranks = RankTable::load(config.ranks_path.as_deref())?;

    let order = if descending {
        SortOrder::Descending
    } else {
        SortOrder::Ascending
    };

    let params = ViewParams {
        filter,
        sort,
        order,
    };

    println!("{}", render::render(model, &ranks, &params));

    if save {
        match session.save(&config.output_dir) {
            Ok(record) => info!("saved {}", record.display_name),
            Err(err) => error!("{:?}", err.wrap_err("Failed to save snapshot")),
        }
    }

    Ok(())
}

/// Asks the service to refresh every member of the group. The service
/// queues the updates; the count of affected players is reported back.
async fn update(group_id: u32) -> Result<()> {
    let config = Config::get();

    let Some(code) = config.verification_code.as_deref() else {
        bail!(
            "missing env variable `GROUP_VERIFICATION_CODE`; \
            the update action requires the group's verification code"
        );
    };

    let client = Client::new();

    match client.post_update_all(group_id, code).await {
        Ok(receipt) => {
            info!("queued an update for {} member(s)", receipt.count);

            if let Some(message) = receipt.message {
                info!("service response: {message}");
            }
        }
        Err(err) => error!("{:?}", Report::new(err).wrap_err("Failed to request group update")),
    }

    Ok(())
}
