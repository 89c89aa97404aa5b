use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    sync::Arc,
    time::SystemTime,
};

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use eyre::{Context as _, Result};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

use crate::{
    config::Config,
    history::{self, HistoryPoint},
    model::{DisplayModel, MemberRow},
    ranks::RankTable,
};

/// Read-only data source for the chart dashboard. Every request reads
/// the newest snapshot file fresh, so a save is visible immediately.
struct Dashboard {
    output_dir: PathBuf,
    history_path: PathBuf,
    ranks: RankTable,
}

pub async fn run(port: u16) -> Result<()> {
    let config = Config::get();

    let state = Arc::new(Dashboard {
        output_dir: config.output_dir.clone(),
        history_path: config.history_path.clone(),
        ranks: RankTable::load(config.ranks_path.as_deref())?,
    });

    let app = Router::new()
        .route("/api/rank-distribution", get(rank_distribution))
        .route("/api/top-players", get(top_players))
        .route("/api/ehb-history", get(ehb_history))
        .with_state(state);

    let listener = TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("failed to bind port {port}"))?;

    info!("dashboard listening on port {port}");

    axum::serve(listener, app)
        .await
        .context("dashboard server failed")
}

async fn rank_distribution(
    State(state): State<Arc<Dashboard>>,
) -> Json<BTreeMap<String, usize>> {
    let members = state.latest_members();

    Json(state.ranks.distribution(&members))
}

#[derive(Serialize)]
struct TopPlayer {
    username: Box<str>,
    ehb: f64,
    rank: Box<str>,
}

#[derive(Deserialize)]
struct TopParams {
    #[serde(default = "default_limit")]
    limit: usize,
}

fn default_limit() -> usize {
    15
}

async fn top_players(
    State(state): State<Arc<Dashboard>>,
    Query(params): Query<TopParams>,
) -> Json<Vec<TopPlayer>> {
    let top = top_by_ehb(state.latest_members(), params.limit, &state.ranks);

    Json(top)
}

#[derive(Deserialize)]
struct HistoryParams {
    player: String,
}

async fn ehb_history(
    State(state): State<Arc<Dashboard>>,
    Query(params): Query<HistoryParams>,
) -> Json<Vec<HistoryPoint>> {
    match history::player_history(&state.history_path, &params.player) {
        Ok(points) => Json(points),
        Err(err) => {
            error!("{:?}", err.wrap_err("Failed to read player history"));

            Json(Vec::new())
        }
    }
}

impl Dashboard {
    fn latest_members(&self) -> Vec<MemberRow> {
        match latest_snapshot(&self.output_dir) {
            Ok(Some(model)) => model.members,
            Ok(None) => {
                warn!("no snapshot files in {}", self.output_dir.display());

                Vec::new()
            }
            Err(err) => {
                error!("{:?}", err.wrap_err("Failed to load latest snapshot"));

                Vec::new()
            }
        }
    }
}

/// Ordered by EHB descending, cut off at `limit`.
fn top_by_ehb(mut members: Vec<MemberRow>, limit: usize, ranks: &RankTable) -> Vec<TopPlayer> {
    members.sort_by(|a, b| b.ehb.total_cmp(&a.ehb));
    members.truncate(limit);

    members
        .into_iter()
        .map(|row| TopPlayer {
            rank: ranks.rank_for(row.ehb).into(),
            ehb: row.ehb,
            username: row.name,
        })
        .collect()
}

/// The newest snapshot file in the output directory, by modification
/// time. A missing directory means no snapshot has been saved yet.
fn latest_snapshot(dir: &Path) -> Result<Option<DisplayModel>> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Ok(None);
    };

    let mut newest: Option<(SystemTime, PathBuf)> = None;

    for entry in entries {
        let entry = entry.context("failed to read output directory entry")?;
        let path = entry.path();

        if path.extension().is_none_or(|ext| ext != "json") {
            continue;
        }

        let modified = entry
            .metadata()
            .and_then(|metadata| metadata.modified())
            .with_context(|| format!("failed to read metadata of {}", path.display()))?;

        if newest.as_ref().is_none_or(|(at, _)| modified > *at) {
            newest = Some((modified, path));
        }
    }

    let Some((_, path)) = newest else {
        return Ok(None);
    };

    let bytes =
        fs::read(&path).with_context(|| format!("failed to read snapshot {}", path.display()))?;

    serde_json::from_slice(&bytes)
        .map(Some)
        .with_context(|| format!("failed to deserialize snapshot {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, ehb: f64) -> MemberRow {
        MemberRow {
            name: name.into(),
            role: "Member".into(),
            account_type: "regular".into(),
            exp: 0,
            ehp: 0.0,
            ehb,
        }
    }

    #[test]
    fn top_players_order_and_limit() {
        let members = vec![row("low", 1.0), row("high", 20.0), row("mid", 5.0)];

        let top = top_by_ehb(members, 2, &RankTable::default());
        let names: Vec<_> = top.iter().map(|player| &*player.username).collect();

        assert_eq!(names, ["high", "mid"]);
    }

    #[test]
    fn missing_output_directory_means_no_snapshot() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("absent");

        assert!(latest_snapshot(&dir).unwrap().is_none());
    }

    #[test]
    fn non_json_files_are_ignored() {
        let root = tempfile::tempdir().unwrap();

        fs::write(root.path().join("notes.txt"), "not a snapshot").unwrap();

        assert!(latest_snapshot(root.path()).unwrap().is_none());
    }

    #[test]
    fn snapshot_round_trips_through_the_output_directory() {
        let root = tempfile::tempdir().unwrap();

        let json = serde_json::json!({
            "group_id": 2300,
            "name": "Iron Foundry",
            "member_count": 1,
            "created_at": "2020-01-01T12:00:00Z",
            "updated_at": "2024-05-01T13:07:00Z",
            "description": "(none)",
            "clan_chat": "(none)",
            "homeworld": "(none)",
            "members": [{
                "name": "Zezima",
                "role": "Member",
                "account_type": "regular",
                "exp": 100,
                "ehp": 10.0,
                "ehb": 1500.0
            }]
        });

        fs::write(
            root.path().join("iron_foundry_2024-05-01_13-07.json"),
            serde_json::to_vec_pretty(&json).unwrap(),
        )
        .unwrap();

        let model = latest_snapshot(root.path()).unwrap().unwrap();

        assert_eq!(model.member_count, 1);
        assert_eq!(&*model.members[0].name, "Zezima");
    }
}
