use chrono::Utc;
use clap::Parser;
use maze_chase_core::constants::TICK_MS;
use maze_chase_core::engine::{EngineOptions, GameEngine};
use maze_chase_core::error::EngineError;
use maze_chase_core::layouts::classic_maze;
use maze_chase_core::level::{LevelRecord, LevelTable};
use maze_chase_core::save_store::{JsonFileStore, MemoryStore, SaveStore};
use maze_chase_core::types::{
    Difficulty, GameEvent, GameOutcome, PelletTier, Snapshot, TickOrder,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    runs: Option<u32>,
    /// JSON array of level records replacing the built-in table.
    #[arg(long)]
    levels: Option<PathBuf>,
    /// JSON save file; progress and high score carry over between runs.
    #[arg(long)]
    save: Option<PathBuf>,
    #[arg(long)]
    difficulty: Option<String>,
    #[arg(long)]
    tick_order: Option<String>,
    /// Simulated time limit per run.
    #[arg(long)]
    minutes: Option<u32>,
    #[arg(long)]
    run_id: Option<String>,
    #[arg(long)]
    summary_out: Option<PathBuf>,
}

#[derive(Clone, Debug)]
struct RunConfig {
    index: u32,
    seed: u64,
    difficulty: Difficulty,
    tick_order: TickOrder,
    minutes: u32,
}

#[derive(Clone, Debug, Serialize)]
struct RunResultLine {
    run: u32,
    seed: u64,
    difficulty: Difficulty,
    #[serde(rename = "tickOrder")]
    tick_order: TickOrder,
    outcome: GameOutcome,
    #[serde(rename = "durationMs")]
    duration_ms: u64,
    level: u32,
    #[serde(rename = "levelsCleared")]
    levels_cleared: u32,
    score: u32,
    #[serde(rename = "highScore")]
    high_score: u32,
    #[serde(rename = "livesLeft")]
    lives_left: u32,
    #[serde(rename = "pelletsEaten")]
    pellets_eaten: u32,
    #[serde(rename = "energizersEaten")]
    energizers_eaten: u32,
    #[serde(rename = "fruitsEaten")]
    fruits_eaten: u32,
    #[serde(rename = "ghostsEaten")]
    ghosts_eaten: u32,
    defeats: u32,
    anomalies: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
struct AnomalyRecord {
    tick: u64,
    message: String,
}

#[derive(Clone, Debug)]
struct RunOutcome {
    result: RunResultLine,
    anomaly_records: Vec<AnomalyRecord>,
    finished_tick: u64,
}

#[derive(Clone, Debug, Serialize)]
struct RunSummary {
    #[serde(rename = "runId")]
    run_id: String,
    #[serde(rename = "startedAtMs")]
    started_at_ms: u64,
    #[serde(rename = "finishedAtMs")]
    finished_at_ms: u64,
    #[serde(rename = "runCount")]
    run_count: usize,
    #[serde(rename = "anomalyCount")]
    anomaly_count: usize,
    #[serde(rename = "averageDurationMs")]
    average_duration_ms: u64,
    #[serde(rename = "averageScore")]
    average_score: u32,
    #[serde(rename = "outcomeCounts")]
    outcome_counts: BTreeMap<String, usize>,
    runs: Vec<RunResultLine>,
}

#[derive(Clone, Debug, Serialize)]
struct StructuredLogLine {
    #[serde(rename = "timestampMs")]
    timestamp_ms: u64,
    level: String,
    event: String,
    #[serde(rename = "runId")]
    run_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tick: Option<u64>,
    details: Value,
}

fn main() {
    let cli = Cli::parse();
    let runs = resolve_runs(&cli);
    let started_at_ms = now_ms();
    let seed_hint = runs.first().map(|run| run.seed).unwrap_or(0);
    let run_id = cli
        .run_id
        .clone()
        .unwrap_or_else(|| default_run_id(seed_hint, started_at_ms));

    let levels = match cli.levels.as_deref().map(load_levels) {
        Some(Ok(records)) => Some(records),
        Some(Err(error)) => {
            emit_log(
                "error",
                "levels_load_failed",
                &run_id,
                None,
                None,
                json!({ "error": error }),
            );
            std::process::exit(2);
        }
        None => None,
    };

    let mut has_anomaly = false;
    let mut results = Vec::new();
    let mut outcome_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut total_anomalies = 0usize;

    for config in runs {
        emit_log(
            "info",
            "run_started",
            &run_id,
            Some(config.seed),
            None,
            json!({
                "run": config.index,
                "difficulty": config.difficulty,
                "tickOrder": config.tick_order,
                "minutes": config.minutes,
            }),
        );

        let outcome = match run_session(&config, levels.clone(), cli.save.as_deref()) {
            Ok(outcome) => outcome,
            Err(error) => {
                emit_log(
                    "error",
                    "run_aborted",
                    &run_id,
                    Some(config.seed),
                    None,
                    json!({ "error": error.to_string() }),
                );
                std::process::exit(2);
            }
        };

        for anomaly in &outcome.anomaly_records {
            emit_log(
                "warn",
                "anomaly_detected",
                &run_id,
                Some(config.seed),
                Some(anomaly.tick),
                json!({ "message": anomaly.message }),
            );
        }
        if !outcome.result.anomalies.is_empty() {
            has_anomaly = true;
        }
        total_anomalies += outcome.anomaly_records.len();
        *outcome_counts
            .entry(outcome_key(outcome.result.outcome))
            .or_insert(0) += 1;

        emit_log(
            "info",
            "run_finished",
            &run_id,
            Some(config.seed),
            Some(outcome.finished_tick),
            json!({
                "outcome": outcome.result.outcome,
                "durationMs": outcome.result.duration_ms,
                "score": outcome.result.score,
                "level": outcome.result.level,
                "anomalyCount": outcome.anomaly_records.len(),
            }),
        );

        println!(
            "{}",
            serde_json::to_string(&outcome.result).expect("run result should serialize")
        );
        results.push(outcome.result);
    }

    let summary = build_run_summary(
        run_id.clone(),
        started_at_ms,
        now_ms(),
        results,
        outcome_counts,
        total_anomalies,
    );

    let mut summary_out_written: Option<String> = None;
    if let Some(path) = cli.summary_out.as_ref() {
        if let Err(error) = write_summary(path, &summary) {
            emit_log(
                "error",
                "summary_write_failed",
                &run_id,
                None,
                None,
                json!({
                    "path": path.to_string_lossy(),
                    "error": error.to_string(),
                }),
            );
            std::process::exit(2);
        }
        summary_out_written = Some(path.to_string_lossy().to_string());
    }

    emit_log(
        "info",
        "simulation_finished",
        &run_id,
        None,
        None,
        json!({
            "runCount": summary.run_count,
            "anomalyCount": summary.anomaly_count,
            "averageDurationMs": summary.average_duration_ms,
            "averageScore": summary.average_score,
            "outcomeCounts": summary.outcome_counts,
            "summaryOut": summary_out_written,
        }),
    );

    if has_anomaly {
        std::process::exit(1);
    }
}

fn run_session(
    config: &RunConfig,
    levels: Option<Vec<LevelRecord>>,
    save: Option<&Path>,
) -> Result<RunOutcome, EngineError> {
    let maze = classic_maze()?;
    let levels = match levels {
        Some(records) => LevelTable::new(records)?,
        None => LevelTable::classic(),
    };
    let store: Box<dyn SaveStore> = match save {
        Some(path) => Box::new(JsonFileStore::new(path.to_path_buf())),
        None => Box::new(MemoryStore::new()),
    };
    let mut engine = GameEngine::with_parts(
        maze,
        levels,
        store,
        EngineOptions {
            seed: config.seed,
            difficulty: config.difficulty,
            tick_order: config.tick_order,
            ..EngineOptions::default()
        },
    );

    let limit_ms = u64::from(config.minutes) * 60_000;
    let mut tally = EventTally::default();
    let mut anomalies = Vec::new();
    let mut anomaly_records = Vec::new();
    let mut anomaly_seen = HashSet::new();
    let mut last: Option<(u32, u32)> = None;
    let mut last_tick = 0u64;

    while !engine.is_ended() && engine.elapsed_ms() < limit_ms {
        let input = engine.autopilot_direction();
        engine.step(TICK_MS, input);
        let snapshot = engine.build_snapshot(true);
        last_tick = snapshot.tick;
        for message in collect_snapshot_anomalies(&snapshot, last) {
            push_anomaly(
                &mut anomalies,
                &mut anomaly_records,
                &mut anomaly_seen,
                snapshot.tick,
                message,
            );
        }
        last = Some((snapshot.score, snapshot.lives));
        tally.record(&snapshot.events);
    }

    let summary = engine.build_summary();
    Ok(RunOutcome {
        result: RunResultLine {
            run: config.index,
            seed: config.seed,
            difficulty: config.difficulty,
            tick_order: config.tick_order,
            outcome: summary.outcome,
            duration_ms: summary.duration_ms,
            level: summary.level,
            levels_cleared: summary.levels_cleared,
            score: summary.score,
            high_score: summary.high_score,
            lives_left: summary.lives,
            pellets_eaten: tally.pellets,
            energizers_eaten: tally.energizers,
            fruits_eaten: tally.fruits,
            ghosts_eaten: summary.ghosts_eaten,
            defeats: summary.defeats,
            anomalies,
        },
        anomaly_records,
        finished_tick: last_tick,
    })
}

#[derive(Clone, Debug, Default)]
struct EventTally {
    pellets: u32,
    energizers: u32,
    fruits: u32,
}

impl EventTally {
    fn record(&mut self, events: &[GameEvent]) {
        for event in events {
            if let GameEvent::PelletConsumed { tier, .. } = event {
                match tier {
                    PelletTier::Normal => self.pellets += 1,
                    PelletTier::Energizer => self.energizers += 1,
                    PelletTier::Fruit => self.fruits += 1,
                }
            }
        }
    }
}

fn collect_snapshot_anomalies(snapshot: &Snapshot, previous: Option<(u32, u32)>) -> Vec<String> {
    let mut anomalies = Vec::new();
    if !snapshot.player.x.is_finite() || !snapshot.player.y.is_finite() {
        anomalies.push(format!(
            "player position not finite: ({}, {})",
            snapshot.player.x, snapshot.player.y
        ));
    }
    for ghost in &snapshot.ghosts {
        if !ghost.x.is_finite() || !ghost.y.is_finite() {
            anomalies.push(format!("ghost position not finite: {:?}", ghost.kind));
        }
    }
    if snapshot.high_score < snapshot.score {
        anomalies.push(format!(
            "high score {} below score {}",
            snapshot.high_score, snapshot.score
        ));
    }
    if let Some((score, lives)) = previous {
        if snapshot.score < score {
            anomalies.push(format!("score decreased: {score} -> {}", snapshot.score));
        }
        if snapshot.lives > lives {
            anomalies.push(format!("lives increased: {lives} -> {}", snapshot.lives));
        }
    }
    anomalies
}

fn resolve_runs(cli: &Cli) -> Vec<RunConfig> {
    let seed = cli.seed.unwrap_or_else(rand::random::<u64>);
    let difficulty = cli
        .difficulty
        .as_deref()
        .and_then(Difficulty::parse)
        .unwrap_or(Difficulty::Normal);
    let tick_order = cli
        .tick_order
        .as_deref()
        .and_then(TickOrder::parse)
        .unwrap_or(TickOrder::PlayerFirst);
    let runs = cli.runs.unwrap_or(1).clamp(1, 100);
    let minutes = cli.minutes.unwrap_or(10).clamp(1, 60);

    (0..runs)
        .map(|index| RunConfig {
            index: index + 1,
            seed: seed.wrapping_add(u64::from(index)),
            difficulty,
            tick_order,
            minutes,
        })
        .collect()
}

fn load_levels(path: &Path) -> Result<Vec<LevelRecord>, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|error| format!("failed to read {}: {error}", path.display()))?;
    serde_json::from_str(&text)
        .map_err(|error| format!("failed to parse {}: {error}", path.display()))
}

fn push_anomaly(
    anomalies: &mut Vec<String>,
    anomaly_records: &mut Vec<AnomalyRecord>,
    anomaly_seen: &mut HashSet<String>,
    tick: u64,
    message: String,
) {
    anomaly_records.push(AnomalyRecord {
        tick,
        message: message.clone(),
    });
    if anomaly_seen.insert(message.clone()) {
        anomalies.push(message);
    }
}

fn default_run_id(seed: u64, timestamp_ms: u64) -> String {
    format!("sim-{seed}-{timestamp_ms}")
}

fn build_run_summary(
    run_id: String,
    started_at_ms: u64,
    finished_at_ms: u64,
    runs: Vec<RunResultLine>,
    outcome_counts: BTreeMap<String, usize>,
    anomaly_count: usize,
) -> RunSummary {
    let run_count = runs.len();
    let (average_duration_ms, average_score) = if run_count == 0 {
        (0, 0)
    } else {
        let total_duration: u64 = runs.iter().map(|run| run.duration_ms).sum();
        let total_score: u64 = runs.iter().map(|run| u64::from(run.score)).sum();
        (
            total_duration / run_count as u64,
            (total_score / run_count as u64) as u32,
        )
    };
    RunSummary {
        run_id,
        started_at_ms,
        finished_at_ms,
        run_count,
        anomaly_count,
        average_duration_ms,
        average_score,
        outcome_counts,
        runs,
    }
}

fn emit_log(
    level: &str,
    event: &str,
    run_id: &str,
    seed: Option<u64>,
    tick: Option<u64>,
    details: Value,
) {
    let log_line = StructuredLogLine {
        timestamp_ms: now_ms(),
        level: level.to_string(),
        event: event.to_string(),
        run_id: run_id.to_string(),
        seed,
        tick,
        details,
    };
    eprintln!(
        "{}",
        serde_json::to_string(&log_line).expect("structured log should serialize")
    );
}

fn outcome_key(outcome: GameOutcome) -> String {
    match outcome {
        GameOutcome::InProgress => "time_limit",
        GameOutcome::GameOver => "game_over",
    }
    .to_string()
}

fn now_ms() -> u64 {
    u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default()
}

fn write_summary(path: &Path, summary: &RunSummary) -> io::Result<()> {
    let summary_text = serde_json::to_string_pretty(summary).expect("run summary should serialize");
    std::fs::write(path, summary_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_result(outcome: GameOutcome, duration_ms: u64, score: u32) -> RunResultLine {
        RunResultLine {
            run: 1,
            seed: 42,
            difficulty: Difficulty::Normal,
            tick_order: TickOrder::PlayerFirst,
            outcome,
            duration_ms,
            level: 1,
            levels_cleared: 0,
            score,
            high_score: score,
            lives_left: 0,
            pellets_eaten: 0,
            energizers_eaten: 0,
            fruits_eaten: 0,
            ghosts_eaten: 0,
            defeats: 3,
            anomalies: Vec::new(),
        }
    }

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("simulate").chain(args.iter().copied()))
    }

    #[test]
    fn default_run_id_contains_seed_and_timestamp() {
        assert_eq!(default_run_id(42, 123456789), "sim-42-123456789");
    }

    #[test]
    fn runs_get_consecutive_seeds() {
        let runs = resolve_runs(&cli(&[
            "--seed",
            "7",
            "--runs",
            "3",
            "--difficulty",
            "hard",
            "--tick-order",
            "ghosts-first",
        ]));
        let seeds: Vec<u64> = runs.iter().map(|run| run.seed).collect();
        assert_eq!(seeds, vec![7, 8, 9]);
        assert!(runs.iter().all(|run| run.difficulty == Difficulty::Hard));
        assert!(runs
            .iter()
            .all(|run| run.tick_order == TickOrder::GhostsFirst));
    }

    #[test]
    fn unknown_flags_values_fall_back_to_defaults() {
        let runs = resolve_runs(&cli(&["--seed", "1", "--difficulty", "insane", "--runs", "0"]));
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].difficulty, Difficulty::Normal);
        assert_eq!(runs[0].minutes, 10);
    }

    #[test]
    fn build_run_summary_averages_duration_and_score() {
        let summary = build_run_summary(
            "sim-42-1".to_string(),
            1,
            2,
            vec![
                make_result(GameOutcome::GameOver, 60_000, 1_000),
                make_result(GameOutcome::InProgress, 90_000, 3_000),
            ],
            BTreeMap::from([
                ("game_over".to_string(), 1usize),
                ("time_limit".to_string(), 1usize),
            ]),
            0,
        );
        assert_eq!(summary.average_duration_ms, 75_000);
        assert_eq!(summary.average_score, 2_000);
        assert_eq!(summary.run_count, 2);
    }

    #[test]
    fn write_summary_returns_error_when_parent_does_not_exist() {
        let target = std::env::temp_dir()
            .join(format!("maze-chase-missing-{}", rand::random::<u32>()))
            .join("summary.json");
        let summary = build_run_summary(
            "sim-1-1".to_string(),
            1,
            2,
            vec![make_result(GameOutcome::GameOver, 60_000, 10)],
            BTreeMap::from([("game_over".to_string(), 1usize)]),
            0,
        );
        assert!(write_summary(&target, &summary).is_err());
    }

    #[test]
    fn push_anomaly_keeps_records_and_deduplicates_summary_messages() {
        let mut anomalies = Vec::new();
        let mut records = Vec::new();
        let mut seen = HashSet::new();
        push_anomaly(&mut anomalies, &mut records, &mut seen, 10, "same".to_string());
        push_anomaly(&mut anomalies, &mut records, &mut seen, 11, "same".to_string());

        assert_eq!(anomalies.len(), 1);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].tick, 11);
    }

    #[test]
    fn short_session_runs_clean() {
        let config = RunConfig {
            index: 1,
            seed: 5,
            difficulty: Difficulty::Normal,
            tick_order: TickOrder::PlayerFirst,
            minutes: 1,
        };
        let outcome = run_session(&config, None, None).expect("classic session");
        assert!(outcome.result.anomalies.is_empty());
        assert!(outcome.result.score > 0);
        assert!(outcome.result.pellets_eaten > 0);
    }

    #[test]
    fn level_file_is_parsed_with_camel_case_keys() {
        let path = std::env::temp_dir().join(format!("maze-levels-{}.json", rand::random::<u32>()));
        let raw = r#"[{"levelNumber":1,"ghostTimers":[7,20,7,20,5,20,5],
            "normalEnergizerTime":6,"hardEnergizerTime":3,
            "bonusFruit":"cherry","fruitPoints":100}]"#;
        std::fs::write(&path, raw).expect("write levels");
        let records = load_levels(&path).expect("levels parse");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].fruit_points, 100);
        let _ = std::fs::remove_file(&path);
    }
}
