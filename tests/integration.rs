// Integration tests (native) for the `hidden-friends` crate.
// These drive a full `Run` with in-memory doubles for the host, the ticker
// and the progress store, so they run under `cargo test` on the host.

use std::cell::RefCell;
use std::rc::Rc;

use hidden_friends::error::{HostError, ProgressError};
use hidden_friends::host::Host;
use hidden_friends::progress::MemorySink;
use hidden_friends::session::FailReason;
use hidden_friends::{
    AttemptOutcome, Catalog, CharacterProgressRecord, CharacterRecord, GameConfig, Phase,
    ProgressBook, ProgressStore, Run, RunStatus, TickOutcome, Ticker,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

type Log = Rc<RefCell<Vec<String>>>;

#[derive(Default)]
struct RecordingHost {
    ready_calls: u32,
    game_overs: Vec<u64>,
    haptics: u32,
}

impl Host for RecordingHost {
    fn ready(&mut self) -> Result<(), HostError> {
        self.ready_calls += 1;
        Ok(())
    }
    fn game_over(&mut self, score: u64) -> Result<(), HostError> {
        self.game_overs.push(score);
        Ok(())
    }
    fn haptic_feedback(&mut self) -> Result<(), HostError> {
        self.haptics += 1;
        Ok(())
    }
}

struct LogTicker {
    log: Log,
    running: bool,
}

impl Ticker for LogTicker {
    fn start(&mut self) {
        self.running = true;
        self.log.borrow_mut().push("start".into());
    }
    fn stop(&mut self) {
        if self.running {
            self.log.borrow_mut().push("stop".into());
        }
        self.running = false;
    }
}

/// Progress store that records calls into the shared log.
struct SpyStore {
    inner: ProgressBook<MemorySink>,
    log: Log,
}

impl ProgressStore for SpyStore {
    fn coins(&self) -> u64 {
        self.inner.coins()
    }
    fn add_coins(&mut self, amount: u64) {
        self.log.borrow_mut().push(format!("coins:{amount}"));
        self.inner.add_coins(amount)
    }
    fn spend_coins(&mut self, amount: u64) -> bool {
        self.inner.spend_coins(amount)
    }
    fn unlock_character(&mut self, id: &str, level: u32) {
        self.log.borrow_mut().push(format!("unlock:{id}:{level}"));
        self.inner.unlock_character(id, level)
    }
    fn character_progress(&self, id: &str) -> CharacterProgressRecord {
        self.inner.character_progress(id)
    }
    fn unlocked_characters(&self) -> Vec<CharacterProgressRecord> {
        self.inner.unlocked_characters()
    }
    fn load_saved_state(&mut self, json: &str) -> Result<bool, ProgressError> {
        self.log.borrow_mut().push("load".into());
        self.inner.load_saved_state(json)
    }
}

type TestRun = Run<SpyStore, RecordingHost, LogTicker>;

fn make_run(cfg: GameConfig, catalog: Catalog) -> (TestRun, Log) {
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    let store = SpyStore {
        inner: ProgressBook::new(MemorySink::default()),
        log: log.clone(),
    };
    let ticker = LogTicker { log: log.clone(), running: false };
    let run = Run::new(cfg, catalog, store, RecordingHost::default(), ticker, StdRng::seed_from_u64(11));
    (run, log)
}

fn builtin_run() -> (TestRun, Log) {
    make_run(GameConfig::default(), Catalog::builtin().unwrap())
}

fn finish_intro(run: &mut TestRun) {
    for _ in 0..run.config().intro_countdown_ticks {
        run.tick();
    }
    assert_eq!(run.session().map(|s| s.phase()), Some(Phase::Active));
}

fn target_index(run: &TestRun) -> usize {
    run.layout()
        .sprites
        .iter()
        .position(|s| s.is_target && !s.found)
        .expect("a target is left")
}

fn decoy_index(run: &TestRun) -> usize {
    run.layout()
        .sprites
        .iter()
        .position(|s| !s.is_target)
        .expect("layout has a decoy")
}

fn double_tap(run: &mut TestRun, index: usize, at: f64) -> AttemptOutcome {
    let first = run.tap(index, at);
    assert_eq!(first, AttemptOutcome::Ignored);
    run.tap(index, at + 100.0)
}

#[test]
fn level_one_single_target_completes_and_advances() {
    let (mut run, log) = builtin_run();
    run.start();
    assert_eq!(run.level(), 1);
    let plan = run.session().unwrap().plan().clone();
    assert_eq!(plan.total_targets(), 1);
    assert_eq!(plan.time_limit_seconds, 15);
    finish_intro(&mut run);

    let idx = target_index(&run);
    let out = double_tap(&mut run, idx, 1_000.0);
    match out {
        AttemptOutcome::LevelComplete { id, points } => {
            assert_eq!(id, "graceful-goldfish");
            assert!((100..=400).contains(&points));
        }
        other => panic!("expected completion, got {other:?}"),
    }

    assert_eq!(run.level(), 2);
    assert_eq!(run.status(), RunStatus::Playing);
    assert_eq!(run.store().coins(), 50);
    assert!(run.store().is_unlocked("graceful-goldfish"));
    let s = run.session().unwrap();
    assert_eq!(s.score(), 400);
    assert_eq!(s.coins(), 50);
    assert_eq!(s.strikes(), 0);
    assert!(matches!(s.phase(), Phase::Intro { .. }));
    assert!(s.found_catalog_ids().contains("graceful-goldfish"));
    assert_eq!(run.host().haptics, 1);

    let log = log.borrow();
    assert_eq!(
        *log,
        vec!["start", "stop", "coins:50", "unlock:graceful-goldfish:1", "start"]
    );
}

#[test]
fn level_fourteen_requires_double_find() {
    let (mut run, _) = builtin_run();
    run.start_at(14);
    let plan = run.session().unwrap().plan().clone();
    assert_eq!(plan.base_level, 1);
    assert_eq!(plan.required("graceful-goldfish"), 2);
    assert_eq!(plan.time_limit_seconds, 15);
    finish_intro(&mut run);

    let first = target_index(&run);
    assert!(matches!(
        double_tap(&mut run, first, 0.0),
        AttemptOutcome::Progress { found: 1, required: 2, .. }
    ));
    // found sprite no longer reacts
    assert_eq!(run.tap(first, 5_000.0), AttemptOutcome::Ignored);
    assert!(run.resume());
    assert_eq!(run.tap(first, 5_000.0), AttemptOutcome::Ignored);
    assert_eq!(run.tap(first, 5_050.0), AttemptOutcome::Ignored);

    let second = target_index(&run);
    assert_ne!(first, second);
    assert!(matches!(
        double_tap(&mut run, second, 6_000.0),
        AttemptOutcome::LevelComplete { .. }
    ));
    assert_eq!(run.store().character_progress("graceful-goldfish").max_level, 2);
    assert_eq!(run.store().coins(), 100);
    assert_eq!(run.level(), 15);
}

#[test]
fn first_wrong_pick_ends_the_run() {
    let (mut run, log) = builtin_run();
    run.start();
    finish_intro(&mut run);
    let decoy = decoy_index(&run);

    assert_eq!(run.tap(decoy, 0.0), AttemptOutcome::Ignored);
    assert_eq!(run.session().unwrap().strikes(), 0);
    assert_eq!(run.tap(decoy, 50.0), AttemptOutcome::LevelFailed { strikes: 1 });

    assert_eq!(run.status(), RunStatus::Over { score: 0, reason: FailReason::Strikes });
    assert!(run.session().is_none());
    assert_eq!(run.host().game_overs, vec![0]);
    assert_eq!(log.borrow().last().map(String::as_str), Some("stop"));

    // nothing reaches the discarded session
    assert_eq!(run.tick(), TickOutcome::Ignored);
    assert_eq!(run.tap(0, 1_000.0), AttemptOutcome::Ignored);
    assert_eq!(run.host().game_overs.len(), 1);
}

#[test]
fn timer_runs_out_on_the_zero_tick() {
    let (mut run, _) = builtin_run();
    run.start_at(13);
    finish_intro(&mut run);
    for _ in 0..9 {
        assert!(matches!(run.tick(), TickOutcome::Tick { .. }));
    }
    assert_eq!(run.tick(), TickOutcome::TimeExpired);
    assert_eq!(
        run.status(),
        RunStatus::Over { score: 0, reason: FailReason::TimeExpired }
    );
    assert!(!run.ticker().running);
    assert_eq!(run.host().game_overs, vec![0]);
    assert_eq!(run.tick(), TickOutcome::Ignored);
}

fn rec(id: &'static str) -> CharacterRecord {
    CharacterRecord {
        id,
        name: id,
        description: "",
        level: 1,
        map_asset: "m.png",
        card_asset: "c.png",
    }
}

#[test]
fn three_targets_pay_150_coins_and_unlock_each_once() {
    let catalog = Catalog::new(vec![rec("a"), rec("b"), rec("c")]).unwrap();
    let (mut run, log) = make_run(GameConfig::default(), catalog);
    run.start_at(27);
    assert_eq!(run.session().unwrap().plan().total_targets(), 3);
    finish_intro(&mut run);

    let mut t = 0.0;
    loop {
        let idx = target_index(&run);
        let out = double_tap(&mut run, idx, t);
        t += 1_000.0;
        match out {
            AttemptOutcome::Progress { .. } => assert!(run.resume()),
            AttemptOutcome::LevelComplete { .. } => break,
            other => panic!("unexpected {other:?}"),
        }
    }

    assert_eq!(run.store().coins(), 150);
    let log = log.borrow();
    let unlocks: Vec<_> = log.iter().filter(|l| l.starts_with("unlock:")).cloned().collect();
    assert_eq!(unlocks, vec!["unlock:a:1", "unlock:b:1", "unlock:c:1"]);
    assert_eq!(log.iter().filter(|l| l.starts_with("coins:")).count(), 1);
}

#[test]
fn score_and_coins_never_decrease_across_levels() {
    let (mut run, _) = builtin_run();
    run.start();
    let (mut last_score, mut last_coins) = (0u64, 0u64);
    let mut t = 0.0;
    for _ in 0..30 {
        finish_intro(&mut run);
        // let a couple of seconds pass so awards vary
        run.tick();
        run.tick();
        let level = run.level();
        while run.level() == level {
            let idx = target_index(&run);
            match double_tap(&mut run, idx, t) {
                AttemptOutcome::Progress { .. } => {
                    run.resume();
                }
                AttemptOutcome::LevelComplete { .. } => {}
                other => panic!("unexpected {other:?}"),
            }
            t += 1_000.0;
        }
        let s = run.session().unwrap();
        assert!(s.score() >= last_score);
        assert!(s.coins() >= last_coins);
        last_score = s.score();
        last_coins = s.coins();
    }
    assert_eq!(run.level(), 31);
    assert_eq!(run.store().unlocked_characters().len(), 13);
    // levels 14..=26 require two finds of their character
    assert_eq!(run.store().character_progress("fearless-fox").max_level, 2);
    assert_eq!(run.store().character_progress("graceful-goldfish").max_level, 3);
}

#[test]
fn picks_during_intro_and_pause_are_ignored() {
    let (mut run, _) = builtin_run();
    run.start_at(14);
    let idx = target_index(&run);
    assert_eq!(run.tap(idx, 0.0), AttemptOutcome::Ignored);
    assert_eq!(run.tap(idx, 10.0), AttemptOutcome::Ignored);
    finish_intro(&mut run);

    double_tap(&mut run, idx, 100.0);
    assert_eq!(run.session().unwrap().phase(), Phase::Paused);
    let decoy = decoy_index(&run);
    assert_eq!(double_tap(&mut run, decoy, 200.0), AttemptOutcome::Ignored);
    assert_eq!(run.session().unwrap().strikes(), 0);
}

#[test]
fn play_again_restarts_at_level_one_keeping_coins() {
    let (mut run, _) = builtin_run();
    run.start();
    finish_intro(&mut run);
    let idx = target_index(&run);
    double_tap(&mut run, idx, 0.0);
    finish_intro(&mut run);
    let decoy = decoy_index(&run);
    double_tap(&mut run, decoy, 1_000.0);
    assert!(matches!(run.status(), RunStatus::Over { .. }));

    run.play_again();
    assert_eq!(run.level(), 1);
    assert_eq!(run.status(), RunStatus::Playing);
    let s = run.session().unwrap();
    assert_eq!(s.score(), 0);
    assert_eq!(s.coins(), 50);
    assert!(run.ticker().running);
}

#[test]
fn hud_reflects_session() {
    let (mut run, _) = builtin_run();
    let idle = run.hud();
    assert_eq!(idle.phase, "idle");
    run.start_at(14);
    let hud = run.hud();
    assert_eq!(hud.phase, "intro");
    assert_eq!(hud.countdown, Some(3));
    assert_eq!(hud.targets.len(), 1);
    assert_eq!(hud.targets[0].required, 2);
    finish_intro(&mut run);
    run.tick();
    let hud = run.hud();
    assert_eq!(hud.phase, "active");
    assert_eq!(hud.remaining_seconds, 14);
}

const SAVED: &str = r#"{"gameState":{"coins":120,"characters":[{"id":"fearless-fox","unlocked":true,"maxLevel":2}]}}"#;

#[test]
fn boot_announces_ready_then_starts_level_one() {
    let (mut run, log) = builtin_run();
    run.boot();
    assert_eq!(run.host().ready_calls, 1);
    assert_eq!(run.level(), 1);
    assert_eq!(run.status(), RunStatus::Playing);
    assert_eq!(*log.borrow(), vec!["start"]);
}

#[test]
fn saved_state_arriving_after_boot_reaches_live_session() {
    let (mut run, _) = builtin_run();
    run.boot();
    assert_eq!(run.session().unwrap().coins(), 0);

    assert!(run.load_saved_state(SAVED).unwrap());
    assert_eq!(run.store().coins(), 120);
    assert_eq!(run.session().unwrap().coins(), 120);
    assert_eq!(run.hud().coins, 120);
    assert_eq!(run.store().character_progress("fearless-fox").max_level, 2);

    finish_intro(&mut run);
    let idx = target_index(&run);
    double_tap(&mut run, idx, 0.0);
    assert_eq!(run.store().coins(), 170);
    assert_eq!(run.session().unwrap().coins(), 170);
}

#[test]
fn saved_state_before_boot_is_used_by_first_level() {
    let (mut run, log) = builtin_run();
    assert!(run.load_saved_state(SAVED).unwrap());
    run.boot();
    assert_eq!(run.session().unwrap().coins(), 120);
    assert!(run.store().is_unlocked("fearless-fox"));
    assert_eq!(*log.borrow(), vec!["load", "start"]);
}

#[test]
fn unusable_saved_state_leaves_run_alone() {
    let (mut run, _) = builtin_run();
    run.boot();
    assert!(run.load_saved_state("{oops").is_err());
    assert!(!run.load_saved_state("null").unwrap());
    assert_eq!(run.session().unwrap().coins(), 0);
    assert_eq!(run.store().coins(), 0);
}
