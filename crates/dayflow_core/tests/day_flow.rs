use chrono::NaiveDate;
use dayflow_core::db::{open_db, open_db_in_memory};
use dayflow_core::flow::persistence::{LAST_RUN_DATE_KEY, SELECTED_FOCUS_KEY};
use dayflow_core::{
    DayFlowMachine, DayFlowPersistence, DayPhase, Focus, Mood, PreferenceError, PreferenceResult,
    PreferenceStore, SqlitePreferenceStore, TomorrowStart,
};
use std::path::Path;

struct UnavailablePrefs;

impl PreferenceStore for UnavailablePrefs {
    fn get(&self, _key: &str) -> PreferenceResult<Option<String>> {
        Err(PreferenceError::Unavailable("storage offline".to_string()))
    }

    fn set(&mut self, _key: &str, _value: &str) -> PreferenceResult<()> {
        Err(PreferenceError::Unavailable("storage offline".to_string()))
    }
}

fn date(text: &str) -> NaiveDate {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").unwrap()
}

fn prefs(entries: &[(&str, &str)]) -> SqlitePreferenceStore {
    let mut store = SqlitePreferenceStore::new(open_db_in_memory().unwrap());
    for (key, value) in entries {
        store.set(key, value).unwrap();
    }
    store
}

fn cold_start(path: &Path, today: &str) -> DayFlowMachine<SqlitePreferenceStore> {
    let store = SqlitePreferenceStore::new(open_db(path).unwrap());
    DayFlowMachine::start(DayFlowPersistence::new(store), date(today))
}

fn stored(machine: &DayFlowMachine<SqlitePreferenceStore>, key: &str) -> Option<String> {
    machine.persistence().store().get(key).unwrap()
}

#[test]
fn same_day_restart_with_focus_skips_to_task_list() {
    let store = prefs(&[
        (LAST_RUN_DATE_KEY, "2025-01-01"),
        (SELECTED_FOCUS_KEY, "Konstant bleiben"),
    ]);
    let mut machine = DayFlowMachine::start(DayFlowPersistence::new(store), date("2025-01-01"));

    assert_eq!(machine.current_phase(), DayPhase::MorningConfirmation);
    assert_eq!(machine.selected_focus(), Some(Focus::StayConsistent));
    assert!(!machine.is_first_run_today());

    assert!(machine.finish_confirmation());
    assert_eq!(machine.current_phase(), DayPhase::DayTaskList);
}

#[test]
fn first_run_walks_the_whole_morning_and_persists_focus() {
    let mut machine =
        DayFlowMachine::start(DayFlowPersistence::new(prefs(&[])), date("2025-01-02"));

    assert_eq!(machine.current_phase(), DayPhase::MorningIntro);
    assert!(machine.is_first_run_today());
    assert_eq!(machine.selected_focus(), None);
    assert_eq!(
        stored(&machine, LAST_RUN_DATE_KEY).as_deref(),
        Some("2025-01-02")
    );
    assert_eq!(stored(&machine, SELECTED_FOCUS_KEY).as_deref(), Some(""));

    assert!(machine.finish_intro());
    assert_eq!(machine.current_phase(), DayPhase::MorningFocus);
    assert!(machine.choose_focus(Focus::BigStep));
    assert_eq!(machine.current_phase(), DayPhase::MorningConfirmation);
    assert_eq!(
        stored(&machine, SELECTED_FOCUS_KEY).as_deref(),
        Some("Großer Schritt")
    );

    assert!(machine.finish_confirmation());
    assert_eq!(machine.current_phase(), DayPhase::FIRST_MOVE);
    for step in 0..3 {
        assert!(machine.toggle_first_move_step(step));
    }
    assert_eq!(machine.current_phase(), DayPhase::FirstMoveSuccess);
    assert!(machine.finish_first_move_success());
    assert_eq!(machine.current_phase(), DayPhase::DayTaskList);
    assert_eq!(machine.selected_focus(), Some(Focus::BigStep));
}

#[test]
fn rest_of_day_runs_to_the_idle_task_list() {
    let store = prefs(&[
        (LAST_RUN_DATE_KEY, "2025-03-10"),
        (SELECTED_FOCUS_KEY, "Sauber abschließen"),
    ]);
    let mut machine = DayFlowMachine::start(DayFlowPersistence::new(store), date("2025-03-10"));
    machine.finish_confirmation();

    assert!(machine.clear_day_tasks());
    assert_eq!(machine.current_phase(), DayPhase::MiddayReset { mood: None });
    assert!(machine.select_mood(Mood::Okay));
    assert_eq!(
        machine.current_phase(),
        DayPhase::MiddayReset {
            mood: Some(Mood::Okay)
        }
    );
    assert!(machine.start_focus_timer());
    assert_eq!(machine.current_phase(), DayPhase::EveningClosure);
    assert!(machine.finish_evening());
    assert!(machine.select_tomorrow_option(TomorrowStart::CalmStart));
    assert_eq!(
        machine.current_phase(),
        DayPhase::TomorrowSetup {
            choice: Some(TomorrowStart::CalmStart)
        }
    );
    assert!(machine.finish_tomorrow_setup());
    assert_eq!(machine.current_phase(), DayPhase::TaskList);

    assert!(!machine.clear_day_tasks());
    assert!(!machine.finish_intro());
    assert_eq!(machine.current_phase(), DayPhase::TaskList);
}

#[test]
fn first_move_success_fires_once() {
    let mut machine =
        DayFlowMachine::start(DayFlowPersistence::new(prefs(&[])), date("2025-01-02"));
    machine.finish_intro();
    machine.choose_focus(Focus::FinishCleanly);
    machine.finish_confirmation();
    for step in 0..3 {
        machine.toggle_first_move_step(step);
    }
    let generation = machine.generation();

    assert!(!machine.toggle_first_move_step(2));
    assert!(!machine.toggle_first_move_step(0));
    assert_eq!(machine.generation(), generation);
    assert_eq!(machine.current_phase(), DayPhase::FirstMoveSuccess);
}

#[test]
fn repeated_cold_starts_on_the_same_day_take_the_short_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dayflow.sqlite3");

    let mut first = cold_start(&path, "2025-01-02");
    assert!(first.is_first_run_today());
    first.finish_intro();
    first.choose_focus(Focus::BigStep);
    drop(first);

    for _ in 0..3 {
        let mut again = cold_start(&path, "2025-01-02");
        assert!(!again.is_first_run_today());
        assert_eq!(again.current_phase(), DayPhase::MorningConfirmation);
        assert_eq!(again.selected_focus(), Some(Focus::BigStep));
        again.finish_confirmation();
        assert_eq!(again.current_phase(), DayPhase::DayTaskList);
    }

    let next_day = cold_start(&path, "2025-01-03");
    assert!(next_day.is_first_run_today());
    assert_eq!(next_day.current_phase(), DayPhase::MorningIntro);
    assert_eq!(next_day.selected_focus(), None);
    assert_eq!(stored(&next_day, LAST_RUN_DATE_KEY).as_deref(), Some("2025-01-03"));
}

#[test]
fn restart_before_choosing_focus_replays_intro_without_first_move() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dayflow.sqlite3");
    drop(cold_start(&path, "2025-06-01"));

    let mut again = cold_start(&path, "2025-06-01");
    assert_eq!(again.current_phase(), DayPhase::MorningIntro);
    assert!(!again.is_first_run_today());

    again.finish_intro();
    again.choose_focus(Focus::StayConsistent);
    again.finish_confirmation();
    assert_eq!(again.current_phase(), DayPhase::DayTaskList);
}

#[test]
fn restart_on_a_new_day_before_choosing_focus_forgets_yesterdays_focus() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dayflow.sqlite3");

    let mut yesterday = cold_start(&path, "2025-06-01");
    yesterday.finish_intro();
    yesterday.choose_focus(Focus::BigStep);
    drop(yesterday);

    let interrupted = cold_start(&path, "2025-06-02");
    assert!(interrupted.is_first_run_today());
    assert_eq!(interrupted.current_phase(), DayPhase::MorningIntro);
    assert_eq!(stored(&interrupted, SELECTED_FOCUS_KEY).as_deref(), Some(""));
    drop(interrupted);

    let mut again = cold_start(&path, "2025-06-02");
    assert!(!again.is_first_run_today());
    assert_eq!(again.current_phase(), DayPhase::MorningIntro);
    assert_eq!(again.selected_focus(), None);

    again.finish_intro();
    assert!(again.choose_focus(Focus::FinishCleanly));
    assert_eq!(again.selected_focus(), Some(Focus::FinishCleanly));
}

#[test]
fn unavailable_preferences_degrade_to_first_run() {
    let mut machine =
        DayFlowMachine::start(DayFlowPersistence::new(UnavailablePrefs), date("2025-01-01"));

    assert!(machine.is_first_run_today());
    assert_eq!(machine.current_phase(), DayPhase::MorningIntro);

    machine.finish_intro();
    assert!(machine.choose_focus(Focus::BigStep));
    assert_eq!(machine.selected_focus(), Some(Focus::BigStep));
    assert!(machine.finish_confirmation());
    assert_eq!(machine.current_phase(), DayPhase::FIRST_MOVE);
}

#[test]
fn planning_is_reachable_from_the_day_task_list() {
    let store = prefs(&[
        (LAST_RUN_DATE_KEY, "2025-01-01"),
        (SELECTED_FOCUS_KEY, "Großer Schritt"),
    ]);
    let mut machine = DayFlowMachine::start(DayFlowPersistence::new(store), date("2025-01-01"));
    assert!(!machine.request_planning());
    machine.finish_confirmation();

    assert!(machine.request_planning());
    assert!(machine.open_long_term_goals());
    assert!(machine.back_to_planning());
    assert!(machine.open_weekly_planning());
    assert_eq!(machine.current_phase(), DayPhase::PlanningWeekly);
}
