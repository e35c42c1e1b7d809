//! End-to-end flows over a SQLite-backed session.

use std::time::Duration;

use salaryflow_core::{
    update_rates, Currency, Database, ManualClock, SalaryPeriod, Session, SortOrder,
    StaticRateFetcher, TimerState,
};

fn open(db: Database, clock: &ManualClock) -> Session<Database, ManualClock> {
    Session::open_with_clock(db, clock.clone()).unwrap()
}

#[test]
fn calculate_tick_record_export() {
    let clock = ManualClock::new(1_700_000_000_000);
    let mut session = open(Database::open_memory().unwrap(), &clock);

    let rate = session
        .begin(246.0 * 8.0 * 3600.0, SalaryPeriod::Year, Currency::Cny, true)
        .unwrap();
    assert!((rate.per_second() - 1.0).abs() < 1e-12);
    assert!((rate.per_hour() - 3600.0).abs() < 1e-9);

    clock.advance(Duration::from_secs(60));
    let first = session.record().unwrap();
    assert!((first.amount - 60.0).abs() < 1e-9);

    clock.advance(Duration::from_secs(30));
    session.pause().unwrap();
    clock.advance(Duration::from_secs(600));
    let second = session.record().unwrap();
    assert!((second.amount - 90.0).abs() < 1e-9);
    assert!((second.delta - 30.0).abs() < 1e-9);

    let records = session.records();
    let desc = records.list_all(SortOrder::Descending).unwrap();
    assert_eq!(desc.len(), 2);
    assert_eq!(desc[0].id, second.id);

    let csv = records.export_csv(SortOrder::Ascending).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "时间,金额,货币,持续时间(秒),收益增量");
    assert!(lines[1].contains(",60,CNY,60,60"));
    assert!(lines[2].contains(",90,CNY,90,30"));
}

#[test]
fn latest_list_is_bounded_and_rebuilt_on_delete() {
    let clock = ManualClock::new(0);
    let mut session = open(Database::open_memory().unwrap(), &clock);
    session
        .begin(10_000.0, SalaryPeriod::Month, Currency::Usd, true)
        .unwrap();

    let mut ids = Vec::new();
    for _ in 0..5 {
        clock.advance(Duration::from_secs(1));
        ids.push(session.record().unwrap().id);
    }

    let mut records = session.records();
    assert_eq!(records.history().unwrap().len(), 5);
    let latest = records.latest().unwrap();
    assert_eq!(latest.len(), 3);
    assert_eq!(latest[0].id, ids[4]);

    assert!(records.delete(&ids[4]).unwrap());
    let latest: Vec<String> = records.latest().unwrap().into_iter().map(|r| r.id).collect();
    assert_eq!(latest, vec![ids[3].clone(), ids[2].clone(), ids[1].clone()]);

    assert!(!records.delete("no-such-id").unwrap());
    records.clear_all().unwrap();
    assert!(records.history().unwrap().is_empty());
    assert!(records.export_csv(SortOrder::Descending).is_err());
}

#[test]
fn running_timer_persists_across_processes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("salaryflow.db");
    let clock = ManualClock::new(5_000);

    {
        let mut session = open(Database::open_at(&path).unwrap(), &clock);
        session
            .begin(100_000.0, SalaryPeriod::Year, Currency::Gbp, true)
            .unwrap();
        clock.advance(Duration::from_secs(10));
    }

    clock.advance(Duration::from_secs(20));
    let mut session = open(Database::open_at(&path).unwrap(), &clock);
    session.status().unwrap();
    assert_eq!(session.engine().state(), TimerState::Running);
    assert_eq!(session.engine().elapsed_ms(), 30_000);

    session.reset().unwrap();
    assert_eq!(session.engine().state(), TimerState::Idle);
    assert_eq!(session.engine().current_amount(), 0.0);
}

#[test]
fn rates_update_feeds_display_conversion() {
    let clock = ManualClock::new(0);
    let mut session = open(Database::open_memory().unwrap(), &clock);

    let mut prefs = session.preferences().clone();
    prefs.set("currency.defaultDisplayCurrency", "JPY").unwrap();
    session.save_preferences(prefs).unwrap();

    let settings = session.preferences().exchange_rate.clone();
    let updated = update_rates(
        session.store_mut(),
        &StaticRateFetcher::new(Duration::ZERO),
        &settings,
        chrono::Utc::now(),
    )
    .unwrap();
    assert!(updated.last_updated.is_some());

    session
        .begin(246.0 * 8.0 * 3600.0, SalaryPeriod::Year, Currency::Cny, true)
        .unwrap();
    clock.advance(Duration::from_secs(100));
    session.status().unwrap();
    // 100 CNY at 15.1823 JPY/CNY, JPY has no fraction digits.
    assert_eq!(session.display_amount().unwrap(), "¥ 1,518");
}
