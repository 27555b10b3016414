//! Alert Evaluation Integration Tests
//!
//! Store → engine → sink, including concurrent ingestion and evaluation

use std::sync::Arc;
use std::thread;

use alert_engine::ingest::ingest_text;
use alert_engine::{CollectingSink, EvaluationEngine, FixedClock, RecordStore};
use vitals_core::{Alert, Condition, PatientId, RecordType, TimestampMs, HOUR_MS, MINUTE_MS};

const NOW: TimestampMs = 1_700_000_000_000;

fn engine(store: Arc<RecordStore>, sink: Arc<CollectingSink>) -> EvaluationEngine {
    EvaluationEngine::new(store, sink).with_clock(Arc::new(FixedClock::new(NOW)))
}

fn conditions(alerts: &[Alert]) -> Vec<Condition> {
    alerts.iter().map(|a| a.condition).collect()
}

#[test]
fn test_blood_pressure_trend_through_store() {
    let store = Arc::new(RecordStore::new());
    let patient = PatientId(42);
    // Inserted out of order on purpose
    store.append(patient, 142.0, RecordType::SystolicPressure, NOW - HOUR_MS).unwrap();
    store.append(patient, 120.0, RecordType::SystolicPressure, NOW - 3 * HOUR_MS).unwrap();
    store.append(patient, 131.0, RecordType::SystolicPressure, NOW - 2 * HOUR_MS).unwrap();

    let sink = Arc::new(CollectingSink::new());
    engine(store, sink.clone()).evaluate_data(patient);

    assert_eq!(
        sink.snapshot(),
        vec![Alert::new(patient, Condition::SystolicIncreasing, NOW - HOUR_MS)]
    );
}

#[test]
fn test_critical_systolic_for_every_out_of_range_reading() {
    let store = Arc::new(RecordStore::new());
    let patient = PatientId(5);
    let values = [(75.0, NOW - 10 * HOUR_MS), (120.0, NOW - 5 * HOUR_MS), (200.0, NOW - MINUTE_MS)];
    for (value, ts) in values {
        store.append(patient, value, RecordType::SystolicPressure, ts).unwrap();
    }

    let sink = Arc::new(CollectingSink::new());
    engine(store, sink.clone()).evaluate_data(patient);

    let critical: Vec<TimestampMs> = sink
        .snapshot()
        .iter()
        .filter(|a| a.condition == Condition::CriticalSystolic)
        .map(|a| a.timestamp)
        .collect();
    assert_eq!(critical, vec![NOW - 10 * HOUR_MS, NOW - MINUTE_MS]);
}

#[test]
fn test_text_ingestion_to_alerts() {
    let store = Arc::new(RecordStore::new());
    let text = format!(
        "Patient ID: 9, Timestamp: {}, Label: Saturation, Data: 98.0%\n\
         Patient ID: 9, Timestamp: {}, Label: Saturation, Data: 92.0%\n\
         9,{},Alert,triggered\n\
         9,{},Alert,resolved\n",
        NOW - 10 * MINUTE_MS,
        NOW - 5 * MINUTE_MS,
        NOW - 4 * MINUTE_MS,
        NOW - 2 * MINUTE_MS,
    );
    let summary = ingest_text(&store, &text);
    assert_eq!(summary.accepted, 4);

    let sink = Arc::new(CollectingSink::new());
    engine(store, sink.clone()).evaluate_data(PatientId(9));

    assert_eq!(
        sink.snapshot(),
        vec![
            Alert::new(PatientId(9), Condition::RapidSaturationDrop, NOW - 5 * MINUTE_MS),
            Alert::new(PatientId(9), Condition::ManualTrigger, NOW - 4 * MINUTE_MS),
        ]
    );
}

#[test]
fn test_patients_are_isolated() {
    let store = Arc::new(RecordStore::new());
    store.append(PatientId(1), 85.0, RecordType::SystolicPressure, NOW).unwrap();
    store.append(PatientId(2), 90.0, RecordType::Saturation, NOW).unwrap();

    let sink = Arc::new(CollectingSink::new());
    let engine = engine(store, sink.clone());
    engine.evaluate_data(PatientId(1));
    engine.evaluate_data(PatientId(2));

    // Neither patient has both signals, so no hypotensive hypoxemia
    assert_eq!(
        conditions(&sink.snapshot()),
        vec![Condition::CriticalSystolic, Condition::LowSaturation]
    );
}

#[test]
fn test_concurrent_appends_for_distinct_patients() {
    let store = Arc::new(RecordStore::new());
    let calls_per_patient = 1_000;

    let handles: Vec<_> = (0..16)
        .map(|p| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 0..calls_per_patient {
                    store
                        .append(PatientId(p), 72.0, RecordType::Ecg, NOW - i as i64)
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    for p in 0..16 {
        assert_eq!(store.query(PatientId(p), i64::MIN, i64::MAX).len(), calls_per_patient);
    }
}

#[test]
fn test_evaluation_concurrent_with_ingestion() {
    let store = Arc::new(RecordStore::new());
    let sink = Arc::new(CollectingSink::new());
    let engine = Arc::new(engine(Arc::clone(&store), sink.clone()));
    let patient = PatientId(77);

    let writer = {
        let store = Arc::clone(&store);
        thread::spawn(move || {
            for i in 0..2_000 {
                store
                    .append(patient, 72.0, RecordType::Ecg, NOW - HOUR_MS + i * 1_000)
                    .unwrap();
            }
        })
    };
    let readers: Vec<_> = (0..4)
        .map(|_| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                for _ in 0..50 {
                    let summary = engine.evaluate_data(patient);
                    assert_eq!(summary.rule_failures, 0);
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }

    // Regular 1s rhythm at 72 bpm never alerts, however the snapshots interleave
    assert!(sink.is_empty());
    assert_eq!(store.len(patient), 2_000);
}

#[test]
fn test_concurrent_evaluation_of_different_patients() {
    let store = Arc::new(RecordStore::new());
    for p in 0..8 {
        store.append(PatientId(p), 1.0, RecordType::ManualAlert, NOW - p).unwrap();
    }
    let sink = Arc::new(CollectingSink::new());
    let engine = Arc::new(engine(store, sink.clone()));

    let handles: Vec<_> = (0..8)
        .map(|p| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || engine.evaluate_data(PatientId(p)))
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap().alerts_delivered, 1);
    }

    let mut delivered: Vec<String> = sink.drain().into_iter().map(|a| a.patient_id).collect();
    delivered.sort();
    let mut expected: Vec<String> = (0..8).map(|p| p.to_string()).collect();
    expected.sort();
    assert_eq!(delivered, expected);
}
