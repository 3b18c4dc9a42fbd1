mod common;

use std::sync::Arc;

use attendance_desk::error::SubmitError;
use attendance_desk::model::statistics::DataSource;
use attendance_desk::remote::{InitState, RemotePersistenceClient};
use attendance_desk::resolver::{ClientEnvironment, SOURCE_LOCAL_ENVIRONMENT};
use attendance_desk::service::{StatisticsService, SubmissionService};

use common::*;

fn localhost() -> ClientEnvironment {
    ClientEnvironment {
        hostname: "localhost".into(),
        client_ip: String::new(),
        user_agent: "Mozilla/5.0 (X11; Linux x86_64)".into(),
        locale: "zh-TW".into(),
        timezone: "Asia/Taipei".into(),
    }
}

#[tokio::test]
async fn remote_success_is_counted_and_backed_up_locally() {
    let (store, _dir) = sqlite_store().await;
    let table = Arc::new(MemoryTable::default());
    let remote = Arc::new(RemotePersistenceClient::new(Arc::new(MemoryConnector(
        table.clone(),
    ))));
    let submissions = SubmissionService::new(store.clone(), remote.clone(), offline_resolver());
    let stats = StatisticsService::new(store.clone(), remote.clone());

    let before = stats.daily_summary(TODAY).await;
    assert_eq!(before.checkin_count, 0);

    let result = submissions
        .submit_as_of(&valid_input("checkin"), &localhost(), today())
        .await
        .expect("submission should succeed");

    assert!(result.remote);
    assert_eq!(result.remote_id.as_deref(), Some("1"));
    assert!(result.fallback_reason.is_none());
    assert_eq!(result.record.network_info.source, SOURCE_LOCAL_ENVIRONMENT);
    assert_eq!(result.record.network_info.isp, "Local Development");
    assert_eq!(result.record.network_info.country, "TW");
    assert_eq!(table.len(), 1);
    assert_eq!(store.len().await, 1);
    assert_eq!(remote.state(), InitState::Ready);

    let after = stats.daily_summary(TODAY).await;
    assert_eq!(after.source, DataSource::Remote);
    assert_eq!(after.checkin_count, 1);
    assert_eq!(after.checkout_count, 0);
    assert_eq!(after.records[0].attendance_time, "08:15");
}

#[tokio::test]
async fn remote_outage_falls_back_to_local_store() {
    let (store, _dir) = sqlite_store().await;
    let remote = Arc::new(RemotePersistenceClient::new(Arc::new(DownConnector)));
    let submissions = SubmissionService::new(store.clone(), remote.clone(), offline_resolver());
    let stats = StatisticsService::new(store.clone(), remote.clone());

    let result = submissions
        .submit_as_of(&valid_input("checkout"), &localhost(), today())
        .await
        .expect("local fallback should succeed");

    assert!(!result.remote);
    assert!(result.remote_id.is_none());
    assert!(
        result
            .fallback_reason
            .as_deref()
            .is_some_and(|r| r.contains("connection refused"))
    );
    assert_eq!(remote.state(), InitState::Failed);

    let local = store.query_by_date(TODAY).await;
    assert_eq!(local.len(), 1);
    assert_eq!(local[0].id, result.id);

    let summary = stats.daily_summary(TODAY).await;
    assert_eq!(summary.source, DataSource::Local);
    assert_eq!(summary.checkout_count, 1);
    assert_eq!(summary.checkin_count, 0);

    let backups = store.backups().await.unwrap();
    assert_eq!(backups.len(), 1);
    assert_eq!(backups[0].file_name, "attendance_Wang Lei_2026-01-05_0815.json");
}

#[tokio::test]
async fn both_stores_failing_reports_submission_failed() {
    let store = failing_store().await;
    let remote = Arc::new(RemotePersistenceClient::new(Arc::new(DownConnector)));
    let submissions = SubmissionService::new(store.clone(), remote, offline_resolver());

    let err = submissions
        .submit_as_of(&valid_input("checkin"), &localhost(), today())
        .await
        .unwrap_err();

    match err {
        SubmitError::SubmissionFailed { remote, local } => {
            assert!(remote.contains("connection refused"));
            assert!(local.contains("disk full"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(store.len().await, 0);
}

#[tokio::test]
async fn local_backup_failure_keeps_remote_success() {
    let store = failing_store().await;
    let table = Arc::new(MemoryTable::default());
    let remote = Arc::new(RemotePersistenceClient::new(Arc::new(MemoryConnector(
        table.clone(),
    ))));
    let submissions = SubmissionService::new(store.clone(), remote, offline_resolver());

    let result = submissions
        .submit_as_of(&valid_input("checkin"), &localhost(), today())
        .await
        .unwrap();

    assert!(result.remote);
    assert_eq!(table.len(), 1);
    assert_eq!(store.len().await, 0);
}

#[tokio::test]
async fn invalid_form_lists_every_field_and_stores_nothing() {
    let (store, _dir) = sqlite_store().await;
    let table = Arc::new(MemoryTable::default());
    let remote = Arc::new(RemotePersistenceClient::new(Arc::new(MemoryConnector(
        table.clone(),
    ))));
    let submissions = SubmissionService::new(store.clone(), remote.clone(), offline_resolver());

    let mut input = valid_input("checkin");
    input.employee_name = Some("   ".into());
    input.attendance_date = Some("2026-01-06".into());

    let err = submissions
        .submit_as_of(&input, &localhost(), today())
        .await
        .unwrap_err();

    let SubmitError::ValidationFailed { field_errors } = err else {
        panic!("expected validation failure");
    };
    let fields: Vec<_> = field_errors.iter().map(|e| e.field.as_str()).collect();
    assert_eq!(fields, vec!["employeeName", "attendanceDate"]);

    assert_eq!(table.len(), 0);
    assert_eq!(store.len().await, 0);
    // validation runs before any remote work
    assert_eq!(remote.state(), InitState::Uninitialized);
}

#[tokio::test]
async fn other_location_keeps_custom_text() {
    let (store, _dir) = sqlite_store().await;
    let remote = Arc::new(RemotePersistenceClient::new(Arc::new(DownConnector)));
    let submissions = SubmissionService::new(store, remote, offline_resolver());

    let mut input = valid_input("checkin");
    input.location = Some("other".into());
    input.custom_location = Some("Client site, Tainan".into());

    let result = submissions
        .submit_as_of(&input, &localhost(), today())
        .await
        .unwrap();
    assert_eq!(result.record.custom_location, "Client site, Tainan");
    assert_eq!(result.record.notes, "early shift");
}

#[tokio::test]
async fn local_records_survive_reopen() {
    let (store, dir) = sqlite_store().await;
    let remote = Arc::new(RemotePersistenceClient::new(Arc::new(DownConnector)));
    let submissions = SubmissionService::new(store.clone(), remote, offline_resolver());

    let first = submissions
        .submit_as_of(&valid_input("checkin"), &localhost(), today())
        .await
        .unwrap();
    let second = submissions
        .submit_as_of(&valid_input("checkout"), &localhost(), today())
        .await
        .unwrap();
    drop(submissions);
    drop(store);

    let reopened = open_store(&dir).await;
    let records = reopened.load_all().await;
    let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec![first.id.as_str(), second.id.as_str()]);
    assert_eq!(records[1], second.record);

    let blob = reopened.backup(&first.id).await.unwrap().unwrap();
    assert_eq!(blob["attendanceRecord"]["employeeName"], "Wang Lei");
    assert_eq!(reopened.backups().await.unwrap().len(), 2);
}
