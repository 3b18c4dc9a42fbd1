use std::sync::Arc;

use chrono::{Local, NaiveDate};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::error::SubmitError;
use crate::model::attendance::{AttendanceInput, AttendanceRecord};
use crate::model::network_info::or_unknown;
use crate::models::SubmissionResult;
use crate::remote::RemotePersistenceClient;
use crate::resolver::{ClientEnvironment, NetworkInfoResolver};
use crate::service::validation::{ValidForm, validate};
use crate::store::LocalRecordStore;
use crate::utils::time::DATE_FORMAT;

/// Validate → enrich → remote insert → local copy (or local fallback).
pub struct SubmissionService {
    store: Arc<LocalRecordStore>,
    remote: Arc<RemotePersistenceClient>,
    resolver: Arc<NetworkInfoResolver>,
}

impl SubmissionService {
    pub fn new(
        store: Arc<LocalRecordStore>,
        remote: Arc<RemotePersistenceClient>,
        resolver: Arc<NetworkInfoResolver>,
    ) -> Self {
        Self {
            store,
            remote,
            resolver,
        }
    }

    pub async fn submit(
        &self,
        input: &AttendanceInput,
        env: &ClientEnvironment,
    ) -> Result<SubmissionResult, SubmitError> {
        self.submit_as_of(input, env, Local::now().date_naive()).await
    }

    /// `today` bounds the accepted attendance date.
    #[instrument(skip_all, fields(employee = input.employee_name.as_deref().unwrap_or("")))]
    pub async fn submit_as_of(
        &self,
        input: &AttendanceInput,
        env: &ClientEnvironment,
        today: NaiveDate,
    ) -> Result<SubmissionResult, SubmitError> {
        let form = validate(input, today).map_err(|field_errors| {
            info!(count = field_errors.len(), "Submission rejected by validation");
            SubmitError::ValidationFailed { field_errors }
        })?;

        let record = self.build_record(form, env).await;

        match self.remote.insert(&record).await {
            Ok(remote_id) => {
                info!(id = %record.id, %remote_id, "Record stored remotely");
                if let Err(e) = self.store.append(&record).await {
                    warn!(error = %e, id = %record.id, "Local backup copy failed");
                }
                Ok(SubmissionResult::stored_remotely(record, remote_id))
            }
            Err(remote_err) => {
                warn!(error = %remote_err, id = %record.id, "Remote insert failed, storing locally");
                match self.store.append(&record).await {
                    Ok(()) => Ok(SubmissionResult::stored_locally(
                        record,
                        remote_err.to_string(),
                    )),
                    Err(local_err) => {
                        error!(
                            remote = %remote_err,
                            local = %local_err,
                            id = %record.id,
                            "Submission lost: remote and local persistence both failed"
                        );
                        Err(SubmitError::SubmissionFailed {
                            remote: remote_err.to_string(),
                            local: local_err.to_string(),
                        })
                    }
                }
            }
        }
    }

    async fn build_record(&self, form: ValidForm, env: &ClientEnvironment) -> AttendanceRecord {
        let network_info = self.resolver.resolve(env).await;

        AttendanceRecord {
            id: Uuid::new_v4().to_string(),
            employee_name: form.employee_name,
            department: form.department,
            attendance_date: form.attendance_date.format(DATE_FORMAT).to_string(),
            attendance_time: form.attendance_time,
            attendance_type: form.attendance_type,
            location: form.location,
            custom_location: form.custom_location,
            notes: form.notes,
            submitted_at: Local::now().to_rfc3339(),
            user_agent: or_unknown(Some(&env.user_agent)),
            network_info,
        }
    }
}
