use crate::api::health::HealthResponse;
use crate::api::network::ClientIp;
use crate::model::attendance::{AttendanceInput, AttendanceRecord, AttendanceType};
use crate::model::network_info::NetworkInfo;
use crate::model::statistics::{DailyStatistics, DataSource, RemoteTotals};
use crate::models::{BackupEntry, FieldError, SubmissionResult};
use crate::remote::InitState;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Attendance Desk API",
        version = "1.0.0",
        description = r#"
## Attendance check-in / check-out

Accepts attendance form submissions and keeps them safe even when the shared
database is unreachable.

### 🔹 Submission pipeline
- **Validation** reports every invalid field at once
- **Network info** is resolved best-effort (origin hint, request address, public lookups of the client address, local heuristic)
- **Remote first**: records go to the shared `attendance_records` table
- **Local fallback**: when the remote insert fails the record is kept on this device and the response is flagged `remote: false`

### 📊 Statistics
Daily summaries come from the remote table when reachable and from local records otherwise.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::attendance::submit_attendance,
        crate::api::attendance::daily_summary,
        crate::api::attendance::remote_statistics,
        crate::api::attendance::list_backups,

        crate::api::network::client_ip,
        crate::api::health::health
    ),
    components(
        schemas(
            AttendanceInput,
            AttendanceRecord,
            AttendanceType,
            NetworkInfo,
            SubmissionResult,
            FieldError,
            DailyStatistics,
            DataSource,
            RemoteTotals,
            BackupEntry,
            ClientIp,
            HealthResponse,
            InitState
        )
    ),
    tags(
        (name = "Attendance", description = "Attendance submission and statistics"),
        (name = "Network", description = "Client network lookups"),
        (name = "Health", description = "Service health"),
    )
)]
pub struct ApiDoc;
