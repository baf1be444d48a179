use std::collections::HashMap;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, MySql, MySqlPool, Transaction};
use tracing::debug;

use crate::model::attendance::{
    AttendanceEntry, AttendancePhoto, AttendanceRecord, AttendanceStatus, NewAttendance,
};
use crate::model::employee::{Employee, EmployeeSummary};
use crate::service::query::{AttendanceFilter, AttendanceScope, PageRequest};
use crate::store::{AttendanceStore, EmployeeDirectory, StoreError};
use crate::utils::db_utils::{SqlFilter, SqlValue, bind_as, bind_scalar, placeholders};

const ENTRY_COLUMNS: &str = r#"
    SELECT
        ar.id,
        ar.employee_id,
        ar.attendance_date,
        ar.check_in_at,
        ar.status,
        ar.note,
        e.employee_code,
        e.full_name,
        e.email,
        e.department,
        e.position
    FROM attendance_records ar
    JOIN employees e ON e.id = ar.employee_id
"#;

#[derive(FromRow)]
struct EntryRow {
    id: u64,
    employee_id: u64,
    attendance_date: NaiveDate,
    check_in_at: DateTime<Utc>,
    status: String,
    note: Option<String>,
    employee_code: String,
    full_name: String,
    email: Option<String>,
    department: Option<String>,
    position: Option<String>,
}

impl EntryRow {
    fn into_entry(self, photos: Vec<AttendancePhoto>) -> Result<AttendanceEntry, StoreError> {
        let status = AttendanceStatus::from_str(&self.status)
            .map_err(|_| StoreError::Corrupt(format!("unknown attendance status {:?}", self.status)))?;

        Ok(AttendanceEntry {
            record: AttendanceRecord {
                id: self.id,
                employee_id: self.employee_id,
                attendance_date: self.attendance_date,
                check_in_at: self.check_in_at,
                status,
                note: self.note,
            },
            employee: EmployeeSummary {
                id: self.employee_id,
                employee_code: self.employee_code,
                full_name: self.full_name,
                email: self.email,
                department: self.department,
                position: self.position,
            },
            photos,
        })
    }
}

/// Renders the scope and optional filters as one WHERE clause, so the
/// self-service and administrative queries share a single code path.
fn filter_sql(filter: &AttendanceFilter) -> SqlFilter {
    let mut sql = scope_sql(filter.scope);

    if let Some(employee_id) = filter.employee_id {
        sql.push("ar.employee_id = ?", SqlValue::U64(employee_id));
    }
    if let Some(status) = filter.status {
        sql.push("ar.status = ?", SqlValue::String(status.as_ref().to_string()));
    }
    if let Some(from) = filter.range.from {
        sql.push("ar.attendance_date >= ?", SqlValue::Date(from));
    }
    if let Some(to) = filter.range.to {
        sql.push("ar.attendance_date <= ?", SqlValue::Date(to));
    }

    sql
}

fn scope_sql(scope: AttendanceScope) -> SqlFilter {
    let mut sql = SqlFilter::default();
    match scope {
        AttendanceScope::Employee(employee_id) => {
            sql.push("ar.employee_id = ?", SqlValue::U64(employee_id));
        }
        AttendanceScope::Organization => {}
    }
    sql
}

pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn photos_for(
        tx: &mut Transaction<'_, MySql>,
        record_ids: &[u64],
    ) -> Result<HashMap<u64, Vec<AttendancePhoto>>, StoreError> {
        let mut by_record: HashMap<u64, Vec<AttendancePhoto>> = HashMap::new();
        if record_ids.is_empty() {
            return Ok(by_record);
        }

        let sql = format!(
            r#"
            SELECT id, attendance_record_id, file_path, file_name, mime_type, file_size, captured_at
            FROM attendance_photos
            WHERE attendance_record_id IN ({})
            ORDER BY id
            "#,
            placeholders(record_ids.len())
        );

        let mut query = sqlx::query_as::<_, AttendancePhoto>(&sql);
        for id in record_ids {
            query = query.bind(*id);
        }

        for photo in query.fetch_all(&mut **tx).await? {
            by_record
                .entry(photo.attendance_record_id)
                .or_default()
                .push(photo);
        }
        Ok(by_record)
    }
}

#[async_trait]
impl AttendanceStore for MySqlStore {
    async fn exists_for_day(&self, employee_id: u64, day: NaiveDate) -> Result<bool, StoreError> {
        let exists = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM attendance_records
                WHERE employee_id = ? AND attendance_date = ?
            )
            "#,
        )
        .bind(employee_id)
        .bind(day)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists > 0)
    }

    async fn create(&self, new: NewAttendance) -> Result<AttendanceEntry, StoreError> {
        let mut tx = self.pool.begin().await?;

        let record_id = sqlx::query(
            r#"
            INSERT INTO attendance_records
                (employee_id, attendance_date, check_in_at, status, note)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(new.employee_id)
        .bind(new.attendance_date)
        .bind(new.check_in_at)
        .bind(new.status.as_ref())
        .bind(new.note.as_deref())
        .execute(&mut *tx)
        .await?
        .last_insert_id();

        let mut photos = Vec::with_capacity(new.photos.len());
        for photo in new.photos {
            let photo_id = sqlx::query(
                r#"
                INSERT INTO attendance_photos
                    (attendance_record_id, file_path, file_name, mime_type, file_size, captured_at)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(record_id)
            .bind(&photo.file_path)
            .bind(&photo.file_name)
            .bind(&photo.mime_type)
            .bind(photo.file_size)
            .bind(photo.captured_at)
            .execute(&mut *tx)
            .await?
            .last_insert_id();

            photos.push(AttendancePhoto {
                id: photo_id,
                attendance_record_id: record_id,
                file_path: photo.file_path,
                file_name: photo.file_name,
                mime_type: photo.mime_type,
                file_size: photo.file_size,
                captured_at: photo.captured_at,
            });
        }

        let employee = sqlx::query_as::<_, Employee>(
            r#"
            SELECT id, employee_code, full_name, email, department, position, is_active
            FROM employees
            WHERE id = ?
            "#,
        )
        .bind(new.employee_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        debug!(record_id, employee_id = employee.id, "Attendance record committed");

        Ok(AttendanceEntry {
            record: AttendanceRecord {
                id: record_id,
                employee_id: employee.id,
                attendance_date: new.attendance_date,
                check_in_at: new.check_in_at,
                status: new.status,
                note: new.note,
            },
            employee: employee.summary(),
            photos,
        })
    }

    async fn page(
        &self,
        filter: &AttendanceFilter,
        page: PageRequest,
    ) -> Result<(u64, Vec<AttendanceEntry>), StoreError> {
        let where_sql = filter_sql(filter);

        // Count and page are read inside one transaction so that both see
        // the same InnoDB snapshot.
        let mut tx = self.pool.begin().await?;

        let count_sql = format!(
            "SELECT COUNT(*) FROM attendance_records ar{}",
            where_sql.where_sql()
        );
        debug!(sql = %count_sql, bindings = ?where_sql.values, "Counting attendance records");

        let total = bind_scalar(sqlx::query_scalar::<_, i64>(&count_sql), &where_sql.values)
            .fetch_one(&mut *tx)
            .await?;

        let data_sql = format!(
            "{}{} ORDER BY ar.attendance_date DESC, ar.id DESC LIMIT ? OFFSET ?",
            ENTRY_COLUMNS,
            where_sql.where_sql()
        );
        debug!(
            sql = %data_sql,
            page = page.page(),
            page_size = page.page_size(),
            "Fetching attendance records"
        );

        let rows = bind_as(sqlx::query_as::<_, EntryRow>(&data_sql), &where_sql.values)
            .bind(page.page_size())
            .bind(page.offset())
            .fetch_all(&mut *tx)
            .await?;

        let ids: Vec<u64> = rows.iter().map(|r| r.id).collect();
        let mut photos = Self::photos_for(&mut tx, &ids).await?;

        tx.commit().await?;

        let entries = rows
            .into_iter()
            .map(|row| {
                let photos = photos.remove(&row.id).unwrap_or_default();
                row.into_entry(photos)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok((total.max(0) as u64, entries))
    }

    async fn find(
        &self,
        id: u64,
        scope: AttendanceScope,
    ) -> Result<Option<AttendanceEntry>, StoreError> {
        let mut where_sql = scope_sql(scope);
        where_sql.push("ar.id = ?", SqlValue::U64(id));

        let sql = format!("{}{}", ENTRY_COLUMNS, where_sql.where_sql());

        let mut tx = self.pool.begin().await?;

        let row = bind_as(sqlx::query_as::<_, EntryRow>(&sql), &where_sql.values)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut photos = Self::photos_for(&mut tx, &[row.id]).await?;
        tx.commit().await?;

        let photos = photos.remove(&row.id).unwrap_or_default();
        row.into_entry(photos).map(Some)
    }
}

#[async_trait]
impl EmployeeDirectory for MySqlStore {
    async fn find_employee(&self, id: u64) -> Result<Option<Employee>, StoreError> {
        let employee = sqlx::query_as::<_, Employee>(
            r#"
            SELECT id, employee_code, full_name, email, department, position, is_active
            FROM employees
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(employee)
    }
}
