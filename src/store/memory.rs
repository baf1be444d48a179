use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::model::attendance::{AttendanceEntry, AttendancePhoto, AttendanceRecord, NewAttendance};
use crate::model::employee::Employee;
use crate::service::query::{AttendanceFilter, AttendanceScope, PageRequest};
use crate::store::{AttendanceStore, EmployeeDirectory, StoreError};

#[derive(Default)]
struct Tables {
    employees: HashMap<u64, Employee>,
    records: Vec<AttendanceRecord>,
    photos: Vec<AttendancePhoto>,
    next_record_id: u64,
    next_photo_id: u64,
}

impl Tables {
    fn entry(&self, record: &AttendanceRecord) -> Result<AttendanceEntry, StoreError> {
        let employee = self
            .employees
            .get(&record.employee_id)
            .ok_or_else(|| StoreError::Corrupt(format!("no employee {}", record.employee_id)))?;

        Ok(AttendanceEntry {
            record: record.clone(),
            employee: employee.summary(),
            photos: self
                .photos
                .iter()
                .filter(|p| p.attendance_record_id == record.id)
                .cloned()
                .collect(),
        })
    }
}

/// Test double with the same `(employee_id, attendance_date)` uniqueness as
/// the real schema.
#[derive(Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
    stale_reads: bool,
    fail_writes: bool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// `exists_for_day` always answers `false`, as if every check raced a
    /// concurrent insert.
    pub fn with_stale_reads(mut self) -> Self {
        self.stale_reads = true;
        self
    }

    /// `create` fails with a non-constraint database error.
    pub fn with_failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    pub fn add_employee(&self, id: u64, code: &str, full_name: &str, is_active: bool) {
        self.tables.lock().unwrap().employees.insert(
            id,
            Employee {
                id,
                employee_code: code.to_string(),
                full_name: full_name.to_string(),
                email: None,
                department: None,
                position: None,
                is_active,
            },
        );
    }

    pub fn set_placement(&self, id: u64, email: &str, department: &str, position: &str) {
        if let Some(employee) = self.tables.lock().unwrap().employees.get_mut(&id) {
            employee.email = Some(email.to_string());
            employee.department = Some(department.to_string());
            employee.position = Some(position.to_string());
        }
    }

    pub fn record_count(&self) -> usize {
        self.tables.lock().unwrap().records.len()
    }

    pub fn photo_count(&self) -> usize {
        self.tables.lock().unwrap().photos.len()
    }
}

#[async_trait]
impl AttendanceStore for InMemoryStore {
    async fn exists_for_day(&self, employee_id: u64, day: NaiveDate) -> Result<bool, StoreError> {
        if self.stale_reads {
            return Ok(false);
        }
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .records
            .iter()
            .any(|r| r.employee_id == employee_id && r.attendance_date == day))
    }

    async fn create(&self, new: NewAttendance) -> Result<AttendanceEntry, StoreError> {
        if self.fail_writes {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }

        let mut tables = self.tables.lock().unwrap();
        if tables
            .records
            .iter()
            .any(|r| r.employee_id == new.employee_id && r.attendance_date == new.attendance_date)
        {
            return Err(StoreError::UniqueViolation);
        }

        tables.next_record_id += 1;
        let record = AttendanceRecord {
            id: tables.next_record_id,
            employee_id: new.employee_id,
            attendance_date: new.attendance_date,
            check_in_at: new.check_in_at,
            status: new.status,
            note: new.note,
        };

        for photo in new.photos {
            tables.next_photo_id += 1;
            let id = tables.next_photo_id;
            tables.photos.push(AttendancePhoto {
                id,
                attendance_record_id: record.id,
                file_path: photo.file_path,
                file_name: photo.file_name,
                mime_type: photo.mime_type,
                file_size: photo.file_size,
                captured_at: photo.captured_at,
            });
        }

        tables.records.push(record.clone());
        tables.entry(&record)
    }

    async fn page(
        &self,
        filter: &AttendanceFilter,
        page: PageRequest,
    ) -> Result<(u64, Vec<AttendanceEntry>), StoreError> {
        let tables = self.tables.lock().unwrap();

        let mut matching: Vec<&AttendanceRecord> =
            tables.records.iter().filter(|r| filter.matches(r)).collect();
        matching.sort_by(|a, b| {
            b.attendance_date
                .cmp(&a.attendance_date)
                .then(b.id.cmp(&a.id))
        });

        let total = matching.len() as u64;
        let entries = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.page_size() as usize)
            .map(|r| tables.entry(r))
            .collect::<Result<Vec<_>, _>>()?;

        Ok((total, entries))
    }

    async fn find(
        &self,
        id: u64,
        scope: AttendanceScope,
    ) -> Result<Option<AttendanceEntry>, StoreError> {
        let tables = self.tables.lock().unwrap();
        tables
            .records
            .iter()
            .find(|r| r.id == id && scope.permits(r))
            .map(|r| tables.entry(r))
            .transpose()
    }
}

#[async_trait]
impl EmployeeDirectory for InMemoryStore {
    async fn find_employee(&self, id: u64) -> Result<Option<Employee>, StoreError> {
        Ok(self.tables.lock().unwrap().employees.get(&id).cloned())
    }
}
