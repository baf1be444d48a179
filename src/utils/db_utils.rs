use chrono::NaiveDate;
use sqlx::MySql;
use sqlx::mysql::MySqlArguments;
use sqlx::query::{QueryAs, QueryScalar};

/// ===============================
/// SQL bindable value enum
/// ===============================
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    U64(u64),
    String(String),
    Date(NaiveDate),
}

/// ===============================
/// WHERE clause container
/// ===============================
#[derive(Debug, Default)]
pub struct SqlFilter {
    conditions: Vec<&'static str>,
    pub values: Vec<SqlValue>,
}

impl SqlFilter {
    pub fn push(&mut self, condition: &'static str, value: SqlValue) {
        self.conditions.push(condition);
        self.values.push(value);
    }

    /// Renders ` WHERE a AND b`, or an empty string when nothing was pushed.
    pub fn where_sql(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.conditions.join(" AND "))
        }
    }
}

pub fn bind_as<'q, O: Send>(
    mut query: QueryAs<'q, MySql, O, MySqlArguments>,
    values: &[SqlValue],
) -> QueryAs<'q, MySql, O, MySqlArguments> {
    for value in values {
        query = match value {
            SqlValue::U64(v) => query.bind(*v),
            SqlValue::String(v) => query.bind(v.clone()),
            SqlValue::Date(v) => query.bind(*v),
        };
    }
    query
}

pub fn bind_scalar<'q, O: Send>(
    mut query: QueryScalar<'q, MySql, O, MySqlArguments>,
    values: &[SqlValue],
) -> QueryScalar<'q, MySql, O, MySqlArguments> {
    for value in values {
        query = match value {
            SqlValue::U64(v) => query.bind(*v),
            SqlValue::String(v) => query.bind(v.clone()),
            SqlValue::Date(v) => query.bind(*v),
        };
    }
    query
}

/// `?, ?, ?` for an `IN (...)` list of `n` items.
pub fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filter_renders_no_where() {
        assert_eq!(SqlFilter::default().where_sql(), "");
    }

    #[test]
    fn conditions_are_anded_in_push_order() {
        let mut filter = SqlFilter::default();
        filter.push("ar.employee_id = ?", SqlValue::U64(7));
        filter.push("ar.status = ?", SqlValue::String("LATE".into()));
        assert_eq!(
            filter.where_sql(),
            " WHERE ar.employee_id = ? AND ar.status = ?"
        );
        assert_eq!(filter.values.len(), 2);
        assert_eq!(placeholders(3), "?, ?, ?");
    }
}
