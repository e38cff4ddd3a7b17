use chrono::NaiveDate;

use super::models::{Department, Employee};

/// Seeded text columns collate NOCASE: captured entities reach the
/// database lower-cased while the seed rows are capitalized.
pub const CREATE_TABLES: [&str; 4] = [
    r#"
    CREATE TABLE IF NOT EXISTS employees (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        department TEXT NOT NULL COLLATE NOCASE,
        salary INTEGER NOT NULL CHECK (salary >= 0),
        hire_date TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS departments (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL COLLATE NOCASE,
        manager TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_employees_department ON employees(department)",
    "CREATE INDEX IF NOT EXISTS idx_departments_name ON departments(name)",
];

pub fn seed_employees() -> Vec<Employee> {
    vec![
        Employee {
            id: 1,
            name: "Alice".to_string(),
            department: "Sales".to_string(),
            salary: 50_000,
            hire_date: seed_date(2021, 1, 15),
        },
        Employee {
            id: 2,
            name: "Bob".to_string(),
            department: "Engineering".to_string(),
            salary: 70_000,
            hire_date: seed_date(2020, 6, 10),
        },
        Employee {
            id: 3,
            name: "Charlie".to_string(),
            department: "Marketing".to_string(),
            salary: 60_000,
            hire_date: seed_date(2022, 3, 20),
        },
    ]
}

pub fn seed_departments() -> Vec<Department> {
    vec![
        Department {
            id: 1,
            name: "Sales".to_string(),
            manager: "Alice".to_string(),
        },
        Department {
            id: 2,
            name: "Engineering".to_string(),
            manager: "Bob".to_string(),
        },
        Department {
            id: 3,
            name: "Marketing".to_string(),
            manager: "Charlie".to_string(),
        },
    ]
}

fn seed_date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("seed date is valid")
}
