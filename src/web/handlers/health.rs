use chrono::Utc;
use salvo::prelude::*;
use serde_json::json;

use crate::db::ResultSet;
use crate::web::web_state;

#[handler]
pub async fn health_check(res: &mut Response) {
    res.render(Json(json!({ "status": "ok" })));
}

#[handler]
pub async fn get_status(res: &mut Response) {
    let state = web_state();
    let store = state.db_manager.query_store();

    let employees = store.select("SELECT COUNT(*) FROM employees", &[]).await;
    let departments = store.select("SELECT COUNT(*) FROM departments", &[]).await;

    let (employees, departments) = match (employees, departments) {
        (Ok(e), Ok(d)) => (count_from(&e), count_from(&d)),
        (Err(err), _) | (_, Err(err)) => {
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            res.render(Json(json!({ "error": format!("database error: {}", err) })));
            return;
        }
    };

    res.render(Json(json!({
        "service": {
            "status": "running",
            "version": env!("CARGO_PKG_VERSION"),
            "uptime_seconds": state.started_at.elapsed().as_secs(),
            "timestamp": Utc::now().to_rfc3339(),
        },
        "database": {
            "path": state.db_manager.db_path(),
            "employees": employees,
            "departments": departments,
        }
    })));
}

fn count_from(result: &ResultSet) -> i64 {
    result
        .rows
        .first()
        .and_then(|row| row.first())
        .and_then(|cell| cell.as_i64())
        .unwrap_or(0)
}
