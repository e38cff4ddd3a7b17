use salvo::prelude::*;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::web::web_state;

#[derive(Debug, Deserialize)]
struct QueryRequest {
    #[serde(default)]
    query: Option<String>,
    #[serde(default)]
    narrate: bool,
}

fn render_error(res: &mut Response, status: StatusCode, message: &str) {
    res.status_code(status);
    res.render(Json(json!({ "error": message })));
}

#[handler]
pub async fn run_query(req: &mut Request, res: &mut Response) {
    let body = match req.parse_json::<QueryRequest>().await {
        Ok(body) => body,
        Err(_) => {
            render_error(
                res,
                StatusCode::BAD_REQUEST,
                "No query provided. Please enter a valid query.",
            );
            return;
        }
    };

    let user_query = match body.query {
        Some(q) if !q.trim().is_empty() => q,
        _ => {
            render_error(
                res,
                StatusCode::BAD_REQUEST,
                "No query provided. Please enter a valid query.",
            );
            return;
        }
    };

    let state = web_state();

    let sql_query = match state.translator.generate_sql(&user_query).await {
        Ok(query) => query,
        Err(err) => {
            debug!("rejected question: {err}");
            render_error(res, StatusCode::BAD_REQUEST, &err.to_string());
            return;
        }
    };

    let result = match state.executor.execute(&sql_query).await {
        Ok(result) => result,
        Err(err) => {
            render_error(res, StatusCode::BAD_REQUEST, &err.to_string());
            return;
        }
    };

    let answer = if body.narrate {
        state.translator.narrate(&user_query, &result).await
    } else {
        None
    };

    let mut payload = json!({
        "query": sql_query.display_text(),
        "columns": result.columns,
        "results": result.rows,
        "message": "Query executed successfully. Here are your results.",
    });
    if let Some(answer) = answer {
        payload["answer"] = json!(answer);
    }

    res.render(Json(payload));
}
