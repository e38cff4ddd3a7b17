use std::sync::Arc;

use tracing::{debug, warn};

use crate::db::{QueryStore, ResultSet};
use crate::llm::{self, DecodingParams, TextGenerator};

use super::error::QueryError;
use super::rules::RuleSet;
use super::statement::SqlQuery;

/// Turns a natural-language question into an executable [`SqlQuery`]:
/// rule table first, model fallback when no rule matches.
pub struct QueryTranslator {
    rules: RuleSet,
    store: Arc<dyn QueryStore>,
    model: Option<Arc<dyn TextGenerator>>,
}

impl QueryTranslator {
    pub fn new(
        rules: RuleSet,
        store: Arc<dyn QueryStore>,
        model: Option<Arc<dyn TextGenerator>>,
    ) -> Self {
        Self {
            rules,
            store,
            model,
        }
    }

    pub async fn generate_sql(&self, question: &str) -> Result<SqlQuery, QueryError> {
        if question.trim().is_empty() {
            return Err(QueryError::EmptyInput);
        }

        let lowered = question.to_lowercase();

        if let Some((rule, entity)) = self.rules.matched(&lowered) {
            if let Some(target) = rule.validation() {
                let exists = self
                    .store
                    .value_exists(target.table, target.column, entity)
                    .await
                    .map_err(|e| QueryError::Sql(e.to_string()))?;

                if !exists {
                    return Err(QueryError::UnknownEntity {
                        column: target.column.to_string(),
                        value: entity.to_string(),
                    });
                }
            }

            debug!(entity, "question matched a static rule");
            return Ok(rule.build(entity));
        }

        self.model_fallback(question).await
    }

    /// Last resort: ask the model for SQL directly. Output is accepted
    /// only if it is a SELECT; there is no retry.
    async fn model_fallback(&self, question: &str) -> Result<SqlQuery, QueryError> {
        let Some(model) = &self.model else {
            return Err(QueryError::Unrecognized);
        };

        let generated = model
            .generate(
                &llm::sql_generation_prompt(question),
                DecodingParams::SQL_GENERATION,
            )
            .await
            .map_err(|e| QueryError::Model(e.to_string()))?;

        let sql = llm::strip_code_fences(&generated);
        if !sql.to_uppercase().starts_with("SELECT") {
            warn!("model produced non-SELECT output, rejecting");
            return Err(QueryError::Unrecognized);
        }

        debug!(sql, "model fallback produced a statement");
        Ok(SqlQuery::raw(sql))
    }

    /// Narrate a result set in prose. Best effort: a model failure is
    /// logged and swallowed, never surfaced to the caller.
    pub async fn narrate(&self, question: &str, result: &ResultSet) -> Option<String> {
        let model = self.model.as_ref()?;

        let results_json = serde_json::to_string(&result.rows).unwrap_or_default();
        let prompt = llm::narration_prompt(question, &results_json);

        match model.generate(&prompt, DecodingParams::NARRATION).await {
            Ok(text) => Some(text.trim().to_string()),
            Err(err) => {
                warn!("narration failed: {err}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use serde_json::json;

    use crate::db::{DatabaseError, QueryStore, ResultSet};
    use crate::llm::{DecodingParams, LlmError, TextGenerator};
    use crate::nlq::{GUIDANCE, QueryError, RuleSet};

    use super::QueryTranslator;

    /// Store double: `value_exists` answers from a fixed list, `select`
    /// always returns an empty result.
    struct StubStore {
        known: Vec<(&'static str, &'static str, &'static str)>,
    }

    impl StubStore {
        fn with_seeds() -> Self {
            Self {
                known: vec![
                    ("employees", "department", "sales"),
                    ("employees", "department", "engineering"),
                    ("departments", "name", "sales"),
                ],
            }
        }
    }

    #[async_trait]
    impl QueryStore for StubStore {
        async fn select(&self, _sql: &str, _params: &[String]) -> Result<ResultSet, DatabaseError> {
            Ok(ResultSet::default())
        }

        async fn value_exists(
            &self,
            table: &str,
            column: &str,
            value: &str,
        ) -> Result<bool, DatabaseError> {
            Ok(self
                .known
                .iter()
                .any(|(t, c, v)| *t == table && *c == column && *v == value))
        }
    }

    struct CannedGenerator {
        reply: &'static str,
    }

    #[async_trait]
    impl TextGenerator for CannedGenerator {
        async fn generate(
            &self,
            _prompt: &str,
            _params: DecodingParams,
        ) -> Result<String, LlmError> {
            Ok(self.reply.to_string())
        }
    }

    struct FailingGenerator;

    #[async_trait]
    impl TextGenerator for FailingGenerator {
        async fn generate(
            &self,
            _prompt: &str,
            _params: DecodingParams,
        ) -> Result<String, LlmError> {
            Err(LlmError::Request("connection refused".to_string()))
        }
    }

    fn translator(model: Option<Arc<dyn TextGenerator>>) -> QueryTranslator {
        QueryTranslator::new(RuleSet::builtin(), Arc::new(StubStore::with_seeds()), model)
    }

    #[tokio::test]
    async fn empty_input_is_rejected() {
        let translator = translator(None);

        for question in ["", "   ", "\n\t"] {
            let err = translator
                .generate_sql(question)
                .await
                .expect_err("empty input");
            assert_eq!(
                err.to_string(),
                "Invalid input. Please provide a valid question."
            );
        }
    }

    #[tokio::test]
    async fn known_department_builds_the_templated_statement() {
        let translator = translator(None);

        let query = translator
            .generate_sql("show me all employees in the Sales department")
            .await
            .expect("sales exists");

        assert_eq!(query.sql, "SELECT * FROM employees WHERE department = ?;");
        assert_eq!(query.params, vec!["sales".to_string()]);
        assert_eq!(
            query.display_text(),
            "SELECT * FROM employees WHERE department = 'sales';"
        );
    }

    #[tokio::test]
    async fn unknown_department_is_rejected_with_entity_detail() {
        let translator = translator(None);

        let err = translator
            .generate_sql("show me all employees in the Bogus department")
            .await
            .expect_err("bogus does not exist");

        let message = err.to_string();
        assert!(message.contains("department"));
        assert!(message.contains("'bogus'"));
        assert!(message.contains("does not exist"));
    }

    #[tokio::test]
    async fn date_rules_skip_entity_validation() {
        let translator = translator(None);

        let query = translator
            .generate_sql("list all employees hired after 2022-01-01")
            .await
            .expect("no validation target");

        assert_eq!(
            query.display_text(),
            "SELECT * FROM employees WHERE hire_date > '2022-01-01';"
        );
    }

    #[tokio::test]
    async fn unmatched_question_without_model_gets_the_guidance() {
        let translator = translator(None);

        let err = translator
            .generate_sql("how is the weather today")
            .await
            .expect_err("no rule, no model");

        assert!(matches!(err, QueryError::Unrecognized));
        assert_eq!(err.to_string(), GUIDANCE);
    }

    #[tokio::test]
    async fn model_select_output_is_accepted_verbatim() {
        let translator = translator(Some(Arc::new(CannedGenerator {
            reply: "SELECT name FROM employees ORDER BY salary DESC LIMIT 1",
        })));

        let query = translator
            .generate_sql("who earns the most?")
            .await
            .expect("model produced a SELECT");

        assert_eq!(
            query.sql,
            "SELECT name FROM employees ORDER BY salary DESC LIMIT 1"
        );
        assert!(query.params.is_empty());
    }

    #[tokio::test]
    async fn model_select_check_is_case_insensitive() {
        let translator = translator(Some(Arc::new(CannedGenerator {
            reply: "  select * from employees  ",
        })));

        let query = translator
            .generate_sql("everyone, please")
            .await
            .expect("lower-case select passes");

        assert_eq!(query.sql, "select * from employees");
    }

    #[tokio::test]
    async fn model_code_fences_are_stripped_before_the_check() {
        let translator = translator(Some(Arc::new(CannedGenerator {
            reply: "```sql\nSELECT manager FROM departments;\n```",
        })));

        let query = translator
            .generate_sql("who runs the place?")
            .await
            .expect("fenced select passes");

        assert_eq!(query.sql, "SELECT manager FROM departments;");
    }

    #[tokio::test]
    async fn model_non_select_output_gets_the_guidance() {
        for reply in [
            "DROP TABLE employees;",
            "I cannot help with that.",
            "UPDATE employees SET salary = 0",
        ] {
            let translator = translator(Some(Arc::new(CannedGenerator { reply })));

            let err = translator
                .generate_sql("do something destructive")
                .await
                .expect_err("non-SELECT must be rejected");

            assert!(matches!(err, QueryError::Unrecognized));
            assert_eq!(err.to_string(), GUIDANCE);
        }
    }

    #[tokio::test]
    async fn model_backend_failure_is_surfaced() {
        let translator = translator(Some(Arc::new(FailingGenerator)));

        let err = translator
            .generate_sql("anything unmatched")
            .await
            .expect_err("backend down");

        assert!(matches!(err, QueryError::Model(_)));
        assert!(err.to_string().contains("connection refused"));
    }

    #[tokio::test]
    async fn matched_rules_never_reach_the_model() {
        // A generator that would panic if ever called.
        struct PanickingGenerator;

        #[async_trait]
        impl TextGenerator for PanickingGenerator {
            async fn generate(
                &self,
                _prompt: &str,
                _params: DecodingParams,
            ) -> Result<String, LlmError> {
                panic!("model must not be consulted for rule matches");
            }
        }

        let translator = translator(Some(Arc::new(PanickingGenerator)));

        translator
            .generate_sql("show me all employees in the Engineering department")
            .await
            .expect("rule match bypasses the model");
    }

    #[tokio::test]
    async fn narration_uses_the_model_when_present() {
        let translator = translator(Some(Arc::new(CannedGenerator {
            reply: "Alice manages the sales department.",
        })));

        let result = ResultSet {
            columns: vec!["manager".to_string()],
            rows: vec![vec![json!("Alice")]],
        };

        let answer = translator.narrate("who is the manager of sales?", &result).await;
        assert_eq!(answer.as_deref(), Some("Alice manages the sales department."));
    }

    #[tokio::test]
    async fn narration_is_best_effort() {
        let failing = translator(Some(Arc::new(FailingGenerator)));
        assert!(failing.narrate("q", &ResultSet::default()).await.is_none());

        let disabled = translator(None);
        assert!(disabled.narrate("q", &ResultSet::default()).await.is_none());
    }

    mod pipeline {
        use std::sync::Arc;

        use serde_json::json;
        use tempfile::NamedTempFile;

        use crate::config::DatabaseConfig;
        use crate::db::DatabaseManager;
        use crate::nlq::{QueryExecutor, QueryTranslator, RuleSet};

        async fn seeded_pipeline() -> (NamedTempFile, QueryTranslator, QueryExecutor) {
            let file = NamedTempFile::new().expect("temp sqlite file");
            let config = DatabaseConfig {
                filename: file.path().to_string_lossy().to_string(),
            };

            let manager = DatabaseManager::new(&config).expect("db manager");
            manager.migrate().await.expect("migrate");
            manager.seed().await.expect("seed");

            let translator =
                QueryTranslator::new(RuleSet::builtin(), manager.query_store(), None);
            let executor = QueryExecutor::new(manager.query_store());

            (file, translator, executor)
        }

        #[tokio::test]
        async fn engineering_question_returns_the_bob_row() {
            let (_file, translator, executor) = seeded_pipeline().await;

            let query = translator
                .generate_sql("Show me all employees in the Engineering department")
                .await
                .expect("engineering exists");
            assert_eq!(
                query.display_text(),
                "SELECT * FROM employees WHERE department = 'engineering';"
            );

            let result = executor.execute(&query).await.expect("rows");
            assert_eq!(
                result.rows,
                vec![vec![
                    json!(2),
                    json!("Bob"),
                    json!("Engineering"),
                    json!(70000),
                    json!("2020-06-10"),
                ]]
            );
        }

        #[tokio::test]
        async fn manager_question_names_alice() {
            let (_file, translator, executor) = seeded_pipeline().await;

            let query = translator
                .generate_sql("Who is the manager of the Sales department")
                .await
                .expect("sales exists");

            let result = executor.execute(&query).await.expect("rows");
            assert_eq!(result.columns, vec!["manager"]);
            assert_eq!(result.rows, vec![vec![json!("Alice")]]);
        }

        #[tokio::test]
        async fn salary_expense_question_sums_the_department() {
            let (_file, translator, executor) = seeded_pipeline().await;

            let query = translator
                .generate_sql("What is the total salary expense for the Sales department")
                .await
                .expect("sales exists");

            let result = executor.execute(&query).await.expect("rows");
            assert_eq!(result.rows, vec![vec![json!(50000)]]);
        }

        #[tokio::test]
        async fn unknown_department_is_rejected_against_the_real_store() {
            let (_file, translator, _executor) = seeded_pipeline().await;

            let err = translator
                .generate_sql("show me all employees in the Bogus department")
                .await
                .expect_err("bogus does not exist");

            assert!(err.to_string().contains("'bogus'"));
        }

        #[tokio::test]
        async fn hired_after_question_filters_by_date() {
            let (_file, translator, executor) = seeded_pipeline().await;

            let query = translator
                .generate_sql("List all employees hired after 2021-01-01")
                .await
                .expect("date rule");

            let result = executor.execute(&query).await.expect("rows");
            let names: Vec<_> = result.rows.iter().map(|row| row[1].clone()).collect();
            assert_eq!(names, vec![json!("Alice"), json!("Charlie")]);
        }

        #[tokio::test]
        async fn arc_wiring_matches_the_server_setup() {
            // The server shares one store between translator and executor.
            let file = NamedTempFile::new().expect("temp sqlite file");
            let config = DatabaseConfig {
                filename: file.path().to_string_lossy().to_string(),
            };
            let manager = Arc::new(DatabaseManager::new(&config).expect("db manager"));
            manager.migrate().await.expect("migrate");
            manager.seed().await.expect("seed");

            let translator = Arc::new(QueryTranslator::new(
                RuleSet::builtin(),
                manager.query_store(),
                None,
            ));
            let executor = Arc::new(QueryExecutor::new(manager.query_store()));

            let query = translator
                .generate_sql("show me all employees in the sales department")
                .await
                .expect("sales exists");
            let result = executor.execute(&query).await.expect("rows");
            assert_eq!(result.rows.len(), 1);
        }
    }
}
