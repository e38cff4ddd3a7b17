use regex::Regex;

use super::statement::SqlQuery;

/// Table and column a captured entity must exist in before the rule's
/// statement is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationTarget {
    pub table: &'static str,
    pub column: &'static str,
}

/// One entry of the rule table: a pattern over the lower-cased question,
/// an optional validation target, and a parameterized SELECT template
/// with a single placeholder.
pub struct QueryRule {
    pattern: Regex,
    validation: Option<ValidationTarget>,
    template: &'static str,
}

impl QueryRule {
    fn new(pattern: &str, validation: Option<ValidationTarget>, template: &'static str) -> Self {
        Self {
            pattern: Regex::new(pattern).expect("rule pattern compiles"),
            validation,
            template,
        }
    }

    pub fn validation(&self) -> Option<&ValidationTarget> {
        self.validation.as_ref()
    }

    /// First capture group of the pattern, if the question matches.
    pub fn capture<'q>(&self, question: &'q str) -> Option<&'q str> {
        self.pattern
            .captures(question)
            .and_then(|captures| captures.get(1))
            .map(|entity| entity.as_str())
    }

    pub fn build(&self, entity: &str) -> SqlQuery {
        SqlQuery::new(self.template, vec![entity.to_string()])
    }
}

pub struct RuleSet {
    rules: Vec<QueryRule>,
}

impl RuleSet {
    pub fn builtin() -> Self {
        Self {
            rules: vec![
                QueryRule::new(
                    r"^show me all employees in the (\w+) department",
                    Some(ValidationTarget {
                        table: "employees",
                        column: "department",
                    }),
                    "SELECT * FROM employees WHERE department = ?;",
                ),
                QueryRule::new(
                    r"^who is the manager of the (\w+) department",
                    Some(ValidationTarget {
                        table: "departments",
                        column: "name",
                    }),
                    "SELECT manager FROM departments WHERE name = ?;",
                ),
                QueryRule::new(
                    r"^list all employees hired after (\d{4}-\d{2}-\d{2})",
                    None,
                    "SELECT * FROM employees WHERE hire_date > ?;",
                ),
                QueryRule::new(
                    r"^list all employees hired before (\d{4}-\d{2}-\d{2})",
                    None,
                    "SELECT * FROM employees WHERE hire_date < ?;",
                ),
                QueryRule::new(
                    r"^what is the total salary expense for the (\w+) department",
                    Some(ValidationTarget {
                        table: "employees",
                        column: "department",
                    }),
                    "SELECT SUM(salary) FROM employees WHERE department = ?;",
                ),
            ],
        }
    }

    /// Rules are tried in table order; the first match wins.
    pub fn matched<'q>(&self, question: &'q str) -> Option<(&QueryRule, &'q str)> {
        self.rules
            .iter()
            .find_map(|rule| rule.capture(question).map(|entity| (rule, entity)))
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::builtin()
    }
}
