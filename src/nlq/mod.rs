pub use self::error::{GUIDANCE, QueryError};
pub use self::executor::QueryExecutor;
pub use self::rules::{QueryRule, RuleSet, ValidationTarget};
pub use self::statement::SqlQuery;
pub use self::translator::QueryTranslator;

pub mod error;
pub mod executor;
pub mod rules;
pub mod statement;
pub mod translator;
