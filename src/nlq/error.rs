use thiserror::Error;

/// Shown whenever a question cannot be turned into SQL.
pub const GUIDANCE: &str = "Sorry, I couldn't understand that. Try asking:\n\
    - 'Show me all employees in the Sales department.'\n\
    - 'Who is the manager of the HR department?'\n\
    - 'List all employees hired after 2022-01-01.'";

/// User-facing failures of the question → SQL → rows pipeline. Every
/// variant resolves to a 400 at the endpoint boundary.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Invalid input. Please provide a valid question.")]
    EmptyInput,

    #[error("Sorry, the specified {column} '{value}' does not exist in the database. Please check and try again.")]
    UnknownEntity { column: String, value: String },

    #[error("{}", GUIDANCE)]
    Unrecognized,

    #[error("Model backend error: {0}")]
    Model(String),

    #[error("SQL Error: {0}")]
    Sql(String),

    #[error("No results found. Please check your query and try again.")]
    NoResults,
}
