pub use self::parser::{Config, DatabaseConfig, LoggingConfig, ModelConfig, ServerConfig};
pub use self::validator::ConfigError;

mod parser;
mod validator;
