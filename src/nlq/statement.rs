use std::fmt;

/// A SELECT statement with its bound arguments. Rule-built statements
/// carry one positional placeholder per parameter; model-generated SQL
/// is raw text with no parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlQuery {
    pub sql: String,
    pub params: Vec<String>,
}

impl SqlQuery {
    pub fn new(sql: impl Into<String>, params: Vec<String>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    pub fn raw(sql: impl Into<String>) -> Self {
        Self::new(sql, Vec::new())
    }

    /// The statement with quoted arguments substituted into the
    /// placeholder positions. Display only — execution always goes
    /// through the bound parameters.
    pub fn display_text(&self) -> String {
        let mut rendered = String::with_capacity(self.sql.len());
        let mut params = self.params.iter();

        for ch in self.sql.chars() {
            if ch == '?' {
                if let Some(param) = params.next() {
                    rendered.push('\'');
                    rendered.push_str(&param.replace('\'', "''"));
                    rendered.push('\'');
                    continue;
                }
            }
            rendered.push(ch);
        }

        rendered
    }
}

impl fmt::Display for SqlQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_text())
    }
}
