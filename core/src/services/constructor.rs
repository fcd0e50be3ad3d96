//! Shop object constructors and the factory that selects them
//!
//! A constructor turns a class key plus request parameters into the SQL
//! statements that update the matching shop records.

use std::collections::HashMap;

use crate::adapter::{quote_identifier, quote_literal};
use crate::error::{CoreError, Result};

/// Key of the constructor used when no specific one is registered
pub const DEFAULT_CONSTRUCTOR: &str = "Object";

/// Parameters of one construction request
#[derive(Debug, Clone, Default)]
pub struct ConstructorParams {
    pub oxid: Option<String>,
    pub class_params: serde_json::Map<String, serde_json::Value>,
    pub shop_id: u32,
}

/// Builds update statements for one kind of shop object
pub trait Constructor: Send + Sync {
    /// Class key this constructor was created for
    fn class_name(&self) -> &str;

    fn statements(&self, params: &ConstructorParams) -> Result<Vec<String>>;
}

/// Creates a constructor for the requested class key
pub type ConstructorFn = fn(&str) -> Box<dyn Constructor>;

/// Registry of constructors keyed case-insensitively by class key
pub struct ConstructorFactory {
    entries: HashMap<String, ConstructorFn>,
    default: ConstructorFn,
}

impl ConstructorFactory {
    /// Factory with only a default entry
    pub fn new(default: ConstructorFn) -> Self {
        Self {
            entries: HashMap::new(),
            default,
        }
    }

    /// Factory with the built-in constructors
    pub fn with_defaults() -> Self {
        let mut factory = Self::new(ObjectConstructor::boxed);
        factory.register(DEFAULT_CONSTRUCTOR, ObjectConstructor::boxed);
        factory.register(ConfigConstructor::CLASS, ConfigConstructor::boxed);
        factory
    }

    pub fn register(&mut self, class_name: &str, constructor: ConstructorFn) {
        self.entries
            .insert(class_name.to_ascii_lowercase(), constructor);
    }

    /// Constructor registered for `class_name`, or the default one
    pub fn get_constructor(&self, class_name: &str) -> Box<dyn Constructor> {
        let constructor = self
            .entries
            .get(&class_name.to_ascii_lowercase())
            .copied()
            .unwrap_or(self.default);
        constructor(class_name)
    }
}

impl Default for ConstructorFactory {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Render a JSON parameter as a SQL value
fn sql_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => "NULL".to_string(),
        serde_json::Value::Bool(b) => quote_literal(if *b { "1" } else { "0" }),
        serde_json::Value::String(s) => quote_literal(s),
        other => quote_literal(&other.to_string()),
    }
}

/// Generic constructor: the lowercased class key names the table
pub struct ObjectConstructor {
    class_name: String,
}

impl ObjectConstructor {
    pub fn boxed(class_name: &str) -> Box<dyn Constructor> {
        Box::new(Self {
            class_name: class_name.to_string(),
        })
    }

    fn table(&self) -> String {
        self.class_name.to_ascii_lowercase()
    }
}

impl Constructor for ObjectConstructor {
    fn class_name(&self) -> &str {
        &self.class_name
    }

    fn statements(&self, params: &ConstructorParams) -> Result<Vec<String>> {
        let oxid = params
            .oxid
            .as_deref()
            .ok_or_else(|| CoreError::InvalidParameter("'oxid' is required".to_string()))?;
        if params.class_params.is_empty() {
            return Err(CoreError::InvalidParameter(
                "'classparams' must not be empty".to_string(),
            ));
        }

        let assignments = params
            .class_params
            .iter()
            .map(|(column, value)| format!("{} = {}", quote_identifier(column), sql_value(value)))
            .collect::<Vec<_>>()
            .join(", ");

        Ok(vec![format!(
            "UPDATE {} SET {} WHERE `OXID` = {}",
            quote_identifier(&self.table()),
            assignments,
            quote_literal(oxid)
        )])
    }
}

/// Writes shop configuration variables into `oxconfig`
pub struct ConfigConstructor {
    class_name: String,
}

impl ConfigConstructor {
    pub const CLASS: &'static str = "oxConfig";

    pub fn boxed(class_name: &str) -> Box<dyn Constructor> {
        Box::new(Self {
            class_name: class_name.to_string(),
        })
    }
}

impl Constructor for ConfigConstructor {
    fn class_name(&self) -> &str {
        &self.class_name
    }

    fn statements(&self, params: &ConstructorParams) -> Result<Vec<String>> {
        Ok(params
            .class_params
            .iter()
            .map(|(name, value)| {
                format!(
                    "UPDATE `oxconfig` SET `OXVARVALUE` = {} WHERE `OXVARNAME` = {} AND `OXSHOPID` = {}",
                    sql_value(value),
                    quote_literal(name),
                    params.shop_id
                )
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(oxid: Option<&str>, class_params: serde_json::Value) -> ConstructorParams {
        ConstructorParams {
            oxid: oxid.map(str::to_string),
            class_params: class_params.as_object().cloned().unwrap_or_default(),
            shop_id: 1,
        }
    }

    #[test]
    fn test_unknown_key_falls_back_to_default() {
        let factory = ConstructorFactory::with_defaults();
        let constructor = factory.get_constructor("oxArticle");
        assert_eq!(constructor.class_name(), "oxArticle");

        let sql = constructor
            .statements(&params(Some("a1"), json!({"OXTITLE": "Kite"})))
            .unwrap();
        assert_eq!(
            sql,
            vec!["UPDATE `oxarticle` SET `OXTITLE` = 'Kite' WHERE `OXID` = 'a1'"]
        );
    }

    #[test]
    fn test_config_key_is_case_insensitive() {
        let factory = ConstructorFactory::with_defaults();
        let constructor = factory.get_constructor("OXCONFIG");
        let sql = constructor
            .statements(&params(None, json!({"blEnterNetPrice": true})))
            .unwrap();
        assert_eq!(
            sql,
            vec!["UPDATE `oxconfig` SET `OXVARVALUE` = '1' WHERE `OXVARNAME` = 'blEnterNetPrice' AND `OXSHOPID` = 1"]
        );
    }

    #[test]
    fn test_registered_entry_wins() {
        let mut factory = ConstructorFactory::new(ObjectConstructor::boxed);
        factory.register("oxUser", ConfigConstructor::boxed);
        let sql = factory
            .get_constructor("oxuser")
            .statements(&params(None, json!({"a": "b"})))
            .unwrap();
        assert!(sql[0].starts_with("UPDATE `oxconfig`"));
    }

    #[test]
    fn test_object_constructor_requires_oxid_and_params() {
        let constructor = ObjectConstructor::boxed("oxuser");
        assert!(constructor
            .statements(&params(None, json!({"OXACTIVE": 1})))
            .is_err());
        assert!(constructor.statements(&params(Some("u1"), json!({}))).is_err());
    }

    #[test]
    fn test_values_are_escaped() {
        let constructor = ObjectConstructor::boxed("oxuser");
        let sql = constructor
            .statements(&params(
                Some("u'1"),
                json!({"OXBONI": 1000, "OXFNAME": "O'Brien", "OXSAL": null}),
            ))
            .unwrap();
        assert_eq!(
            sql[0],
            r"UPDATE `oxuser` SET `OXBONI` = '1000', `OXFNAME` = 'O\'Brien', `OXSAL` = NULL WHERE `OXID` = 'u\'1'"
        );
    }
}
