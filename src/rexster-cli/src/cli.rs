use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand};
use rexster_core::{Comparison, PropertyConstraint, QueryExpression, TypedValue};
use serde_json::Value;

/// Command-line client for the Rexster graph server
#[derive(Parser, Debug)]
#[command(name = "rexster-cli", version, about)]
pub struct Cli {
    /// Path to the JSON client configuration
    #[arg(long, short, default_value = "config.json", env = "REXSTER_CONFIG")]
    pub config: String,

    /// Server URL, overrides the configuration
    #[arg(long, env = "REXSTER_URL")]
    pub url: Option<String>,

    /// Graph name, overrides the configuration
    #[arg(long)]
    pub graph: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the query parameters and Gremlin fragment for a filter
    Explain {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Fetch a vertex by id
    Vertex { id: String },
    /// List vertices, optionally where KEY equals VALUE
    Vertices {
        #[arg(long, requires = "value")]
        key: Option<String>,
        #[arg(long, requires = "key")]
        value: Option<String>,
    },
    /// Find vertices through a Gremlin lookup
    LookupVertices {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Find edges through a Gremlin lookup
    LookupEdges {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Run a registered script or raw Gremlin code against the graph
    RunScript {
        script: String,
        /// Script parameter as NAME=VALUE, repeatable
        #[arg(long = "param")]
        params: Vec<String>,
    },
}

#[derive(Args, Debug, Default, Clone)]
pub struct FilterArgs {
    #[arg(long)]
    pub label: Option<String>,

    #[arg(long, allow_negative_numbers = true)]
    pub skip: Option<i64>,

    #[arg(long, allow_negative_numbers = true)]
    pub take: Option<i64>,

    /// Property condition such as `age>=21` or `name=marko`, repeatable
    #[arg(long = "where", value_name = "KEY<OP>VALUE")]
    pub conditions: Vec<String>,
}

impl FilterArgs {
    pub fn to_query(&self) -> Result<QueryExpression> {
        let mut builder = QueryExpression::builder();
        if let Some(label) = &self.label {
            builder = builder.label(label.clone());
        }
        if let Some(skip) = self.skip {
            builder = builder.skip(skip);
        }
        if let Some(take) = self.take {
            builder = builder.take(take);
        }
        let constraints = self
            .conditions
            .iter()
            .map(|c| parse_condition(c))
            .collect::<Result<Vec<_>>>()?;
        Ok(builder.constraints(constraints).build()?)
    }
}

// Longest operators first so `<=` is not read as `<`
const OPERATORS: [&str; 6] = ["<=", ">=", "<>", "<", ">", "="];

/// Parse `key<op>value` into a constraint
pub fn parse_condition(raw: &str) -> Result<PropertyConstraint> {
    let start = raw
        .find(['<', '>', '='])
        .ok_or_else(|| anyhow!("condition '{}' has no comparison operator", raw))?;
    let op = OPERATORS
        .iter()
        .find(|op| raw[start..].starts_with(**op))
        .ok_or_else(|| anyhow!("condition '{}' has no comparison operator", raw))?;

    let key = raw[..start].trim();
    if key.is_empty() {
        return Err(anyhow!("condition '{}' has no property key", raw));
    }
    let comparison: Comparison = op.parse()?;
    let value = parse_typed(raw[start + op.len()..].trim())?;
    Ok(PropertyConstraint::new(key, comparison, value))
}

/// JSON literal when it parses as one, otherwise a plain string
pub fn parse_typed(raw: &str) -> Result<TypedValue> {
    match serde_json::from_str::<Value>(raw) {
        Ok(json) => Ok(TypedValue::try_from(json)?),
        Err(_) => Ok(TypedValue::from(raw)),
    }
}

/// Parse `name=value` into a script parameter
pub fn parse_param(raw: &str) -> Result<(String, Value)> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("parameter '{}' must look like NAME=VALUE", raw))?;
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((name.trim().to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_condition_operators() {
        let c = parse_condition("age>=21").unwrap();
        assert_eq!(c.key, "age");
        assert_eq!(c.comparison, Comparison::GreaterThanEqual);
        assert_eq!(c.value, TypedValue::Integer(21));

        assert_eq!(parse_condition("age<>3").unwrap().comparison, Comparison::NotEqual);
        assert_eq!(parse_condition("age<3").unwrap().comparison, Comparison::LessThan);
        assert_eq!(parse_condition("w > 0.5").unwrap().value, TypedValue::Double(0.5));
    }

    #[test]
    fn test_parse_condition_string_fallback() {
        let c = parse_condition("name=marko").unwrap();
        assert_eq!(c.comparison, Comparison::Equal);
        assert_eq!(c.value, TypedValue::from("marko"));

        let quoted = parse_condition("name=\"42\"").unwrap();
        assert_eq!(quoted.value, TypedValue::from("42"));
    }

    #[test]
    fn test_parse_condition_errors() {
        assert!(parse_condition("name").is_err());
        assert!(parse_condition("=marko").is_err());
        assert!(parse_condition("name=null").is_err());
    }

    #[test]
    fn test_filter_args_to_query() {
        let cli = Cli::try_parse_from([
            "rexster-cli",
            "explain",
            "--label",
            "person",
            "--take",
            "5",
            "--where",
            "age>18",
        ])
        .unwrap();
        let Command::Explain { filter } = cli.command else {
            panic!("expected explain");
        };
        let query = filter.to_query().unwrap();
        assert_eq!(
            query.to_traversal_fragment(),
            "has(\"label\", \"person\").has(\"age\",Compare.GREATER_THAN,18)[0..4]"
        );
    }

    #[test]
    fn test_negative_skip_rejected() {
        let filter = FilterArgs {
            skip: Some(-2),
            ..FilterArgs::default()
        };
        assert!(filter.to_query().is_err());
    }

    #[test]
    fn test_parse_param() {
        assert_eq!(parse_param("limit=10").unwrap(), ("limit".to_string(), Value::from(10)));
        assert_eq!(parse_param("name=josh").unwrap(), ("name".to_string(), Value::from("josh")));
        assert!(parse_param("oops").is_err());
    }
}
