//! Common types used across CLI modules

use resolwe_core::domain::data::ProcessInputs;
use serde_json::Value as JsonValue;
use std::str::FromStr;

/// A `name=value` process input given on the command line
///
/// The value is parsed as JSON when possible (`axis=1`, `init=[1,2]`),
/// otherwise it is taken as a plain string (`x_tsne_var=tSNE-x`).
#[derive(Debug, Clone, PartialEq)]
pub struct InputArg {
    pub name: String,
    pub value: JsonValue,
}

impl InputArg {
    /// Parse a single `name=value` pair
    pub fn parse(input: &str) -> Result<Self, String> {
        let (name, raw) = input
            .split_once('=')
            .ok_or_else(|| format!("invalid NAME=value: no `=` found in `{}`", input))?;

        let name = name.trim();
        if name.is_empty() {
            return Err(format!("invalid NAME=value: empty name in `{}`", input));
        }

        let value =
            serde_json::from_str(raw).unwrap_or_else(|_| JsonValue::String(raw.to_string()));

        Ok(Self {
            name: name.to_string(),
            value,
        })
    }
}

impl FromStr for InputArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Collects command line inputs into process inputs
///
/// Later occurrences of the same name win.
pub fn into_inputs(args: Vec<InputArg>) -> ProcessInputs {
    args.into_iter().map(|arg| (arg.name, arg.value)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_json_values() {
        assert_eq!(InputArg::parse("axis=1").unwrap().value, json!(1));
        assert_eq!(
            InputArg::parse("selection=[0, 4, 5]").unwrap().value,
            json!([0, 4, 5])
        );
        assert_eq!(InputArg::parse("flag=true").unwrap().value, json!(true));
    }

    #[test]
    fn test_parse_string_fallback() {
        let arg = InputArg::parse("x_tsne_var=tSNE-x").unwrap();
        assert_eq!(arg.name, "x_tsne_var");
        assert_eq!(arg.value, json!("tSNE-x"));
    }

    #[test]
    fn test_value_may_contain_equals() {
        let arg = InputArg::parse("expr=a=b").unwrap();
        assert_eq!(arg.value, json!("a=b"));
    }

    #[test]
    fn test_parse_errors() {
        assert!(InputArg::parse("axis").is_err());
        assert!(InputArg::parse("=1").is_err());
    }

    #[test]
    fn test_into_inputs_last_wins() {
        let inputs = into_inputs(vec![
            InputArg::parse("axis=0").unwrap(),
            InputArg::parse("axis=1").unwrap(),
            InputArg::parse("measure=0").unwrap(),
        ]);

        assert_eq!(inputs.len(), 2);
        assert_eq!(inputs["axis"], json!(1));
    }
}
