//! `--param NAME=VALUE` parsing

use std::collections::HashMap;

use crate::errors::RunnerError;

/// Parse one `NAME=VALUE` pair. The value may itself contain `=`.
pub fn parse_param(raw: &str) -> Result<(String, String), RunnerError> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| RunnerError::InvalidParam(raw.to_string()))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(RunnerError::EmptyParamName(raw.to_string()));
    }
    Ok((name.to_string(), value.to_string()))
}

/// Later pairs win over earlier ones with the same name.
pub fn collect_params<I>(pairs: I) -> HashMap<String, String>
where
    I: IntoIterator<Item = (String, String)>,
{
    pairs.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_first_equals() {
        assert_eq!(
            parse_param("password=a=b").unwrap(),
            ("password".to_string(), "a=b".to_string())
        );
        assert_eq!(
            parse_param("username=").unwrap(),
            ("username".to_string(), String::new())
        );
    }

    #[test]
    fn rejects_malformed_pairs() {
        assert!(matches!(
            parse_param("username"),
            Err(RunnerError::InvalidParam(_))
        ));
        assert!(matches!(
            parse_param(" =x"),
            Err(RunnerError::EmptyParamName(_))
        ));
    }

    #[test]
    fn last_value_wins() {
        let params = collect_params(vec![
            ("a".to_string(), "1".to_string()),
            ("a".to_string(), "2".to_string()),
        ]);
        assert_eq!(params["a"], "2");
    }
}
