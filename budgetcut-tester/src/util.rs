use anyhow::{Context, Result};

use crate::logic::GameplayStrategy;

pub fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

/// Parse a comma-separated seed list.
pub fn parse_seeds(s: &str) -> Result<Vec<u64>> {
    split_csv(s)
        .iter()
        .map(|token| {
            token
                .parse::<u64>()
                .with_context(|| format!("invalid seed `{token}`"))
        })
        .collect()
}

/// Expand a comma-separated strategy list; `all` selects every strategy.
pub fn expand_strategies(s: &str) -> Result<Vec<GameplayStrategy>> {
    let mut strategies = Vec::new();
    for token in split_csv(s) {
        if token.eq_ignore_ascii_case("all") {
            strategies.extend(GameplayStrategy::ALL);
        } else {
            strategies.push(token.parse::<GameplayStrategy>()?);
        }
    }
    let mut seen = Vec::with_capacity(strategies.len());
    strategies.retain(|strategy| {
        let fresh = !seen.contains(strategy);
        seen.push(*strategy);
        fresh
    });
    Ok(strategies)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_csv_trims_and_filters() {
        let parts = split_csv(" alpha, ,beta,  gamma ");
        assert_eq!(parts, vec!["alpha", "beta", "gamma"]);
    }

    #[test]
    fn seeds_parse_or_name_the_bad_token() {
        assert_eq!(parse_seeds("1, 2,1337").unwrap(), vec![1, 2, 1337]);
        let err = parse_seeds("1,abc").unwrap_err();
        assert!(err.to_string().contains("abc"));
    }

    #[test]
    fn all_expands_without_duplicates() {
        let strategies = expand_strategies("override,all").unwrap();
        assert_eq!(strategies.len(), GameplayStrategy::ALL.len());
        assert_eq!(strategies[0], GameplayStrategy::Override);
        assert!(expand_strategies("greedy,bogus").is_err());
    }
}
