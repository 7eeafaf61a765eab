use std::sync::OnceLock;

use regex::{Captures, Regex};

fn env_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}|\$([A-Za-z_][A-Za-z0-9_]*)")
            .expect("static regex")
    })
}

/// 展开 `${VAR}`、`${VAR:-default}` 和 `$VAR`；未定义的变量展开为空串
pub fn expand_env_vars(input: &str) -> String {
    env_pattern()
        .replace_all(input, |caps: &Captures| {
            if let Some(name) = caps.get(3) {
                return std::env::var(name.as_str()).unwrap_or_default();
            }
            let name = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
            match (std::env::var(name), caps.get(2)) {
                (Ok(val), Some(_)) if !val.is_empty() => val,
                (_, Some(default)) => default.as_str().to_string(),
                (Ok(val), None) => val,
                (Err(_), None) => String::new(),
            }
        })
        .into_owned()
}
