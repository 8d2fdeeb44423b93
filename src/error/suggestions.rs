//! Context-aware error suggestions.

use serde_json::Value;

use super::codes::ErrorCode;
use crate::metrics::strings::normalized_levenshtein;

/// Generate a suggestion for an error, using its context when available.
pub fn suggest_for_error(code: ErrorCode, context: Option<&Value>) -> String {
    match code {
        ErrorCode::ActorNotFound => suggest_actor_not_found(context),
        ErrorCode::ProfileNotFound => suggest_profile_not_found(context),
        ErrorCode::ProfileInvalid => suggest_profile_invalid(context),
        _ => code.suggestion().to_string(),
    }
}

fn suggest_actor_not_found(context: Option<&Value>) -> String {
    match context.and_then(|c| c.get("actor_id")).and_then(Value::as_str) {
        Some(id) => format!(
            "Actor '{id}' is not in the actor file. Check the id, or pass --actors <path>"
        ),
        None => ErrorCode::ActorNotFound.suggestion().to_string(),
    }
}

fn suggest_profile_not_found(context: Option<&Value>) -> String {
    let suggestions: Vec<&str> = context
        .and_then(|c| c.get("suggestions"))
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    if suggestions.is_empty() {
        return ErrorCode::ProfileNotFound.suggestion().to_string();
    }
    format!(
        "Did you mean: {}? Run `rapport profiles list` to see all profiles",
        suggestions.join(", ")
    )
}

fn suggest_profile_invalid(context: Option<&Value>) -> String {
    let profile = context.and_then(|c| c.get("profile")).and_then(Value::as_str);
    let reason = context.and_then(|c| c.get("reason")).and_then(Value::as_str);

    match (profile, reason) {
        (Some(profile), Some(reason)) => format!(
            "Fix profile '{profile}' in the config file: {reason}"
        ),
        _ => ErrorCode::ProfileInvalid.suggestion().to_string(),
    }
}

/// Names from `available` that look like a misspelling of `query`.
pub fn suggest_similar(query: &str, available: &[&str], max_suggestions: usize) -> Vec<String> {
    let query_lower = query.to_lowercase();
    let mut scored: Vec<_> = available
        .iter()
        .map(|name| (*name, normalized_levenshtein(&query_lower, &name.to_lowercase())))
        .filter(|(_, score)| *score >= 0.5)
        .collect();

    scored.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    scored
        .into_iter()
        .take(max_suggestions)
        .map(|(name, _)| name.to_string())
        .collect()
}
