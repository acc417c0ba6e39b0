//! Translation between the camel-case names older game clients send and the
//! canonical snake_case field names used everywhere inside the service.

use serde_json::{Map, Value};

/// Surface name -> canonical name.
pub const FIELD_ALIASES: &[(&str, &str)] = &[
    ("userId", "user_id"),
    ("activityId", "activity_id"),
    ("timeSpent", "time_spent"),
    ("currentLevel", "current_level"),
    ("lastPlayed", "last_played"),
    ("configurationId", "configuration_id"),
    ("configId", "config_id"),
    ("createdBy", "created_by"),
    ("createdAt", "created_at"),
    ("isPublic", "is_public"),
    ("targetRange", "target_range"),
    ("numberOfAddends", "number_of_addends"),
    ("timeLimit", "time_limit"),
    ("hintsEnabled", "hints_enabled"),
    ("progressionRules", "progression_rules"),
    ("requiredSuccessRate", "required_success_rate"),
    ("advancementThreshold", "advancement_threshold"),
];

pub fn canonical_name(key: &str) -> Option<&'static str> {
    FIELD_ALIASES
        .iter()
        .find(|(surface, _)| *surface == key)
        .map(|(_, canonical)| *canonical)
}

/// Rewrites object keys to their canonical names, recursing into nested
/// objects and arrays. If an object carries both spellings of a field, the
/// surface spelling wins unless it is null.
pub fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut out = Map::with_capacity(map.len());
            let mut surface = Vec::new();

            for (key, inner) in map {
                let inner = canonicalize(inner);
                match canonical_name(&key) {
                    Some(canonical) => surface.push((canonical, inner)),
                    None => {
                        out.insert(key, inner);
                    }
                }
            }

            for (canonical, inner) in surface {
                if inner.is_null() && out.contains_key(canonical) {
                    continue;
                }
                out.insert(canonical.to_string(), inner);
            }

            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_aliases_are_unique() {
        for (i, (surface, _)) in FIELD_ALIASES.iter().enumerate() {
            assert!(
                FIELD_ALIASES[i + 1..].iter().all(|(other, _)| other != surface),
                "duplicate alias {}",
                surface
            );
        }
    }

    #[test]
    fn test_camel_case_attempt_is_canonicalized() {
        let value = canonicalize(json!({
            "userId": "u1",
            "activityId": "c1",
            "timeSpent": 4.2,
            "target": 5,
            "inputs": [2, 3],
            "success": true
        }));

        assert_eq!(
            value,
            json!({
                "user_id": "u1",
                "activity_id": "c1",
                "time_spent": 4.2,
                "target": 5,
                "inputs": [2, 3],
                "success": true
            })
        );
    }

    #[test]
    fn test_nested_history_is_canonicalized() {
        let value = canonicalize(json!({
            "userId": "u1",
            "history": [{ "timeSpent": 1.0, "userId": "u1" }]
        }));
        assert_eq!(value["history"][0]["time_spent"], json!(1.0));
        assert_eq!(value["history"][0]["user_id"], json!("u1"));
    }

    #[test]
    fn test_surface_name_wins_unless_null() {
        let value = canonicalize(json!({ "user_id": "snake", "userId": "camel" }));
        assert_eq!(value, json!({ "user_id": "camel" }));

        let value = canonicalize(json!({ "user_id": "snake", "userId": null }));
        assert_eq!(value, json!({ "user_id": "snake" }));
    }

    #[test]
    fn test_unknown_keys_untouched() {
        let value = canonicalize(json!({ "someField": 1, "min": 2 }));
        assert_eq!(value, json!({ "someField": 1, "min": 2 }));
    }
}
