use serde_json::Value;

/// Reserved keys stripped before a payload crosses into the signer/VRF
/// worker (spec §4.J "Messages sent to the worker must be free of
/// functions and live DOM handles; sender sanitizes by removing
/// function-typed keys and a reserved `_confirmHandle`"). JSON itself has
/// no function type, so the function-typed-key case collapses to: any
/// value that isn't a JSON-representable type never reaches this payload
/// in the first place. `_confirmHandle` is the one in-band marker the
/// host actually has to scrub: the `ConfirmUIHandle` map key (spec §9
/// "Ambient UI handles vs. pure messages") that the Secure Confirm Flow
/// keeps locally, keyed by `requestId`, rather than posting into the
/// worker message.
pub const RESERVED_HANDOFF_KEYS: &[&str] = &["_confirmHandle"];

/// Recursively strips `RESERVED_HANDOFF_KEYS` from a payload before
/// `HandoffToWorker` posts it (spec §4.G step 7 / §4.J).
pub fn sanitize_for_worker(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for key in RESERVED_HANDOFF_KEYS {
                map.remove(*key);
            }
            for nested in map.values_mut() {
                sanitize_for_worker(nested);
            }
        }
        Value::Array(items) => {
            for item in items {
                sanitize_for_worker(item);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strips_confirm_handle_at_top_level() {
        let mut value = json!({"requestId": "req-1", "_confirmHandle": "opaque"});
        sanitize_for_worker(&mut value);
        assert_eq!(value, json!({"requestId": "req-1"}));
    }

    #[test]
    fn strips_confirm_handle_nested_inside_arrays_and_objects() {
        let mut value = json!({
            "txContext": {"_confirmHandle": "nested", "blockHeight": 100},
            "batch": [{"_confirmHandle": "also-nested", "ok": true}],
        });
        sanitize_for_worker(&mut value);
        assert_eq!(
            value,
            json!({
                "txContext": {"blockHeight": 100},
                "batch": [{"ok": true}],
            })
        );
    }

    #[test]
    fn leaves_unrelated_fields_untouched() {
        let mut value = json!({"credential": {"rawId": "abc"}});
        let before = value.clone();
        sanitize_for_worker(&mut value);
        assert_eq!(value, before);
    }
}
