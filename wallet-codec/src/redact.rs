//! JSON-aware secret redaction for error messages that may echo a caller's
//! payload. Generalizes the signer worker's field-scrubbing idiom so the
//! VRF worker and the relay orchestrator can redact their own secret field
//! names through the same small state machine, rather than each hand
//! rolling a copy.

#[derive(Clone, Copy)]
enum QuoteStyle {
    Plain,
    Escaped,
}

impl QuoteStyle {
    fn quote(self) -> &'static str {
        match self {
            QuoteStyle::Plain => "\"",
            QuoteStyle::Escaped => "\\\"",
        }
    }

    fn skip_value(self, s: &str) -> Option<&str> {
        match self {
            QuoteStyle::Plain => skip_plain_quoted_value(s),
            QuoteStyle::Escaped => skip_escaped_quoted_value(s),
        }
    }
}

const REDACTED: &str = "[REDACTED]";

/// Default secret field names redacted across the workspace: private keys,
/// wrap-key material, and PRF outputs in both camelCase and snake_case, in
/// both plain and JSON-escaped-quote contexts (errors that embed a nested
/// JSON string, e.g. a `serde_wasm_bindgen` error, escape their quotes).
pub const DEFAULT_SECRET_FIELDS: &[&str] = &[
    "nearPrivateKey",
    "near_private_key",
    "wrapKeySeed",
    "wrap_key_seed",
    "prfOutput",
    "prf_output",
    "prfFirst",
    "prfSecond",
    "prf_first",
    "prf_second",
    "chacha20PrfOutput",
    "ed25519PrfOutput",
    "chacha20PrfOutputBase64",
    "ed25519PrfOutputBase64",
    "prfSecondB64u",
    "prf_second_b64u",
    "kek_c_b64u",
    "kek_cs_b64u",
    "e_s_b64u",
    "d_s_b64u",
    "vrfPrivateKey",
    "relayerPrivateKey",
    "sessionSecret",
];

fn patterns_for(fields: &[&str]) -> Vec<(String, QuoteStyle)> {
    let mut out = Vec::with_capacity(fields.len() * 2);
    for field in fields {
        out.push((format!("\"{field}\""), QuoteStyle::Plain));
        out.push((format!("\\\"{field}\\\""), QuoteStyle::Escaped));
    }
    out
}

fn scrub_json_string_fields(input: &str, patterns: &[(String, QuoteStyle)]) -> String {
    let mut output = input.to_string();
    for (pattern, quote_style) in patterns {
        output = scrub_json_string_field(&output, pattern, *quote_style);
    }
    output
}

fn scrub_json_string_field(input: &str, key_pattern: &str, quote_style: QuoteStyle) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some((before_key, after_key)) = rest.split_once(key_pattern) {
        out.push_str(before_key);
        out.push_str(key_pattern);
        rest = after_key;

        let Some((before_colon, after_colon)) = rest.split_once(':') else {
            out.push_str(rest);
            return out;
        };

        out.push_str(before_colon);
        out.push(':');
        rest = after_colon;

        let (ws, after_ws) = split_while(rest, |ch| ch.is_whitespace());
        out.push_str(ws);
        rest = after_ws;

        let quote = quote_style.quote();
        let Some(after_open) = rest.strip_prefix(quote) else {
            out.push_str(rest);
            return out;
        };

        out.push_str(quote);
        out.push_str(REDACTED);
        out.push_str(quote);

        rest = match quote_style.skip_value(after_open) {
            Some(after_close) => after_close,
            None => return out,
        };
    }

    out.push_str(rest);
    out
}

fn split_while<F>(s: &str, mut pred: F) -> (&str, &str)
where
    F: FnMut(char) -> bool,
{
    let mut end = 0;
    for (idx, ch) in s.char_indices() {
        if pred(ch) {
            end = idx + ch.len_utf8();
        } else {
            break;
        }
    }
    s.split_at(end)
}

fn skip_plain_quoted_value(s: &str) -> Option<&str> {
    let mut escaped = false;
    for (idx, ch) in s.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        if ch == '\\' {
            escaped = true;
            continue;
        }
        if ch == '"' {
            return Some(&s[idx + ch.len_utf8()..]);
        }
    }
    None
}

fn skip_escaped_quoted_value(s: &str) -> Option<&str> {
    s.find("\\\"").map(|idx| &s[idx + 2..])
}

/// Redact `DEFAULT_SECRET_FIELDS`, plus nested `prf.first`/`prf.second`
/// when a `"prf"` key is present anywhere in the message.
pub fn scrub_error_message(message: &str) -> String {
    scrub_error_message_with(message, DEFAULT_SECRET_FIELDS)
}

/// Redact a caller-supplied set of secret field names (used by crates that
/// have additional secret fields beyond `DEFAULT_SECRET_FIELDS`, e.g. the
/// relay orchestrator's `RELAYER_PRIVATE_KEY`).
pub fn scrub_error_message_with(message: &str, fields: &[&str]) -> String {
    let scrubbed = scrub_json_string_fields(message, &patterns_for(fields));
    if scrubbed.contains("\"prf\"") || scrubbed.contains("\\\"prf\\\"") {
        let prf_fields = ["first", "second"];
        scrub_json_string_fields(&scrubbed, &patterns_for(&prf_fields))
    } else {
        scrubbed
    }
}

#[cfg(test)]
mod tests {
    use super::scrub_error_message;

    #[test]
    fn scrubs_plain_json_string_fields() {
        let input = r#"{"nearPrivateKey":"ed25519:SECRET","wrapKeySeed":"SEED","ok":true}"#;
        let scrubbed = scrub_error_message(input);
        assert!(scrubbed.contains(r#""nearPrivateKey":"[REDACTED]""#));
        assert!(scrubbed.contains(r#""wrapKeySeed":"[REDACTED]""#));
        assert!(scrubbed.contains(r#""ok":true"#));
        assert!(!scrubbed.contains("ed25519:SECRET"));
        assert!(!scrubbed.contains("SEED"));
    }

    #[test]
    fn scrubs_escaped_json_string_fields() {
        let input = r#"{\"nearPrivateKey\":\"ed25519:SECRET\",\"wrapKeySeed\":\"SEED\"}"#;
        let scrubbed = scrub_error_message(input);
        assert!(scrubbed.contains(r#"\"nearPrivateKey\":\"[REDACTED]\""#));
        assert!(!scrubbed.contains("ed25519:SECRET"));
    }

    #[test]
    fn scrubs_prf_first_second_when_prf_present() {
        let input = r#"{"prf":{"first":"AAA","second":"BBB"}}"#;
        let scrubbed = scrub_error_message(input);
        assert!(scrubbed.contains(r#""first":"[REDACTED]""#));
        assert!(scrubbed.contains(r#""second":"[REDACTED]""#));
    }

    #[test]
    fn leaves_unrelated_fields_alone_without_prf_key() {
        let input = r#"{"first":"AAA","second":"BBB"}"#;
        let scrubbed = scrub_error_message(input);
        assert_eq!(scrubbed, input);
    }
}
