use regex::Regex;
use std::sync::{Mutex, OnceLock};

const DEFAULT_PREVIEW_LEN: usize = 4000;
// Shorter values would redact ordinary words
const MIN_SECRET_LEN: usize = 4;

pub fn preview_len() -> usize {
    std::env::var("TESTGEN_PREVIEW_LEN")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(DEFAULT_PREVIEW_LEN)
}

pub fn allow_raw_output() -> bool {
    std::env::var("TESTGEN_ALLOW_RAW_OUTPUT")
        .ok()
        .is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

fn secrets() -> &'static Mutex<Vec<String>> {
    static SECRETS: OnceLock<Mutex<Vec<String>>> = OnceLock::new();
    SECRETS.get_or_init(|| Mutex::new(Vec::new()))
}

/// Register a literal (e.g. the login password) to be masked in console output.
///
/// Generated tests embed credentials in code, where the key/value patterns
/// below do not reach.
pub fn register_secret(secret: &str) {
    if secret.chars().count() < MIN_SECRET_LEN {
        return;
    }
    if let Ok(mut list) = secrets().lock() {
        if !list.iter().any(|s| s == secret) {
            list.push(secret.to_string());
        }
    }
}

pub fn strip_ansi(input: &str) -> String {
    // Remove ANSI CSI sequences (ESC [ ... final byte)
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == 0x1b && i + 1 < bytes.len() && bytes[i + 1] == b'[' {
            i += 2;
            while i < bytes.len() {
                let b = bytes[i];
                i += 1;
                if (0x40..=0x7e).contains(&b) {
                    break;
                }
            }
            continue;
        }

        out.push(bytes[i]);
        i += 1;
    }

    String::from_utf8_lossy(&out).to_string()
}

pub fn sanitize_for_console(input: &str) -> String {
    if allow_raw_output() {
        return input.to_string();
    }

    let no_ansi = strip_ansi(input);
    redact(&no_ansi)
}

pub fn sanitize_preview_for_console(input: &str) -> String {
    let sanitized = sanitize_for_console(input);
    truncate_chars(&sanitized, preview_len())
}

fn truncate_chars(s: &str, max_chars: usize) -> String {
    let total = s.chars().count();
    if total <= max_chars {
        return s.to_string();
    }

    let truncated: String = s.chars().take(max_chars).collect();
    format!("{truncated}... [truncated {} chars]", total - max_chars)
}

fn redact(input: &str) -> String {
    static SK_RE: OnceLock<Regex> = OnceLock::new();
    static URL_CREDS_RE: OnceLock<Regex> = OnceLock::new();
    static KV_RE: OnceLock<Regex> = OnceLock::new();

    let sk_re = SK_RE.get_or_init(|| Regex::new(r"\bsk-[A-Za-z0-9_\-]{10,}\b").expect("sk regex"));
    let url_creds_re = URL_CREDS_RE.get_or_init(|| {
        Regex::new(r"(https?://)([^/\s:@]+):([^/\s@]+)@").expect("url creds regex")
    });
    let kv_re = KV_RE.get_or_init(|| {
        // key: value  OR  key=value  (prompt, JSON, env-like)
        Regex::new(
            r#"(?i)(api[_-]?key|authorization|access[_-]?token|secret|password)(\s*[:=]\s*)(["']?)([^\s"'\r\n,}]+)(["']?)"#,
        )
        .expect("kv regex")
    });

    let mut s = input.to_string();
    if let Ok(list) = secrets().lock() {
        for secret in list.iter() {
            s = s.replace(secret.as_str(), "[REDACTED]");
        }
    }
    s = url_creds_re.replace_all(&s, "$1$2:[REDACTED]@").to_string();
    s = sk_re.replace_all(&s, "sk-[REDACTED]").to_string();
    s = kv_re.replace_all(&s, "$1$2$3[REDACTED]$5").to_string();

    s
}
