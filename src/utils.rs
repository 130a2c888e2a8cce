/// Shortest digest we compute (MD5) in hex characters.
const MIN_HASH_LEN: usize = 32;

/// If user loads a checksum file (text) allow common formats:
/// - single hex line
/// - "filename <hash>"
/// - "hash  filename" (sha256sum and friends)
/// - "SHA256 (filename) = hash" (BSD style)
pub fn parse_first_hash_from_text(s: &str) -> Option<String> {
    for line in s.lines() {
        let t = line.trim();
        if t.is_empty() || t.starts_with('#') {
            continue;
        }
        for tok in t.split_whitespace() {
            // sha256sum prefixes the hash with '\' when the filename is escaped
            let tok = tok.trim_start_matches('\\');
            if tok.len() >= MIN_HASH_LEN && tok.chars().all(|c| c.is_ascii_hexdigit()) {
                return Some(tok.to_ascii_lowercase());
            }
        }
    }
    None
}
