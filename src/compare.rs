use crate::models::{Algorithm, DigestSet, MatchOutcome};

/// Trim and lowercase a user-entered digest.
pub fn normalize_expected(expected: &str) -> String {
    expected.trim().to_lowercase()
}

/// Check `expected` against the successful digests in `results`, MD5 first, then SHA1, then SHA256.
pub fn match_expected(expected: &str, results: &DigestSet) -> MatchOutcome {
    let expected = normalize_expected(expected);
    if expected.is_empty() {
        return MatchOutcome::EmptyExpected;
    }
    Algorithm::all()
        .into_iter()
        .find(|&algorithm| results.digest(algorithm) == Some(expected.as_str()))
        .map(MatchOutcome::Matches)
        .unwrap_or(MatchOutcome::NoMatch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DigestResult;

    const EMPTY_MD5: &str = "d41d8cd98f00b204e9800998ecf8427e";
    const EMPTY_SHA1: &str = "da39a3ee5e6b4b0d3255bfef95601890afd80709";
    const EMPTY_SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

    fn empty_file_results() -> DigestSet {
        vec![
            DigestResult::success(Algorithm::Md5, EMPTY_MD5.into()),
            DigestResult::success(Algorithm::Sha1, EMPTY_SHA1.into()),
            DigestResult::success(Algorithm::Sha256, EMPTY_SHA256.into()),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn empty_expected() {
        assert_eq!(match_expected("", &empty_file_results()), MatchOutcome::EmptyExpected);
        assert_eq!(match_expected("  \t\n", &empty_file_results()), MatchOutcome::EmptyExpected);
        assert_eq!(match_expected("", &DigestSet::default()), MatchOutcome::EmptyExpected);
    }

    #[test]
    fn matches_case_and_whitespace_insensitively() {
        let results = empty_file_results();
        assert_eq!(
            match_expected("D41D8CD98F00B204E9800998ECF8427E", &results),
            MatchOutcome::Matches(Algorithm::Md5)
        );
        assert_eq!(
            match_expected(&format!("  {}\n", EMPTY_SHA1.to_uppercase()), &results),
            MatchOutcome::Matches(Algorithm::Sha1)
        );
        assert_eq!(match_expected(EMPTY_SHA256, &results), MatchOutcome::Matches(Algorithm::Sha256));
    }

    #[test]
    fn no_match() {
        assert_eq!(match_expected("deadbeef", &empty_file_results()), MatchOutcome::NoMatch);
    }

    #[test]
    fn pending_results_never_match() {
        assert_eq!(match_expected(EMPTY_MD5, &DigestSet::default()), MatchOutcome::NoMatch);
    }

    #[test]
    fn error_text_never_matches() {
        let message = "failed to open x: no such file";
        let results: DigestSet = vec![DigestResult::failure(Algorithm::Md5, message.into())]
            .into_iter()
            .collect();
        assert_eq!(match_expected(message, &results), MatchOutcome::NoMatch);
    }

    #[test]
    fn priority_order_is_md5_sha1_sha256() {
        let results: DigestSet = vec![
            DigestResult::success(Algorithm::Sha256, "abcd".into()),
            DigestResult::success(Algorithm::Sha1, "abcd".into()),
            DigestResult::success(Algorithm::Md5, "ffff".into()),
        ]
        .into_iter()
        .collect();
        assert_eq!(match_expected("ABCD", &results), MatchOutcome::Matches(Algorithm::Sha1));
    }
}
