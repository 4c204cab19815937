//! Verify command implementation.

use super::{read_store_file, CliError, CliResult, StoreLine};
use mobiledb_codec::decode_each;
use mobiledb_core::EntityKey;
use std::collections::HashMap;
use std::path::Path;

/// Verification result.
#[derive(Debug, Default)]
pub struct VerifyResult {
    /// Number of non-blank lines checked.
    pub lines_checked: usize,
    /// Number of lines that parsed.
    pub valid_records: usize,
    /// Number of lines that failed to parse.
    pub malformed_lines: usize,
    /// Number of lines repeating an earlier identity.
    pub duplicate_identities: usize,
    /// List of errors found.
    pub errors: Vec<String>,
}

impl VerifyResult {
    fn problems(&self) -> usize {
        self.malformed_lines + self.duplicate_identities
    }

    fn is_ok(&self) -> bool {
        self.problems() == 0
    }
}

/// Runs the verify command.
pub fn run(path: &Path) -> CliResult<()> {
    println!("Verifying store file {}", path.display());
    println!();

    let bytes = read_store_file(path)?;
    let result = verify(&bytes);
    print_result(&result);

    println!();
    if result.is_ok() {
        println!("✓ Store verification passed");
        Ok(())
    } else {
        println!("✗ Store verification failed");
        Err(CliError::VerificationFailed {
            problems: result.problems(),
        })
    }
}

/// Checks every line of a store file independently.
pub fn verify(bytes: &[u8]) -> VerifyResult {
    let mut result = VerifyResult::default();
    let mut seen: HashMap<EntityKey, usize> = HashMap::new();

    for decoded in decode_each::<StoreLine>(bytes) {
        result.lines_checked += 1;
        match decoded {
            Ok((line, envelope)) => {
                result.valid_records += 1;
                if let Some(first) = seen.get(&envelope.identity) {
                    result.duplicate_identities += 1;
                    result.errors.push(format!(
                        "line {line}: duplicate identity {} (first seen on line {first})",
                        envelope.identity
                    ));
                } else {
                    seen.insert(envelope.identity, line);
                }
            }
            Err(e) => {
                result.malformed_lines += 1;
                result.errors.push(e.to_string());
            }
        }
    }

    result
}

fn print_result(result: &VerifyResult) {
    println!("  Lines checked:        {}", result.lines_checked);
    println!("  Valid records:        {}", result.valid_records);
    println!("  Malformed lines:      {}", result.malformed_lines);
    println!("  Duplicate identities: {}", result.duplicate_identities);

    if !result.errors.is_empty() {
        println!("  Errors:");
        for error in result.errors.iter().take(10) {
            println!("    - {error}");
        }
        if result.errors.len() > 10 {
            println!("    ... and {} more", result.errors.len() - 10);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures;

    #[test]
    fn clean_file_passes() {
        let result = verify(fixtures::TWO_USERS.as_bytes());
        assert!(result.is_ok());
        assert_eq!(result.valid_records, 2);
    }

    #[test]
    fn reports_every_malformed_line() {
        let contents = format!("nope\n{}[1,\n", fixtures::TWO_USERS);
        let result = verify(contents.as_bytes());

        assert_eq!(result.lines_checked, 4);
        assert_eq!(result.malformed_lines, 2);
        assert!(result.errors[0].contains("line 1"));
        assert!(result.errors[1].contains("line 4"));
    }

    #[test]
    fn reports_duplicate_identities() {
        let first = fixtures::TWO_USERS.lines().next().unwrap();
        let contents = format!("{}{first}\n", fixtures::TWO_USERS);
        let result = verify(contents.as_bytes());

        assert_eq!(result.duplicate_identities, 1);
        assert!(result.errors[0].contains("line 3"));
        assert!(result.errors[0].contains("first seen on line 1"));
    }

    #[test]
    fn run_fails_on_problems() {
        let file = fixtures::store_file("garbage\n");
        let err = run(file.path()).unwrap_err();
        assert!(matches!(err, CliError::VerificationFailed { problems: 1 }));

        let file = fixtures::store_file(fixtures::TWO_USERS);
        run(file.path()).unwrap();
    }
}
