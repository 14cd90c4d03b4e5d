use crate::error::{Result, SplitError};

/// Builds the file name for the chunk numbered `number`:
/// `prefix + zero-padded number + additional_suffix`.
///
/// # Errors
///
/// Returns `SplitError::Config` if `number` has more digits than
/// `suffix_length`.
pub fn chunk_file_name(
    prefix: &str,
    number: u64,
    suffix_length: usize,
    additional_suffix: &str,
) -> Result<String> {
    let digits = number.to_string();
    if digits.len() > suffix_length {
        return Err(SplitError::Config(format!(
            "file number longer than suffix size ({}): {}",
            suffix_length, digits
        )));
    }

    Ok(format!(
        "{}{:0>width$}{}",
        prefix,
        digits,
        additional_suffix,
        width = suffix_length
    ))
}
