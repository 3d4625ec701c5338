//! Test file names derived from scenario blocks.

pub const TEST_FILE_SUFFIX: &str = ".test.js";
pub const INDEX_TEST_FILE: &str = "index.test.js";

/// Page path named on a block's first line (`path: /users/42,` gives `/users/42`).
///
/// Takes the text after the first `:` up to the next `,`. Returns `None` when
/// the block is blank or its first line has no `:`.
pub fn scenario_path(block: &str) -> Option<String> {
    let first_line = block.trim_start().lines().next()?;
    let (_, rest) = first_line.split_once(':')?;
    let value = rest.split(',').next().unwrap_or(rest);
    Some(value.trim().to_string())
}

/// File name for the generated test of `path`.
///
/// Only `/` maps to `index.test.js`. A path that strips down to nothing
/// (`""`, `//`, `/.well-known`) yields the bare `.test.js`, so it can never
/// replace the root page's test.
pub fn test_file_name(path: &str) -> String {
    if path == "/" {
        return INDEX_TEST_FILE.to_string();
    }

    let stem = path.trim_matches('/').replace('/', "_");
    let stem = match stem.find('.') {
        Some(idx) => &stem[..idx],
        None => stem.as_str(),
    };
    format!("{stem}{TEST_FILE_SUFFIX}")
}
