/// Folder name used for any segment that sanitizes to nothing.
pub const FALLBACK_SEGMENT: &str = "Misc";

const ILLEGAL_CHARS: &[char] = &['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// Turn an oracle-supplied category such as `"documents/tax returns"` into a
/// relative folder path like `"Documents/Tax_Returns"`.
///
/// Total and idempotent. Every segment of the result matches `[A-Za-z0-9_]+`;
/// characters outside that set which are not illegal in file names act as word
/// separators, so `..` or `.` can never survive as a segment.
pub fn sanitize(category_path: &str) -> String {
    category_path
        .split('/')
        .map(sanitize_segment)
        .collect::<Vec<_>>()
        .join("/")
}

fn sanitize_segment(segment: &str) -> String {
    let spaced: String = segment
        .chars()
        .filter(|c| !ILLEGAL_CHARS.contains(c))
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c
            } else {
                ' '
            }
        })
        .collect();

    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");

    let titled = joined
        .split('_')
        .map(capitalize)
        .collect::<Vec<_>>()
        .join("_");

    if titled.is_empty() {
        FALLBACK_SEGMENT.to_string()
    } else {
        titled
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => std::iter::once(first.to_ascii_uppercase())
            .chain(chars.map(|c| c.to_ascii_lowercase()))
            .collect(),
        None => String::new(),
    }
}
