// Filename helpers for config import/export.

/// Turn a device name into something safe to use as a filename:
/// whitespace, path separators, and shell-hostile punctuation become
/// underscores.
pub fn normalize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_whitespace() || matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|') {
                '_'
            } else {
                c
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_names_pass_through() {
        assert_eq!(normalize_filename("PC1"), "PC1");
        assert_eq!(normalize_filename("edge-router.lab"), "edge-router.lab");
    }

    #[test]
    fn hostile_characters_become_underscores() {
        assert_eq!(normalize_filename("my pc"), "my_pc");
        assert_eq!(normalize_filename("a/b\\c:d"), "a_b_c_d");
        assert_eq!(normalize_filename("what?"), "what_");
    }
}
