//! Line diffs of dumped channel records
//!
//! Output follows the unified format with the whole document as context,
//! so a reviewer always sees the complete record being changed.

/// One line of an edit script
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffLine<'a> {
    Same(&'a str),
    Removed(&'a str),
    Added(&'a str),
}

/// Longest-common-subsequence edit script from `before` to `after`
#[must_use]
pub fn diff_lines<'a>(before: &[&'a str], after: &[&'a str]) -> Vec<DiffLine<'a>> {
    let (n, m) = (before.len(), after.len());
    // lcs[i][j]: common subsequence length of before[i..] and after[j..]
    let mut lcs = vec![vec![0usize; m + 1]; n + 1];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            lcs[i][j] = if before[i] == after[j] {
                lcs[i + 1][j + 1] + 1
            } else {
                lcs[i + 1][j].max(lcs[i][j + 1])
            };
        }
    }

    let mut script = Vec::with_capacity(n.max(m));
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if before[i] == after[j] {
            script.push(DiffLine::Same(before[i]));
            i += 1;
            j += 1;
        } else if lcs[i + 1][j] >= lcs[i][j + 1] {
            script.push(DiffLine::Removed(before[i]));
            i += 1;
        } else {
            script.push(DiffLine::Added(after[j]));
            j += 1;
        }
    }
    script.extend(before[i..].iter().copied().map(DiffLine::Removed));
    script.extend(after[j..].iter().copied().map(DiffLine::Added));
    script
}

fn hunk_range(len: usize) -> String {
    match len {
        0 => "0,0".to_string(),
        1 => "1".to_string(),
        n => format!("1,{n}"),
    }
}

/// Unified diff with full context; empty when the texts are equal
#[must_use]
pub fn unified_diff(before: &str, after: &str) -> String {
    if before == after {
        return String::new();
    }
    let old: Vec<&str> = before.lines().collect();
    let new: Vec<&str> = after.lines().collect();

    let mut out = format!(
        "--- current\n+++ updated\n@@ -{} +{} @@\n",
        hunk_range(old.len()),
        hunk_range(new.len())
    );
    for line in diff_lines(&old, &new) {
        let (marker, text) = match line {
            DiffLine::Same(t) => (' ', t),
            DiffLine::Removed(t) => ('-', t),
            DiffLine::Added(t) => ('+', t),
        };
        out.push(marker);
        out.push_str(text);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn equal_texts_have_no_diff() {
        assert_eq!(unified_diff("a: 1\n", "a: 1\n"), "");
    }

    #[test]
    fn changed_line_keeps_full_context() {
        let diff = unified_diff("a: 1\nb: 2\nc: 3\n", "a: 1\nb: 5\nc: 3\n");
        assert_eq!(
            diff,
            "--- current\n+++ updated\n@@ -1,3 +1,3 @@\n a: 1\n-b: 2\n+b: 5\n c: 3\n"
        );
    }

    #[test]
    fn creation_from_nothing() {
        let diff = unified_diff("", "enabled: true\n");
        assert_eq!(diff, "--- current\n+++ updated\n@@ -0,0 +1 @@\n+enabled: true\n");
    }

    #[test]
    fn edit_script_preserves_common_lines() {
        let script = diff_lines(&["x", "y", "z"], &["y", "z", "w"]);
        assert_eq!(
            script,
            vec![
                DiffLine::Removed("x"),
                DiffLine::Same("y"),
                DiffLine::Same("z"),
                DiffLine::Added("w"),
            ]
        );
    }
}
