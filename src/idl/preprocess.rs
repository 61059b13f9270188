// Include preprocessing
//
// Expands top-level `!@include: path` lines by splicing in the referenced
// file before the grammar ever sees the source. Each file is spliced at most
// once, which also breaks include cycles.

use crate::idl::constants::INCLUDE_DIRECTIVE;
use crate::{Error, Result};
use std::collections::HashSet;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::path::Path;
use tracing::debug;

/// Source of IDL text for the preprocessor.
pub trait IncludeLoader {
    /// Load the file at `path`.
    ///
    /// Returns the content together with an id that is equal for two paths
    /// naming the same file.
    fn load(&self, path: &str) -> Result<(String, u64)>;

    /// Resolve `include` as written inside the file at `base`.
    fn resolve(&self, base: &str, include: &str) -> Result<String>;
}

/// Loads from the local filesystem.
///
/// Includes resolve relative to the directory of the including file; the id
/// is a hash of the canonical path.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsLoader;

impl IncludeLoader for FsLoader {
    fn load(&self, path: &str) -> Result<(String, u64)> {
        let canonical = std::fs::canonicalize(path).map_err(|e| Error::include(path, e.to_string()))?;
        let content =
            std::fs::read_to_string(&canonical).map_err(|e| Error::include(path, e.to_string()))?;

        let mut hasher = DefaultHasher::new();
        canonical.hash(&mut hasher);
        Ok((content, hasher.finish()))
    }

    fn resolve(&self, base: &str, include: &str) -> Result<String> {
        let include_path = Path::new(include);
        if include_path.is_absolute() {
            return Ok(include.to_string());
        }
        let resolved = match Path::new(base).parent() {
            Some(dir) => dir.join(include_path),
            None => include_path.to_path_buf(),
        };
        Ok(resolved.to_string_lossy().into_owned())
    }
}

/// Read `path` through `loader` and expand its `!@include:` directives
///
/// Only directives outside of any `{ ... }` block are expanded. The path may
/// be wrapped in `"` or `'`.
pub fn preprocess(path: &str, loader: &impl IncludeLoader) -> Result<String> {
    let mut visited = HashSet::new();
    preprocess_recursive(path, loader, &mut visited)
}

fn preprocess_recursive(
    path: &str,
    loader: &impl IncludeLoader,
    visited: &mut HashSet<u64>,
) -> Result<String> {
    let (source, id) = loader.load(path)?;
    if !visited.insert(id) {
        debug!(path, "skipping already included file");
        return Ok(String::new());
    }

    let mut out = String::with_capacity(source.len());
    let mut brace_level = 0i32;

    for line in source.lines() {
        let trimmed = line.trim();

        if brace_level == 0 {
            if let Some(target) = trimmed.strip_prefix(INCLUDE_DIRECTIVE) {
                let target = target.trim().trim_matches('"').trim_matches('\'');
                let resolved = loader.resolve(path, target)?;
                debug!(from = path, include = %resolved, "expanding include");

                let expanded = preprocess_recursive(&resolved, loader, visited)?;
                out.push_str(&expanded);
                if !expanded.is_empty() && !expanded.ends_with('\n') {
                    out.push('\n');
                }
                continue;
            }
        }

        out.push_str(line);
        out.push('\n');
        brace_level = (brace_level + brace_change(line)).max(0);
    }

    Ok(out)
}

/// Net `{`/`}` balance of a line, ignoring string and char literals and
/// `//` comments.
fn brace_change(line: &str) -> i32 {
    let mut change = 0;
    let mut quote: Option<char> = None;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match quote {
            Some(q) => {
                if c == '\\' {
                    chars.next();
                } else if c == q {
                    quote = None;
                }
            }
            None => match c {
                '{' => change += 1,
                '}' => change -= 1,
                '"' | '\'' => quote = Some(c),
                '/' if chars.peek() == Some(&'/') => break,
                _ => {}
            },
        }
    }

    change
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// In-memory loader; ids are content hashes.
    struct MapLoader(HashMap<&'static str, &'static str>);

    impl IncludeLoader for MapLoader {
        fn load(&self, path: &str) -> Result<(String, u64)> {
            let content = self
                .0
                .get(path)
                .ok_or_else(|| Error::include(path, "file not found"))?;
            let mut hasher = DefaultHasher::new();
            content.hash(&mut hasher);
            Ok((content.to_string(), hasher.finish()))
        }

        fn resolve(&self, base: &str, include: &str) -> Result<String> {
            Ok(match base.rfind('/') {
                Some(pos) => format!("{}{include}", &base[..=pos]),
                None => include.to_string(),
            })
        }
    }

    macro_rules! test_cases {
        ($($name:ident: $input:expr => $expected:expr),* $(,)?) => {
            $(
                #[test]
                fn $name() {
                    assert_eq!(brace_change($input), $expected);
                }
            )*
        };
    }

    // ============================================================
    // Section: Brace counting
    // ============================================================

    test_cases! {
        test_plain_open: "service S {" => 1,
        test_balanced: "struct P { a: u32 }" => 0,
        test_comment_ignored: "service { // { }" => 1,
        test_string_ignored: r#"service { " { " }"# => 0,
        test_escaped_quote: r#"{ " \" { " }"# => 0,
        test_char_literal: "{ '}' " => 1,
        test_close_only: "}}" => -2,
    }

    // ============================================================
    // Section: Expansion
    // ============================================================

    #[test]
    fn nested_includes_expand_in_place() {
        let loader = MapLoader(HashMap::from([
            ("leaf.idl", "service Leaf {}"),
            ("dir/middle.idl", "!@include: ../leaf.idl\nservice Middle {}"),
            ("main.idl", "!@include: \"dir/middle.idl\"\nservice Main {}"),
            ("dir/../leaf.idl", "service Leaf {}"),
        ]));
        let out = preprocess("main.idl", &loader).unwrap();
        let leaf = out.find("service Leaf").unwrap();
        let middle = out.find("service Middle").unwrap();
        let main = out.find("service Main").unwrap();
        assert!(leaf < middle && middle < main, "{out}");
    }

    #[test]
    fn shared_include_is_spliced_once() {
        let loader = MapLoader(HashMap::from([
            ("common.idl", "service Common {}"),
            ("a.idl", "!@include: common.idl\nservice A {}"),
            ("b.idl", "!@include: 'common.idl'\nservice B {}"),
            ("main.idl", "!@include: a.idl\n!@include: b.idl"),
        ]));
        let out = preprocess("main.idl", &loader).unwrap();
        assert_eq!(out.matches("service Common").count(), 1);
    }

    #[test]
    fn cycle_terminates() {
        let loader = MapLoader(HashMap::from([
            ("a.idl", "!@include: b.idl\nservice A {}"),
            ("b.idl", "!@include: a.idl\nservice B {}"),
        ]));
        let out = preprocess("a.idl", &loader).unwrap();
        assert_eq!(out.matches("service A").count(), 1);
        assert_eq!(out.matches("service B").count(), 1);
    }

    #[test]
    fn directive_inside_block_is_kept_verbatim() {
        let loader = MapLoader(HashMap::from([(
            "main.idl",
            "service S {\n  !@include: other.idl\n}",
        )]));
        let out = preprocess("main.idl", &loader).unwrap();
        assert!(out.contains("!@include: other.idl"));
    }

    #[test]
    fn missing_include_reports_path() {
        let loader = MapLoader(HashMap::from([("main.idl", "!@include: gone.idl")]));
        match preprocess("main.idl", &loader) {
            Err(Error::Include { path, .. }) => assert_eq!(path, "gone.idl"),
            other => panic!("expected include error, got {other:?}"),
        }
    }

    #[test]
    fn fs_loader_resolves_relative_to_including_file() {
        let loader = FsLoader;
        assert_eq!(
            loader.resolve("idl/main.idl", "common.idl").unwrap(),
            Path::new("idl").join("common.idl").to_string_lossy()
        );
        assert_eq!(loader.resolve("main.idl", "common.idl").unwrap(), "common.idl");
    }
}
