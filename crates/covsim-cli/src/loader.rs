// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Dragonscale Team

//! Cover file loading.
//!
//! One module per line, members separated by whitespace:
//!
//! ```text
//! # optional comment
//! 3> 1 2 5
//! 4 6 7
//! ```
//!
//! A leading `<id>>` token names the module. Unnamed lines are numbered in
//! file order from 0, skipping ids that a named line claims anywhere in the
//! file. A member may carry a `:share` suffix, which is accepted and ignored.

use covsim_algo::{BipartiteRelation, RelationPair};
use covsim_common::{CovsimError, ModuleId, Result, VertexId};
use fxhash::FxHashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

pub fn load_cover(path: &Path) -> Result<BipartiteRelation> {
    let file = File::open(path)?;
    let relation = parse_cover(BufReader::new(file))?;
    debug!(
        path = %path.display(),
        vertices = relation.vertex_count(),
        modules = relation.module_count(),
        "Loaded cover"
    );
    Ok(relation)
}

pub fn load_cover_pair(first: &Path, second: &Path) -> Result<RelationPair> {
    Ok(RelationPair::new(load_cover(first)?, load_cover(second)?))
}

pub fn parse_cover<R: BufRead>(reader: R) -> Result<BipartiteRelation> {
    let mut named: Vec<(ModuleId, Vec<VertexId>)> = Vec::new();
    let mut unnamed: Vec<Vec<VertexId>> = Vec::new();
    let mut named_ids: FxHashSet<ModuleId> = FxHashSet::default();

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut tokens = line.split_whitespace().peekable();
        let module = match tokens.peek().and_then(|t| t.strip_suffix('>')) {
            Some(id) => {
                let module = id.parse::<ModuleId>().map_err(|_| {
                    CovsimError::parse_at(line_no, format!("bad module id '{}'", id))
                })?;
                tokens.next();
                if !named_ids.insert(module) {
                    return Err(CovsimError::parse_at(
                        line_no,
                        format!("duplicate module id {}", module),
                    ));
                }
                Some(module)
            }
            None => None,
        };

        let members = tokens
            .map(|token| {
                let id = token.split(':').next().unwrap_or(token);
                id.parse::<VertexId>().map_err(|_| {
                    CovsimError::parse_at(line_no, format!("bad vertex id '{}'", token))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        match module {
            Some(module) => named.push((module, members)),
            None => unnamed.push(members),
        }
    }

    // Unnamed lines take the lowest ids not claimed by a named line.
    let mut next: ModuleId = 0;
    let numbered = unnamed.into_iter().map(|members| {
        while named_ids.contains(&next) {
            next += 1;
        }
        let module = next;
        next += 1;
        (module, members)
    });

    Ok(BipartiteRelation::from_modules(named.into_iter().chain(numbered)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    #[test]
    fn test_parse_numbered_and_named_modules() {
        let input = "# comment\n\n1 2 3\n7> 3 4\n5:0.5 6\n";
        let cover = parse_cover(Cursor::new(input)).unwrap();

        assert_eq!(cover.members_of(0), &[1, 2, 3]);
        assert_eq!(cover.members_of(7), &[3, 4]);
        assert_eq!(cover.members_of(1), &[5, 6]);
        assert_eq!(cover.modules_of(3), &[0, 7]);
    }

    #[test]
    fn test_unnamed_lines_skip_named_ids() {
        let cover = parse_cover(Cursor::new("1> 4 5\n6 7\n0> 8\n9\n")).unwrap();

        assert_eq!(cover.modules(), &[0, 1, 2, 3]);
        assert_eq!(cover.members_of(1), &[4, 5]);
        assert_eq!(cover.members_of(0), &[8]);
        assert_eq!(cover.members_of(2), &[6, 7]);
        assert_eq!(cover.members_of(3), &[9]);
    }

    #[test]
    fn test_bad_vertex_reports_line() {
        let err = parse_cover(Cursor::new("1 2\n3 x\n")).unwrap_err();
        match err {
            CovsimError::Parse { line, message } => {
                assert_eq!(line, Some(2));
                assert!(message.contains("'x'"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_module_is_rejected() {
        let err = parse_cover(Cursor::new("1> 1 2\n1> 3\n")).unwrap_err();
        assert!(matches!(err, CovsimError::Parse { line: Some(2), .. }));
    }

    #[test]
    fn test_load_cover_pair_from_files() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let a = dir.path().join("a.cnl");
        let b = dir.path().join("b.cnl");
        writeln!(File::create(&a)?, "0 1\n2 3")?;
        writeln!(File::create(&b)?, "0 2\n1 3")?;

        let pair = load_cover_pair(&a, &b)?;
        assert_eq!(pair.vertex_set(), vec![0, 1, 2, 3]);
        assert_eq!(pair.modules_of(2), (&[1][..], &[0][..]));
        Ok(())
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_cover(Path::new("/nonexistent/cover.cnl")).unwrap_err();
        assert!(matches!(err, CovsimError::Io(_)));
    }
}
