/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */
//! Rewriting of GLSL ES source into something a desktop GLSL compiler takes.
//!
//! The output is assembled as:
//!
//! 1. `#version N`, taken from the guest's own `#version` directive if it is
//!    newer than GLSL 1.20, otherwise 120. The guest's directive is blanked
//!    out of the body.
//! 2. Constants standing in for the GLES-only `gl_Max*Vectors` built-ins.
//! 3. Either defines that make `lowp`/`mediump`/`highp` vanish (with the
//!    guest's `precision` statements blanked out of the body), or, in the
//!    alternate mode, default sampler precisions.
//! 4. `#line 1`, so compiler messages refer to the guest's line numbers.
//! 5. The guest source.
//!
//! Blanking replaces characters with spaces and never removes newlines, so
//! line numbers in the body stay correct.
//!
//! Only the scanning needed for this is done; there is no real GLSL parsing.

use crate::options::Options;

const MIN_GLSL_VERSION: i64 = 120;

const BUILTIN_CONSTANTS: &str = "\
const int _translator_gl_MaxVertexUniformVectors = 256;
const int _translator_gl_MaxFragmentUniformVectors = 256;
const int _translator_gl_MaxVaryingVectors = 15;
#define gl_MaxVertexUniformVectors _translator_gl_MaxVertexUniformVectors
#define gl_MaxFragmentUniformVectors _translator_gl_MaxFragmentUniformVectors
#define gl_MaxVaryingVectors _translator_gl_MaxVaryingVectors
";

// Not `#define precision`, because some drivers choke on the `float;` that
// would leave behind.
const OMIT_PRECISION: &str = "#define GLES 1\n#define lowp \n#define mediump \n#define highp \n";

const DEFAULT_PRECISION: &str = "\
#define GLES 1
precision lowp sampler2D;
precision lowp samplerCube;
";

/// The subset of [Options] that affects translation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TranslateOptions {
    pub force_glsl_version: Option<u32>,
    pub precision_defaults: bool,
}

impl From<&Options> for TranslateOptions {
    fn from(options: &Options) -> Self {
        TranslateOptions {
            force_glsl_version: options.force_glsl_version,
            precision_defaults: options.precision_defaults,
        }
    }
}

/// Translate `original` (the guest's source, already concatenated). The
/// result has no NUL terminator.
pub fn translate(original: &[u8], options: &TranslateOptions) -> Vec<u8> {
    let mut body = original.to_vec();

    let mut version = MIN_GLSL_VERSION;
    if let Some(guest_version) = extract_version(&mut body) {
        if guest_version > MIN_GLSL_VERSION {
            version = guest_version;
        }
    }
    if let Some(forced) = options.force_glsl_version {
        version = forced.into();
    }

    let mut out = format!("#version {}\n", version).into_bytes();
    out.extend_from_slice(BUILTIN_CONSTANTS.as_bytes());
    if options.precision_defaults {
        out.extend_from_slice(DEFAULT_PRECISION.as_bytes());
    } else {
        out.extend_from_slice(OMIT_PRECISION.as_bytes());
        blank_precision_statements(&mut body);
    }
    out.extend_from_slice(b"#line 1\n");
    out.extend_from_slice(&body);
    log_dbg!(
        "Translated shader source:\n{}",
        String::from_utf8_lossy(&out)
    );
    out
}

/// Which kind of comment the scanner is inside, if any.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum CommentState {
    None,
    Block,
    Line,
}

impl CommentState {
    /// If `src[i]` is part of a comment (or starts one), update the state and
    /// return how many bytes to skip. Returns `None` for code.
    fn skip(&mut self, src: &[u8], i: usize) -> Option<usize> {
        let next = src.get(i + 1).copied();
        match *self {
            CommentState::Block => {
                if src[i] == b'*' && next == Some(b'/') {
                    *self = CommentState::None;
                    Some(2)
                } else {
                    Some(1)
                }
            }
            CommentState::Line => {
                if src[i] == b'\n' {
                    *self = CommentState::None;
                }
                Some(1)
            }
            CommentState::None => match (src[i], next) {
                (b'/', Some(b'/')) => {
                    *self = CommentState::Line;
                    Some(2)
                }
                (b'/', Some(b'*')) => {
                    *self = CommentState::Block;
                    Some(2)
                }
                _ => None,
            },
        }
    }
}

/// Where the scanner is within a `precision <qualifier> <type>;` statement.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum StatementState {
    SeekPrecision,
    SeekQualifier,
    SeekSemicolon,
}

fn is_delimiter(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\r' | b'\n')
}

fn is_token_delimiter(c: u8) -> bool {
    is_delimiter(c) || c == b';'
}

fn blank(src: &mut [u8]) {
    for c in src.iter_mut().filter(|c| **c != b'\n') {
        *c = b' ';
    }
}

/// If the first thing in `src` that isn't whitespace or a comment is a
/// `#version` directive with a number on the same line, blank it out and
/// return the number.
fn extract_version(src: &mut [u8]) -> Option<i64> {
    let mut comments = CommentState::None;
    let mut start = 0;
    while start < src.len() {
        if let Some(skip) = comments.skip(src, start) {
            start += skip;
        } else if is_delimiter(src[start]) {
            start += 1;
        } else {
            break;
        }
    }

    if !src[start..].starts_with(b"#version") {
        return None;
    }
    let mut end = start + b"#version".len();
    while end < src.len() && matches!(src[end], b' ' | b'\t') {
        end += 1;
    }
    let number_start = end;
    if end < src.len() && matches!(src[end], b'+' | b'-') {
        end += 1;
    }
    let digits_start = end;
    while end < src.len() && src[end].is_ascii_digit() {
        end += 1;
    }
    if end == digits_start {
        return None;
    }
    let version = std::str::from_utf8(&src[number_start..end])
        .ok()?
        .parse()
        .ok()?;

    blank(&mut src[start..end]);
    Some(version)
}

/// Blank out every `precision <lowp|mediump|highp> <type>;` statement that
/// isn't inside a comment.
fn blank_precision_statements(src: &mut [u8]) {
    let mut comments = CommentState::None;
    let mut statement = StatementState::SeekPrecision;
    let mut precision_start = 0;
    let mut token_start: Option<usize> = None;

    let mut i = 0;
    while i < src.len() {
        if let Some(skip) = comments.skip(src, i) {
            i += skip;
            continue;
        }
        let c = src[i];
        match token_start {
            Some(t) if is_token_delimiter(c) => {
                let token = &src[t..i];
                let is_precision = token == b"precision";
                let is_qualifier = matches!(token, b"lowp" | b"mediump" | b"highp");
                statement = match statement {
                    StatementState::SeekPrecision if is_precision => {
                        precision_start = t;
                        StatementState::SeekQualifier
                    }
                    StatementState::SeekPrecision => StatementState::SeekPrecision,
                    StatementState::SeekQualifier if is_qualifier => StatementState::SeekSemicolon,
                    StatementState::SeekQualifier => StatementState::SeekPrecision,
                    StatementState::SeekSemicolon => {
                        if c == b';' {
                            blank(&mut src[precision_start..=i]);
                        }
                        StatementState::SeekPrecision
                    }
                };
                token_start = None;
            }
            None if c.is_ascii_alphabetic() => token_start = Some(i),
            _ => (),
        }
        i += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn translate_str(src: &str) -> String {
        String::from_utf8(translate(src.as_bytes(), &TranslateOptions::default())).unwrap()
    }

    fn body(translated: &str) -> &str {
        translated.split_once("#line 1\n").unwrap().1
    }

    #[test]
    fn output_layout() {
        let out = translate_str("void main() {}\n");
        let expected = format!(
            "#version 120\n{}{}#line 1\nvoid main() {{}}\n",
            BUILTIN_CONSTANTS, OMIT_PRECISION
        );
        assert_eq!(out, expected);
    }

    #[test]
    fn old_versions_use_baseline() {
        let out = translate_str("#version 100\nvoid main() {}");
        assert!(out.starts_with("#version 120\n"));
        assert_eq!(body(&out), "            \nvoid main() {}");
    }

    #[test]
    fn newer_versions_are_kept() {
        let out = translate_str("#version 130\nvoid main() {}");
        assert!(out.starts_with("#version 130\n"));
        assert!(!body(&out).contains("#version"));
    }

    #[test]
    fn version_after_comments_and_blank_lines() {
        let src = "// header\n/* block\ncomment */\n\n  #version 150\nvoid main() {}";
        let out = translate_str(src);
        assert!(out.starts_with("#version 150\n"));
        assert_eq!(out.matches("#version").count(), 1);
        // Line count of the body is preserved.
        assert_eq!(body(&out).lines().count(), src.lines().count());
    }

    #[test]
    fn version_with_extra_spaces() {
        let out = translate_str("#version   100\nvoid main() {}");
        assert!(out.starts_with("#version 120\n"));
        assert_eq!(out.matches("#version").count(), 1);
        assert_eq!(body(&out), "              \nvoid main() {}");
    }

    #[test]
    fn version_number_must_be_on_same_line() {
        let out = translate_str("#version\n100\n");
        assert!(out.starts_with("#version 120\n"));
        // Left for the host compiler to complain about.
        assert_eq!(body(&out), "#version\n100\n");
    }

    #[test]
    fn version_only_counts_as_first_token() {
        let out = translate_str("void f();\n#version 300\n");
        assert!(out.starts_with("#version 120\n"));
        assert!(body(&out).contains("#version 300"));
    }

    #[test]
    fn version_in_comment_is_ignored() {
        let out = translate_str("/* #version 300 */ void main() {}");
        assert!(out.starts_with("#version 120\n"));
        assert!(body(&out).contains("/* #version 300 */"));
    }

    #[test]
    fn forced_version_wins() {
        let options = TranslateOptions {
            force_glsl_version: Some(110),
            ..Default::default()
        };
        let out = translate(b"#version 300\nvoid main() {}", &options);
        let out = String::from_utf8(out).unwrap();
        assert!(out.starts_with("#version 110\n"));
        assert_eq!(out.matches("#version").count(), 1);
    }

    #[test]
    fn translating_twice_gives_same_result() {
        let src = b"#version 100\nprecision mediump float;\nvoid main() {}";
        let options = TranslateOptions::default();
        let first = translate(src, &options);
        let second = translate(src, &options);
        assert_eq!(first, second);
        assert_eq!(String::from_utf8(first).unwrap().matches("#version").count(), 1);
    }

    #[test]
    fn precision_statements_are_blanked() {
        let out = translate_str("precision mediump float;\nprecision highp\nint;\nvoid main() {}");
        assert_eq!(
            body(&out),
            "                        \n               \n    \nvoid main() {}"
        );
    }

    #[test]
    fn precision_with_unknown_qualifier_is_kept() {
        let src = "precision superp float;\nvoid main() {}";
        let out = translate_str(src);
        assert_eq!(body(&out), src);
    }

    #[test]
    fn scanning_resumes_after_unknown_qualifier() {
        let out = translate_str("precision bogus float;\nprecision lowp float;\n");
        assert_eq!(
            body(&out),
            "precision bogus float;\n                     \n"
        );
    }

    #[test]
    fn precision_needs_semicolon_right_after_type() {
        let src = "precision lowp float ;\n";
        let out = translate_str(src);
        assert_eq!(body(&out), src);
    }

    #[test]
    fn precision_in_comments_is_kept() {
        let src = "// precision lowp float;\n/* precision highp int; */\n";
        let out = translate_str(src);
        assert_eq!(body(&out), src);
    }

    #[test]
    fn unterminated_comment_is_tolerated() {
        let src = "void main() {}\n/* precision lowp float;";
        let out = translate_str(src);
        assert_eq!(body(&out), src);
    }

    #[test]
    fn qualifiers_as_variable_prefixes_are_kept() {
        let src = "uniform mediump vec4 color;\nvarying highp vec2 uv;\n";
        let out = translate_str(src);
        assert_eq!(body(&out), src);
    }

    #[test]
    fn precision_defaults_mode() {
        let options = TranslateOptions {
            precision_defaults: true,
            ..Default::default()
        };
        let src = "precision mediump float;\nvoid main() {}";
        let out = String::from_utf8(translate(src.as_bytes(), &options)).unwrap();
        assert!(out.contains(DEFAULT_PRECISION));
        assert!(!out.contains(OMIT_PRECISION));
        assert_eq!(body(&out), src);
    }
}
