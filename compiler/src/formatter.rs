/// Re-indents generated single-line code by brace depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Formatter {
    indent_width: usize,
}

impl Default for Formatter {
    fn default() -> Self {
        Formatter::new(4)
    }
}

impl Formatter {
    pub fn new(indent_width: usize) -> Self {
        Formatter { indent_width }
    }

    fn indent(&self, depth: isize) -> String {
        " ".repeat(self.indent_width * depth.max(0) as usize)
    }

    /// Puts every `{` on its own line, breaks after every `;` and `}`, and indents each
    /// line by its depth. A `;` or `}` directly followed by `}` takes the shallower indent.
    ///
    /// Panics when the braces of `code` do not balance: the generator only emits
    /// balanced text, so anything else is a bug in it.
    pub fn format(&self, code: &str) -> String {
        let bytes = code.as_bytes();
        let mut out = String::with_capacity(code.len() * 2);
        let mut depth: isize = 0;

        for (i, ch) in code.char_indices() {
            let next_closes = bytes.get(i + ch.len_utf8()) == Some(&b'}');
            match ch {
                '{' => {
                    out.push('\n');
                    out.push_str(&self.indent(depth));
                    depth += 1;
                    out.push('{');
                    out.push('\n');
                    out.push_str(&self.indent(depth));
                }
                ';' => {
                    out.push(';');
                    out.push('\n');
                    out.push_str(&self.indent(if next_closes { depth - 1 } else { depth }));
                }
                '}' => {
                    out.push('}');
                    out.push('\n');
                    depth -= 1;
                    out.push_str(&self.indent(if next_closes { depth - 1 } else { depth }));
                }
                _ => out.push(ch),
            }
        }

        assert!(depth == 0, "mismatched braces in generated code (depth {})", depth);
        out
    }
}

/// Net `{` minus `}` count of `code`.
pub fn brace_depth(code: &str) -> isize {
    code.chars().fold(0, |depth, ch| match ch {
        '{' => depth + 1,
        '}' => depth - 1,
        _ => depth,
    })
}
