use crate::Node;

const INDENT_STEP: &str = "  ";
const PREVIEW_CHARS: usize = 40;

/// One line per node, indented by depth, at most `cap` lines.
pub fn outline(root: &Node, cap: usize) -> Vec<String> {
    struct IndentGuard<'a> {
        indent: &'a mut String,
        step: usize,
    }

    impl Drop for IndentGuard<'_> {
        fn drop(&mut self) {
            let new_len = self.indent.len() - self.step;
            self.indent.truncate(new_len);
        }
    }

    fn push_preview(out: &mut String, s: &str) {
        for (i, ch) in s.chars().enumerate() {
            if i == PREVIEW_CHARS {
                out.push('…');
                break;
            }
            out.push(if ch == '\n' { ' ' } else { ch });
        }
    }

    fn walk(node: &Node, indent: &mut String, out: &mut Vec<String>, left: &mut usize) {
        if *left == 0 {
            return;
        }
        *left -= 1;
        match node {
            Node::Element {
                key,
                name,
                children,
                ..
            } => {
                let mut line = String::with_capacity(indent.len() + 32);
                line.push_str(indent);
                line.push('<');
                line.push_str(name);
                for attr in ["id", "class"] {
                    if let Some(value) = node.attr(attr).filter(|v| !v.is_empty()) {
                        line.push(' ');
                        line.push_str(attr);
                        line.push_str("=\"");
                        line.push_str(value);
                        line.push('"');
                    }
                }
                line.push('>');
                line.push_str(&format!("  #{}", key.0));
                out.push(line);
                indent.push_str(INDENT_STEP);
                let mut guard = IndentGuard {
                    indent,
                    step: INDENT_STEP.len(),
                };
                for child in children {
                    walk(child, guard.indent, out, left);
                }
            }
            Node::Text { text, .. } => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    let mut line = String::with_capacity(indent.len() + PREVIEW_CHARS + 2);
                    line.push_str(indent);
                    line.push('"');
                    push_preview(&mut line, trimmed);
                    line.push('"');
                    out.push(line);
                }
            }
        }
    }

    let mut out = Vec::new();
    let mut left = cap;
    let mut indent = String::new();
    walk(root, &mut indent, &mut out, &mut left);
    out
}
