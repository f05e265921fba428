const BULLETS: [char; 4] = ['•', '●', '▪', '–'];

/// Convert an XHTML chapter to markdown
pub fn html_to_markdown(html: &str) -> String {
    let md = html2md::rewrite_html(html, false);
    clean_markdown(&md)
}

/// Convert plain page text to markdown.
///
/// Blank lines separate blocks. A block made of one short line without
/// terminal punctuation becomes a `##` heading, bullet lines become list
/// items and the remaining lines of a block are joined into a paragraph.
pub fn text_to_markdown(text: &str) -> String {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines().map(str::trim) {
        if line.is_empty() {
            if !current.is_empty() {
                blocks.push(render_block(&current));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(render_block(&current));
    }

    clean_markdown(&blocks.join("\n\n"))
}

fn render_block(lines: &[&str]) -> String {
    if let [line] = lines {
        if looks_like_heading(line) {
            return format!("## {}", line);
        }
    }

    let mut out: Vec<String> = Vec::new();
    let mut paragraph = String::new();

    for line in lines {
        if let Some(item) = strip_bullet(line) {
            if !paragraph.is_empty() {
                out.push(std::mem::take(&mut paragraph));
            }
            out.push(format!("- {}", item));
            continue;
        }

        if paragraph.is_empty() {
            paragraph.push_str(line);
        } else if paragraph.ends_with('-')
            && line.chars().next().is_some_and(char::is_lowercase)
        {
            // Re-join a word hyphenated across a line break
            paragraph.pop();
            paragraph.push_str(line);
        } else {
            paragraph.push(' ');
            paragraph.push_str(line);
        }
    }
    if !paragraph.is_empty() {
        out.push(paragraph);
    }

    out.join("\n")
}

fn strip_bullet(line: &str) -> Option<&str> {
    let rest = line
        .strip_prefix(BULLETS)
        .or_else(|| line.strip_prefix("- "))
        .or_else(|| line.strip_prefix("* "))?;
    let rest = rest.trim_start();
    if rest.is_empty() {
        None
    } else {
        Some(rest)
    }
}

fn looks_like_heading(line: &str) -> bool {
    let len = line.chars().count();
    if len == 0 || len > 80 || line.split_whitespace().count() > 10 {
        return false;
    }
    if line.ends_with(['.', ',', ';', ':', '?', '!']) {
        return false;
    }
    let Some(first) = line.chars().next() else {
        return false;
    };
    (first.is_uppercase() || first.is_ascii_digit())
        && line.chars().any(char::is_alphabetic)
        && strip_bullet(line).is_none()
}

/// Normalize whitespace: no trailing spaces, at most one blank line between
/// blocks and exactly one trailing newline (none for empty output).
pub fn clean_markdown(md: &str) -> String {
    let mut out = String::with_capacity(md.len());
    let mut blank_run = 0;

    for line in md.trim().lines().map(str::trim_end) {
        if line.is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push_str(line);
        out.push('\n');
    }
    out
}
