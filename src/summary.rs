use crate::play::Play;

pub const DEFAULT_WRAP_WIDTH: usize = 70;
pub const LINE_BREAK: &str = "<br>";

const TEXT_DELIMITER: &str = "brk, ";
const NAME_DELIMITER: &str = ", ";

/// Description text together with the source it was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Summary {
    /// Clock, down/distance and interleaved play-by-play text.
    Merged(String),
    /// The raw `detail` cell.
    Detail(String),
    /// The unparsed text cell.
    Raw(String),
    Empty,
}

impl Summary {
    pub fn text(&self) -> &str {
        match self {
            Summary::Merged(s) | Summary::Detail(s) | Summary::Raw(s) => s,
            Summary::Empty => "",
        }
    }
}

pub fn summarize(play: &Play) -> Summary {
    if let Some(desc) = merged_description(play) {
        return Summary::Merged(format!("{} - {}: {}", clock(play), down_distance(play), desc));
    }
    if let Some(detail) = play.detail.as_deref() {
        return Summary::Detail(detail.to_string());
    }
    if let Some(cell) = play.onecell.as_deref() {
        return Summary::Raw(cell.to_string());
    }
    Summary::Empty
}

/// One display label: the summary wrapped at `width` columns.
pub fn summary_label(play: &Play, width: usize) -> String {
    wrap(summarize(play).text(), width).join(LINE_BREAK)
}

fn clock(play: &Play) -> String {
    format!(
        "Q{} {}",
        play.quarter.as_deref().unwrap_or("?"),
        play.qtr_time_remain.as_deref().unwrap_or("")
    )
}

fn down_distance(play: &Play) -> String {
    let down = match play.down {
        Some(1) => "1st",
        Some(2) => "2nd",
        Some(3) => "3rd",
        Some(4) => "4th",
        _ => "Xth",
    };
    let dist = play
        .dist
        .map(|d| d.to_string())
        .unwrap_or_else(|| "?".to_string());
    format!("{down} & {dist}")
}

/// Interleave the text segments with the player names they were split around.
fn merged_description(play: &Play) -> Option<String> {
    let text = play.detail_text.as_deref()?;
    let names = play.detail_a.as_deref()?;
    let texts: Vec<&str> = text.split(TEXT_DELIMITER).collect();
    let names: Vec<&str> = names.split(NAME_DELIMITER).collect();

    let mut out = String::new();
    if names.len() >= texts.len() {
        for (name, segment) in names.iter().zip(texts.iter()) {
            out.push_str(name);
            out.push_str(segment);
        }
        if names.len() > texts.len() {
            out.push_str(names.last()?);
        }
    } else {
        for (segment, name) in texts.iter().zip(names.iter()) {
            out.push_str(segment);
            out.push_str(name);
        }
        out.push_str(texts.last()?);
    }
    Some(out)
}

/// Greedy word wrap; words longer than `width` are split.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut line_len = 0usize;

    for word in text.split_whitespace() {
        let mut chars: Vec<char> = word.chars().collect();
        while !chars.is_empty() {
            let needed = if line_len == 0 { chars.len() } else { line_len + 1 + chars.len() };
            if needed <= width {
                if line_len > 0 {
                    line.push(' ');
                    line_len += 1;
                }
                line.extend(chars.iter());
                line_len += chars.len();
                chars.clear();
            } else if line_len > 0 {
                lines.push(std::mem::take(&mut line));
                line_len = 0;
            } else {
                let rest = chars.split_off(width);
                lines.push(chars.iter().collect());
                chars = rest;
            }
        }
    }
    if line_len > 0 {
        lines.push(line);
    }
    lines
}
