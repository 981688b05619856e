//! Message template rendering
//!
//! Templates use positional `{}` placeholders. Each placeholder takes the
//! next unused argument; whatever sits between the braces is ignored. The
//! renderer never fails: placeholders it cannot fill are kept as literal text.

use super::log_arg::LogArg;

/// How a rendered segment is styled on the console
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentStyle {
    /// Literal template text
    Plain,
    /// Integer arguments
    Emphasis,
    /// Every other argument kind
    Value,
}

impl SegmentStyle {
    pub fn color(&self) -> colored::Color {
        match self {
            SegmentStyle::Plain => colored::Color::White,
            SegmentStyle::Emphasis => colored::Color::Magenta,
            SegmentStyle::Value => colored::Color::Cyan,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub style: SegmentStyle,
}

impl Segment {
    pub fn new(text: impl Into<String>, style: SegmentStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, SegmentStyle::Plain)
    }
}

/// Render `template` with `args` into styled segments.
///
/// Adjacent literal runs are merged into a single [`SegmentStyle::Plain`]
/// segment. Once a `{` cannot be filled, either because the arguments ran
/// out or because no `}` follows, the remainder of the template is literal.
pub fn render(template: &str, args: &[LogArg]) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut rest = template;
    let mut next_arg = 0;

    while !rest.is_empty() {
        let Some(open) = rest.find('{') else {
            push_literal(&mut segments, rest);
            break;
        };
        push_literal(&mut segments, &rest[..open]);

        let placeholder = &rest[open..];
        let close = match placeholder.find('}') {
            Some(close) if next_arg < args.len() => close,
            _ => {
                push_literal(&mut segments, placeholder);
                break;
            }
        };

        let arg = &args[next_arg];
        next_arg += 1;
        if let Some(text) = arg.text() {
            if !text.is_empty() {
                segments.push(Segment::new(text.into_owned(), arg.style()));
            }
        }

        rest = &placeholder[close + 1..];
    }

    segments
}

/// Render and drop the styles
pub fn render_plain(template: &str, args: &[LogArg]) -> String {
    concat(&render(template, args))
}

/// Concatenate segment texts in order
pub fn concat(segments: &[Segment]) -> String {
    let len = segments.iter().map(|s| s.text.len()).sum();
    segments
        .iter()
        .fold(String::with_capacity(len), |mut out, segment| {
            out.push_str(&segment.text);
            out
        })
}

fn push_literal(segments: &mut Vec<Segment>, text: &str) {
    if text.is_empty() {
        return;
    }
    match segments.last_mut() {
        Some(last) if last.style == SegmentStyle::Plain => last.text.push_str(text),
        _ => segments.push(Segment::plain(text)),
    }
}
