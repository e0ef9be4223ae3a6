//! Client-side exports: plain text, Markdown, standalone HTML and a raw
//! JSON dump of the editor output, delivered as browser downloads.

use std::sync::OnceLock;

use pulldown_cmark::{html, Options, Parser};
use regex::Regex;
use serde_json::Value;
use wasm_bindgen::{JsCast, JsValue};

use crate::document::{Block, DocumentRecord, OutputData};
use crate::error::ExportError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Text,
    Markdown,
    Html,
    Json,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 4] = [
        ExportFormat::Text,
        ExportFormat::Markdown,
        ExportFormat::Html,
        ExportFormat::Json,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ExportFormat::Text => "Plain text (.txt)",
            ExportFormat::Markdown => "Markdown (.md)",
            ExportFormat::Html => "Web page (.html)",
            ExportFormat::Json => "Editor data (.json)",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Text => "txt",
            ExportFormat::Markdown => "md",
            ExportFormat::Html => "html",
            ExportFormat::Json => "json",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            ExportFormat::Text => "text/plain",
            ExportFormat::Markdown => "text/markdown",
            ExportFormat::Html => "text/html",
            ExportFormat::Json => "application/json",
        }
    }

    pub fn render(self, doc: &DocumentRecord) -> Result<String, ExportError> {
        Ok(match self {
            ExportFormat::Text => to_plain_text(&doc.content),
            ExportFormat::Markdown => to_markdown(&doc.content),
            ExportFormat::Html => to_html(&doc.title, &doc.content),
            ExportFormat::Json => to_json(&doc.content)?,
        })
    }

    /// Download name derived from the title, `document.<ext>` when the
    /// title has nothing usable in it.
    pub fn file_name(self, title: &str) -> String {
        static RE_UNSAFE: OnceLock<Regex> = OnceLock::new();
        let re_unsafe = RE_UNSAFE.get_or_init(|| Regex::new(r"[^\w\- ]+").unwrap());
        let cleaned = re_unsafe.replace_all(title, "");
        let stem = cleaned.split_whitespace().collect::<Vec<_>>().join("-");
        let stem = if stem.is_empty() { "document" } else { stem.as_str() };
        format!("{stem}.{}", self.extension())
    }
}

fn list_item_text(item: &Value) -> &str {
    match item {
        Value::String(s) => s,
        Value::Object(map) => map
            .get("content")
            .or_else(|| map.get("text"))
            .and_then(Value::as_str)
            .unwrap_or_default(),
        _ => "",
    }
}

fn header_level(block: &Block) -> usize {
    match block.data.get("level").and_then(Value::as_u64) {
        Some(level) if level > 0 => level.min(6) as usize,
        _ => 1,
    }
}

fn is_ordered(block: &Block) -> bool {
    block.str_field("style") == Some("ordered")
}

fn items(block: &Block) -> &[Value] {
    block
        .data
        .get("items")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// Plain text: headers become `#` runs, lists bullet or numbered lines,
/// quotes `>`-prefixed, code fenced. Blocks are separated by a blank line.
pub fn to_plain_text(data: &OutputData) -> String {
    data.blocks
        .iter()
        .map(|block| match block.kind.as_str() {
            "header" => {
                let level = "#".repeat(header_level(block));
                format!("{level} {}", strip_inline(block.text()))
            }
            "paragraph" => strip_inline(block.text()),
            "list" => items(block)
                .iter()
                .enumerate()
                .map(|(idx, item)| {
                    let text = strip_inline(list_item_text(item));
                    if is_ordered(block) {
                        format!("{}. {text}", idx + 1)
                    } else {
                        format!("• {text}")
                    }
                })
                .collect::<Vec<_>>()
                .join("\n"),
            "quote" => format!("> {}", strip_inline(block.text())),
            "code" => format!("```\n{}\n```", block.str_field("code").unwrap_or_default()),
            _ => strip_inline(block.text()),
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn to_json(data: &OutputData) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(data)?)
}

fn markdown_list(out: &mut Vec<String>, values: &[Value], ordered: bool, depth: usize) {
    for (idx, item) in values.iter().enumerate() {
        let marker = if ordered {
            format!("{}.", idx + 1)
        } else {
            "-".to_string()
        };
        out.push(format!(
            "{}{marker} {}",
            "   ".repeat(depth),
            inline_to_markdown(list_item_text(item))
        ));
        if let Some(children) = item.get("items").and_then(Value::as_array) {
            markdown_list(out, children, ordered, depth + 1);
        }
    }
}

fn markdown_table(block: &Block) -> String {
    let rows: Vec<Vec<String>> = block
        .data
        .get("content")
        .and_then(Value::as_array)
        .map(|rows| {
            rows.iter()
                .map(|row| {
                    row.as_array()
                        .map(|cells| {
                            cells
                                .iter()
                                .map(|cell| {
                                    inline_to_markdown(cell.as_str().unwrap_or_default())
                                        .replace('|', "\\|")
                                })
                                .collect()
                        })
                        .unwrap_or_default()
                })
                .collect()
        })
        .unwrap_or_default();
    let Some(width) = rows.iter().map(Vec::len).max().filter(|w| *w > 0) else {
        return String::new();
    };
    let line = |cells: &[String]| {
        let mut padded: Vec<&str> = cells.iter().map(String::as_str).collect();
        padded.resize(width, "");
        format!("| {} |", padded.join(" | "))
    };
    let with_headings = block
        .data
        .get("withHeadings")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let mut out = Vec::with_capacity(rows.len() + 2);
    let body = if with_headings {
        out.push(line(rows[0].as_slice()));
        &rows[1..]
    } else {
        out.push(line(vec![String::new(); width].as_slice()));
        &rows[..]
    };
    out.push(format!("|{}", " --- |".repeat(width)));
    out.extend(body.iter().map(|row| line(row.as_slice())));
    out.join("\n")
}

fn block_to_markdown(block: &Block) -> String {
    match block.kind.as_str() {
        "header" => format!(
            "{} {}",
            "#".repeat(header_level(block)),
            inline_to_markdown(block.text())
        ),
        "list" => {
            let mut out = Vec::new();
            markdown_list(&mut out, items(block), is_ordered(block), 0);
            out.join("\n")
        }
        "checklist" => items(block)
            .iter()
            .map(|item| {
                let checked = item.get("checked").and_then(Value::as_bool).unwrap_or(false);
                format!(
                    "- [{}] {}",
                    if checked { "x" } else { " " },
                    inline_to_markdown(list_item_text(item))
                )
            })
            .collect::<Vec<_>>()
            .join("\n"),
        "quote" => {
            let mut out: Vec<String> = inline_to_markdown(block.text())
                .lines()
                .map(|line| format!("> {line}"))
                .collect();
            if let Some(caption) = block.str_field("caption").filter(|c| !c.trim().is_empty()) {
                out.push(">".to_string());
                out.push(format!("> *{}*", inline_to_markdown(caption)));
            }
            out.join("\n")
        }
        "code" => {
            let code = block.str_field("code").unwrap_or_default();
            let fence = code_fence(code);
            let language = block
                .str_field("language")
                .unwrap_or_default()
                .split_whitespace()
                .next()
                .unwrap_or_default();
            format!("{fence}{language}\n{code}\n{fence}")
        }
        "delimiter" => "---".to_string(),
        "warning" | "alert" => {
            let title = block.str_field("title").unwrap_or_default();
            let message = block.str_field("message").unwrap_or_default();
            match (title.trim().is_empty(), message.trim().is_empty()) {
                (false, false) => format!(
                    "> **{}**\n> {}",
                    inline_to_markdown(title),
                    inline_to_markdown(message)
                ),
                (false, true) => format!("> **{}**", inline_to_markdown(title)),
                _ => format!("> {}", inline_to_markdown(message)),
            }
        }
        "table" => markdown_table(block),
        "image" => {
            let url = block
                .data
                .pointer("/file/url")
                .or_else(|| block.data.get("url"))
                .and_then(Value::as_str)
                .and_then(link_destination)
                .unwrap_or_default();
            let caption = strip_inline(block.str_field("caption").unwrap_or_default());
            format!("![{}]({url})", escape_markdown(&caption))
        }
        "linkTool" | "embed" => {
            let url = block
                .str_field("link")
                .or_else(|| block.str_field("source"))
                .unwrap_or_default();
            match link_destination(url) {
                Some(dest) if !dest.is_empty() => format!("[{}]({dest})", escape_markdown(url)),
                _ => String::new(),
            }
        }
        _ => inline_to_markdown(block.text()),
    }
}

pub fn to_markdown(data: &OutputData) -> String {
    data.blocks
        .iter()
        .map(block_to_markdown)
        .filter(|chunk| !chunk.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Standalone page with the title as `<h1>` and the Markdown rendering
/// of the blocks as the body.
pub fn to_html(title: &str, data: &OutputData) -> String {
    let markdown = to_markdown(data);
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    let parser = Parser::new_ext(&markdown, options);
    let mut body = String::new();
    html::push_html(&mut body, parser);

    let title = escape_html(title);
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n</head>\n<body>\n<h1>{title}</h1>\n{body}</body>\n</html>\n"
    )
}

pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

fn inline_tag() -> &'static Regex {
    static RE_TAG: OnceLock<Regex> = OnceLock::new();
    RE_TAG.get_or_init(|| Regex::new(r"<(/?)([a-zA-Z][a-zA-Z0-9]*)([^>]*)>").unwrap())
}

/// Drops inline markup the editor stores in block text and decodes
/// entities. Plain-text output only: the result is no longer escaped.
pub fn strip_inline(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for caps in inline_tag().captures_iter(text) {
        let Some(tag) = caps.get(0) else {
            continue;
        };
        out.push_str(&text[cursor..tag.start()]);
        cursor = tag.end();
        if caps[2].eq_ignore_ascii_case("br") {
            out.push('\n');
        }
    }
    out.push_str(&text[cursor..]);
    decode_entities(&out)
}

/// Escapes literal text for Markdown: punctuation Markdown would act on
/// gets a backslash, and `<`, `>`, `&` become entities so typed text can
/// never turn into raw HTML.
pub fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' | '`' | '*' | '_' | '[' | ']' | '~' => {
                out.push('\\');
                out.push(ch);
            }
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Backslash-escapes a leading `#`, `-`, `+`, `=` or `1.` so a line of
/// text never becomes a heading, list item or rule.
fn escape_line_starts(text: &str) -> String {
    text.split('\n')
        .map(|line| {
            let indent = line.len() - line.trim_start_matches([' ', '\t']).len();
            let (lead, rest) = line.split_at(indent);
            if rest.starts_with(['#', '-', '+', '=']) {
                return format!("{lead}\\{rest}");
            }
            let digits = rest.len() - rest.trim_start_matches(|c: char| c.is_ascii_digit()).len();
            if digits > 0 && rest[digits..].starts_with(['.', ')']) {
                return format!("{lead}{}\\{}", &rest[..digits], &rest[digits..]);
            }
            line.to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Link target usable in `[text](url)`, or `None` for script URLs.
fn link_destination(url: &str) -> Option<String> {
    let url = decode_entities(url.trim());
    let scheme = url.to_ascii_lowercase();
    if scheme.starts_with("javascript:") || scheme.starts_with("vbscript:") {
        return None;
    }
    Some(
        url.replace(' ', "%20")
            .replace('(', "%28")
            .replace(')', "%29")
            .replace('<', "%3C")
            .replace('>', "%3E"),
    )
}

fn push_run(out: &mut String, run: &str, in_code: bool) {
    let run = decode_entities(run);
    if in_code {
        out.push_str(&run);
    } else {
        out.push_str(&escape_markdown(&run));
    }
}

/// Converts the editor's inline HTML (bold, italic, inline code, links,
/// strikethrough, marker) into Markdown; any other tag is dropped. Text
/// between tags is escaped, so only real markup becomes Markdown.
pub fn inline_to_markdown(text: &str) -> String {
    static RE_HREF: OnceLock<Regex> = OnceLock::new();
    let re_href = RE_HREF.get_or_init(|| Regex::new(r#"(?i)href\s*=\s*"([^"]*)""#).unwrap());

    let mut out = String::with_capacity(text.len());
    let mut links: Vec<Option<String>> = Vec::new();
    let mut in_code = false;
    let mut cursor = 0;
    for caps in inline_tag().captures_iter(text) {
        let Some(tag) = caps.get(0) else {
            continue;
        };
        push_run(&mut out, &text[cursor..tag.start()], in_code);
        cursor = tag.end();
        let closing = &caps[1] == "/";
        let name = caps[2].to_ascii_lowercase();
        if in_code && name != "code" {
            continue;
        }
        match name.as_str() {
            "br" => out.push('\n'),
            "b" | "strong" => out.push_str("**"),
            "i" | "em" => out.push('*'),
            "s" | "del" | "strike" => out.push_str("~~"),
            "mark" => out.push_str("=="),
            "code" => {
                out.push('`');
                in_code = !closing;
            }
            "a" if closing => {
                if let Some(Some(href)) = links.pop() {
                    out.push_str(&format!("]({href})"));
                }
            }
            "a" => {
                let href = re_href
                    .captures(&caps[3])
                    .and_then(|href| link_destination(&href[1]));
                if href.is_some() {
                    out.push('[');
                }
                links.push(href);
            }
            _ => {}
        }
    }
    push_run(&mut out, &text[cursor..], in_code);
    escape_line_starts(&out)
}

/// Backtick fence longer than any backtick run inside `code`.
fn code_fence(code: &str) -> String {
    let longest = code
        .split(|c: char| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    "`".repeat((longest + 1).max(3))
}

/// Triggers a browser download of `contents` via a temporary object URL.
pub fn download(file_name: &str, mime: &str, contents: &str) -> Result<(), ExportError> {
    let window = web_sys::window().ok_or_else(|| ExportError::Download("no window".into()))?;
    let document = window
        .document()
        .ok_or_else(|| ExportError::Download("no document".into()))?;

    let parts = js_sys::Array::of1(&JsValue::from_str(contents));
    let options = web_sys::BlobPropertyBag::new();
    options.set_type(mime);
    let blob = web_sys::Blob::new_with_str_sequence_and_options(&parts, &options)?;
    let url = web_sys::Url::create_object_url_with_blob(&blob)?;

    let anchor: web_sys::HtmlAnchorElement = document.create_element("a")?.unchecked_into();
    anchor.set_href(&url);
    anchor.set_download(file_name);
    anchor.click();
    web_sys::Url::revoke_object_url(&url)?;
    tracing::debug!(file_name, mime, bytes = contents.len(), "export downloaded");
    Ok(())
}

pub fn export_document(doc: &DocumentRecord, format: ExportFormat) -> Result<(), ExportError> {
    let contents = format.render(doc)?;
    download(&format.file_name(&doc.title), format.mime(), &contents)
}

/// Reads a `.json` file produced by the JSON export (or a saved document
/// record holding it under `content`) back into editor data.
pub fn import_json(raw: &str) -> Result<OutputData, ExportError> {
    let value: Value = serde_json::from_str(raw)?;
    let data = match value.get("content") {
        Some(content) if value.get("blocks").is_none() => content.clone(),
        _ => value,
    };
    if !data.get("blocks").is_some_and(Value::is_array) {
        return Err(ExportError::NotEditorData);
    }
    Ok(serde_json::from_value(data)?)
}

pub async fn read_file_text(file: &web_sys::File) -> Result<String, ExportError> {
    let text = wasm_bindgen_futures::JsFuture::from(file.text()).await?;
    text.as_string()
        .ok_or_else(|| ExportError::Download("file is not text".into()))
}

pub fn print_page() {
    let Some(window) = web_sys::window() else {
        return;
    };
    if let Err(e) = window.print() {
        tracing::warn!("print failed: {:?}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(blocks: Vec<Block>) -> OutputData {
        OutputData::new(blocks)
    }

    #[test]
    fn header_and_paragraph_to_text() {
        let data = doc(vec![
            Block::new("header", json!({ "text": "Title", "level": 2 })),
            Block::new("paragraph", json!({ "text": "Body" })),
        ]);
        assert_eq!(to_plain_text(&data), "## Title\n\nBody");
    }

    #[test]
    fn text_covers_lists_quotes_and_code() {
        let data = doc(vec![
            Block::new("header", json!({ "text": "No level" })),
            Block::new("list", json!({ "style": "ordered", "items": ["one", "two"] })),
            Block::new(
                "list",
                json!({ "style": "unordered", "items": [{ "content": "a", "items": [] }] }),
            ),
            Block::new("quote", json!({ "text": "wise", "caption": "someone" })),
            Block::new("code", json!({ "code": "let x = 1;" })),
            Block::new("delimiter", Value::Null),
        ]);
        assert_eq!(
            to_plain_text(&data),
            "# No level\n\n1. one\n2. two\n\n• a\n\n> wise\n\n```\nlet x = 1;\n```\n\n"
        );
    }

    #[test]
    fn text_strips_inline_markup() {
        let data = doc(vec![Block::new(
            "paragraph",
            json!({ "text": "type <code>/</code> &amp; <b>go</b>" }),
        )]);
        assert_eq!(to_plain_text(&data), "type / & go");
    }

    #[test]
    fn inline_html_becomes_markdown() {
        assert_eq!(
            inline_to_markdown(r#"<b>bold</b>, <i>it</i>, <code class="inline-code">x</code>, <a href="https://a.b">link</a>"#),
            "**bold**, *it*, `x`, [link](https://a.b)"
        );
        assert_eq!(inline_to_markdown("<mark class=\"cdx-marker\">hi</mark>"), "==hi==");
        assert_eq!(inline_to_markdown("a<br>b"), "a\nb");
    }

    #[test]
    fn markdown_blocks() {
        let data = doc(vec![
            Block::new("header", json!({ "text": "Plan", "level": 1 })),
            Block::new("checklist", json!({ "items": [
                { "text": "done", "checked": true },
                { "text": "todo", "checked": false }
            ] })),
            Block::new("list", json!({ "style": "ordered", "items": [
                { "content": "top", "items": [{ "content": "nested", "items": [] }] }
            ] })),
            Block::new("delimiter", json!({})),
            Block::new("quote", json!({ "text": "q", "caption": "c" })),
            Block::new("code", json!({ "code": "fn main() {}", "language": "rust" })),
        ]);
        assert_eq!(
            to_markdown(&data),
            "# Plan\n\n- [x] done\n- [ ] todo\n\n1. top\n   1. nested\n\n---\n\n> q\n>\n> *c*\n\n```rust\nfn main() {}\n```"
        );
    }

    #[test]
    fn markdown_tables() {
        let with_head = Block::new("table", json!({
            "withHeadings": true,
            "content": [["Name", "Qty"], ["a|b", "1"]]
        }));
        assert_eq!(
            block_to_markdown(&with_head),
            "| Name | Qty |\n| --- | --- |\n| a\\|b | 1 |"
        );
        let headless = Block::new("table", json!({ "content": [["x"]] }));
        assert_eq!(block_to_markdown(&headless), "|  |\n| --- |\n| x |");
        assert_eq!(block_to_markdown(&Block::new("table", json!({}))), "");
    }

    #[test]
    fn html_export_wraps_rendered_markdown() {
        let data = doc(vec![
            Block::new("paragraph", json!({ "text": "Hello <b>world</b>" })),
        ]);
        let page = to_html("Notes & <draft>", &data);
        assert!(page.contains("<title>Notes &amp; &lt;draft&gt;</title>"));
        assert!(page.contains("<h1>Notes &amp; &lt;draft&gt;</h1>"));
        assert!(page.contains("<p>Hello <strong>world</strong></p>"));
    }

    #[test]
    fn typed_markup_stays_text_in_html() {
        let data = doc(vec![Block::new(
            "paragraph",
            json!({ "text": "&lt;img src=x onerror=alert(1)&gt;" }),
        )]);
        assert_eq!(to_markdown(&data), "&lt;img src=x onerror=alert(1)&gt;");
        let page = to_html("t", &data);
        assert!(!page.contains("<img src=x"));
        assert!(page.contains("<p>&lt;img src=x onerror=alert(1)&gt;</p>"));
    }

    #[test]
    fn typed_markdown_syntax_is_escaped() {
        assert_eq!(inline_to_markdown("# not a heading"), "\\# not a heading");
        assert_eq!(inline_to_markdown("1. step"), "1\\. step");
        assert_eq!(inline_to_markdown("- dash<br>+ plus"), "\\- dash\n\\+ plus");
        assert_eq!(inline_to_markdown("snake_case *x*"), "snake\\_case \\*x\\*");
        assert_eq!(inline_to_markdown("a &amp; b"), "a &amp; b");

        let data = doc(vec![
            Block::new("paragraph", json!({ "text": "# not a heading" })),
            Block::new("paragraph", json!({ "text": "1. step" })),
        ]);
        let page = to_html("t", &data);
        assert!(page.contains("<p># not a heading</p>"));
        assert!(page.contains("<p>1. step</p>"));
    }

    #[test]
    fn code_keeps_literal_text() {
        assert_eq!(inline_to_markdown("<code>&lt;b&gt; *x*</code>"), "`<b> *x*`");
        let block = Block::new("code", json!({ "code": "a ``` b", "language": "md" }));
        assert_eq!(block_to_markdown(&block), "````md\na ``` b\n````");
    }

    #[test]
    fn script_links_are_dropped() {
        assert_eq!(
            inline_to_markdown(r#"<a href="javascript:alert(1)">go</a>"#),
            "go"
        );
        assert_eq!(
            inline_to_markdown(r#"<a href="https://a.b/x y">go</a>"#),
            "[go](https://a.b/x%20y)"
        );
        let card = Block::new("linkTool", json!({ "link": "javascript:alert(1)" }));
        assert_eq!(block_to_markdown(&card), "");
    }

    #[test]
    fn marker_becomes_highlight() {
        assert_eq!(
            inline_to_markdown(r#"see <mark class="cdx-marker">this</mark> part"#),
            "see ==this== part"
        );
    }

    #[test]
    fn json_import_accepts_exports_and_records() {
        let data = doc(vec![Block::new("paragraph", json!({ "text": "x" }))]);
        assert_eq!(import_json(&to_json(&data).unwrap()).unwrap(), data);

        let record = json!({ "title": "t", "content": { "blocks": [
            { "type": "header", "data": { "text": "h", "level": 2 } }
        ] } });
        let opened = import_json(&record.to_string()).unwrap();
        assert_eq!(opened.blocks[0].kind, "header");

        assert!(matches!(import_json("{\"title\": \"x\"}"), Err(ExportError::NotEditorData)));
        assert!(matches!(import_json("not json"), Err(ExportError::Json(_))));
    }

    #[test]
    fn json_export_round_trips() {
        let data = doc(vec![Block::new("paragraph", json!({ "text": "x" }))]);
        let dumped = to_json(&data).unwrap();
        assert!(dumped.contains("\"type\": \"paragraph\""));
        let back: OutputData = serde_json::from_str(&dumped).unwrap();
        assert_eq!(back, data);
    }

    #[test]
    fn file_names_follow_title() {
        assert_eq!(ExportFormat::Text.file_name("Weekly  notes!"), "Weekly-notes.txt");
        assert_eq!(ExportFormat::Json.file_name("🚀"), "document.json");
        assert_eq!(ExportFormat::Markdown.file_name(""), "document.md");
    }
}
