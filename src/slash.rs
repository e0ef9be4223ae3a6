//! Slash commands: trigger detection, the static command catalog,
//! filtering and menu navigation.

use serde_json::{json, Value};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    Basic,
    List,
    Media,
    Advanced,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Basic,
        Category::List,
        Category::Media,
        Category::Advanced,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Category::Basic => "Basic blocks",
            Category::List => "Lists",
            Category::Media => "Media",
            Category::Advanced => "Advanced",
        }
    }
}

/// Block to insert when a command runs.
#[derive(Clone, Debug, PartialEq)]
pub struct BlockTemplate {
    pub kind: &'static str,
    pub data: Value,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SlashCommand {
    pub id: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    pub keywords: &'static [&'static str],
    pub category: Category,
    pub shortcut: Option<&'static str>,
    pub block: BlockTemplate,
}

impl SlashCommand {
    pub fn matches(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        self.label.to_lowercase().contains(&term)
            || self.description.to_lowercase().contains(&term)
            || self
                .keywords
                .iter()
                .any(|keyword| keyword.to_lowercase().contains(&term))
    }
}

fn command(
    id: &'static str,
    label: &'static str,
    description: &'static str,
    keywords: &'static [&'static str],
    category: Category,
    shortcut: Option<&'static str>,
    kind: &'static str,
    data: Value,
) -> SlashCommand {
    SlashCommand {
        id,
        label,
        description,
        keywords,
        category,
        shortcut,
        block: BlockTemplate { kind, data },
    }
}

/// The full, fixed command list in menu order.
pub fn catalog() -> Vec<SlashCommand> {
    use Category::*;
    vec![
        command(
            "paragraph",
            "Text",
            "Plain paragraph",
            &["paragraph", "text", "p"],
            Basic,
            None,
            "paragraph",
            json!({}),
        ),
        command(
            "header1",
            "Heading 1",
            "Large section heading",
            &["heading", "title", "h1", "header"],
            Basic,
            Some("#"),
            "header",
            json!({ "level": 1 }),
        ),
        command(
            "header2",
            "Heading 2",
            "Medium section heading",
            &["heading", "title", "h2", "header"],
            Basic,
            Some("##"),
            "header",
            json!({ "level": 2 }),
        ),
        command(
            "header3",
            "Heading 3",
            "Small section heading",
            &["heading", "title", "h3", "header"],
            Basic,
            Some("###"),
            "header",
            json!({ "level": 3 }),
        ),
        command(
            "unordered-list",
            "Bulleted list",
            "Simple bulleted list",
            &["list", "bullet", "ul"],
            List,
            Some("-"),
            "list",
            json!({ "style": "unordered" }),
        ),
        command(
            "ordered-list",
            "Numbered list",
            "List with numbering",
            &["list", "numbered", "ol"],
            List,
            Some("1."),
            "list",
            json!({ "style": "ordered" }),
        ),
        command(
            "checklist",
            "To-do list",
            "Track tasks with checkboxes",
            &["todo", "task", "checklist"],
            List,
            Some("[]"),
            "checklist",
            json!({ "items": [{ "text": "", "checked": false }] }),
        ),
        command(
            "image",
            "Image",
            "Upload or embed an image",
            &["image", "photo", "picture"],
            Media,
            None,
            "image",
            json!({}),
        ),
        command(
            "table",
            "Table",
            "Insert a table",
            &["table", "grid"],
            Media,
            None,
            "table",
            json!({ "withHeadings": true, "rows": 3, "cols": 3 }),
        ),
        command(
            "embed",
            "Embed",
            "Embed a video or link",
            &["embed", "video", "youtube"],
            Media,
            None,
            "embed",
            json!({}),
        ),
        command(
            "attaches",
            "File attachment",
            "Upload and attach a file",
            &["file", "upload", "attach"],
            Media,
            None,
            "attaches",
            json!({}),
        ),
        command(
            "code",
            "Code",
            "Capture a code snippet",
            &["code", "programming"],
            Advanced,
            Some("```"),
            "code",
            json!({}),
        ),
        command(
            "quote",
            "Quote",
            "Capture a quotation",
            &["quote", "blockquote"],
            Advanced,
            Some(">"),
            "quote",
            json!({}),
        ),
        command(
            "warning",
            "Warning",
            "Highlighted warning block",
            &["warning", "alert", "caution"],
            Advanced,
            None,
            "warning",
            json!({}),
        ),
        command(
            "delimiter",
            "Divider",
            "Visual section divider",
            &["divider", "separator", "hr"],
            Advanced,
            Some("---"),
            "delimiter",
            json!({}),
        ),
        command(
            "link",
            "Link",
            "Link preview card",
            &["link", "url"],
            Advanced,
            None,
            "linkTool",
            json!({}),
        ),
        command(
            "columns",
            "Columns",
            "Multi-column layout",
            &["columns", "layout"],
            Advanced,
            None,
            "columns",
            json!({}),
        ),
        command(
            "button",
            "Button",
            "Clickable button",
            &["button", "click"],
            Advanced,
            None,
            "button",
            json!({ "text": "Click me", "link": "", "variant": "primary" }),
        ),
        command(
            "toggle",
            "Toggle",
            "Collapsible section",
            &["toggle", "collapse", "accordion"],
            Advanced,
            None,
            "toggle",
            json!({ "text": "Click to expand", "status": "closed" }),
        ),
        command(
            "alert",
            "Callout",
            "Coloured notice box",
            &["alert", "notice", "info"],
            Advanced,
            None,
            "alert",
            json!({ "type": "info", "message": "", "title": "" }),
        ),
        command(
            "spoiler",
            "Spoiler",
            "Text hidden until clicked",
            &["spoiler", "hidden", "secret"],
            Advanced,
            None,
            "spoiler",
            json!({ "text": "" }),
        ),
        command(
            "tooltip",
            "Tooltip",
            "Text with a hover hint",
            &["tooltip", "hint", "help"],
            Advanced,
            None,
            "tooltip",
            json!({ "text": "", "tooltip": "" }),
        ),
    ]
}

/// Commands matching `term`, grouped by category in display order.
/// Empty categories are dropped.
pub fn filter_grouped<'a>(
    commands: &'a [SlashCommand],
    term: &str,
) -> Vec<(Category, Vec<&'a SlashCommand>)> {
    Category::ALL
        .iter()
        .filter_map(|&category| {
            let items: Vec<_> = commands
                .iter()
                .filter(|cmd| cmd.category == category && cmd.matches(term))
                .collect();
            (!items.is_empty()).then_some((category, items))
        })
        .collect()
}

/// Flat list in the same order the grouped menu renders.
pub fn filter<'a>(commands: &'a [SlashCommand], term: &str) -> Vec<&'a SlashCommand> {
    filter_grouped(commands, term)
        .into_iter()
        .flat_map(|(_, items)| items)
        .collect()
}

/// An active `/term` in a block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlashTrigger {
    /// Byte offset of the `/`.
    pub position: usize,
    pub term: String,
}

impl SlashTrigger {
    pub fn span(&self) -> (usize, usize) {
        (self.position, self.position + 1 + self.term.len())
    }
}

/// Finds the `/` the caret is currently typing after, if any. The slash
/// must start the text or follow whitespace, and nothing between it and
/// the caret may be whitespace.
pub fn detect_trigger(text: &str, caret: usize) -> Option<SlashTrigger> {
    let caret = caret.min(text.len());
    let before = text.get(..caret)?;
    let position = before.rfind('/')?;
    let valid_start = before[..position]
        .chars()
        .next_back()
        .map_or(true, char::is_whitespace);
    if !valid_start {
        return None;
    }
    let term = &before[position + 1..];
    if term.chars().any(char::is_whitespace) {
        return None;
    }
    Some(SlashTrigger {
        position,
        term: term.to_string(),
    })
}

/// `text` with `/term` cut out, or `None` when the span no longer holds
/// the trigger (the block changed after detection).
pub fn remove_trigger(text: &str, trigger: &SlashTrigger) -> Option<String> {
    let (start, end) = trigger.span();
    let span = text.get(start..end)?;
    if span.strip_prefix('/') != Some(trigger.term.as_str()) {
        return None;
    }
    Some(format!("{}{}", &text[..start], &text[end..]))
}

/// Converts a UTF-16 code unit offset (as reported by DOM ranges) into a
/// byte offset, clamping past-the-end offsets to `text.len()`.
pub fn utf16_to_byte(text: &str, offset: u32) -> usize {
    let mut units = 0u32;
    for (idx, ch) in text.char_indices() {
        if units >= offset {
            return idx;
        }
        units += ch.len_utf16() as u32;
    }
    text.len()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuKey {
    Up,
    Down,
    Enter,
    Escape,
}

impl MenuKey {
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowUp" => Some(Self::Up),
            "ArrowDown" => Some(Self::Down),
            "Enter" => Some(Self::Enter),
            "Escape" => Some(Self::Escape),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum MenuOutcome {
    Moved,
    Invoke(usize),
    Close,
    Ignored,
}

/// Open/closed state of the dropdown.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SlashMenuState {
    pub visible: bool,
    pub x: f64,
    pub y: f64,
    pub trigger: Option<SlashTrigger>,
    /// Block picked from the plus button; typed triggers use the caret's block.
    pub block: Option<u32>,
    pub selected: usize,
}

impl SlashMenuState {
    pub fn open(&mut self, trigger: SlashTrigger, x: f64, y: f64) {
        if self.trigger.as_ref().map(|t| &t.term) != Some(&trigger.term) {
            self.selected = 0;
        }
        self.visible = true;
        self.x = x;
        self.y = y;
        self.trigger = Some(trigger);
        self.block = None;
    }

    /// Opens without a typed trigger, targeting `block`.
    pub fn open_for_block(&mut self, block: u32, x: f64, y: f64) {
        self.visible = true;
        self.x = x;
        self.y = y;
        self.trigger = None;
        self.block = Some(block);
        self.selected = 0;
    }

    pub fn close(&mut self) {
        self.visible = false;
        self.trigger = None;
        self.block = None;
        self.selected = 0;
    }

    pub fn term(&self) -> &str {
        self.trigger.as_ref().map_or("", |t| t.term.as_str())
    }

    /// Handles a navigation key against a list of `count` visible items.
    pub fn handle_key(&mut self, key: MenuKey, count: usize) -> MenuOutcome {
        if !self.visible {
            return MenuOutcome::Ignored;
        }
        match key {
            MenuKey::Down => {
                self.selected = if count == 0 || self.selected + 1 >= count {
                    0
                } else {
                    self.selected + 1
                };
                MenuOutcome::Moved
            }
            MenuKey::Up => {
                self.selected = if self.selected == 0 {
                    count.saturating_sub(1)
                } else {
                    self.selected - 1
                };
                MenuOutcome::Moved
            }
            MenuKey::Enter if self.selected < count => MenuOutcome::Invoke(self.selected),
            MenuKey::Enter => MenuOutcome::Ignored,
            MenuKey::Escape => {
                self.close();
                MenuOutcome::Close
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slash_at_start_opens() {
        let trigger = detect_trigger("/", 1).unwrap();
        assert_eq!(trigger.position, 0);
        assert_eq!(trigger.term, "");
    }

    #[test]
    fn slash_after_space_opens_with_term() {
        let trigger = detect_trigger("notes /tab", 10).unwrap();
        assert_eq!(trigger.position, 6);
        assert_eq!(trigger.term, "tab");
    }

    #[test]
    fn slash_after_newline_or_nbsp_opens() {
        assert!(detect_trigger("line\n/h", 7).is_some());
        assert!(detect_trigger("word\u{a0}/", 7).is_some());
    }

    #[test]
    fn slash_after_letter_does_not_open() {
        assert_eq!(detect_trigger("and/or", 4), None);
        assert_eq!(detect_trigger("http://x", 7), None);
    }

    #[test]
    fn space_after_term_closes() {
        assert_eq!(detect_trigger("/tab le", 7), None);
    }

    #[test]
    fn only_text_before_caret_counts() {
        assert_eq!(detect_trigger("abc /x", 3), None);
        let trigger = detect_trigger("a /hea rest", 6).unwrap();
        assert_eq!(trigger.term, "hea");
    }

    #[test]
    fn caret_inside_multibyte_is_rejected() {
        assert_eq!(detect_trigger("é/", 1), None);
    }

    #[test]
    fn tab_filter_matches_only_tab_items() {
        let commands = catalog();
        let hits = filter(&commands, "tab");
        assert!(!hits.is_empty());
        assert!(hits.iter().any(|c| c.id == "table"));
        for cmd in &hits {
            let term = "tab";
            let found = cmd.label.to_lowercase().contains(term)
                || cmd.description.to_lowercase().contains(term)
                || cmd.keywords.iter().any(|k| k.to_lowercase().contains(term));
            assert!(found, "{} should not match", cmd.id);
        }
        let misses = commands.iter().filter(|c| !hits.iter().any(|h| h.id == c.id));
        for cmd in misses {
            assert!(!cmd.matches("tab"));
        }
    }

    #[test]
    fn filter_is_case_insensitive() {
        let commands = catalog();
        let upper: Vec<_> = filter(&commands, "QUOTE").iter().map(|c| c.id).collect();
        let lower: Vec<_> = filter(&commands, "quote").iter().map(|c| c.id).collect();
        assert_eq!(upper, lower);
        assert!(upper.contains(&"quote"));
    }

    #[test]
    fn blank_term_returns_everything_grouped() {
        let commands = catalog();
        assert_eq!(filter(&commands, "  ").len(), commands.len());
        let groups = filter_grouped(&commands, "");
        let order: Vec<_> = groups.iter().map(|(c, _)| *c).collect();
        assert_eq!(order, Category::ALL.to_vec());
    }

    #[test]
    fn grouping_drops_empty_categories() {
        let commands = catalog();
        let groups = filter_grouped(&commands, "h1");
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].0, Category::Basic);
    }

    #[test]
    fn removing_trigger_strips_slash_and_term() {
        let trigger = detect_trigger("notes /tab", 10).unwrap();
        assert_eq!(remove_trigger("notes /tab", &trigger).as_deref(), Some("notes "));

        let trigger = detect_trigger("/code after", 5).unwrap();
        assert_eq!(remove_trigger("/code after", &trigger).as_deref(), Some(" after"));
    }

    #[test]
    fn stale_trigger_is_left_alone() {
        let trigger = SlashTrigger { position: 6, term: "tab".into() };
        assert_eq!(remove_trigger("notes /ta", &trigger), None);
        assert_eq!(remove_trigger("notes xtab", &trigger), None);
        assert_eq!(remove_trigger("é", &trigger), None);
    }

    #[test]
    fn utf16_offsets_map_to_bytes() {
        let text = "a😀/b";
        assert_eq!(utf16_to_byte(text, 0), 0);
        assert_eq!(utf16_to_byte(text, 1), 1);
        assert_eq!(utf16_to_byte(text, 3), 5);
        assert_eq!(utf16_to_byte(text, 99), text.len());

        let text = "😀 /b";
        let trigger = detect_trigger(text, utf16_to_byte(text, 5)).unwrap();
        assert_eq!(trigger.position, 5);
        assert_eq!(trigger.term, "b");
    }

    #[test]
    fn menu_navigation_wraps() {
        let mut menu = SlashMenuState::default();
        assert_eq!(menu.handle_key(MenuKey::Down, 3), MenuOutcome::Ignored);

        menu.open(SlashTrigger { position: 0, term: String::new() }, 10.0, 20.0);
        assert_eq!(menu.handle_key(MenuKey::Up, 3), MenuOutcome::Moved);
        assert_eq!(menu.selected, 2);
        menu.handle_key(MenuKey::Down, 3);
        assert_eq!(menu.selected, 0);
        menu.handle_key(MenuKey::Down, 3);
        assert_eq!(menu.handle_key(MenuKey::Enter, 3), MenuOutcome::Invoke(1));
        assert_eq!(menu.handle_key(MenuKey::Escape, 3), MenuOutcome::Close);
        assert!(!menu.visible);
        assert_eq!(menu.term(), "");
    }

    #[test]
    fn enter_with_no_results_is_ignored() {
        let mut menu = SlashMenuState::default();
        menu.open(SlashTrigger { position: 0, term: "zzz".into() }, 0.0, 0.0);
        assert_eq!(menu.handle_key(MenuKey::Enter, 0), MenuOutcome::Ignored);
    }

    #[test]
    fn changing_term_resets_selection() {
        let mut menu = SlashMenuState::default();
        menu.open(SlashTrigger { position: 0, term: "h".into() }, 0.0, 0.0);
        menu.handle_key(MenuKey::Down, 5);
        menu.open(SlashTrigger { position: 0, term: "h".into() }, 0.0, 0.0);
        assert_eq!(menu.selected, 1);
        menu.open(SlashTrigger { position: 0, term: "he".into() }, 0.0, 0.0);
        assert_eq!(menu.selected, 0);
    }

    #[test]
    fn plus_button_open_has_no_trigger() {
        let mut menu = SlashMenuState::default();
        menu.open(SlashTrigger { position: 0, term: "h".into() }, 0.0, 0.0);
        menu.open_for_block(3, 5.0, 6.0);
        assert!(menu.visible);
        assert_eq!(menu.trigger, None);
        assert_eq!(menu.block, Some(3));
        assert_eq!(menu.term(), "");
        menu.close();
        assert_eq!(menu.block, None);
    }
}
