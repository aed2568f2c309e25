//! Line-oriented text rendering of change sets.

use std::fmt::Write as _;

use super::{Path, PathSegment};
use crate::{Changes, CollectionChange, EntityChange, FieldChange, FieldChanges, ItemChanges};

const COLOR_RESET: &str = "\u{1b}[0m";
const COLOR_RED: &str = "\u{1b}[31m";
const COLOR_GREEN: &str = "\u{1b}[32m";

/// Configuration toggles for change rendering.
#[derive(Clone, Copy, Debug, Default)]
pub struct RenderConfig {
    color: bool,
}

impl RenderConfig {
    /// Constructs a configuration with default settings (no ANSI color).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables ANSI color output.
    #[must_use]
    pub fn with_color(mut self, enabled: bool) -> Self {
        self.color = enabled;
        self
    }

    /// Indicates whether color output is enabled.
    #[must_use]
    pub fn color_enabled(self) -> bool {
        self.color
    }
}

impl Changes {
    /// Renders the change set as text.
    ///
    /// Every leaf change is printed under an `@ [path]` header naming its
    /// location from the root; consecutive changes at the same location share
    /// one header. Lines start with `=` for assignments, `+`/`-` for added and
    /// removed entities, `>` for moves and `++`/`--` for collections that
    /// appeared or disappeared.
    ///
    /// ```
    /// # use entdiff_core::{Changes, EntityChange, ItemChanges, Node, RenderConfig};
    /// let mut items = ItemChanges::new();
    /// items.push(0, EntityChange::Move(1));
    /// items.push(2, EntityChange::Remove(Node::from("gone")));
    /// let rendered = Changes::Collection(items).render(&RenderConfig::default());
    /// assert_eq!(rendered, "@ [0]\n> 1\n@ [2]\n- \"gone\"\n");
    /// ```
    #[must_use]
    pub fn render(&self, config: &RenderConfig) -> String {
        let mut renderer = Renderer { config: *config, output: String::new(), header: None };
        renderer.changes(&mut Path::new(), self);
        renderer.output
    }
}

#[derive(Clone, Copy)]
enum Tone {
    Plain,
    Added,
    Removed,
}

struct Renderer {
    config: RenderConfig,
    output: String,
    header: Option<Path>,
}

impl Renderer {
    fn changes(&mut self, path: &mut Path, changes: &Changes) {
        match changes {
            Changes::Entity(fields) => self.fields(path, fields),
            Changes::Collection(items) => self.items(path, items),
        }
    }

    fn fields(&mut self, path: &mut Path, fields: &FieldChanges) {
        for (key, change) in fields.iter() {
            path.push(PathSegment::key(key));
            match change {
                FieldChange::Assign(value) => {
                    self.line(path, "=", &value.to_string(), Tone::Added);
                }
                FieldChange::Entity(list) => {
                    for change in list {
                        self.entity_change(path, change, |target| {
                            PathSegment::key(target.as_str()).to_string()
                        });
                    }
                }
                FieldChange::Collection(CollectionChange::AddAll(items)) => {
                    self.line(path, "++", &items.to_string(), Tone::Added);
                }
                FieldChange::Collection(CollectionChange::RemoveAll(items)) => {
                    self.line(path, "--", &items.to_string(), Tone::Removed);
                }
                FieldChange::Collection(CollectionChange::Edit(items)) => self.items(path, items),
            }
            path.pop();
        }
    }

    fn items(&mut self, path: &mut Path, items: &ItemChanges) {
        for (index, list) in items.iter() {
            path.push(PathSegment::index(index));
            for change in list {
                self.entity_change(path, change, |target| target.to_string());
            }
            path.pop();
        }
    }

    fn entity_change<K>(
        &mut self,
        path: &mut Path,
        change: &EntityChange<K>,
        target: impl Fn(&K) -> String,
    ) {
        match change {
            EntityChange::Add(node) => self.line(path, "+", &node.to_string(), Tone::Added),
            EntityChange::Remove(node) => self.line(path, "-", &node.to_string(), Tone::Removed),
            EntityChange::Move(to) => self.line(path, ">", &target(to), Tone::Plain),
            EntityChange::Edit(nested) => self.changes(path, nested),
        }
    }

    fn line(&mut self, path: &Path, marker: &str, text: &str, tone: Tone) {
        if self.header.as_ref() != Some(path) {
            let _ = writeln!(self.output, "@ {path}");
            self.header = Some(path.clone());
        }
        let color = match tone {
            Tone::Added if self.config.color_enabled() => Some(COLOR_GREEN),
            Tone::Removed if self.config.color_enabled() => Some(COLOR_RED),
            _ => None,
        };
        if let Some(color) = color {
            self.output.push_str(color);
        }
        let _ = writeln!(self.output, "{marker} {text}");
        if color.is_some() {
            self.output.push_str(COLOR_RESET);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Node;

    fn sample() -> Changes {
        let mut nested = FieldChanges::new();
        nested.set("n", FieldChange::Assign(Node::from(1)));
        let mut fields = FieldChanges::new();
        fields.push_entity_change("k", EntityChange::Edit(Changes::Entity(nested)));
        fields.push_entity_change("k", EntityChange::Move("k2".to_string()));
        fields.push_entity_change("k", EntityChange::Add(Node::entity([("id", Node::from(3))])));
        let emptied = CollectionChange::RemoveAll(Node::collection(Vec::new()));
        fields.set("gone", FieldChange::Collection(emptied));
        fields.set("note", FieldChange::Assign(Node::Undefined));
        Changes::Entity(fields)
    }

    #[test]
    fn renders_nested_paths_and_markers() {
        let expected = "\
@ [\"gone\"]
-- []
@ [\"k\",\"n\"]
= 1
@ [\"k\"]
> \"k2\"
+ {\"id\":3}
@ [\"note\"]
= undefined
";
        assert_eq!(sample().render(&RenderConfig::new()), expected);
    }

    #[test]
    fn color_wraps_additions_and_removals_only() {
        let mut items = ItemChanges::new();
        items.push(0, EntityChange::Remove(Node::Null));
        items.push(1, EntityChange::Move(0));
        items.push(1, EntityChange::Add(Node::Null));
        let rendered = Changes::Collection(items).render(&RenderConfig::new().with_color(true));
        let expected = format!(
            "@ [0]\n{COLOR_RED}- null\n{COLOR_RESET}@ [1]\n> 0\n{COLOR_GREEN}+ null\n{COLOR_RESET}"
        );
        assert_eq!(rendered, expected);
    }
}
