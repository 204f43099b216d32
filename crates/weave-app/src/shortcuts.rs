//! Keyboard and pointer shortcut registry and documentation.

/// A shortcut definition.
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: &'static str,
    pub ctrl: bool,
    pub shift: bool,
    pub description: &'static str,
}

impl Shortcut {
    pub const fn new(key: &'static str, ctrl: bool, shift: bool, description: &'static str) -> Self {
        Self {
            key,
            ctrl,
            shift,
            description,
        }
    }

    /// Format the shortcut for display (e.g., "Ctrl+Drag").
    pub fn format(&self) -> String {
        let mut parts = Vec::new();
        if self.ctrl {
            parts.push("Ctrl/Cmd");
        }
        if self.shift {
            parts.push("Shift");
        }
        parts.push(self.key);
        parts.join("+")
    }
}

/// Registry of the shortcuts the board understands.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    pub fn all() -> Vec<Shortcut> {
        vec![
            Shortcut::new("Delete", false, false, "Delete selected objects"),
            Shortcut::new("Backspace", false, false, "Delete selected objects"),
            Shortcut::new("Escape", false, false, "Clear selection"),
            Shortcut::new("Space", false, false, "Hold to pan"),
            Shortcut::new("Drag", false, true, "Move along one axis"),
            Shortcut::new("Drag", true, false, "Keep aspect ratio (corner handles)"),
            Shortcut::new("Double-click", false, false, "Edit text"),
        ]
    }

    /// Print all shortcuts to console.
    pub fn print_all() {
        println!("\n=== Shortcuts ===");
        for shortcut in Self::all() {
            println!("  {:20} {}", shortcut.format(), shortcut.description);
        }
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format() {
        let formatted: Vec<String> = ShortcutRegistry::all().iter().map(Shortcut::format).collect();
        assert!(formatted.contains(&"Shift+Drag".to_string()));
        assert!(formatted.contains(&"Ctrl/Cmd+Drag".to_string()));
        assert!(formatted.contains(&"Delete".to_string()));
    }
}
