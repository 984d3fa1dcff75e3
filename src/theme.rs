//! Card theme registry.
//!
//! A theme is a bundle of four inline style declarations that skin a card:
//!
//! | Field | Applied to |
//! |-------|------------|
//! | `container` | the outer card element (background, padding, width, font) |
//! | `content` | the wrapper around the rendered Markdown |
//! | `quote_border` | every `<blockquote>` |
//! | `heading` | every top-level `<h1>` |
//!
//! The registry is a fixed table built into the binary. Adding a theme means
//! adding a [`ThemeId`] variant and a row in [`THEMES`]; nothing that consumes
//! themes needs to change.
//!
//! Lookups never fail: [`get_theme`] returns the `default` descriptor for any
//! identifier it does not recognize.

use std::fmt;

const SANS: &str = "font-family:system-ui,-apple-system,Segoe UI,Roboto,Helvetica,Arial,sans-serif";

/// Identifier of a built-in theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThemeId {
    Default,
    Modern,
    Minimal,
    Elegant,
    Vibrant,
    Social,
    Blog,
    Code,
    Nature,
    Ocean,
    Sunset,
    Retro,
    Newspaper,
    Magazine,
}

impl ThemeId {
    /// Every theme, in display order.
    pub const ALL: [ThemeId; 14] = [
        ThemeId::Default,
        ThemeId::Modern,
        ThemeId::Minimal,
        ThemeId::Elegant,
        ThemeId::Vibrant,
        ThemeId::Social,
        ThemeId::Blog,
        ThemeId::Code,
        ThemeId::Nature,
        ThemeId::Ocean,
        ThemeId::Sunset,
        ThemeId::Retro,
        ThemeId::Newspaper,
        ThemeId::Magazine,
    ];

    /// Parse an identifier. Matching is exact; there is no prefix or
    /// case-insensitive matching.
    pub fn parse(id: &str) -> Option<ThemeId> {
        Self::ALL.into_iter().find(|t| t.as_str() == id)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ThemeId::Default => "default",
            ThemeId::Modern => "modern",
            ThemeId::Minimal => "minimal",
            ThemeId::Elegant => "elegant",
            ThemeId::Vibrant => "vibrant",
            ThemeId::Social => "social",
            ThemeId::Blog => "blog",
            ThemeId::Code => "code",
            ThemeId::Nature => "nature",
            ThemeId::Ocean => "ocean",
            ThemeId::Sunset => "sunset",
            ThemeId::Retro => "retro",
            ThemeId::Newspaper => "newspaper",
            ThemeId::Magazine => "magazine",
        }
    }

    pub fn descriptor(self) -> &'static ThemeDescriptor {
        &THEMES[self.index()]
    }

    /// Position of this theme's row in [`THEMES`].
    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for ThemeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Style bundle for one theme. Every style field is a non-empty list of
/// CSS declarations suitable for a `style` attribute.
#[derive(Debug, PartialEq, Eq)]
pub struct ThemeDescriptor {
    pub id: ThemeId,
    /// Human-readable name shown in theme listings.
    pub name: &'static str,
    pub container: &'static str,
    pub content: &'static str,
    pub quote_border: &'static str,
    pub heading: &'static str,
}

/// The theme table, indexed by `ThemeId as usize`.
pub static THEMES: [ThemeDescriptor; 14] = [
    ThemeDescriptor {
        id: ThemeId::Default,
        name: "Default",
        container: "background:#ffffff;color:#374151;border-radius:0.5rem;box-shadow:0 4px 6px -1px rgba(0,0,0,0.1),0 2px 4px -2px rgba(0,0,0,0.1);padding:2rem;width:600px;font-family:system-ui,-apple-system,Segoe UI,Roboto,Helvetica,Arial,sans-serif",
        content: "line-height:1.75;padding:0 0.5rem",
        quote_border: "border-left:4px solid #3b82f6;padding-left:1.5rem;margin:1rem 0",
        heading: "font-size:1.25rem;line-height:1.75rem;font-weight:700;margin:0 0 1rem;color:#2563eb",
    },
    ThemeDescriptor {
        id: ThemeId::Modern,
        name: "Modern",
        container: "background:linear-gradient(to bottom right,#ffffff,#f3f4f6);color:#374151;border-radius:0.75rem;box-shadow:0 10px 15px -3px rgba(0,0,0,0.1),0 4px 6px -4px rgba(0,0,0,0.1);padding:2.5rem;width:600px;font-family:system-ui,-apple-system,Segoe UI,Roboto,Helvetica,Arial,sans-serif",
        content: "line-height:1.75;padding:0 0.5rem",
        quote_border: "border-left:4px solid #a855f7;padding-left:1.5rem;margin:1rem 0",
        heading: "font-size:1.5rem;line-height:2rem;font-weight:700;margin:0 0 1.5rem;color:#9333ea",
    },
    ThemeDescriptor {
        id: ThemeId::Minimal,
        name: "Minimal",
        container: "background:#ffffff;color:#111827;border-radius:0;padding:2rem;width:600px;font-family:ui-monospace,SFMono-Regular,Menlo,Consolas,monospace",
        content: "line-height:1.75;padding:0 0.5rem",
        quote_border: "border-left:0;border-top:1px solid #e5e7eb;border-bottom:1px solid #e5e7eb;padding:1rem 0;margin:1rem 0",
        heading: "font-size:1.25rem;line-height:1.75rem;font-weight:400;margin:0 0 1rem;color:#111827",
    },
    ThemeDescriptor {
        id: ThemeId::Elegant,
        name: "Elegant",
        container: "background:#f8f5f0;color:#3f3a34;border-radius:0.5rem;box-shadow:0 4px 6px -1px rgba(0,0,0,0.1),0 2px 4px -2px rgba(0,0,0,0.1);padding:2.5rem;width:600px;font-family:Georgia,Cambria,Times New Roman,serif",
        content: "line-height:1.75;padding:0 0.5rem",
        quote_border: "border-left:0;border-top:2px solid #d4bea5;border-bottom:2px solid #d4bea5;padding:1rem 0;margin:1rem 0",
        heading: "font-size:1.5rem;line-height:2rem;font-weight:700;margin:0 0 1.5rem;color:#8a5a44",
    },
    ThemeDescriptor {
        id: ThemeId::Vibrant,
        name: "Vibrant",
        container: "background:linear-gradient(to right,#ec4899,#f97316);color:#ffffff;border-radius:0.5rem;box-shadow:0 10px 15px -3px rgba(0,0,0,0.1),0 4px 6px -4px rgba(0,0,0,0.1);padding:2rem;width:600px;font-family:system-ui,-apple-system,Segoe UI,Roboto,Helvetica,Arial,sans-serif",
        content: "line-height:1.75;padding:0 0.5rem;--card-link:#ffffff;--card-code-bg:rgba(255,255,255,0.2)",
        quote_border: "border-left:4px solid #ffffff;padding-left:1.5rem;margin:1rem 0",
        heading: "font-size:1.5rem;line-height:2rem;font-weight:800;margin:0 0 1.5rem;color:#ffffff",
    },
    ThemeDescriptor {
        id: ThemeId::Social,
        name: "Social Media",
        container: "background:#ffffff;color:#374151;border-radius:0.75rem;box-shadow:0 10px 15px -3px rgba(0,0,0,0.1),0 4px 6px -4px rgba(0,0,0,0.1);padding:1.75rem;width:400px;font-family:system-ui,-apple-system,Segoe UI,Roboto,Helvetica,Arial,sans-serif",
        content: "font-size:0.875rem;line-height:1.7;padding:0 0.5rem",
        quote_border: "border-left:0;border-top:1px solid #f3f4f6;padding-top:1rem;margin-top:1rem",
        heading: "font-size:1.125rem;line-height:1.75rem;font-weight:700;margin:0 0 0.75rem",
    },
    ThemeDescriptor {
        id: ThemeId::Blog,
        name: "Blog Post",
        container: "background:#ffffff;color:#374151;border-radius:0;border:1px solid #e5e7eb;padding:2.5rem;width:700px;font-family:Georgia,Cambria,Times New Roman,serif",
        content: "line-height:1.75;padding:0 0.5rem",
        quote_border: "border-left:0;border-top:1px solid #e5e7eb;padding-top:1rem;margin-top:1rem",
        heading: "font-size:1.875rem;line-height:2.25rem;font-weight:700;margin:0 0 1.5rem",
    },
    ThemeDescriptor {
        id: ThemeId::Code,
        name: "Code",
        container: "background:#1e1e1e;color:#d4d4d4;border-radius:0.5rem;padding:2rem;width:600px;font-family:ui-monospace,SFMono-Regular,Menlo,Consolas,monospace",
        content: "line-height:1.75;padding:0 0.5rem;--card-link:#9cdcfe;--card-code-bg:#2d2d2d",
        quote_border: "border-left:4px solid #569cd6;padding-left:1.5rem;margin:1rem 0",
        heading: "font-size:1.25rem;line-height:1.75rem;font-weight:700;margin:0 0 1rem;color:#569cd6",
    },
    ThemeDescriptor {
        id: ThemeId::Nature,
        name: "Nature",
        container: "background:#f0f9e8;color:#2f3e2c;border-radius:0.5rem;box-shadow:0 4px 6px -1px rgba(0,0,0,0.1),0 2px 4px -2px rgba(0,0,0,0.1);padding:2rem;width:600px;font-family:system-ui,-apple-system,Segoe UI,Roboto,Helvetica,Arial,sans-serif",
        content: "line-height:1.75;padding:0 0.5rem",
        quote_border: "border-left:4px solid #6a994e;padding-left:1.5rem;margin:1rem 0",
        heading: "font-size:1.25rem;line-height:1.75rem;font-weight:700;margin:0 0 1rem;color:#386641",
    },
    ThemeDescriptor {
        id: ThemeId::Ocean,
        name: "Ocean",
        container: "background:linear-gradient(to bottom,#e0f7fa,#bbdefb);color:#1f3a4d;border-radius:0.5rem;box-shadow:0 4px 6px -1px rgba(0,0,0,0.1),0 2px 4px -2px rgba(0,0,0,0.1);padding:2rem;width:600px;font-family:system-ui,-apple-system,Segoe UI,Roboto,Helvetica,Arial,sans-serif",
        content: "line-height:1.75;padding:0 0.5rem",
        quote_border: "border-left:4px solid #0288d1;padding-left:1.5rem;margin:1rem 0",
        heading: "font-size:1.25rem;line-height:1.75rem;font-weight:700;margin:0 0 1rem;color:#01579b",
    },
    ThemeDescriptor {
        id: ThemeId::Sunset,
        name: "Sunset",
        container: "background:linear-gradient(to right,#ffecd2,#fcb69f);color:#4a2a1f;border-radius:0.5rem;box-shadow:0 4px 6px -1px rgba(0,0,0,0.1),0 2px 4px -2px rgba(0,0,0,0.1);padding:2rem;width:600px;font-family:system-ui,-apple-system,Segoe UI,Roboto,Helvetica,Arial,sans-serif",
        content: "line-height:1.75;padding:0 0.5rem",
        quote_border: "border-left:4px solid #ff8a65;padding-left:1.5rem;margin:1rem 0",
        heading: "font-size:1.25rem;line-height:1.75rem;font-weight:700;margin:0 0 1rem;color:#e64a19",
    },
    ThemeDescriptor {
        id: ThemeId::Retro,
        name: "Retro",
        container: "background:#fdf6e3;color:#586e75;border-radius:0;border:2px solid #073642;padding:2rem;width:600px;font-family:ui-monospace,SFMono-Regular,Menlo,Consolas,monospace",
        content: "line-height:1.75;padding:0 0.5rem",
        quote_border: "border-left:0;border-top:2px solid #073642;border-bottom:2px solid #073642;padding:1rem 0;margin:1rem 0",
        heading: "font-size:1.25rem;line-height:1.75rem;font-weight:700;margin:0 0 1rem;color:#073642",
    },
    ThemeDescriptor {
        id: ThemeId::Newspaper,
        name: "Newspaper",
        container: "background:#f5f5f0;color:#1f2937;border:1px solid #d1d5db;padding:2rem;width:700px;font-family:Georgia,Cambria,Times New Roman,serif",
        content: "line-height:1.75;padding:0 0.5rem",
        quote_border: "border-left:0;border-top:2px solid #9ca3af;padding-top:1rem;margin-top:1rem",
        heading: "font-size:1.875rem;line-height:2.25rem;font-weight:900;margin:0 0 1rem;text-transform:uppercase;letter-spacing:-0.025em;color:#000000",
    },
    ThemeDescriptor {
        id: ThemeId::Magazine,
        name: "Magazine",
        container: "background:#ffffff;color:#111827;border-radius:0;padding:2rem;width:600px;font-family:system-ui,-apple-system,Segoe UI,Roboto,Helvetica,Arial,sans-serif",
        content: "line-height:1.75;padding:0 0.5rem",
        quote_border: "border-left:0;border-top:8px solid #ef4444;padding-top:1rem;margin-top:1rem",
        heading: "font-size:2.25rem;line-height:2.5rem;font-weight:800;margin:0 0 1.5rem;color:#000000",
    },
];

/// The descriptor used when a lookup misses.
pub fn default_theme() -> &'static ThemeDescriptor {
    &THEMES[ThemeId::Default.index()]
}

/// Look up a theme by identifier, falling back to the default theme.
///
/// Unknown identifiers are not an error: the card simply renders with the
/// default skin.
pub fn get_theme(id: &str) -> &'static ThemeDescriptor {
    match ThemeId::parse(id) {
        Some(theme) => theme.descriptor(),
        None => {
            tracing::debug!(theme = id, "unknown theme, using default");
            default_theme()
        }
    }
}

/// Base font stack shared by themes that do not pick their own.
pub fn base_font() -> &'static str {
    SANS
}
