use crossterm::style::{Attribute, Color, ContentStyle};

/// A text style parsed from a whitespace separated list such as `bold blue`.
///
/// Unknown tokens are skipped, so `boldish red` styles as `red` and a list with
/// nothing recognizable paints text unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Style {
    foreground: Option<Color>,
    background: Option<Color>,
    attributes: Vec<Attribute>,
}

impl Style {
    pub fn plain() -> Self {
        Self::default()
    }

    pub fn parse(spec: &str) -> Self {
        let mut style = Self::default();
        for token in spec.split_whitespace() {
            if let Some(attribute) = attribute(token) {
                if !style.attributes.contains(&attribute) {
                    style.attributes.push(attribute);
                }
            } else if let Some(color) = token.strip_prefix("bg").and_then(background_color) {
                style.background = Some(color);
            } else if let Some(color) = color(token) {
                style.foreground = Some(color);
            }
        }
        style
    }

    pub fn is_plain(&self) -> bool {
        self.foreground.is_none() && self.background.is_none() && self.attributes.is_empty()
    }

    pub fn paint(&self, text: &str) -> String {
        if self.is_plain() {
            return text.to_owned();
        }
        let mut style = ContentStyle::new();
        style.foreground_color = self.foreground;
        style.background_color = self.background;
        for attribute in &self.attributes {
            style.attributes.set(*attribute);
        }
        style.apply(text).to_string()
    }
}

fn attribute(token: &str) -> Option<Attribute> {
    Some(match token {
        "bold" => Attribute::Bold,
        "dim" => Attribute::Dim,
        "italic" => Attribute::Italic,
        "underline" => Attribute::Underlined,
        "inverse" => Attribute::Reverse,
        "hidden" => Attribute::Hidden,
        "strikethrough" => Attribute::CrossedOut,
        _ => return None,
    })
}

fn color(token: &str) -> Option<Color> {
    Some(match token {
        "black" => Color::Black,
        "red" => Color::DarkRed,
        "green" => Color::DarkGreen,
        "yellow" => Color::DarkYellow,
        "blue" => Color::DarkBlue,
        "magenta" => Color::DarkMagenta,
        "cyan" => Color::DarkCyan,
        "white" => Color::Grey,
        "gray" | "grey" | "blackBright" => Color::DarkGrey,
        "redBright" => Color::Red,
        "greenBright" => Color::Green,
        "yellowBright" => Color::Yellow,
        "blueBright" => Color::Blue,
        "magentaBright" => Color::Magenta,
        "cyanBright" => Color::Cyan,
        "whiteBright" => Color::White,
        _ => return None,
    })
}

// `bgRed` arrives here as `Red`.
fn background_color(name: &str) -> Option<Color> {
    let mut chars = name.chars();
    let first = chars.next()?;
    if !first.is_ascii_uppercase() {
        return None;
    }
    color(&format!("{}{}", first.to_ascii_lowercase(), chars.as_str()))
}
