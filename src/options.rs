use crate::message::{DefaultFormatter, MessageFormatter};
use crate::style::Style;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_COLOR: &str = "bold blue";
pub const DEFAULT_TICK: Duration = Duration::from_millis(1000);

/// Construction options for [`crate::StatusLogger`].
#[derive(Clone)]
pub struct LoggerOptions {
    pub formatter: Option<Arc<dyn MessageFormatter>>,
    pub separator: String,
    pub color: Option<String>,
    pub tick: Duration,
}

impl Default for LoggerOptions {
    fn default() -> Self {
        Self {
            formatter: None,
            separator: " ".to_owned(),
            color: Some(DEFAULT_COLOR.to_owned()),
            tick: DEFAULT_TICK,
        }
    }
}

impl LoggerOptions {
    pub fn with_formatter(mut self, formatter: impl MessageFormatter + 'static) -> Self {
        self.formatter = Some(Arc::new(formatter));
        self
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn without_color(mut self) -> Self {
        self.color = None;
        self
    }

    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    /// The configured formatter, or the default one using `separator`.
    pub(crate) fn message_formatter(&self) -> Arc<dyn MessageFormatter> {
        match &self.formatter {
            Some(formatter) => formatter.clone(),
            None => Arc::new(DefaultFormatter::new(self.separator.clone())),
        }
    }

    pub(crate) fn style(&self) -> Style {
        self.color.as_deref().map(Style::parse).unwrap_or_default()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::args;

    #[test]
    fn defaults() {
        let options = LoggerOptions::default();
        assert_eq!(options.separator, " ");
        assert_eq!(options.style(), Style::parse("bold blue"));
        assert_eq!(options.tick, Duration::from_secs(1));
    }

    #[test]
    fn separator_reaches_default_formatter() {
        let formatter = LoggerOptions::default()
            .with_separator("::")
            .message_formatter();
        assert_eq!(formatter.format(&args!["a", "b"], Duration::ZERO), "a::b");
    }

    #[test]
    fn custom_formatter_wins() {
        let formatter = LoggerOptions::default()
            .with_separator("::")
            .with_formatter(|args: &[crate::Arg], _: Duration| format!("{} args", args.len()))
            .message_formatter();
        assert_eq!(formatter.format(&args!["a", "b"], Duration::ZERO), "2 args");
    }

    #[test]
    fn no_color_is_plain() {
        assert!(LoggerOptions::default().without_color().style().is_plain());
    }
}
