//! Rendering of one event into bytes
//!
//! Two layouts are supported:
//! - Text: `2025-01-08T10:30:45.123Z [INFO]  api: request done: status=200 path=/v1`
//! - Json: `{"@level":"info","@message":"request done","@module":"api",...}`

use super::error::Result;
use super::field::Fields;
use super::log_level::Level;
use super::logger::Location;
use super::timestamp::TimestampFormat;
use super::writer::{paint, ColorMode};
use chrono::{DateTime, Utc};
use std::fmt::Write as _;

/// One admitted event, ready to be rendered
pub(crate) struct Event<'a> {
    pub time: Option<DateTime<Utc>>,
    pub name: &'a str,
    pub level: Level,
    pub location: Option<Location>,
    pub message: &'a str,
    pub fields: &'a Fields,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }

    /// Append the rendered event, newline included, to `out`.
    pub(crate) fn render(
        &self,
        event: &Event<'_>,
        time_format: &TimestampFormat,
        color: ColorMode,
        out: &mut Vec<u8>,
    ) -> Result<()> {
        match self {
            OutputFormat::Text => {
                let line = Self::format_text(event, time_format, color);
                out.extend_from_slice(line.as_bytes());
            }
            OutputFormat::Json => Self::format_json(event, time_format, out)?,
        }
        Ok(())
    }

    fn format_text(event: &Event<'_>, time_format: &TimestampFormat, color: ColorMode) -> String {
        let mut line = String::with_capacity(128);

        if let Some(time) = &event.time {
            line.push_str(&time_format.format(time));
            line.push(' ');
        }

        let header = format!("{:<7}", format!("[{}]", event.level.to_str()));
        match color {
            ColorMode::Header | ColorMode::HeaderAndFields => {
                line.push_str(&paint(event.level, &header))
            }
            _ => line.push_str(&header),
        }
        line.push(' ');

        if let Some(location) = &event.location {
            let _ = write!(line, "{}: ", location);
        }
        if !event.name.is_empty() {
            line.push_str(event.name);
            line.push_str(": ");
        }
        line.push_str(event.message);

        for (key, value) in event.fields.iter() {
            let key = if color == ColorMode::HeaderAndFields {
                paint(event.level, key)
            } else {
                key.to_string()
            };
            let value = value.to_string();

            if value.contains('\n') {
                let _ = write!(line, " {}=", key);
                for part in value.lines() {
                    let _ = write!(line, "\n  | {}", part);
                }
            } else if needs_quoting(&value) {
                let _ = write!(line, " {}={:?}", key, value);
            } else {
                let _ = write!(line, " {}={}", key, value);
            }
        }

        line.push('\n');
        line
    }

    fn format_json(event: &Event<'_>, time_format: &TimestampFormat, out: &mut Vec<u8>) -> Result<()> {
        let mut json_obj = serde_json::Map::new();

        if let Some(time) = &event.time {
            json_obj.insert("@timestamp".to_string(), time_format.to_json_value(time));
        }
        json_obj.insert(
            "@level".to_string(),
            serde_json::Value::String(event.level.to_str().to_lowercase()),
        );
        json_obj.insert(
            "@message".to_string(),
            serde_json::Value::String(event.message.to_string()),
        );
        if !event.name.is_empty() {
            json_obj.insert(
                "@module".to_string(),
                serde_json::Value::String(event.name.to_string()),
            );
        }
        if let Some(location) = &event.location {
            json_obj.insert(
                "@caller".to_string(),
                serde_json::Value::String(location.to_string()),
            );
        }

        for (key, value) in event.fields.iter() {
            json_obj.insert(key.to_string(), value.to_json_value());
        }

        serde_json::to_writer(&mut *out, &json_obj)?;
        out.push(b'\n');
        Ok(())
    }
}

fn needs_quoting(value: &str) -> bool {
    value.is_empty()
        || value
            .chars()
            .any(|c| c.is_whitespace() || c == '"' || c == '=' || c.is_control())
}
