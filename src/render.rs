//! Rendering of the users view.
//!
//! A [`ViewState`] is first turned into a [`Frame`], a plain view model with
//! every string already formatted, and then handed to a [`Renderer`].

use crate::users::User;
use crate::view::ViewState;
use anyhow::Result;
use chrono::{FixedOffset, Local, Locale};
use minijinja::Environment;
use serde::{Deserialize, Serialize};

pub const TITLE: &str = "User List";
pub const AVATAR_SIZE: u32 = 50;
const INVALID_DATE: &str = "Invalid Date";

const USERS_TEMPLATE: &str = include_str!("../templates/users.html");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Html,
}

/// Time zone used to pick the calendar day of a timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    /// The viewer's zone rules, applied at each instant shown
    Local,
    Fixed(FixedOffset),
}

/// How creation dates are shown to the viewer
#[derive(Debug, Clone, Copy)]
pub struct DateStyle {
    pub locale: Locale,
    pub zone: Zone,
}

impl DateStyle {
    pub fn new(locale: Locale, zone: Zone) -> Self {
        Self { locale, zone }
    }

    /// Locale from `name` (or the environment when `None`), local time zone
    pub fn detect(name: Option<&str>) -> Self {
        let locale = name
            .and_then(parse_locale)
            .or_else(|| locale_from_env(|var| std::env::var(var).ok()))
            .unwrap_or(Locale::en_US);
        Self::new(locale, Zone::Local)
    }

    /// Short date in the viewer's locale, e.g. "1/15/2024" for en_US
    pub fn short_date(&self, user: &User) -> String {
        let Some(dt) = user.created() else {
            return INVALID_DATE.to_string();
        };
        let fmt = short_date_format(self.locale);
        match self.zone {
            Zone::Local => dt
                .with_timezone(&Local)
                .format_localized(fmt, self.locale)
                .to_string(),
            Zone::Fixed(offset) => dt
                .with_timezone(&offset)
                .format_localized(fmt, self.locale)
                .to_string(),
        }
    }
}

/// en_US short dates are unpadded ("1/5/2024"); other locales use their `%x`
fn short_date_format(locale: Locale) -> &'static str {
    match locale {
        Locale::en_US => "%-m/%-d/%Y",
        _ => "%x",
    }
}

/// Parse a POSIX locale name such as "de_DE.UTF-8" or "C"
pub fn parse_locale(name: &str) -> Option<Locale> {
    let base = name.split(['.', '@']).next().unwrap_or_default().trim();
    match base {
        "" => None,
        "C" | "POSIX" => Some(Locale::POSIX),
        _ => Locale::try_from(base).ok(),
    }
}

/// First usable locale from LC_ALL, LC_TIME, LANG
pub fn locale_from_env<F>(get: F) -> Option<Locale>
where
    F: Fn(&str) -> Option<String>,
{
    ["LC_ALL", "LC_TIME", "LANG"]
        .iter()
        .filter_map(|var| get(*var))
        .find(|value| !value.is_empty())
        .and_then(|value| parse_locale(&value))
}

#[derive(Debug, Clone, Serialize)]
pub struct ListItem {
    pub key: String,
    pub name: String,
    pub alt: String,
    pub avatar: String,
    pub avatar_size: u32,
    pub date: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Frame {
    pub title: &'static str,
    pub loading: bool,
    /// Empty while loading
    pub items: Vec<ListItem>,
}

impl Frame {
    pub fn from_state(state: &ViewState, style: &DateStyle) -> Self {
        let items = state
            .users()
            .unwrap_or_default()
            .iter()
            .map(|user| ListItem {
                key: user.id.clone(),
                name: user.name.clone(),
                alt: user.alt_text(),
                avatar: user.avatar.clone(),
                avatar_size: AVATAR_SIZE,
                date: style.short_date(user),
            })
            .collect();

        Self {
            title: TITLE,
            loading: state.is_loading(),
            items,
        }
    }
}

pub trait Renderer {
    fn render(&self, frame: &Frame) -> Result<String>;
}

/// Build the renderer for a format
pub fn renderer_for(format: OutputFormat, ansi: bool) -> Result<Box<dyn Renderer>> {
    Ok(match format {
        OutputFormat::Text => Box::new(TextRenderer { ansi }),
        OutputFormat::Html => Box::new(HtmlRenderer::new()?),
    })
}

/// Terminal output. With `ansi`, names are printed in bold.
pub struct TextRenderer {
    pub ansi: bool,
}

impl Renderer for TextRenderer {
    fn render(&self, frame: &Frame) -> Result<String> {
        let mut out = format!("{}\n", frame.title);
        if frame.loading {
            out.push_str("Loading...\n");
            return Ok(out);
        }
        for (i, item) in frame.items.iter().enumerate() {
            let name = if self.ansi {
                format!("\x1b[1m{}\x1b[0m", item.name)
            } else {
                item.name.clone()
            };
            out.push_str(&format!("{:>2}. {}  {}\n", i + 1, name, item.date));
            out.push_str(&format!(
                "    [{} {}x{}] {}\n",
                item.alt, item.avatar_size, item.avatar_size, item.avatar
            ));
        }
        Ok(out)
    }
}

pub struct HtmlRenderer {
    env: Environment<'static>,
}

impl HtmlRenderer {
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        // The .html name turns on auto-escaping
        env.add_template("users.html", USERS_TEMPLATE)?;
        Ok(Self { env })
    }
}

impl Renderer for HtmlRenderer {
    fn render(&self, frame: &Frame) -> Result<String> {
        let tmpl = self.env.get_template("users.html")?;
        Ok(tmpl.render(frame)?)
    }
}
