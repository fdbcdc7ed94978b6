//! Page rendering with minijinja
//!
//! Templates are compiled into the binary and registered once at start-up.

use minijinja::{context, Environment, Value};
use serde::Serialize;

use super::state::AppState;
use crate::locale::Language;
use crate::utils::error::Result;
use crate::VERSION;

const TEMPLATES: [(&str, &str); 4] = [
    ("base.html", include_str!("../../templates/base.html")),
    ("home.html", include_str!("../../templates/home.html")),
    ("about.html", include_str!("../../templates/about.html")),
    ("recognition.html", include_str!("../../templates/recognition.html")),
];

/// Pages reachable from the navigation menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Home,
    About,
    Recognition,
}

impl Page {
    pub const ALL: [Page; 3] = [Page::Home, Page::About, Page::Recognition];

    pub fn path(&self) -> &'static str {
        match self {
            Page::Home => "/",
            Page::About => "/about",
            Page::Recognition => "/recognition",
        }
    }

    /// Locale key of the menu label
    pub fn title_key(&self) -> &'static str {
        match self {
            Page::Home => "home",
            Page::About => "about",
            Page::Recognition => "disease_recognition",
        }
    }

    pub fn template(&self) -> &'static str {
        match self {
            Page::Home => "home.html",
            Page::About => "about.html",
            Page::Recognition => "recognition.html",
        }
    }
}

#[derive(Serialize)]
struct NavItem<'a> {
    path: &'static str,
    label: &'a str,
    active: bool,
}

#[derive(Serialize)]
struct LanguageOption {
    code: &'static str,
    name: &'static str,
    selected: bool,
}

/// Registered page templates
pub struct PageRenderer {
    env: Environment<'static>,
}

impl PageRenderer {
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        for (name, source) in TEMPLATES {
            env.add_template(name, source)?;
        }
        Ok(Self { env })
    }

    /// Render `page` in `language`, merging `extra` into the shared context
    pub fn render(&self, state: &AppState, page: Page, language: Language, extra: Value) -> Result<String> {
        let strings = state.locales.strings(language);

        let nav: Vec<NavItem> = Page::ALL
            .iter()
            .map(|p| NavItem {
                path: p.path(),
                label: state.locales.text(language, p.title_key()),
                active: *p == page,
            })
            .collect();

        let languages: Vec<LanguageOption> = Language::ALL
            .iter()
            .map(|l| LanguageOption {
                code: l.code(),
                name: l.native_name(),
                selected: *l == language,
            })
            .collect();

        let ctx = context! {
            t => strings,
            lang => language.code(),
            page_path => page.path(),
            nav => nav,
            languages => languages,
            version => VERSION,
            ..extra
        };

        Ok(self.env.get_template(page.template())?.render(ctx)?)
    }
}

impl std::fmt::Debug for PageRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageRenderer")
            .field("templates", &TEMPLATES.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::cnn::PlantClassifierConfig;
    use crate::server::state::ServerConfig;

    fn state() -> AppState {
        AppState::new(ServerConfig::default(), PlantClassifierConfig::new()).unwrap()
    }

    #[test]
    fn test_all_templates_register() {
        assert!(PageRenderer::new().is_ok());
    }

    #[test]
    fn test_every_page_renders_in_every_language() {
        let state = state();
        for page in Page::ALL {
            for language in Language::ALL {
                let html = state
                    .pages
                    .render(&state, page, language, context! {})
                    .unwrap();
                assert!(html.contains(&format!("lang=\"{}\"", language.code())));
                assert!(html.contains(state.locales.text(language, page.title_key())));
            }
        }
    }

    #[test]
    fn test_home_page_links_static_image() {
        let state = state();
        let html = state
            .pages
            .render(&state, Page::Home, Language::English, context! {})
            .unwrap();
        assert!(html.contains("PLANT DISEASE RECOGNITION SYSTEM"));
        assert!(html.contains("/static/home_page.png"));
    }
}
