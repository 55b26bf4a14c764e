// Shared test helpers for integration tests
#![allow(dead_code)]

use cvd_matrix::core::error::{CvdError, CvdResult};
use cvd_matrix::infra::browser::{AuditEngine, BrowserPage, BrowserSession};
use cvd_matrix::models::{DisplayMode, Issue, Standard};
use kuchiki::traits::*;
use kuchiki::NodeRef;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::rc::Rc;

pub const TARGET: &str = "https://example.test/resume.html";

/// Page with one style block whose only color is pure red.
pub const RED_PAGE: &str = "<!DOCTYPE html><html><head><style>p { color: #ff0000; }</style></head><body><p>Hello</p></body></html>";

pub const NO_STYLE_PAGE: &str = "<!DOCTYPE html><html><head><title>x</title></head><body><p>Hello</p></body></html>";

/// Everything the fake browser observed, shared between the session, its
/// pages and the test.
#[derive(Debug, Default)]
pub struct FakeState {
    /// Markup served for non-file URLs.
    pub sites: HashMap<String, String>,
    /// Ordered log of browser operations, e.g. `goto 2 https://...`.
    pub events: Vec<String>,
    pub pages_opened: usize,
    pub pages_closed: usize,
    pub session_closed: bool,
    /// Screenshot paths containing this text fail.
    pub fail_screenshot_containing: Option<String>,
    next_page: usize,
}

impl FakeState {
    pub fn open_pages(&self) -> usize {
        self.pages_opened - self.pages_closed
    }

    pub fn events_starting_with(&self, prefix: &str) -> Vec<String> {
        self.events
            .iter()
            .filter(|e| e.starts_with(prefix))
            .cloned()
            .collect()
    }
}

pub type SharedState = Rc<RefCell<FakeState>>;

/// In-memory browser session. HTML is parsed with kuchiki; `file://` URLs
/// are read from disk so materialized artifacts can be navigated to.
pub struct FakeSession {
    state: SharedState,
}

impl FakeSession {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(FakeState::default())),
        }
    }

    pub fn serving(url: &str, html: &str) -> Self {
        let session = Self::new();
        session
            .state
            .borrow_mut()
            .sites
            .insert(url.to_string(), html.to_string());
        session
    }

    pub fn state(&self) -> SharedState {
        Rc::clone(&self.state)
    }
}

impl BrowserSession for FakeSession {
    type Page = FakePage;

    async fn new_page(&self) -> CvdResult<FakePage> {
        let mut state = self.state.borrow_mut();
        state.next_page += 1;
        state.pages_opened += 1;
        let id = state.next_page;
        state.events.push(format!("open {id}"));
        Ok(FakePage {
            id,
            document: RefCell::new(None),
            scheme: RefCell::new(None),
            state: Rc::clone(&self.state),
        })
    }

    async fn close(self) -> CvdResult<()> {
        let mut state = self.state.borrow_mut();
        state.session_closed = true;
        state.events.push("close session".to_string());
        Ok(())
    }
}

pub struct FakePage {
    pub id: usize,
    document: RefCell<Option<NodeRef>>,
    scheme: RefCell<Option<DisplayMode>>,
    state: SharedState,
}

impl FakePage {
    fn log(&self, event: String) {
        self.state.borrow_mut().events.push(event);
    }

    fn first_style(&self) -> CvdResult<Option<NodeRef>> {
        let document = self.document.borrow();
        let document = document
            .as_ref()
            .ok_or_else(|| CvdError::Bridge("page has not navigated".to_string()))?;
        Ok(document
            .select_first("style")
            .ok()
            .map(|style| style.as_node().clone()))
    }
}

impl BrowserPage for FakePage {
    async fn emulate_color_scheme(&self, mode: DisplayMode) -> CvdResult<()> {
        *self.scheme.borrow_mut() = Some(mode);
        self.log(format!("emulate {} {}", self.id, mode));
        Ok(())
    }

    async fn goto(&self, url: &str) -> CvdResult<()> {
        self.log(format!("goto {} {}", self.id, url));
        let html = match url.strip_prefix("file://") {
            Some(path) => fs::read_to_string(path)?,
            None => self
                .state
                .borrow()
                .sites
                .get(url)
                .cloned()
                .ok_or_else(|| CvdError::Bridge(format!("net::ERR_NAME_NOT_RESOLVED at {url}")))?,
        };
        *self.document.borrow_mut() = Some(kuchiki::parse_html().one(html));
        Ok(())
    }

    async fn first_style_text(&self) -> CvdResult<Option<String>> {
        Ok(self.first_style()?.map(|style| style.text_contents()))
    }

    async fn replace_first_style(&self, css: &str) -> CvdResult<bool> {
        let Some(style) = self.first_style()? else {
            return Ok(false);
        };
        for child in style.children().collect::<Vec<_>>() {
            child.detach();
        }
        style.append(NodeRef::new_text(css));
        Ok(true)
    }

    async fn content(&self) -> CvdResult<String> {
        let document = self.document.borrow();
        let document = document
            .as_ref()
            .ok_or_else(|| CvdError::Bridge("page has not navigated".to_string()))?;
        Ok(document.to_string())
    }

    async fn screenshot(&self, path: &Path) -> CvdResult<()> {
        self.log(format!("screenshot {} {}", self.id, path.display()));
        let fail = self
            .state
            .borrow()
            .fail_screenshot_containing
            .as_ref()
            .is_some_and(|needle| path.to_string_lossy().contains(needle.as_str()));
        if fail {
            return Err(CvdError::Bridge("screenshot failed".to_string()));
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let scheme = self.scheme.borrow().map(|m| m.to_string()).unwrap_or_default();
        fs::write(path, format!("fake png ({scheme})"))?;
        Ok(())
    }

    async fn close(self) -> CvdResult<()> {
        let mut state = self.state.borrow_mut();
        state.pages_closed += 1;
        state.events.push(format!("close {}", self.id));
        Ok(())
    }
}

/// Audit engine that navigates the given page to the target and reports one
/// contrast issue if the page's first style block still contains `flagged`.
pub struct FakeAudit {
    pub flagged: String,
    pub standards: RefCell<Vec<Standard>>,
}

impl FakeAudit {
    pub fn flagging(color: &str) -> Self {
        Self {
            flagged: color.to_string(),
            standards: RefCell::new(Vec::new()),
        }
    }
}

impl AuditEngine<FakePage> for FakeAudit {
    async fn audit(&self, target: &str, standard: Standard, page: &FakePage) -> CvdResult<Vec<Issue>> {
        self.standards.borrow_mut().push(standard);
        page.log(format!("audit {} {}", page.id, target));
        page.goto(target).await?;

        let styles = page.first_style_text().await?.unwrap_or_default();
        if !styles.contains(&self.flagged) {
            return Ok(Vec::new());
        }
        Ok(vec![Issue {
            code: format!("{}.Principle1.Guideline1_4.1_4_6.G17.Fail", standard),
            message: "This element has insufficient contrast at this conformance level.".to_string(),
            context: "<p>Hello</p>".to_string(),
            selector: "html > body > p".to_string(),
            kind: Some("error".to_string()),
        }])
    }
}
