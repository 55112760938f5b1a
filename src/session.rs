//! Ephemeral per-run state: the latest query results and the request
//! generations that decide which in-flight response may still land.

use serde::Serialize;
use std::collections::HashMap;

use crate::types::{AppView, ProductIdea, TrendResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RequestKind {
    Ideas,
    Trends,
    Mockup,
}

/// Issued when a request starts. A response is applied only if its token is
/// still the latest of its kind; anything older has been superseded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken {
    kind: RequestKind,
    generation: u64,
}

impl RequestToken {
    pub fn kind(&self) -> RequestKind {
        self.kind
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Slot {
    latest: u64,
    pending: bool,
}

impl Slot {
    fn issue(&mut self) -> u64 {
        self.latest += 1;
        self.pending = true;
        self.latest
    }

    /// Settle a response. False when the generation is stale.
    fn settle(&mut self, generation: u64) -> bool {
        if generation != self.latest {
            return false;
        }
        self.pending = false;
        true
    }
}

/// Snapshot of the session handed to the frontend.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub view: AppView,
    pub ideas: Vec<ProductIdea>,
    pub trends: Vec<TrendResult>,
    pub visualizing: Option<ProductIdea>,
    pub mockup_url: Option<String>,
    pub is_loading_ideas: bool,
    pub is_loading_trends: bool,
    pub is_generating_image: bool,
}

#[derive(Debug, Default)]
pub struct Session {
    pub view: AppView,
    ideas: Vec<ProductIdea>,
    trends: Vec<TrendResult>,
    visualizing: Option<ProductIdea>,
    mockup_url: Option<String>,
    ideas_slot: Slot,
    trends_slot: Slot,
    mockup_slot: Slot,
    /// Latest mockup generation per (title, description).
    mockup_by_idea: HashMap<(String, String), u64>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&mut self, kind: RequestKind) -> &mut Slot {
        match kind {
            RequestKind::Ideas => &mut self.ideas_slot,
            RequestKind::Trends => &mut self.trends_slot,
            RequestKind::Mockup => &mut self.mockup_slot,
        }
    }

    /// Start an idea query. The previous batch is dropped right away.
    pub fn begin_ideas(&mut self) -> RequestToken {
        self.ideas.clear();
        self.issue(RequestKind::Ideas)
    }

    pub fn begin_trends(&mut self) -> RequestToken {
        self.trends.clear();
        self.issue(RequestKind::Trends)
    }

    /// Start rendering a mockup for `idea` and switch to the visualizer.
    pub fn begin_mockup(&mut self, idea: ProductIdea) -> RequestToken {
        self.view = AppView::Visualizer;
        let key = (idea.title.clone(), idea.description.clone());
        self.visualizing = Some(idea);
        self.mockup_url = None;
        let token = self.issue(RequestKind::Mockup);
        self.mockup_by_idea.insert(key, token.generation);
        token
    }

    /// Whether `token` is the newest mockup request for this idea, even if
    /// the visualizer has since moved to another idea.
    pub fn is_latest_for_idea(&self, token: RequestToken, title: &str, description: &str) -> bool {
        token.kind == RequestKind::Mockup
            && self
                .mockup_by_idea
                .get(&(title.to_string(), description.to_string()))
                == Some(&token.generation)
    }

    fn issue(&mut self, kind: RequestKind) -> RequestToken {
        let generation = self.slot(kind).issue();
        RequestToken { kind, generation }
    }

    /// Whether `token` is still the latest request of its kind.
    pub fn is_current(&self, token: RequestToken) -> bool {
        let slot = match token.kind {
            RequestKind::Ideas => &self.ideas_slot,
            RequestKind::Trends => &self.trends_slot,
            RequestKind::Mockup => &self.mockup_slot,
        };
        slot.latest == token.generation
    }

    /// Replace the idea list. Returns false if the token was superseded.
    pub fn finish_ideas(&mut self, token: RequestToken, ideas: Vec<ProductIdea>) -> bool {
        debug_assert_eq!(token.kind, RequestKind::Ideas);
        if !self.ideas_slot.settle(token.generation) {
            return false;
        }
        self.ideas = ideas;
        true
    }

    pub fn finish_trends(&mut self, token: RequestToken, trends: Vec<TrendResult>) -> bool {
        debug_assert_eq!(token.kind, RequestKind::Trends);
        if !self.trends_slot.settle(token.generation) {
            return false;
        }
        self.trends = trends;
        true
    }

    pub fn finish_mockup(&mut self, token: RequestToken, data_url: String) -> bool {
        debug_assert_eq!(token.kind, RequestKind::Mockup);
        if !self.mockup_slot.settle(token.generation) {
            return false;
        }
        self.mockup_url = Some(data_url);
        true
    }

    /// Clear the pending flag after a failed request, if still current.
    pub fn fail(&mut self, token: RequestToken) -> bool {
        self.slot(token.kind).settle(token.generation)
    }

    pub fn is_pending(&self, kind: RequestKind) -> bool {
        match kind {
            RequestKind::Ideas => self.ideas_slot.pending,
            RequestKind::Trends => self.trends_slot.pending,
            RequestKind::Mockup => self.mockup_slot.pending,
        }
    }

    pub fn ideas(&self) -> &[ProductIdea] {
        &self.ideas
    }

    pub fn trends(&self) -> &[TrendResult] {
        &self.trends
    }

    pub fn snapshot(&self) -> SessionView {
        SessionView {
            view: self.view,
            ideas: self.ideas.clone(),
            trends: self.trends.clone(),
            visualizing: self.visualizing.clone(),
            mockup_url: self.mockup_url.clone(),
            is_loading_ideas: self.ideas_slot.pending,
            is_loading_trends: self.trends_slot.pending,
            is_generating_image: self.mockup_slot.pending,
        }
    }
}
