/// Crawl phase definitions
///
/// A run moves `Idle -> Walking(category) -> Walking(subcategory) -> Fanning(products)`
/// and ends in either `Done` or `Capped`.
use std::fmt;

/// Represents where the orchestrator currently is in a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlPhase {
    /// Nothing has been walked yet
    Idle,

    /// Walking a top-level category
    WalkingCategory { category: String },

    /// Walking one subcategory of the current category
    WalkingSubcategory {
        category: String,
        subcategory: String,
    },

    /// Enriching the listings of the current subcategory
    Fanning { subcategory: String, listings: usize },

    // ===== Terminal States =====
    /// Every category was walked
    Done,

    /// The global product cap was reached and the walk stopped early
    Capped,
}

impl CrawlPhase {
    /// Returns true if the run has finished
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Capped)
    }

    /// Short label used in logs and the run table
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::WalkingCategory { .. } => "walking_category",
            Self::WalkingSubcategory { .. } => "walking_subcategory",
            Self::Fanning { .. } => "fanning",
            Self::Done => "done",
            Self::Capped => "capped",
        }
    }

    /// Checks whether moving from `self` to `next` is a legal step
    pub fn can_transition_to(&self, next: &CrawlPhase) -> bool {
        use CrawlPhase::*;

        match (self, next) {
            (Done | Capped, _) => false,
            (_, Done) => true,
            (Idle, WalkingCategory { .. }) => true,
            (WalkingCategory { .. }, WalkingCategory { .. } | WalkingSubcategory { .. }) => true,
            (
                WalkingSubcategory { .. },
                WalkingCategory { .. } | WalkingSubcategory { .. } | Fanning { .. },
            ) => true,
            (Fanning { .. }, WalkingCategory { .. } | WalkingSubcategory { .. } | Capped) => true,
            _ => false,
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WalkingCategory { category } => write!(f, "walking({})", category),
            Self::WalkingSubcategory {
                category,
                subcategory,
            } => write!(f, "walking({} / {})", category, subcategory),
            Self::Fanning {
                subcategory,
                listings,
            } => write!(f, "fanning({}, {} listings)", subcategory, listings),
            other => write!(f, "{}", other.label()),
        }
    }
}
