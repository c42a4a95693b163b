//! Server-side convergence: render → measure → step until the engine settles.
//!
//! Used by the export path, where there is no browser to report heights. The loop
//! drives the same [`AutoFit`] state machine as the live editor, with a virtual clock
//! so the settle guard never blocks.

use std::time::Instant;

use tracing::{debug, warn};

use crate::layout::engine::{AutoFit, LayoutState, Step, Transition};
use crate::layout::measure::Measurer;
use crate::models::document::Document;
use crate::render::{Page, Template};

#[derive(Debug, Clone)]
pub struct FitOutcome {
    pub state: LayoutState,
    pub page: Page,
    pub transitions: Vec<Transition>,
    /// Last step taken; `Terminal` means the page still overflows at the floor scale.
    pub last: Step,
}

/// Fits `doc` to one page starting from `engine`'s current state.
///
/// Terminates after at most one step per ladder rung plus the final evaluation.
pub fn fit_with(
    engine: &mut AutoFit,
    template: &dyn Template,
    doc: &Document,
    measurer: &dyn Measurer,
) -> FitOutcome {
    let mut now = Instant::now();
    let mut transitions = Vec::new();
    let mut page = template.render(doc, &engine.tokens());
    let mut last = Step::Unavailable;

    // Shrinking from the current state takes at most `ladder_len` steps, and so does
    // growing back; scale can be refined once more after a grow.
    let bound = 2 * engine.config().ladder_len() + 1;
    let mut settled = false;
    for _ in 0..bound {
        last = engine.on_measure(measurer.measure(&page), now);
        match last {
            Step::Applied { transition } => {
                transitions.push(transition);
                page = template.render(doc, &engine.tokens());
                now += engine.config().settle;
            }
            // A cloned engine may still be settling from a live transition.
            Step::Deferred => now += engine.config().settle,
            _ => {
                settled = true;
                break;
            }
        }
    }
    if !settled {
        warn!(
            template = template.id(),
            transitions = transitions.len(),
            "fit did not settle within {bound} steps"
        );
    }

    debug!(
        template = template.id(),
        transitions = transitions.len(),
        "fit finished at {:?}",
        engine.state()
    );
    FitOutcome {
        state: *engine.state(),
        page,
        transitions,
        last,
    }
}
